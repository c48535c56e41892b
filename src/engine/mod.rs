//! engine
//!
//! Batch rename orchestration.
//!
//! # Architecture
//!
//! The engine sits above the pattern and namespace layers and drives the
//! two-phase rename lifecycle:
//!
//! - [`resolve`]: per-target conflict resolution against the simulated
//!   namespace (counter walk or force)
//! - [`batch`]: the [`BatchRenameOperation`] orchestrator — Phase 1
//!   proposes and resolves without touching the host, Phase 2 applies and
//!   commits per target
//!
//! Callers that just want a batch done end to end use [`run_batch`].

pub mod batch;
pub mod resolve;

pub use batch::{run_batch, BatchRenameOperation, RenameResult, RenameStatus};
pub use resolve::{ConflictResolver, ConflictStrategy, ResolveError};
