//! Namecast - a pattern-based batch renaming core
//!
//! Namecast generates, parses, and de-conflicts structured names for large
//! sets of named entities according to user-defined naming patterns, and
//! safely applies batch renames without corrupting uniqueness invariants.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Strong domain types, declarative configuration schema, and
//!   the [`core::target::RenameTarget`] host boundary
//! - [`element`] - The closed set of name-element variants and the factory
//!   that builds them from configuration
//! - [`pattern`] - Naming patterns: parse, render, counter increment, and
//!   test-name generation
//! - [`namespace`] - Per-scope taken-name sets with a simulate/commit
//!   overlay, and the cache that owns them
//! - [`engine`] - Conflict resolution and the two-phase batch rename
//!   orchestrator
//!
//! # Correctness Invariants
//!
//! Namecast maintains the following invariants:
//!
//! 1. A full-name parse is atomic: element values change only when the whole
//!    input is consumed by the pattern
//! 2. Namespace ground truth is mutated only when a rename has actually been
//!    applied to the host; speculative state lives in the overlay
//! 3. Within a batch, each target's resolution sees the cumulative simulated
//!    effect of all prior targets
//! 4. Batch operations report exactly one result per collected target
//!
//! # Example
//!
//! ```
//! use namecast::core::config::PatternConfig;
//! use namecast::element::ElementFactory;
//!
//! let config: PatternConfig = toml::from_str(
//!     r#"
//!     id = "bones"
//!
//!     [[elements]]
//!     type = "text"
//!     id = "base"
//!     order = 0
//!     separator = "."
//!     items = ["Arm", "Leg"]
//!
//!     [[elements]]
//!     type = "numeric_counter"
//!     id = "count"
//!     order = 1
//!     separator = "."
//!     padding = 3
//!     "#,
//! )
//! .unwrap();
//!
//! let pattern = ElementFactory::new().create_pattern(&config).unwrap();
//! assert!(pattern.validate().is_empty());
//! ```

pub mod core;
pub mod element;
pub mod engine;
pub mod namespace;
pub mod pattern;
