//! core
//!
//! Domain types, declarative configuration, and the host boundary.
//!
//! # Modules
//!
//! - [`types`] - Validated identifier newtypes and scope keys
//! - [`config`] - The declarative pattern/element configuration schema
//! - [`target`] - The `RenameTarget` trait consumed from the host

pub mod config;
pub mod target;
pub mod types;

pub use config::{ConfigError, ElementConfig, ElementKind, PatternConfig};
pub use target::RenameTarget;
pub use types::{ElementId, PatternId, ScopeKey, TypeError};
