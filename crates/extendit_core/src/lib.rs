//! Core of ExtendIt: extension points for scoped extension traits.
//!
//! An extension scope wraps an [`ExtensionPointBase`] to learn which value, or
//! which type, it extends. Downstream code that only needs the erased view goes
//! through the [`ExtensionPoint`] capability.

pub mod extension;
pub mod logging;

pub use extension::point::{ExtensionPoint, ExtensionPointBase, ExtensionPointError};
pub use extension::scope::{Admits, Extendable, Lineage, Member, Scope, TypeDescriptor};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
