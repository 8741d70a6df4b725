//! Error and warning types for Traducir
//!
//! The transpilation pass itself never fails: every degraded path is
//! reported as a [`Warning`] while the pass keeps producing output text.
//! [`Error`] covers the boundary around the core - reading an AST file,
//! deserializing it, writing output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Traducir operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the core transpilation pass
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// AST deserialization error
    #[error("ast error: {0}")]
    Ast(#[from] serde_json::Error),
}

/// A degraded translation path, reported alongside the emitted text
///
/// The pass is total: none of these abort it. They mark places where the
/// output fell back to a generic or placeholder form and deserves review.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    /// An expression or statement shape had no matching rule; a fixed
    /// placeholder was emitted in its place
    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct {
        /// Description of the unmatched node kind
        construct: String,
    },

    /// An idiom reconstruction (match dispatch or pipeline) looked
    /// applicable but its structural preconditions were not met; the
    /// statement was rendered through the generic path instead
    #[error("pattern fell back to generic rendering: {reason}")]
    AmbiguousPattern {
        /// Why the reconstruction was abandoned
        reason: String,
    },

    /// No annotation, default, or heuristic signal resolved a type;
    /// the wildcard `Data` was used
    #[error("no type signal for `{name}`, defaulting to Data")]
    TypeUnresolved {
        /// The parameter or field whose type stayed unresolved
        name: String,
    },

    /// A reconstructed `when` match has no `_` arm because the source
    /// chain had no final `else`
    #[error("match on `{anchor}` has no default arm")]
    NonExhaustiveMatch {
        /// The anchor variable the match scrutinizes
        anchor: String,
    },
}
