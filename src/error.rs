//! Error taxonomy for mesh construction and parameter resolution.
//!
//! All failures here are synchronous and fatal to the call that raised
//! them; nothing is retried or suppressed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeshError {
    /// Construction-time validation failure: no usable model exists after
    /// this is raised.
    #[error("invalid mesh configuration: {0}")]
    Configuration(String),

    /// A supplied beamsplitter-error array does not match the tunable mask.
    #[error("bs_error shape {got:?} does not match mask shape {expected:?}")]
    ShapeMismatch {
        got: (usize, usize),
        expected: (usize, usize),
    },

    /// A symbolic phase-initializer name has no registered implementation.
    #[error("unknown phase initializer '{0}'")]
    UnknownInitializer(String),
}
