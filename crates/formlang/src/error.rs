//! Error types for automaton construction.

use thiserror::Error;

/// Errors surfaced while building an automaton.
///
/// Duplicate state registration is not an error: it logs a warning and
/// leaves the automaton untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A transition or marker referenced a name that was never registered.
    #[error("no state named `{0}` is registered")]
    UnknownState(String),

    /// Conversion was requested for an NFA without a start state.
    #[error("the NFA has no start state")]
    MissingStartState,

    /// Two distinct composite states canonicalized to the same key.
    /// Conversion aborts rather than silently merging the subsets.
    #[error("two distinct composite states share the canonical key `{0}`")]
    CompositeKeyCollision(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AutomatonError>;
