//! Error types for the lowering crate.

use arvak_arith::{ArithError, OperationTag};
use thiserror::Error;

/// Errors that abort a lowering.
///
/// None of these are recoverable locally: a partially lowered command
/// could leave borrowed workspace qubits corrupted, so no output is
/// returned alongside an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LowerError {
    /// No rule, forward or inverted, accepts the command.
    #[error("No decomposition rule applies to {command} (workspace: {workspace} qubits)")]
    NoApplicableDecomposition {
        /// The operation's tag.
        tag: OperationTag,
        /// Rendered canonical command.
        command: String,
        /// Number of qubits available as workspace.
        workspace: usize,
    },

    /// A canonical shape was requested again while still being resolved.
    #[error("Cyclic decomposition: {command} is already being decomposed")]
    CyclicDecomposition {
        /// The operation's tag.
        tag: OperationTag,
        /// Rendered canonical command.
        command: String,
    },

    /// A custom chooser picked a candidate that does not exist.
    #[error("Chooser returned candidate {index} of {len}")]
    ChooserOutOfRange {
        /// The returned index.
        index: usize,
        /// Number of candidates offered.
        len: usize,
    },

    /// A decomposer asked for more workspace than the command offers.
    #[error("Decomposition needs {needed} workspace qubits, only {available} available")]
    InsufficientWorkspace {
        /// Qubits requested.
        needed: usize,
        /// Qubits available.
        available: usize,
    },

    /// A decomposer built an invalid command.
    #[error("Construction error: {0}")]
    Construction(#[from] ArithError),

    /// Capability configuration could not be parsed.
    #[error("Invalid capability configuration: {0}")]
    InvalidCapability(#[from] serde_json::Error),
}

/// Result type for lowering operations.
pub type LowerResult<T> = Result<T, LowerError>;
