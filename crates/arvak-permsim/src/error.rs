//! Error types for the permutation simulators.

use arvak_arith::QubitId;
use thiserror::Error;

/// Errors produced while simulating or checking reversible circuits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Basis states are packed into 128 bits.
    #[error("Simulator supports at most {max} qubits, requested {requested}")]
    TooManyQubits {
        /// Number of qubits requested in total.
        requested: usize,
        /// Maximum supported.
        max: usize,
    },

    /// Exhaustive simulation of this many qubits is not tractable.
    #[error("Exhaustive simulation of {requested} qubits exceeds the limit of {max}")]
    StateSpaceTooLarge {
        /// Number of qubits requested.
        requested: usize,
        /// Maximum supported for exhaustive simulation.
        max: usize,
    },

    /// A command referenced a qubit that was never allocated.
    #[error("Qubit {0} is not allocated in this simulator")]
    UnknownQubit(QubitId),

    /// A register is too wide to be read as a 64-bit value.
    #[error("Register of {0} qubits cannot be read as a 64-bit value")]
    RegisterTooWide(usize),

    /// The simulated circuit does not implement the expected permutation.
    #[error("Permutation mismatch on input {input:?}: expected {expected:?}, got {actual:?}")]
    Mismatch {
        /// Register values before the circuit.
        input: Vec<u64>,
        /// Register values the permutation predicts.
        expected: Vec<u64>,
        /// Register values the circuit produced.
        actual: Vec<u64>,
    },

    /// The circuit changed qubits outside the checked registers.
    #[error("Circuit disturbed qubits outside the checked registers on input {input:?}")]
    SideEffect {
        /// Register values before the circuit.
        input: Vec<u64>,
    },
}

/// Result type for simulation.
pub type SimResult<T> = Result<T, SimError>;
