//! Error types for the arithmetic operation model.

use crate::operation::OperationTag;
use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while constructing operations and commands.
///
/// Every variant describes a value that would be irreversible or
/// ill-shaped. They are raised when the value is built, never during
/// decomposition of an already valid command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ArithError {
    /// Modulus must be strictly positive.
    #[error("Modulus must be positive, got {0}")]
    NonPositiveModulus(i64),

    /// Operation is only reversible for odd moduli.
    #[error("{operation:?} is irreversible modulo even value {modulus}")]
    EvenModulus {
        /// The operation being constructed.
        operation: OperationTag,
        /// The rejected modulus.
        modulus: u64,
    },

    /// Factor has no multiplicative inverse modulo the modulus.
    #[error("Irreversible: *{factor} % {modulus} has no inverse")]
    NotInvertible {
        /// The rejected factor.
        factor: i64,
        /// The modulus.
        modulus: u64,
    },

    /// Scaling a register by an even factor is irreversible.
    #[error("Can't reversibly scale by even factor {0}")]
    EvenFactor(i64),

    /// Operation received the wrong number of registers.
    #[error("{operation:?} takes {expected} registers, got {got}")]
    RegisterCountMismatch {
        /// The operation's tag.
        operation: OperationTag,
        /// Expected register count.
        expected: usize,
        /// Provided register count.
        got: usize,
    },

    /// A register with a fixed size received the wrong number of qubits.
    #[error("{operation:?} register {index} must hold {expected} qubits, got {got}")]
    RegisterSizeMismatch {
        /// The operation's tag.
        operation: OperationTag,
        /// Register position.
        index: usize,
        /// Required size.
        expected: usize,
        /// Provided size.
        got: usize,
    },

    /// Two registers that must match in size do not.
    #[error("{operation:?} requires equal-size registers, got {left} and {right}")]
    UnequalRegisters {
        /// The operation's tag.
        operation: OperationTag,
        /// Size of the first register.
        left: usize,
        /// Size of the second register.
        right: usize,
    },

    /// A qubit appears more than once across registers and controls.
    #[error("Duplicate qubit {qubit} in {operation:?} command")]
    DuplicateQubit {
        /// The duplicated qubit.
        qubit: QubitId,
        /// The operation's tag.
        operation: OperationTag,
    },

    /// Constant-parameter operations work on registers of at most 64 qubits.
    #[error("{operation:?} supports registers of at most {max} qubits, got {got}")]
    RegisterTooWide {
        /// The operation's tag.
        operation: OperationTag,
        /// Maximum supported width.
        max: usize,
        /// Provided width.
        got: usize,
    },

    /// The modulus does not fit the register it acts on.
    #[error("Modulus {modulus} does not fit a {width}-qubit register")]
    ModulusExceedsRegister {
        /// The modulus.
        modulus: u64,
        /// Register width.
        width: usize,
    },

    /// An offset constant is outside the range its operation accepts.
    #[error("{operation:?} offset {offset} is out of range for a {width}-qubit register")]
    OffsetOutOfRange {
        /// The operation's tag.
        operation: OperationTag,
        /// The rejected offset.
        offset: u64,
        /// Register width.
        width: usize,
    },
}

/// Result type for operation construction.
pub type ArithResult<T> = Result<T, ArithError>;
