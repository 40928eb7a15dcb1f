//! Arvak Reversible Arithmetic Model
//!
//! This crate describes the reversible arithmetic operations that the Arvak
//! lowering engine decomposes into primitive gates. It is the leaf of the
//! lowering stack: it knows what each operation does, never how to build it.
//!
//! # Core Components
//!
//! - **Qubits and Registers**: [`QubitId`] and [`Register`], an ordered qubit
//!   sequence read as a little-endian unsigned integer
//! - **Operations**: [`Operation`], a closed set of reversible variants with a
//!   total [`Operation::inverse`] and a basis-state action [`Operation::apply`]
//! - **Commands**: [`Command`], an operation bound to registers, a control set
//!   and provenance tags
//! - **Exact phases**: [`Dyadic`] exponents for phase-gradient operations
//!
//! # Example: Building a Controlled Modular Offset
//!
//! ```rust
//! use arvak_arith::{Command, Operation, QubitId, Register};
//!
//! let target = Register::contiguous(0, 4);
//! let op = Operation::modular_offset(5, 13).unwrap();
//! let cmd = Command::single(op, target)
//!     .unwrap()
//!     .with_controls([QubitId(4)])
//!     .unwrap();
//!
//! assert_eq!(cmd.operation().apply(&[4], &[11]), vec![3]);
//! assert_eq!(cmd.inverse().operation().apply(&[4], &[3]), vec![11]);
//! ```
//!
//! # Reversibility
//!
//! Parameters that would make an operation irreversible are rejected when
//! the operation is built:
//!
//! | Operation | Requirement |
//! |-----------|-------------|
//! | `ModularDouble`, `ModularUndouble` | odd modulus |
//! | `ModularScaledAddition` | odd modulus |
//! | `ModularBimultiplication` | factor invertible modulo the modulus |
//! | `Scale` | odd factors |
//!
//! Modular operations leave out-of-range values (`x >= modulus`) unchanged.

pub mod command;
pub mod dyadic;
pub mod error;
pub mod modular;
pub mod operation;
pub mod qubit;

pub use command::{Command, MAX_CONSTANT_WIDTH};
pub use dyadic::Dyadic;
pub use error::{ArithError, ArithResult};
pub use operation::{Bimultiplier, Modulus, OddFactor, OddModulus, Operation, OperationTag};
pub use qubit::{QubitId, Register};
