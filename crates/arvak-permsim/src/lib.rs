//! Arvak Permutation Simulator
//!
//! Reversible arithmetic circuits permute computational basis states, so
//! they can be verified without amplitudes:
//!
//! - [`PermutationSimulator`] tracks the image of every basis state and
//!   checks a whole permutation at once (small circuits)
//! - [`ClassicalSimulator`] tracks a single basis state (large circuits)
//! - [`check_permutation_circuit`] and [`fuzz_permutation_circuit`] wrap both
//!   into one-call equivalence checks
//!
//! Phase operations act as the identity.
//!
//! # Quick start
//!
//! ```rust
//! use arvak_arith::Command;
//! use arvak_permsim::check_permutation_circuit;
//!
//! // Three CNOTs implement a swap.
//! check_permutation_circuit(
//!     &[1, 1],
//!     |_, v| vec![v[1], v[0]],
//!     |regs| {
//!         let (a, b) = (regs[0][0], regs[1][0]);
//!         vec![
//!             Command::x(b).with_controls([a]).unwrap(),
//!             Command::x(a).with_controls([b]).unwrap(),
//!             Command::x(b).with_controls([a]).unwrap(),
//!         ]
//!     },
//!     None,
//! )
//! .unwrap();
//! ```

pub mod check;
pub mod classical;
pub mod error;
pub mod layout;
pub mod permutation;

pub use check::{check_permutation_circuit, cover, fuzz_permutation_circuit};
pub use classical::ClassicalSimulator;
pub use error::{SimError, SimResult};
pub use layout::{Layout, MAX_QUBITS};
pub use permutation::{MAX_EXHAUSTIVE_QUBITS, PermutationSimulator};
