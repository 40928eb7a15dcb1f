//! Arvak Arithmetic Lowering
//!
//! This crate rewrites reversible arithmetic commands from [`arvak_arith`]
//! into sequences the host can execute directly, typically toggle gates
//! with at most two controls.
//!
//! # Core Components
//!
//! - **Engine**: [`AutoReplacer`] lowers a command recursively, caching each
//!   resolved shape so repeated shapes are decomposed once
//! - **Rules**: [`DecompositionRule`] pairs a [`Predicate`] with a decomposer;
//!   [`RuleSet`] groups rules by operation tag
//! - **Library**: the [`rules`] module covers every operation of the
//!   arithmetic model
//! - **Host**: the [`Host`] trait answers "is this primitive?" and "which
//!   qubits are live?"; [`LimitedCapability`] is the configurable filter
//! - **Optimizer**: [`LocalOptimizer`] cancels and merges adjacent commands
//!   in each decomposition
//!
//! # Example: Lowering an Addition to Toffoli Gates
//!
//! ```rust
//! use arvak_arith::{Command, Operation};
//! use arvak_lower::{AutoReplacer, LimitedCapability, StaticHost};
//!
//! let mut host = StaticHost::new(LimitedCapability::toffoli());
//! let input = host.allocate(3);
//! let target = host.allocate(3);
//!
//! let mut engine = AutoReplacer::new(host);
//! let add = Command::add(input, target).unwrap();
//! let gates = engine.lower(&add).unwrap();
//!
//! assert!(gates.iter().all(|g| g.operation() == &Operation::X));
//! assert!(gates.iter().all(|g| g.controls().len() <= 2));
//! ```
//!
//! # Workspace
//!
//! Rules can borrow qubits that are live but untouched by the command being
//! lowered. Borrowed qubits are dirty: their value is unknown and every
//! rule restores it. A rule states how many it needs through its predicate,
//! so the same operation can lower differently depending on what is free.
//!
//! | Operation | Without workspace | With workspace |
//! |-----------|-------------------|----------------|
//! | `X` with 3+ controls | not lowerable | toggle cascade or halving |
//! | `Increment` | small widths only | halving or subtract twice |
//! | `Offset` | few bit runs | recursive split |
//! | `ModularOffset` | not lowerable | comparison and reflection |
//!
//! # Logging
//!
//! Each top-level [`AutoReplacer::lower`] call opens a `tracing` span. Rule
//! selection is logged at `debug`, primitives at `trace`.

pub mod canonical;
pub mod error;
pub mod host;
pub mod optimizer;
pub mod predicate;
pub mod replacer;
pub mod repository;
pub mod rule;
pub mod rules;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use canonical::{Canonical, CanonicalKey, canonicalize};
pub use error::{LowerError, LowerResult};
pub use host::{CommandFilter, Host, LimitedCapability, StaticHost};
pub use optimizer::{LocalOptimizer, MergeRule};
pub use predicate::Predicate;
pub use replacer::{AutoReplacer, AutoReplacerBuilder, Chooser, LoweringOptions, LoweringStats};
pub use repository::{Candidate, RuleSet};
pub use rule::{DecompositionRule, Emitter, RuleInput};
pub use workspace::workspace;
