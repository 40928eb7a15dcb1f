//! Composable rule predicates.
//!
//! A predicate decides whether a rule may decompose a command, based on its
//! register sizes, control count and the workspace available to it.
//! Predicates combine with `&` and `|`:
//!
//! ```rust
//! use arvak_lower::predicate::{max_controls, min_workspace};
//!
//! let p = max_controls(0) & min_workspace(1);
//! assert_eq!(p.to_string(), "all(max_controls(0), min_workspace(1))");
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

use crate::rule::RuleInput;

/// Register-size bound meaning "no limit".
pub const UNBOUNDED: usize = usize::MAX;

/// A user-supplied check.
#[derive(Clone)]
pub struct PredicateFn(Arc<dyn Fn(&RuleInput<'_>) -> bool + Send + Sync>);

impl fmt::Debug for PredicateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateFn")
    }
}

/// Condition under which a rule applies.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Always applies.
    Always,
    /// At least `n` controls.
    MinControls(usize),
    /// At most `n` controls.
    MaxControls(usize),
    /// Exactly as many registers as limits, each at least its limit.
    MinRegisterSizes(Vec<usize>),
    /// Exactly as many registers as limits, each at most its limit.
    MaxRegisterSizes(Vec<usize>),
    /// At least `n` workspace qubits.
    MinWorkspace(usize),
    /// At most `n` workspace qubits.
    MaxWorkspace(usize),
    /// At least `factor * controls + offset` workspace qubits.
    MinWorkspaceVsControls {
        /// Qubits per control.
        factor: usize,
        /// Constant term.
        offset: i64,
    },
    /// At least `factor * len(register 0) + offset` workspace qubits.
    MinWorkspaceVsReg1 {
        /// Qubits per bit of the first register.
        factor: usize,
        /// Constant term.
        offset: i64,
    },
    /// Named custom check.
    Custom(&'static str, PredicateFn),
    /// Every inner predicate holds.
    All(Vec<Predicate>),
    /// Some inner predicate holds.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// The predicate that always holds.
    pub fn always() -> Self {
        Predicate::Always
    }

    /// Evaluate against a rule input.
    pub fn evaluate(&self, input: &RuleInput<'_>) -> bool {
        let controls = input.controls().len();
        let workspace = input.workspace().len();
        match self {
            Predicate::Always => true,
            Predicate::MinControls(n) => controls >= *n,
            Predicate::MaxControls(n) => controls <= *n,
            Predicate::MinRegisterSizes(limits) => {
                let regs = input.command().registers();
                regs.len() == limits.len() && regs.iter().zip(limits).all(|(r, &l)| r.len() >= l)
            }
            Predicate::MaxRegisterSizes(limits) => {
                let regs = input.command().registers();
                regs.len() == limits.len() && regs.iter().zip(limits).all(|(r, &l)| r.len() <= l)
            }
            Predicate::MinWorkspace(n) => workspace >= *n,
            Predicate::MaxWorkspace(n) => workspace <= *n,
            Predicate::MinWorkspaceVsControls { factor, offset } => {
                workspace as i64 >= (*factor * controls) as i64 + offset
            }
            Predicate::MinWorkspaceVsReg1 { factor, offset } => {
                let width = input.command().register(0).map_or(0, |r| r.len());
                workspace as i64 >= (*factor * width) as i64 + offset
            }
            Predicate::Custom(_, check) => (check.0)(input),
            Predicate::All(inner) => inner.iter().all(|p| p.evaluate(input)),
            Predicate::Any(inner) => inner.iter().any(|p| p.evaluate(input)),
        }
    }
}

/// At least `n` controls.
pub fn min_controls(n: usize) -> Predicate {
    Predicate::MinControls(n)
}

/// At most `n` controls.
pub fn max_controls(n: usize) -> Predicate {
    Predicate::MaxControls(n)
}

/// Register count matches and each register is at least its limit.
pub fn min_register_sizes(limits: &[usize]) -> Predicate {
    Predicate::MinRegisterSizes(limits.to_vec())
}

/// Register count matches and each register is at most its limit.
///
/// Use [`UNBOUNDED`] for registers without an upper bound.
pub fn max_register_sizes(limits: &[usize]) -> Predicate {
    Predicate::MaxRegisterSizes(limits.to_vec())
}

/// At least `n` workspace qubits.
pub fn min_workspace(n: usize) -> Predicate {
    Predicate::MinWorkspace(n)
}

/// At most `n` workspace qubits.
pub fn max_workspace(n: usize) -> Predicate {
    Predicate::MaxWorkspace(n)
}

/// At least `factor * controls + offset` workspace qubits.
pub fn min_workspace_vs_controls(factor: usize, offset: i64) -> Predicate {
    Predicate::MinWorkspaceVsControls { factor, offset }
}

/// At least `factor * len(register 0) + offset` workspace qubits.
pub fn min_workspace_vs_reg1(factor: usize, offset: i64) -> Predicate {
    Predicate::MinWorkspaceVsReg1 { factor, offset }
}

/// A named custom check.
pub fn custom<F>(name: &'static str, check: F) -> Predicate
where
    F: Fn(&RuleInput<'_>) -> bool + Send + Sync + 'static,
{
    Predicate::Custom(name, PredicateFn(Arc::new(check)))
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        match (self, rhs) {
            (Predicate::Always, p) | (p, Predicate::Always) => p,
            (Predicate::All(mut a), Predicate::All(b)) => {
                a.extend(b);
                Predicate::All(a)
            }
            (Predicate::All(mut a), p) => {
                a.push(p);
                Predicate::All(a)
            }
            (p, q) => Predicate::All(vec![p, q]),
        }
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        match (self, rhs) {
            (Predicate::Any(mut a), Predicate::Any(b)) => {
                a.extend(b);
                Predicate::Any(a)
            }
            (Predicate::Any(mut a), p) => {
                a.push(p);
                Predicate::Any(a)
            }
            (p, q) => Predicate::Any(vec![p, q]),
        }
    }
}

fn write_limits(f: &mut fmt::Formatter<'_>, limits: &[usize]) -> fmt::Result {
    for (i, &l) in limits.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if l == UNBOUNDED {
            write!(f, "inf")?;
        } else {
            write!(f, "{l}")?;
        }
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, inner: &[Predicate]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, p) in inner.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{p}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => write!(f, "always"),
            Predicate::MinControls(n) => write!(f, "min_controls({n})"),
            Predicate::MaxControls(n) => write!(f, "max_controls({n})"),
            Predicate::MinRegisterSizes(limits) => {
                write!(f, "min_register_sizes(")?;
                write_limits(f, limits)?;
                write!(f, ")")
            }
            Predicate::MaxRegisterSizes(limits) => {
                write!(f, "max_register_sizes(")?;
                write_limits(f, limits)?;
                write!(f, ")")
            }
            Predicate::MinWorkspace(n) => write!(f, "min_workspace({n})"),
            Predicate::MaxWorkspace(n) => write!(f, "max_workspace({n})"),
            Predicate::MinWorkspaceVsControls { factor, offset } => {
                write!(f, "min_workspace_vs_controls({factor}, {offset})")
            }
            Predicate::MinWorkspaceVsReg1 { factor, offset } => {
                write!(f, "min_workspace_vs_reg1({factor}, {offset})")
            }
            Predicate::Custom(name, _) => write!(f, "custom({name})"),
            Predicate::All(inner) => write_list(f, "all", inner),
            Predicate::Any(inner) => write_list(f, "any", inner),
        }
    }
}
