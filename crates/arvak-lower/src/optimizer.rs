//! Adjacent-command optimization of decomposer output.
//!
//! Each rule looks at two consecutive commands and may replace them with a
//! shorter or cheaper sequence. The optimizer keeps a stack of emitted
//! commands; whenever the newest command combines with the one below it,
//! both are popped and the replacement is pushed back command by command,
//! so cascades of cancellations collapse fully.
//!
//! Built-in rules run in this order:
//!
//! | Rule | Effect |
//! |------|--------|
//! | [`CancelInversePairs`] | `G · G⁻¹` disappears |
//! | [`MergeAdjacent`] | `Offset(a) · Offset(b)` becomes `Offset(a + b)`, and similar |
//! | user rules | in registration order |
//! | [`InverseControlMerge`] | `G` controlled by `c` next to `G⁻¹` becomes `X(c) · G⁻¹ controlled by c · X(c)` |

use std::fmt;

use arvak_arith::Command;

/// A rewrite of two adjacent commands.
pub trait MergeRule: Send + Sync {
    /// Name of the rule.
    fn name(&self) -> &str;

    /// Replacement for `first` followed by `second`, if the rule applies.
    fn try_merge(&self, first: &Command, second: &Command) -> Option<Vec<Command>>;
}

/// Removes a command immediately followed by its inverse.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelInversePairs;

impl MergeRule for CancelInversePairs {
    fn name(&self) -> &str {
        "CancelInversePairs"
    }

    fn try_merge(&self, first: &Command, second: &Command) -> Option<Vec<Command>> {
        (*second == first.inverse()).then(Vec::new)
    }
}

/// Combines mergeable operations on identical qubits.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeAdjacent;

impl MergeRule for MergeAdjacent {
    fn name(&self) -> &str {
        "MergeAdjacent"
    }

    fn try_merge(&self, first: &Command, second: &Command) -> Option<Vec<Command>> {
        if first.registers() != second.registers()
            || first.controls() != second.controls()
            || first.tags() != second.tags()
        {
            return None;
        }
        let merged = first.operation().merge(second.operation())?;
        Some(vec![first.with_operation(merged)])
    }
}

/// Moves a single control off an operation next to its uncontrolled inverse.
///
/// `G` controlled by `c` followed or preceded by an uncontrolled `G⁻¹` acts
/// as `G⁻¹` exactly when `c` is off. Operations on more than two target
/// qubits are cheaper to run that way than to decompose with a control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseControlMerge;

impl InverseControlMerge {
    fn merge_ordered(controlled: &Command, plain: &Command) -> Option<Vec<Command>> {
        let [control] = controlled.controls() else {
            return None;
        };
        if !plain.controls().is_empty()
            || controlled.target_qubit_count() <= 2
            || controlled.registers() != plain.registers()
            || controlled.tags() != plain.tags()
            || *plain.operation() != controlled.operation().inverse()
        {
            return None;
        }
        let flip = Command::x(*control).with_tags(controlled.tags().iter().cloned());
        Some(vec![flip.clone(), controlled.inverse(), flip])
    }
}

impl MergeRule for InverseControlMerge {
    fn name(&self) -> &str {
        "InverseControlMerge"
    }

    fn try_merge(&self, first: &Command, second: &Command) -> Option<Vec<Command>> {
        Self::merge_ordered(first, second).or_else(|| Self::merge_ordered(second, first))
    }
}

/// Runs the merge rules over a command list.
#[derive(Default)]
pub struct LocalOptimizer {
    user_rules: Vec<Box<dyn MergeRule>>,
}

impl LocalOptimizer {
    /// Optimizer with only the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule that runs after the built-in merges and before the
    /// inverse-control rewrite.
    pub fn add_rule(&mut self, rule: impl MergeRule + 'static) {
        self.user_rules.push(Box::new(rule));
    }

    /// Number of user rules.
    pub fn user_rule_count(&self) -> usize {
        self.user_rules.len()
    }

    /// Optimize `commands`.
    pub fn run(&self, commands: Vec<Command>) -> Vec<Command> {
        let mut out = Vec::with_capacity(commands.len());
        for cmd in commands {
            self.push(&mut out, cmd);
        }
        out
    }

    fn push(&self, out: &mut Vec<Command>, cmd: Command) {
        if let Some(last) = out.last() {
            if let Some(replacement) = self.merge_pair(last, &cmd) {
                out.pop();
                for c in replacement {
                    self.push(out, c);
                }
                return;
            }
        }
        out.push(cmd);
    }

    fn merge_pair(&self, first: &Command, second: &Command) -> Option<Vec<Command>> {
        CancelInversePairs
            .try_merge(first, second)
            .or_else(|| MergeAdjacent.try_merge(first, second))
            .or_else(|| {
                self.user_rules
                    .iter()
                    .find_map(|rule| rule.try_merge(first, second))
            })
            .or_else(|| InverseControlMerge.try_merge(first, second))
    }
}

impl fmt::Debug for LocalOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.user_rules.iter().map(|r| r.name()).collect();
        f.debug_struct("LocalOptimizer")
            .field("user_rules", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_arith::{Operation, QubitId, Register};

    fn offset(k: i64) -> Command {
        Command::single(Operation::Offset(k), Register::contiguous(0, 3)).unwrap()
    }

    #[test]
    fn test_cancels_inverse_pair() {
        let inc = Command::single(Operation::Increment, Register::contiguous(0, 3)).unwrap();
        let out = LocalOptimizer::new().run(vec![inc.clone(), inc.inverse()]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_cascading_cancellation() {
        let a = Command::x(QubitId(0));
        let b = Command::x(QubitId(1)).with_controls([QubitId(0)]).unwrap();
        let out = LocalOptimizer::new().run(vec![a.clone(), b.clone(), b, a]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_merges_offsets() {
        let out = LocalOptimizer::new().run(vec![offset(2), offset(3)]);
        assert_eq!(out, vec![offset(5)]);
        let out = LocalOptimizer::new().run(vec![offset(2), offset(3), offset(-4)]);
        assert_eq!(out, vec![offset(1)]);
    }

    #[test]
    fn test_merged_offset_cancels_against_its_inverse() {
        let out = LocalOptimizer::new().run(vec![offset(2), offset(3), offset(-5)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_different_tags_do_not_merge() {
        let out = LocalOptimizer::new().run(vec![offset(2).with_tag("a"), offset(3)]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_inverse_control_merge() {
        let add = Command::add(Register::contiguous(0, 2), Register::contiguous(2, 2))
            .unwrap()
            .with_controls([QubitId(4)])
            .unwrap();
        let sub = Command::subtract(Register::contiguous(0, 2), Register::contiguous(2, 2)).unwrap();

        let out = LocalOptimizer::new().run(vec![add.clone(), sub.clone()]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], Command::x(QubitId(4)));
        assert_eq!(out[1], add.inverse());
        assert_eq!(out[2], Command::x(QubitId(4)));

        let out = LocalOptimizer::new().run(vec![sub, add]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_small_operations_keep_their_control() {
        let inc = Command::single(Operation::Increment, Register::contiguous(0, 2))
            .unwrap()
            .with_controls([QubitId(4)])
            .unwrap();
        let dec = Command::single(Operation::Decrement, Register::contiguous(0, 2)).unwrap();
        assert_eq!(LocalOptimizer::new().run(vec![inc, dec]).len(), 2);
    }

    struct DropSwaps;

    impl MergeRule for DropSwaps {
        fn name(&self) -> &str {
            "DropSwaps"
        }

        fn try_merge(&self, first: &Command, second: &Command) -> Option<Vec<Command>> {
            (first.operation() == &Operation::Swap && second.operation() == &Operation::Swap)
                .then(Vec::new)
        }
    }

    #[test]
    fn test_user_rule() {
        let mut opt = LocalOptimizer::new();
        opt.add_rule(DropSwaps);
        assert_eq!(opt.user_rule_count(), 1);
        let s1 = Command::swap(QubitId(0), QubitId(1)).unwrap();
        let s2 = Command::swap(QubitId(2), QubitId(3)).unwrap();
        assert!(opt.run(vec![s1, s2]).is_empty());
    }
}
