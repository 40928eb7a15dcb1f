//! Rule repository.

use rustc_hash::FxHashMap;

use arvak_arith::{Command, OperationTag, QubitId};

use crate::error::LowerResult;
use crate::rule::{DecompositionRule, RuleInput};
use crate::rules;

/// A rule ready to run on a particular command.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'r> {
    /// The rule decomposes the command directly.
    Forward(&'r DecompositionRule),
    /// The rule decomposes the inverse command; its output is inverted
    /// command by command and reversed.
    Inverted(&'r DecompositionRule),
}

impl<'r> Candidate<'r> {
    /// The underlying rule.
    pub fn rule(&self) -> &'r DecompositionRule {
        match self {
            Candidate::Forward(rule) | Candidate::Inverted(rule) => rule,
        }
    }

    /// Check whether the rule runs in inverted form.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Candidate::Inverted(_))
    }

    /// Decompose `command`, borrowing from `workspace`.
    pub fn decompose(&self, command: &Command, workspace: &[QubitId]) -> LowerResult<Vec<Command>> {
        match self {
            Candidate::Forward(rule) => rule.decompose(&RuleInput::new(command, workspace)),
            Candidate::Inverted(rule) => {
                let inverse = command.inverse();
                let mut out = rule.decompose(&RuleInput::new(&inverse, workspace))?;
                out.reverse();
                Ok(out.iter().map(Command::inverse).collect())
            }
        }
    }
}

/// Decomposition rules indexed by operation tag, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: FxHashMap<OperationTag, Vec<DecompositionRule>>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full arithmetic rule library.
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.extend(rules::all());
        set
    }

    /// Append a rule after the existing rules for its tag.
    pub fn register(&mut self, rule: DecompositionRule) {
        self.rules.entry(rule.tag()).or_default().push(rule);
    }

    /// Append several rules in order.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = DecompositionRule>) {
        for rule in rules {
            self.register(rule);
        }
    }

    /// Rules registered under `tag`.
    pub fn lookup(&self, tag: OperationTag) -> &[DecompositionRule] {
        self.rules.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Check whether no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applicable rules for `command`: its own tag's rules first, then the
    /// inverse tag's rules in inverted form.
    ///
    /// An inverted rule is judged against the inverted command.
    pub fn candidates(&self, command: &Command, workspace: &[QubitId]) -> Vec<Candidate<'_>> {
        let input = RuleInput::new(command, workspace);
        let mut out: Vec<Candidate<'_>> = self
            .lookup(command.tag())
            .iter()
            .filter(|rule| rule.applies(&input))
            .map(Candidate::Forward)
            .collect();

        let inverse = command.inverse();
        let inverse_input = RuleInput::new(&inverse, workspace);
        out.extend(
            self.lookup(inverse.tag())
                .iter()
                .filter(|rule| rule.applies(&inverse_input))
                .map(Candidate::Inverted),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, min_controls};
    use arvak_arith::{Operation, Register};

    fn noop(name: &'static str, tag: OperationTag, predicate: Predicate) -> DecompositionRule {
        DecompositionRule::new(name, tag, predicate, |_, _| Ok(()))
    }

    #[test]
    fn test_lookup_preserves_order() {
        let mut set = RuleSet::new();
        set.register(noop("first", OperationTag::Increment, Predicate::always()));
        set.register(noop("second", OperationTag::Increment, Predicate::always()));
        let names: Vec<&str> = set
            .lookup(OperationTag::Increment)
            .iter()
            .map(DecompositionRule::name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(set.lookup(OperationTag::Negate).is_empty());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_candidates_include_inverse_tag() {
        let mut set = RuleSet::new();
        set.register(noop("dec", OperationTag::Decrement, Predicate::always()));
        set.register(noop("inc", OperationTag::Increment, min_controls(1)));

        let cmd = Command::single(Operation::Increment, Register::contiguous(0, 3)).unwrap();
        let cands = set.candidates(&cmd, &[]);
        assert_eq!(cands.len(), 1);
        assert!(cands[0].is_inverted());
        assert_eq!(cands[0].rule().name(), "dec");
    }

    #[test]
    fn test_inverted_candidate_reverses_and_inverts() {
        let mut set = RuleSet::new();
        set.register(DecompositionRule::new(
            "offset_pair",
            OperationTag::Offset,
            Predicate::always(),
            |input, e| {
                let t = input.register(0);
                e.on(Operation::Offset(1), t, &[])?;
                e.on(Operation::Offset(2), t, &[])
            },
        ));
        let cmd = Command::single(Operation::Offset(-3), Register::contiguous(0, 3)).unwrap();
        // Offset is self-tagged under inversion, so the rule is a candidate both ways.
        let cands = set.candidates(&cmd, &[]);
        assert_eq!(cands.len(), 2);
        let out = cands[1].decompose(&cmd, &[]).unwrap();
        let ops: Vec<Operation> = out.iter().map(|c| c.operation().clone()).collect();
        assert_eq!(ops, vec![Operation::Offset(-2), Operation::Offset(-1)]);
    }

    #[test]
    fn test_standard_covers_library() {
        let set = RuleSet::standard();
        for tag in [
            OperationTag::Swap,
            OperationTag::Add,
            OperationTag::Increment,
            OperationTag::MultiNot,
            OperationTag::X,
            OperationTag::Offset,
            OperationTag::ModularOffset,
            OperationTag::ModularBimultiplication,
            OperationTag::PhaseGradient,
        ] {
            assert!(!set.lookup(tag).is_empty(), "missing rules for {tag:?}");
        }
    }
}
