//! Increments that borrow dirty qubits.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{max_controls, min_workspace, min_workspace_vs_reg1};
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![subtract_twice(), halving()]
}

/// `t += 1` as `t -= d; t -= ~d` with `n` dirty qubits `d`.
pub fn subtract_twice() -> DecompositionRule {
    DecompositionRule::new(
        "increment_subtract_twice",
        OperationTag::Increment,
        max_controls(0) & min_workspace_vs_reg1(1, 0),
        |input, e| {
            let target = input.register(0);
            let dirty = input.dirty(target.len())?;
            do_increment_subtract_twice(e, target, &dirty)
        },
    )
}

/// Recursive halving with one dirty qubit.
pub fn halving() -> DecompositionRule {
    DecompositionRule::new(
        "increment_halving",
        OperationTag::Increment,
        min_workspace(1),
        |input, e| {
            let dirty = input.dirty_qubit()?;
            do_increment_halving(e, input.register(0), dirty, input.controls())
        },
    )
}

/// `t - d - ~d = t - (2^n - 1) = t + 1`.
pub fn do_increment_subtract_twice(e: &mut Emitter, target: &Register, dirty: &Register) -> LowerResult<()> {
    e.op(Operation::Subtract, vec![dirty.clone(), target.clone()], &[])?;
    e.on(Operation::MultiNot, dirty, &[])?;
    e.op(Operation::Subtract, vec![dirty.clone(), target.clone()], &[])?;
    e.on(Operation::MultiNot, dirty, &[])
}

/// Controlled increment through one dirty qubit.
///
/// Even widths peel the low bit off as a control. Odd widths split into a
/// low half and a dirty-extended high half; the high half increments when
/// the low half overflows.
pub fn do_increment_halving(
    e: &mut Emitter,
    target: &Register,
    dirty: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    let Some(low_bit) = target.first() else {
        return Ok(());
    };
    let n = target.len();
    if n % 2 == 0 {
        do_increment_halving(e, &target.from_bit(1), dirty, &joined(controls, [low_bit]))?;
        return e.x(controls, low_bit);
    }

    let h = (n + 1) / 2;
    let (a, high) = target.split_at(h);
    let b = high.with_low(dirty);
    let a_controls = joined(controls, a.iter().copied());
    let both = a.concat(&b);

    e.op(Operation::Subtract, vec![a.clone(), b.clone()], &[])?;
    e.on(Operation::MultiNot, &b, &a_controls)?;
    e.op(Operation::Add, vec![a.clone(), b.clone()], &[])?;
    e.on(Operation::MultiNot, &b, &a_controls)?;
    e.on(Operation::MultiNot, &both, controls)?;
    e.op(Operation::Add, vec![b.clone(), a.clone()], &[])?;
    e.on(Operation::MultiNot, &both, controls)?;
    e.op(Operation::Subtract, vec![b, a], &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_subtract_twice() {
        for n in 1..5 {
            check_rule(&subtract_twice(), Operation::Increment, &[n], 0, n, None);
        }
    }

    #[test]
    fn test_halving() {
        for n in 1..7 {
            for controls in 0..3 {
                check_rule(&halving(), Operation::Increment, &[n], controls, 1, None);
            }
        }
    }

    #[test]
    fn test_halving_odd_width_shape() {
        let n = check_rule(&halving(), Operation::Increment, &[5], 1, 1, None);
        assert_eq!(n, 8);
    }
}
