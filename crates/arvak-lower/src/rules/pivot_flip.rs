//! Pivot flips: reverse the values below a pivot.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{custom, min_workspace};
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![pivot_flip(), const_pivot_flip()]
}

/// `x = p - x - 1` for `x < p`, with `p` held in a register.
pub fn pivot_flip() -> DecompositionRule {
    DecompositionRule::new(
        "pivot_flip",
        OperationTag::PivotFlip,
        min_workspace(1),
        |input, e| {
            let dirty = input.dirty_qubit()?;
            do_pivot_flip(e, input.register(0), input.register(1), input.controls(), dirty)
        },
    )
}

/// `x = p - x - 1` for `x < p`, with a constant pivot.
///
/// The pivot feeds a signed comparison constant, so it must fit in `i64`.
/// Pivots 0 and 1 are the identity and need no workspace.
pub fn const_pivot_flip() -> DecompositionRule {
    DecompositionRule::new(
        "const_pivot_flip",
        OperationTag::ConstPivotFlip,
        custom("trivial_pivot", |input| {
            matches!(input.operation(), Operation::ConstPivotFlip(p) if *p <= 1)
        }) | min_workspace(1)
            & custom("pivot_fits_i64", |input| {
                matches!(input.operation(), Operation::ConstPivotFlip(p) if i64::try_from(*p).is_ok())
            }),
        |input, e| {
            let Operation::ConstPivotFlip(p) = *input.operation() else {
                return Ok(());
            };
            if p <= 1 {
                return Ok(());
            }
            let dirty = input.dirty_qubit()?;
            do_const_pivot_flip(e, p as i64, input.register(0), input.controls(), dirty)
        },
    )
}

/// Twice: compare into the dirty bit, then conditionally negate below the pivot.
pub fn do_pivot_flip(
    e: &mut Emitter,
    pivot: &Register,
    target: &Register,
    controls: &[QubitId],
    dirty: QubitId,
) -> LowerResult<()> {
    let guarded = joined(&[dirty], controls.iter().copied());
    for _ in 0..2 {
        e.op(Operation::Subtract, vec![pivot.clone(), target.with_high(dirty)], &[])?;
        e.op(Operation::Add, vec![pivot.clone(), target.clone()], &[])?;
        e.op(Operation::Subtract, vec![pivot.clone(), target.clone()], &guarded)?;
        e.on(Operation::MultiNot, target, &guarded)?;
    }
    Ok(())
}

/// Twice: mark `x < p` in the dirty bit, then map `x -> ~(x - p)` where marked.
pub fn do_const_pivot_flip(
    e: &mut Emitter,
    pivot: i64,
    target: &Register,
    controls: &[QubitId],
    dirty: QubitId,
) -> LowerResult<()> {
    if pivot <= 1 {
        return Ok(());
    }
    let guarded = joined(&[dirty], controls.iter().copied());
    for _ in 0..2 {
        e.op(
            Operation::LessThanConstant(pivot),
            vec![target.clone(), Register::single(dirty)],
            &[],
        )?;
        e.on(Operation::Offset(-pivot), target, &guarded)?;
        e.on(Operation::MultiNot, target, &guarded)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_pivot_flip() {
        for n in 1..4 {
            for controls in 0..2 {
                check_rule(&pivot_flip(), Operation::PivotFlip, &[n, n], controls, 1, None);
            }
        }
    }

    #[test]
    fn test_const_pivot_flip() {
        for p in 0..=16 {
            check_rule(&const_pivot_flip(), Operation::ConstPivotFlip(p), &[4], 1, 1, None);
        }
    }

    #[test]
    fn test_trivial_pivots_need_no_workspace() {
        for p in [0, 1] {
            let emitted = check_rule(&const_pivot_flip(), Operation::ConstPivotFlip(p), &[4], 1, 0, None);
            assert_eq!(emitted, 0);
        }
    }

    #[test]
    fn test_apply_values() {
        assert_eq!(Operation::ConstPivotFlip(5).apply(&[4], &[1]), vec![3]);
        assert_eq!(Operation::ConstPivotFlip(5).apply(&[4], &[5]), vec![5]);
        assert_eq!(Operation::PivotFlip.apply(&[3, 3], &[6, 2]), vec![6, 3]);
    }
}
