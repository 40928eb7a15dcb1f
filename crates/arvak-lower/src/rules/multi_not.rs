//! MultiNot and many-controlled toggles.

use arvak_arith::{OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{Predicate, min_controls, min_workspace, min_workspace_vs_controls};
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![multi_not(), toggle_cascade(), toggle_halving()]
}

/// Toggle every target qubit.
pub fn multi_not() -> DecompositionRule {
    DecompositionRule::new(
        "multi_not",
        OperationTag::MultiNot,
        Predicate::always(),
        |input, e| do_multi_not(e, input.register(0), input.controls()),
    )
}

/// A toggle with `C >= 3` controls through `C - 2` dirty qubits.
pub fn toggle_cascade() -> DecompositionRule {
    DecompositionRule::new(
        "toggle_cascade",
        OperationTag::X,
        min_controls(3) & min_workspace_vs_controls(1, -2),
        |input, e| {
            let controls = input.controls();
            let dirty = input.dirty(controls.len() - 2)?;
            do_toggle_cascade(e, input.register(0)[0], controls, &dirty)
        },
    )
}

/// A toggle with `C >= 3` controls split in half around one dirty qubit.
pub fn toggle_halving() -> DecompositionRule {
    DecompositionRule::new(
        "toggle_halving",
        OperationTag::X,
        min_controls(3) & min_workspace(1),
        |input, e| {
            let dirty = input.dirty_qubit()?;
            do_toggle_halving(e, input.register(0)[0], input.controls(), dirty)
        },
    )
}

/// One toggle per target for at most two controls, otherwise a CNOT
/// staircase around a single many-controlled toggle.
pub fn do_multi_not(e: &mut Emitter, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let Some(first) = target.first() else {
        return Ok(());
    };
    if controls.len() <= 2 {
        for &q in target.iter() {
            e.x(controls, q)?;
        }
        return Ok(());
    }
    for i in (0..target.len() - 1).rev() {
        e.x(&[target[i]], target[i + 1])?;
    }
    e.x(controls, first)?;
    for i in 0..target.len() - 1 {
        e.x(&[target[i]], target[i + 1])?;
    }
    Ok(())
}

/// Toffoli cascade over dirty qubits, run twice so the dirty values cancel.
pub fn do_toggle_cascade(
    e: &mut Emitter,
    target: QubitId,
    controls: &[QubitId],
    dirty: &Register,
) -> LowerResult<()> {
    let d = dirty.len();
    let (Some(last_control), Some(last_dirty)) = (controls.last(), dirty.last()) else {
        return Ok(());
    };
    for _ in 0..2 {
        e.x(&[*last_control, last_dirty], target)?;
        for i in (0..d - 1).rev() {
            e.x(&[controls[i + 2], dirty[i]], dirty[i + 1])?;
        }
        e.x(&[controls[0], controls[1]], dirty[0])?;
        for i in 0..d - 1 {
            e.x(&[controls[i + 2], dirty[i]], dirty[i + 1])?;
        }
    }
    Ok(())
}

/// `X[a]→dq; X[b, dq]→t`, twice, with the controls split into `a` and `b`.
pub fn do_toggle_halving(
    e: &mut Emitter,
    target: QubitId,
    controls: &[QubitId],
    dirty: QubitId,
) -> LowerResult<()> {
    let (low, high) = controls.split_at(controls.len() / 2);
    let mut with_dirty = low.to_vec();
    with_dirty.push(dirty);
    for _ in 0..2 {
        e.x(high, dirty)?;
        e.x(&with_dirty, target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;
    use arvak_arith::Operation;

    #[test]
    fn test_multi_not() {
        for n in 0..5 {
            for controls in 0..5 {
                check_rule(&multi_not(), Operation::MultiNot, &[n], controls, 0, None);
            }
        }
    }

    #[test]
    fn test_toggle_cascade() {
        for controls in 3..7 {
            let n = check_rule(&toggle_cascade(), Operation::X, &[1], controls, controls - 2, None);
            assert!(n <= 4 * (controls - 2));
        }
    }

    #[test]
    fn test_toggle_halving() {
        for controls in 3..8 {
            check_rule(&toggle_halving(), Operation::X, &[1], controls, 1, None);
        }
    }
}
