//! Workspace-free fallbacks for increment and offset.
//!
//! These quadratic constructions are what the rest of the library bottoms
//! out in when a command has no qubits to borrow.

use arvak_arith::modular::mask;
use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::max_workspace;
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![increment_triangle(), offset_lsb()]
}

/// Increment as a triangle of multi-controlled toggles.
pub fn increment_triangle() -> DecompositionRule {
    DecompositionRule::new(
        "increment_triangle",
        OperationTag::Increment,
        max_workspace(0),
        |input, e| do_increment_triangle(e, input.register(0), input.controls()),
    )
}

/// Offset as an increment of its low bit plus a shorter offset.
pub fn offset_lsb() -> DecompositionRule {
    DecompositionRule::new(
        "offset_lsb",
        OperationTag::Offset,
        max_workspace(0),
        |input, e| {
            let Operation::Offset(k) = *input.operation() else {
                return Ok(());
            };
            do_offset_lsb(e, k, input.register(0), input.controls())
        },
    )
}

/// Toggle the top bit when all lower bits are set, then increment the rest.
pub fn do_increment_triangle(e: &mut Emitter, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let Some(top) = target.last() else {
        return Ok(());
    };
    let low = target.without_last();
    e.x(&joined(controls, low.iter().copied()), top)?;
    e.on(Operation::Increment, &low, controls)
}

/// `target += k` as `target += k & 1` followed by `target[1..] += k >> 1`.
pub fn do_offset_lsb(e: &mut Emitter, offset: i64, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let k = offset as u64 & mask(target.len());
    if k == 0 {
        return Ok(());
    }
    if k & 1 == 1 {
        e.on(Operation::Increment, target, controls)?;
    }
    e.on(Operation::Offset((k >> 1) as i64), &target.from_bit(1), controls)
}
