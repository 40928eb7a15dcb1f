//! `target += input * k` as controlled offsets.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![offsets_per_bit()]
}

/// Each input bit `i` controls `target[i..] += k`.
pub fn offsets_per_bit() -> DecompositionRule {
    DecompositionRule::new(
        "scaled_addition_offsets",
        OperationTag::ScaledAddition,
        Predicate::always(),
        |input, e| {
            let Operation::ScaledAddition(k) = *input.operation() else {
                return Ok(());
            };
            do_scaled_addition(e, k, input.register(0), input.register(1), input.controls())
        },
    )
}

pub fn do_scaled_addition(
    e: &mut Emitter,
    factor: i64,
    input: &Register,
    target: &Register,
    controls: &[QubitId],
) -> LowerResult<()> {
    for (i, &q) in input.iter().enumerate().take(target.len()) {
        e.on(Operation::Offset(factor), &target.from_bit(i), &joined(controls, [q]))?;
    }
    Ok(())
}
