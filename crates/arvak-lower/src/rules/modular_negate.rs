//! Modular negation.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![negate()]
}

/// `x = -x % m`, exact on out-of-range values too.
pub fn negate() -> DecompositionRule {
    DecompositionRule::new(
        "modular_negate",
        OperationTag::ModularNegate,
        Predicate::always(),
        |input, e| {
            let Operation::ModularNegate(m) = *input.operation() else {
                return Ok(());
            };
            do_modular_negate(e, m.get(), input.register(0), input.controls())
        },
    )
}

/// Shift zero out of the way, reverse `0..m-1`, shift back.
pub fn do_modular_negate(e: &mut Emitter, modulus: u64, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    e.on(Operation::Decrement, target, &[])?;
    e.on(Operation::ConstPivotFlip(modulus - 1), target, controls)?;
    e.on(Operation::Increment, target, &[])
}
