//! Phase gradients as per-qubit Z powers.

use arvak_arith::{Dyadic, Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::max_controls;
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![per_qubit()]
}

/// Qubit `i` picks up `Z^(exp / 2^(n-i-1))`.
pub fn per_qubit() -> DecompositionRule {
    DecompositionRule::new(
        "phase_gradient",
        OperationTag::PhaseGradient,
        max_controls(2),
        |input, e| {
            let Operation::PhaseGradient(exponent) = *input.operation() else {
                return Ok(());
            };
            do_phase_gradient(e, exponent, input.register(0), input.controls())
        },
    )
}

/// Emit one Z power per qubit, skipping identities.
pub fn do_phase_gradient(
    e: &mut Emitter,
    exponent: Dyadic,
    target: &Register,
    controls: &[QubitId],
) -> LowerResult<()> {
    let n = target.len();
    for (i, &q) in target.iter().enumerate() {
        let p = exponent.div_pow2((n - i - 1) as u32);
        if p.is_even_integer() {
            continue;
        }
        e.on(Operation::ZPow(p), &Register::single(q), controls)?;
    }
    Ok(())
}
