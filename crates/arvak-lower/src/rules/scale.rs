//! Multiplication by an odd constant modulo the register span.

use arvak_arith::modular::mask;
use arvak_arith::operation::net_scale_factor;
use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![shift_and_add()]
}

/// Process bits from the top down, adding `(f >> 1) * t[i]` above bit `i`.
pub fn shift_and_add() -> DecompositionRule {
    DecompositionRule::new(
        "scale_shift_and_add",
        OperationTag::Scale,
        Predicate::always(),
        |input, e| {
            let Operation::Scale {
                factor,
                inverse_factor,
            } = *input.operation()
            else {
                return Ok(());
            };
            let net = net_scale_factor(factor, inverse_factor, input.register(0).len());
            do_scale(e, net, input.register(0), input.controls())
        },
    )
}

/// `target *= factor` for an odd `factor` already reduced to the width.
///
/// Bit `i` of an odd product depends only on bits `0..=i` of the input, so
/// walking downwards each bit can select its own contribution to the bits
/// above it.
pub fn do_scale(e: &mut Emitter, factor: u64, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let n = target.len();
    if n == 0 || factor == 1 {
        return Ok(());
    }
    if factor == mask(n) {
        return e.on(Operation::Negate, target, controls);
    }
    let step = (factor >> 1) as i64;
    for i in (0..n).rev() {
        e.on(Operation::Offset(step), &target.from_bit(i + 1), &joined(controls, [target[i]]))?;
    }
    Ok(())
}
