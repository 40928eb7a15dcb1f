//! Modular doubling for odd moduli.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![double()]
}

/// `x = 2x % m`; undoubling runs this rule inverted.
pub fn double() -> DecompositionRule {
    DecompositionRule::new(
        "modular_double",
        OperationTag::ModularDouble,
        Predicate::always(),
        |input, e| {
            let Operation::ModularDouble(m) = *input.operation() else {
                return Ok(());
            };
            do_modular_double(e, m.half(), input.register(0), input.controls())
        },
    )
}

/// Double modulo `m`, given `half = (m + 1) / 2`.
///
/// Shifting by `-half` puts `x < half` in the negative range, which sets the
/// top bit. Adding `half` back to just those, toggling the top bit and
/// rotating left produces `2x` or `2x - m`.
pub fn do_modular_double(e: &mut Emitter, half: u64, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let Some(top) = target.last() else {
        return Ok(());
    };
    let h = half as i64;
    e.on(Operation::Offset(-h), target, controls)?;
    e.on(Operation::Offset(h), &target.without_last(), &joined(controls, [top]))?;
    e.x(controls, top)?;
    e.on(Operation::RotateBits(1), target, controls)
}
