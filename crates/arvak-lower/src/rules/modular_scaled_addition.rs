//! Modular scaled addition `target += input·f mod m`.

use arvak_arith::modular::mul_mod;
use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![scaled_addition()]
}

/// One controlled modular offset per input bit.
pub fn scaled_addition() -> DecompositionRule {
    DecompositionRule::new(
        "modular_scaled_addition",
        OperationTag::ModularScaledAddition,
        Predicate::always(),
        |input, e| {
            let Operation::ModularScaledAddition { factor, modulus } = *input.operation() else {
                return Ok(());
            };
            do_modular_scaled_addition(
                e,
                factor,
                modulus.get(),
                input.register(0),
                input.register(1),
                input.controls(),
            )
        },
    )
}

/// Add `2^i·f mod m` to the target for each set input bit `i`.
pub fn do_modular_scaled_addition(
    e: &mut Emitter,
    factor: u64,
    modulus: u64,
    input: &Register,
    target: &Register,
    controls: &[QubitId],
) -> LowerResult<()> {
    let mut step = factor % modulus;
    for &bit in input.iter() {
        let op = Operation::modular_offset(step as i64, modulus as i64)?;
        e.on(op, target, &joined(controls, [bit]))?;
        step = mul_mod(step, 2, modulus);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_modular_scaled_addition() {
        for (f, m) in [(3, 7), (2, 5), (6, 7), (0, 7)] {
            let op = Operation::modular_scaled_addition(f, m).unwrap();
            for controls in 0..2 {
                check_rule(&scaled_addition(), op.clone(), &[3, 3], controls, 0, Some(&[m as u64, m as u64]));
            }
        }
    }
}
