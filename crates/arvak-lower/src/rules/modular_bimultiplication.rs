//! Modular bimultiplication `(x, y) -> (x·f, y·f⁻¹) mod m`.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::custom;
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![bimultiplication()]
}

/// Three scaled additions, a register swap and a negation.
///
/// Scaled modular addition halves through the modulus, so only odd moduli
/// lower this way.
pub fn bimultiplication() -> DecompositionRule {
    DecompositionRule::new(
        "modular_bimultiplication",
        OperationTag::ModularBimultiplication,
        custom("odd_modulus", |input| {
            matches!(input.operation(), Operation::ModularBimultiplication(b) if b.modulus() % 2 == 1)
        }),
        |input, e| {
            let Operation::ModularBimultiplication(b) = input.operation() else {
                return Ok(());
            };
            do_bimultiplication(
                e,
                b.factor(),
                b.inverse_factor(),
                b.modulus(),
                input.register(0),
                input.register(1),
                input.controls(),
            )
        },
    )
}

/// Emit the bimultiplication of `a` (by `factor`) and `b` (by its inverse).
///
/// `b += a·f; a -= b·f⁻¹; b += a·f` leaves `(-b·f⁻¹, a·f)`; swapping the
/// registers and negating the second fixes up the result.
pub fn do_bimultiplication(
    e: &mut Emitter,
    factor: u64,
    inverse_factor: u64,
    modulus: u64,
    a: &Register,
    b: &Register,
    controls: &[QubitId],
) -> LowerResult<()> {
    let m = modulus as i64;
    let forward = Operation::modular_scaled_addition((factor % modulus) as i64, m)?;
    let backward = Operation::modular_scaled_addition(-((inverse_factor % modulus) as i64), m)?;
    let ab = vec![a.clone(), b.clone()];
    let ba = vec![b.clone(), a.clone()];
    e.op(forward.clone(), ab.clone(), controls)?;
    e.op(backward, ba, controls)?;
    e.op(forward, ab, controls)?;
    e.on(Operation::RotateBits(a.len() as i64), &a.concat(b), controls)?;
    e.on(Operation::modular_negate(m)?, b, controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleInput;
    use crate::testing::check_rule;
    use arvak_arith::Command;

    #[test]
    fn test_bimultiplication() {
        for (f, m) in [(2, 7), (3, 7), (5, 7), (3, 5)] {
            let op = Operation::modular_bimultiplication(f, m).unwrap();
            check_rule(&bimultiplication(), op, &[3, 3], 1, 0, Some(&[m as u64, m as u64]));
        }
        let op = Operation::modular_bimultiplication(7, 13).unwrap();
        check_rule(&bimultiplication(), op, &[4, 4], 0, 0, Some(&[13, 13]));
    }

    #[test]
    fn test_even_modulus_is_not_matched() {
        let op = Operation::modular_bimultiplication(3, 8).unwrap();
        let cmd = Command::new(op, vec![Register::contiguous(0, 3), Register::contiguous(3, 3)]).unwrap();
        assert!(!bimultiplication().applies(&RuleInput::new(&cmd, &[])));
    }

    #[test]
    fn test_apply_values() {
        let op = Operation::modular_bimultiplication(3, 7).unwrap();
        // 3⁻¹ = 5 mod 7.
        assert_eq!(op.apply(&[3, 3], &[4, 2]), vec![5, 3]);
        assert_eq!(op.apply(&[3, 3], &[7, 2]), vec![7, 2]);
    }
}
