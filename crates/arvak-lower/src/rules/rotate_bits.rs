//! Cyclic bit rotation as three reversals.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![triple_reversal()]
}

/// `rot(t, r) = rev(t[r..]) . rev(t[..r]) . rev(t)`.
pub fn triple_reversal() -> DecompositionRule {
    DecompositionRule::new(
        "rotate_bits_triple_reversal",
        OperationTag::RotateBits,
        Predicate::always(),
        |input, e| {
            let Operation::RotateBits(amount) = *input.operation() else {
                return Ok(());
            };
            do_rotate_bits(e, amount, input.register(0), input.controls())
        },
    )
}

pub fn do_rotate_bits(e: &mut Emitter, amount: i64, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let n = target.len();
    if n == 0 {
        return Ok(());
    }
    let r = amount.rem_euclid(n as i64) as usize;
    if r == 0 {
        return Ok(());
    }
    let (low, high) = target.split_at(r);
    for part in [target.clone(), low, high] {
        e.on(Operation::ReverseBits, &part, controls)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_rotate_bits() {
        for n in 0..6 {
            for r in [-7, -1, 0, 1, 2, 3, 9] {
                check_rule(&triple_reversal(), Operation::RotateBits(r), &[n], 1, 0, None);
            }
        }
    }

    #[test]
    fn test_full_turn_is_empty() {
        let out = crate::testing::emit(&triple_reversal(), Operation::RotateBits(10), &[5], 0, 0);
        assert!(out.is_empty());
    }
}
