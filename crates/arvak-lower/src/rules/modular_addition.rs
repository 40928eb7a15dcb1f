//! Modular offset and modular addition via pivot flips.
//!
//! A pivot flip at `p` reverses `0..p`. Two reversals around a rotation of
//! the full range turn into a rotation of `0..m`, which is the modular
//! offset.

use arvak_arith::modular::span;
use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{Predicate, custom};
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![modular_offset(), modular_addition_full_span(), modular_addition()]
}

/// `x = (x + k) % m` with `x >= m` left alone.
pub fn modular_offset() -> DecompositionRule {
    DecompositionRule::new(
        "modular_offset",
        OperationTag::ModularOffset,
        Predicate::always(),
        |input, e| {
            let Operation::ModularOffset { offset, modulus } = *input.operation() else {
                return Ok(());
            };
            do_modular_offset(e, offset, modulus.get(), input.register(0), input.controls())
        },
    )
}

/// A modulus equal to the register span is plain addition.
pub fn modular_addition_full_span() -> DecompositionRule {
    DecompositionRule::new(
        "modular_addition_full_span",
        OperationTag::ModularAddition,
        custom("modulus_is_span", |input| {
            let Operation::ModularAddition(m) = input.operation() else {
                return false;
            };
            let (a, b) = (input.register(0), input.register(1));
            a.len() == b.len() && m.get() as u128 == span(b.len())
        }),
        |input, e| {
            e.op(
                Operation::Add,
                vec![input.register(0).clone(), input.register(1).clone()],
                input.controls(),
            )
        },
    )
}

/// Modular addition with a modulus below the register span.
pub fn modular_addition() -> DecompositionRule {
    DecompositionRule::new(
        "modular_addition",
        OperationTag::ModularAddition,
        custom("modulus_below_span", |input| {
            let Operation::ModularAddition(m) = input.operation() else {
                return false;
            };
            let (a, b) = (input.register(0), input.register(1));
            a.len() == b.len() && (m.get() as u128) < span(b.len())
        }),
        |input, e| {
            let Operation::ModularAddition(m) = *input.operation() else {
                return Ok(());
            };
            do_modular_addition(e, m.get(), input.register(0), input.register(1), input.controls())
        },
    )
}

/// Rotate `0..m` by `k`.
///
/// Values at or above `m` are first reflected below `2^n - m` and back, so
/// the pivot flips pass them through unchanged.
pub fn do_modular_offset(
    e: &mut Emitter,
    offset: u64,
    modulus: u64,
    target: &Register,
    controls: &[QubitId],
) -> LowerResult<()> {
    let full = span(target.len());
    if offset % modulus == 0 {
        return Ok(());
    }
    if (modulus as u128) < full {
        let reflect = (full - modulus as u128) as u64;
        e.on(Operation::MultiNot, target, &[])?;
        e.on(Operation::ConstPivotFlip(reflect), target, controls)?;
        e.on(Operation::MultiNot, target, &[])?;
    }
    e.on(Operation::ConstPivotFlip(modulus - offset), target, controls)?;
    e.on(Operation::Offset((modulus as i64).wrapping_neg()), target, controls)?;
    e.on(Operation::MultiNot, target, controls)?;
    e.on(Operation::ConstPivotFlip(offset), target, controls)
}

/// `target = (target + input) % m` for in-range values.
pub fn do_modular_addition(
    e: &mut Emitter,
    modulus: u64,
    input: &Register,
    target: &Register,
    controls: &[QubitId],
) -> LowerResult<()> {
    let m = modulus as i64;
    let pair = vec![input.clone(), target.clone()];
    e.on(Operation::MultiNot, input, controls)?;
    e.on(Operation::Offset(m.wrapping_add(1)), input, controls)?;
    e.op(Operation::PivotFlip, pair.clone(), &[])?;
    e.on(Operation::Offset(m.wrapping_neg()), target, controls)?;
    e.on(Operation::MultiNot, &input.concat(target), controls)?;
    e.on(Operation::Offset(m.wrapping_add(1)), input, controls)?;
    e.op(Operation::PivotFlip, pair, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_modular_offset_passes_out_of_range_values() {
        for (k, m) in [(5, 13), (1, 13), (12, 13), (3, 16), (2, 5), (4, 9)] {
            let op = Operation::modular_offset(k, m).unwrap();
            check_rule(&modular_offset(), op, &[4], 1, 0, None);
        }
    }

    #[test]
    fn test_modular_offset_zero_is_empty() {
        let op = Operation::modular_offset(13, 13).unwrap();
        assert_eq!(check_rule(&modular_offset(), op, &[4], 0, 0, None), 0);
    }

    #[test]
    fn test_modular_addition_in_range() {
        for (n, m) in [(3, 5), (3, 7), (4, 13), (4, 11)] {
            let op = Operation::modular_addition(m).unwrap();
            for controls in 0..2 {
                check_rule(&modular_addition(), op.clone(), &[n, n], controls, 0, Some(&[m as u64, m as u64]));
            }
        }
    }

    #[test]
    fn test_modular_addition_full_span() {
        let op = Operation::modular_addition(8).unwrap();
        check_rule(&modular_addition_full_span(), op, &[3, 3], 1, 0, None);
    }

    #[test]
    fn test_modular_subtraction_applies_inverse() {
        let op = Operation::modular_subtraction(13).unwrap();
        assert_eq!(op.apply(&[4, 4], &[5, 2]), vec![5, 10]);
        assert_eq!(op.inverse(), Operation::modular_addition(13).unwrap());
    }
}
