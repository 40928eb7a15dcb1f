//! Comparisons against constants and carry signals.
//!
//! `XorOffsetCarrySignals(k)` xors the carry into each bit of `q + k` onto a
//! target register. Overflow prediction runs that sweep against dirty
//! qubits twice so the dirty values cancel, leaving only the final carry.

use arvak_arith::modular::span;
use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{Predicate, max_controls, min_workspace_vs_reg1};
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![
        carry_signals(),
        less_than_via_overflow(),
        less_than_low_workspace(),
        predict_overflow(),
    ]
}

/// Ripple the carry signals of `q + k` into the target.
pub fn carry_signals() -> DecompositionRule {
    DecompositionRule::new(
        "xor_offset_carry_signals",
        OperationTag::XorOffsetCarrySignals,
        max_controls(0),
        |input, e| {
            let Operation::XorOffsetCarrySignals(k) = *input.operation() else {
                return Ok(());
            };
            do_carry_signals(e, k, input.register(0), input.register(1))
        },
    )
}

/// `q < k` as "`q + 2^n - k` does not overflow"; needs `n - 1` dirty qubits.
pub fn less_than_via_overflow() -> DecompositionRule {
    DecompositionRule::new(
        "less_than_via_overflow",
        OperationTag::LessThanConstant,
        min_workspace_vs_reg1(1, -1),
        |input, e| {
            let Operation::LessThanConstant(k) = *input.operation() else {
                return Ok(());
            };
            do_less_than_via_overflow(e, k, input.register(0), input.register(1)[0], input.controls())
        },
    )
}

/// `q < k` by offsetting `q` extended with the target as its top bit.
pub fn less_than_low_workspace() -> DecompositionRule {
    DecompositionRule::new(
        "less_than_low_workspace",
        OperationTag::LessThanConstant,
        Predicate::always(),
        |input, e| {
            let Operation::LessThanConstant(k) = *input.operation() else {
                return Ok(());
            };
            do_less_than_low_workspace(e, k, input.register(0), input.register(1)[0], input.controls())
        },
    )
}

/// Overflow of `q + k` via a doubled carry sweep; needs `n - 1` dirty qubits.
pub fn predict_overflow() -> DecompositionRule {
    DecompositionRule::new(
        "predict_offset_overflow",
        OperationTag::PredictOffsetOverflow,
        min_workspace_vs_reg1(1, -1),
        |input, e| {
            let Operation::PredictOffsetOverflow(k) = *input.operation() else {
                return Ok(());
            };
            let query = input.register(0);
            let dirty = input.dirty(query.len().saturating_sub(1))?;
            do_predict_overflow(e, k, query, input.register(1)[0], input.controls(), &dirty)
        },
    )
}

/// `target ^= ((q + k) ^ q ^ k) >> 1`.
pub fn do_carry_signals(e: &mut Emitter, offset: u64, query: &Register, target: &Register) -> LowerResult<()> {
    let n = query.len();
    let set = |i: usize| (offset >> i) & 1 == 1;
    let ons: Register = (0..n).filter(|&i| set(i)).map(|i| query[i]).collect();

    e.on(Operation::MultiNot, &ons, &[])?;
    for i in (1..n).rev() {
        e.x(&[query[i], target[i - 1]], target[i])?;
    }
    for i in (0..n).filter(|&i| set(i)) {
        e.x(&[query[i]], target[i])?;
        e.x(&[], target[i])?;
    }
    for i in 1..n {
        e.x(&[query[i], target[i - 1]], target[i])?;
    }
    e.on(Operation::MultiNot, &ons, &[])
}

/// Toggle `bit` when `q + k` overflows `q`'s width.
pub fn do_predict_overflow(
    e: &mut Emitter,
    offset: u64,
    query: &Register,
    bit: QubitId,
    controls: &[QubitId],
    dirty: &Register,
) -> LowerResult<()> {
    let Some(top_qubit) = query.last() else {
        return Ok(());
    };
    let n = query.len();
    let top = 1u64 << (n - 1);
    let low_offset = offset & !top;
    let top_set = offset & top != 0;

    if top_set {
        e.x(&joined(controls, [top_qubit]), bit)?;
    }
    if n == 1 {
        return Ok(());
    }
    let Some(last_dirty) = dirty.last() else {
        return Ok(());
    };
    let low = query.without_last();
    for _ in 0..2 {
        e.op(
            Operation::XorOffsetCarrySignals(low_offset),
            vec![low.clone(), dirty.clone()],
            &[],
        )?;
        if top_set {
            e.x(&[], top_qubit)?;
        }
        e.x(&joined(controls, [top_qubit, last_dirty]), bit)?;
        if top_set {
            e.x(&[], top_qubit)?;
        }
    }
    Ok(())
}

/// Trivial answers for `k <= 0` and `k >= 2^n`, if any.
fn trivial_less_than(e: &mut Emitter, bound: i64, n: usize, bit: QubitId, controls: &[QubitId]) -> LowerResult<bool> {
    if bound <= 0 {
        return Ok(true);
    }
    if bound as u128 >= span(n) {
        e.x(controls, bit)?;
        return Ok(true);
    }
    Ok(false)
}

/// `bit ^= q < k` through overflow prediction.
pub fn do_less_than_via_overflow(
    e: &mut Emitter,
    bound: i64,
    query: &Register,
    bit: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    if trivial_less_than(e, bound, query.len(), bit, controls)? {
        return Ok(());
    }
    let complement = (span(query.len()) - bound as u128) as u64;
    e.op(
        Operation::PredictOffsetOverflow(complement),
        vec![query.clone(), Register::single(bit)],
        controls,
    )?;
    e.x(controls, bit)
}

/// `bit ^= q < k` by `(q, bit) -= k; q += k`.
///
/// Subtracting from the extended register borrows out of `bit` exactly
/// when `q < k`.
pub fn do_less_than_low_workspace(
    e: &mut Emitter,
    bound: i64,
    query: &Register,
    bit: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    if trivial_less_than(e, bound, query.len(), bit, controls)? {
        return Ok(());
    }
    e.on(Operation::Offset(-bound), &query.with_high(bit), controls)?;
    e.on(Operation::Offset(bound), query, controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_carry_signals() {
        for n in 1..5 {
            for k in 0..(1u64 << n) {
                check_rule(&carry_signals(), Operation::XorOffsetCarrySignals(k), &[n, n], 0, 0, None);
            }
        }
    }

    #[test]
    fn test_predict_overflow() {
        for n in 1..5 {
            for k in 0..(1u64 << n) {
                check_rule(
                    &predict_overflow(),
                    Operation::PredictOffsetOverflow(k),
                    &[n, 1],
                    1,
                    n - 1,
                    None,
                );
            }
        }
    }

    #[test]
    fn test_less_than() {
        for k in [-3, 0, 1, 5, 7, 8, 20] {
            for controls in 0..2 {
                check_rule(&less_than_via_overflow(), Operation::LessThanConstant(k), &[3, 1], controls, 2, None);
                check_rule(&less_than_low_workspace(), Operation::LessThanConstant(k), &[3, 1], controls, 0, None);
            }
        }
    }
}
