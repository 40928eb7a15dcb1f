//! Constant offsets `target += k`.
//!
//! | Rule | Applies when | Strategy |
//! |------|--------------|----------|
//! | `offset_decrease` | `k` even | drop the trailing zero bits |
//! | `offset_remove_controls` | controls and 1 dirty qubit | apply, flip, unapply, flip |
//! | `offset_range` | no controls, at most 4 runs | one increment per run edge |
//! | `offset_recursive` | no controls, 1 dirty qubit | split in halves, carry via overflow prediction |

use arvak_arith::modular::mask;
use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{custom, max_controls, min_controls, min_workspace};
use crate::rule::{DecompositionRule, Emitter, RuleInput};

/// Largest estimated increment count for the range rule.
pub const MAX_RANGE_COST: usize = 4;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![decrease(), remove_controls(), range(), recursive()]
}

fn offset_of(input: &RuleInput<'_>) -> i64 {
    match input.operation() {
        Operation::Offset(k) => *k,
        _ => 0,
    }
}

/// Even offsets leave the low bits alone.
pub fn decrease() -> DecompositionRule {
    DecompositionRule::new(
        "offset_decrease",
        OperationTag::Offset,
        custom("even_offset", |input| offset_of(input) % 2 == 0),
        |input, e| do_decrease(e, offset_of(input), input.register(0), input.controls()),
    )
}

/// Move the controls off the offset through one dirty qubit.
pub fn remove_controls() -> DecompositionRule {
    DecompositionRule::new(
        "offset_remove_controls",
        OperationTag::Offset,
        min_controls(1) & min_workspace(1),
        |input, e| {
            let dirty = input.dirty_qubit()?;
            do_remove_controls(e, input.operation(), input.register(0), dirty, input.controls())
        },
    )
}

/// Offsets with few runs of set bits.
pub fn range() -> DecompositionRule {
    DecompositionRule::new(
        "offset_range",
        OperationTag::Offset,
        max_controls(0)
            & custom("cheap_range", |input| {
                range_cost(offset_of(input), input.register(0).len()) <= MAX_RANGE_COST
            }),
        |input, e| do_range(e, offset_of(input), input.register(0)),
    )
}

/// Split the register and carry into the high half via overflow prediction.
pub fn recursive() -> DecompositionRule {
    DecompositionRule::new(
        "offset_recursive",
        OperationTag::Offset,
        max_controls(0) & min_workspace(1),
        |input, e| {
            let dirty = input.dirty_qubit()?;
            do_recursive(e, offset_of(input), input.register(0), dirty, input.controls())
        },
    )
}

/// `target += k` for even `k` as `target[j..] += k >> j`.
pub fn do_decrease(e: &mut Emitter, offset: i64, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let k = offset as u64 & mask(target.len());
    if k == 0 {
        return Ok(());
    }
    let j = k.trailing_zeros();
    e.on(
        Operation::Offset((k >> j) as i64),
        &target.from_bit(j as usize),
        controls,
    )
}

/// Run `operation` uncontrolled on `[dirty] + target`, flip, undo, flip.
///
/// With the controls off, the flips vanish and the pair cancels. With them
/// on, the inverse acts on the complement, which is the forward action.
pub fn do_remove_controls(
    e: &mut Emitter,
    operation: &Operation,
    target: &Register,
    dirty: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    if target.is_empty() {
        return Ok(());
    }
    let extended = target.with_low(dirty);
    e.on(operation.clone(), &extended, &[])?;
    e.on(Operation::MultiNot, &extended, controls)?;
    e.on(operation.inverse(), &extended, &[])?;
    e.on(Operation::MultiNot, &extended, controls)
}

/// Estimated number of increments [`do_range`] emits for `k` on `n` bits.
pub fn range_cost(offset: i64, n: usize) -> usize {
    let k = offset as u64 & mask(n);
    let bit = |i: usize| i > 0 && (k >> (i - 1)) & 1 == 1;
    // bits[0] is a zero sentinel; bits[i] is bit i - 1 of k.
    let mut cost = 0;
    for i in 0..n {
        let before = if i == 0 { bit(n) } else { bit(i - 1) };
        if bit(i + 1) && !bit(i) {
            cost += 1;
        }
        if !bit(i + 1) && bit(i) && before {
            cost += 1;
        }
    }
    cost
}

/// One increment per isolated set bit, and a decrement/increment pair per
/// longer run of set bits.
pub fn do_range(e: &mut Emitter, offset: i64, target: &Register) -> LowerResult<()> {
    let n = target.len();
    let k = offset as u64 & mask(n);
    let set = |i: usize| (k >> i) & 1 == 1;
    let mut i = 0;
    while i < n {
        if !set(i) {
            i += 1;
            continue;
        }
        let mut next_zero = i + 1;
        while next_zero < n && set(next_zero) {
            next_zero += 1;
        }
        if next_zero == i + 1 {
            e.on(Operation::Increment, &target.from_bit(i), &[])?;
        } else {
            e.on(Operation::Decrement, &target.from_bit(i), &[])?;
            e.on(Operation::Increment, &target.from_bit(next_zero), &[])?;
        }
        i = next_zero;
    }
    Ok(())
}

/// `target += k` by halves.
///
/// The dirty qubit toggles the high half between `x` and `~x - 1`; the
/// overflow prediction of the low half, applied twice around that toggle,
/// leaves exactly the carry increment behind.
pub fn do_recursive(
    e: &mut Emitter,
    offset: i64,
    target: &Register,
    dirty: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    let n = target.len();
    let k = offset as u64 & mask(n);
    if k == 0 {
        return Ok(());
    }
    if k.is_power_of_two() {
        let p = k.trailing_zeros() as usize;
        return e.on(Operation::Increment, &target.from_bit(p), controls);
    }

    let h = n / 2;
    let (low, high) = target.split_at(h);
    let lo = k & mask(h);
    let hi = k >> h;
    let predict = Operation::PredictOffsetOverflow(lo);
    let pair = vec![low.clone(), Register::single(dirty)];

    e.on(Operation::Increment, &high, &[dirty])?;
    e.on(Operation::MultiNot, &high, &[dirty])?;
    e.op(predict.clone(), pair.clone(), controls)?;
    e.on(Operation::Increment, &high, &[dirty])?;
    e.op(predict, pair, controls)?;
    e.on(Operation::MultiNot, &high, &[dirty])?;
    e.on(Operation::Offset(lo as i64), &low, controls)?;
    e.on(Operation::Offset(hi as i64), &high, controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_rule;

    #[test]
    fn test_decrease() {
        for k in [0, 2, 4, 6, -2, 12] {
            check_rule(&decrease(), Operation::Offset(k), &[4], 1, 0, None);
        }
    }

    #[test]
    fn test_remove_controls() {
        for k in [1, 3, 5, -7] {
            for controls in 1..3 {
                check_rule(&remove_controls(), Operation::Offset(k), &[4], controls, 1, None);
            }
        }
    }

    #[test]
    fn test_range_cost() {
        assert_eq!(range_cost(1, 4), 1);
        assert_eq!(range_cost(0b0110, 4), 2);
        assert_eq!(range_cost(0b0101, 4), 2);
        assert_eq!(range_cost(0, 4), 0);
    }

    #[test]
    fn test_range() {
        for k in 0..32 {
            if range_cost(k, 5) <= MAX_RANGE_COST {
                check_rule(&range(), Operation::Offset(k), &[5], 0, 0, None);
            }
        }
    }

    #[test]
    fn test_recursive() {
        for n in 2..7 {
            for k in [3, 5, 7, 11, 13, 21, 27] {
                check_rule(&recursive(), Operation::Offset(k), &[n], 0, 1, None);
            }
        }
    }
}
