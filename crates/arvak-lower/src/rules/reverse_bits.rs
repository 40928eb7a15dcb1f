//! Bit reversal.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{max_controls, min_controls};
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![mirrored_swaps(), middle_qubit()]
}

/// Swap mirrored pairs, keeping the controls on each swap.
pub fn mirrored_swaps() -> DecompositionRule {
    DecompositionRule::new(
        "reverse_bits_swaps",
        OperationTag::ReverseBits,
        max_controls(1),
        |input, e| do_mirrored_swaps(e, input.register(0), input.controls()),
    )
}

/// With many controls, route them through a middle qubit of the register.
pub fn middle_qubit() -> DecompositionRule {
    DecompositionRule::new(
        "reverse_bits_middle_qubit",
        OperationTag::ReverseBits,
        min_controls(2),
        |input, e| do_middle_qubit(e, input.register(0), input.controls()),
    )
}

pub fn do_mirrored_swaps(e: &mut Emitter, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let n = target.len();
    for i in 0..n / 2 {
        e.op(
            Operation::Swap,
            vec![Register::single(target[i]), Register::single(target[n - 1 - i])],
            controls,
        )?;
    }
    Ok(())
}

/// Reverse `target` using its middle qubit as the conditional pivot.
///
/// For even widths the two central qubits are swapped first and the upper
/// one then serves as the pivot.
pub fn do_middle_qubit(e: &mut Emitter, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    let n = target.len();
    if n <= 1 {
        return Ok(());
    }
    let h = n / 2;
    let pivot = target[h];
    let low = if n % 2 == 0 {
        e.op(
            Operation::Swap,
            vec![Register::single(target[h - 1]), Register::single(pivot)],
            controls,
        )?;
        target.low(h - 1)
    } else {
        target.low(h)
    };
    let high = target.from_bit(h + 1).reversed();
    do_multi_swap(e, &low, &high, pivot, controls)
}

/// Swap `a[i]` with `b[i]` for every `i` when the controls are set.
///
/// `pivot` is an arbitrary qubit outside both registers; it is toggled
/// twice and restored.
pub fn do_multi_swap(
    e: &mut Emitter,
    a: &Register,
    b: &Register,
    pivot: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    for (&x, &y) in a.iter().zip(b.iter()) {
        e.x(&[x], y)?;
    }
    for _ in 0..2 {
        e.x(controls, pivot)?;
        for (&x, &y) in a.iter().zip(b.iter()) {
            e.x(&joined(&[pivot], [y]), x)?;
        }
    }
    for (&x, &y) in a.iter().zip(b.iter()) {
        e.x(&[x], y)?;
    }
    Ok(())
}
