//! Addition into a register.
//!
//! The uncontrolled ripple adders borrow the input's most significant bit
//! as the carry. Its value is unknown, so every carry-propagation step is
//! bracketed by toggles conditioned on it; the whole sequence is correct
//! for both values and the bit comes back unchanged.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::{
    UNBOUNDED, custom, max_controls, max_register_sizes, min_controls, min_register_sizes,
    min_workspace,
};
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![
        no_op(),
        single_target(),
        single_input(),
        uncontrolled(),
        controlled(),
    ]
}

/// Nothing to do when either register is empty.
pub fn no_op() -> DecompositionRule {
    DecompositionRule::new(
        "add_no_op",
        OperationTag::Add,
        custom("empty_register", |input| {
            input.register(0).is_empty() || input.register(1).is_empty()
        }),
        |_, _| Ok(()),
    )
}

/// A one-qubit target only sees the input's low bit.
pub fn single_target() -> DecompositionRule {
    DecompositionRule::new(
        "add_single_target",
        OperationTag::Add,
        min_register_sizes(&[1, 1]) & max_register_sizes(&[UNBOUNDED, 1]),
        |input, e| {
            let controls = joined(input.controls(), [input.register(0)[0]]);
            e.x(&controls, input.register(1)[0])
        },
    )
}

/// A one-qubit input is an extra control on an increment.
pub fn single_input() -> DecompositionRule {
    DecompositionRule::new(
        "add_single_input",
        OperationTag::Add,
        min_controls(1) & min_register_sizes(&[1, 1]) & max_register_sizes(&[1, UNBOUNDED]),
        |input, e| {
            let controls = joined(input.controls(), [input.register(0)[0]]);
            e.on(Operation::Increment, input.register(1), &controls)
        },
    )
}

/// Ripple-carry addition without controls or workspace.
pub fn uncontrolled() -> DecompositionRule {
    DecompositionRule::new(
        "add_uncontrolled",
        OperationTag::Add,
        max_controls(0),
        |input, e| do_addition(e, input.register(0), input.register(1)),
    )
}

/// Controlled addition through one dirty qubit.
pub fn controlled() -> DecompositionRule {
    DecompositionRule::new(
        "add_controlled",
        OperationTag::Add,
        min_workspace(1),
        |input, e| {
            let dirty = input.dirty_qubit()?;
            do_controlled_addition(e, input.register(0), input.register(1), dirty, input.controls())
        },
    )
}

/// `target += input`, dispatching on the register sizes.
pub fn do_addition(e: &mut Emitter, input: &Register, target: &Register) -> LowerResult<()> {
    if input.len() >= target.len() {
        do_addition_same_size(e, &input.low(target.len()), target)
    } else {
        do_addition_larger_target(e, input, target)
    }
}

/// `target += input` for registers of equal size.
pub fn do_addition_same_size(e: &mut Emitter, input: &Register, target: &Register) -> LowerResult<()> {
    let n = target.len();
    let Some(carry) = input.last() else {
        return Ok(());
    };
    if n == 0 {
        return Ok(());
    }
    let rest = input.without_last().concat(target);
    e.on(Operation::MultiNot, &rest.reversed(), &[carry])?;
    ripple_forward(e, input, target, carry)?;
    e.x(&[carry], target[n - 1])?;
    ripple_backward(e, input, target, carry)?;
    e.on(Operation::MultiNot, &rest, &[carry])
}

/// `target += input` when the target is wider than the input.
pub fn do_addition_larger_target(
    e: &mut Emitter,
    input: &Register,
    target: &Register,
) -> LowerResult<()> {
    let n = input.len();
    let Some(carry) = input.last() else {
        return Ok(());
    };
    let high = target.from_bit(n - 1);
    e.on(Operation::Decrement, target, &[carry])?;
    e.on(Operation::Increment, &high, &[carry])?;
    ripple_forward(e, input, target, carry)?;
    e.on(Operation::Increment, &high, &[carry])?;
    ripple_backward(e, input, target, carry)
}

fn ripple_forward(e: &mut Emitter, input: &Register, target: &Register, carry: QubitId) -> LowerResult<()> {
    for i in 0..input.len() - 1 {
        e.x(&[carry], target[i])?;
        e.x(&[target[i], carry], input[i])?;
        e.x(&[target[i], input[i]], carry)?;
    }
    Ok(())
}

fn ripple_backward(e: &mut Emitter, input: &Register, target: &Register, carry: QubitId) -> LowerResult<()> {
    for i in (0..input.len() - 1).rev() {
        e.x(&[target[i], input[i]], carry)?;
        e.x(&[target[i], carry], input[i])?;
        e.x(&[input[i]], target[i])?;
    }
    Ok(())
}

/// Controlled `target += input`, extending the target with a dirty bit.
///
/// Add, flip, subtract, flip: with the controls off the flips vanish and
/// the add and subtract cancel.
pub fn do_controlled_addition(
    e: &mut Emitter,
    input: &Register,
    target: &Register,
    dirty: QubitId,
    controls: &[QubitId],
) -> LowerResult<()> {
    if controls.is_empty() {
        return do_addition(e, input, target);
    }
    let extended = target.with_low(dirty);
    e.op(Operation::Add, vec![input.clone(), extended.clone()], &[])?;
    e.on(Operation::MultiNot, &extended, controls)?;
    e.op(Operation::Subtract, vec![input.clone(), extended.clone()], &[])?;
    e.on(Operation::MultiNot, &extended, controls)
}
