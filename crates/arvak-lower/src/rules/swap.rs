//! Swap as three toggles.

use arvak_arith::{OperationTag, QubitId};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

use super::joined;

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![swap()]
}

/// `X[a]→b; X[controls, b]→a; X[a]→b`.
pub fn swap() -> DecompositionRule {
    DecompositionRule::new("swap", OperationTag::Swap, Predicate::always(), |input, e| {
        do_swap(e, input.register(0)[0], input.register(1)[0], input.controls())
    })
}

/// Exchange `a` and `b` when every control is set.
pub fn do_swap(e: &mut Emitter, a: QubitId, b: QubitId, controls: &[QubitId]) -> LowerResult<()> {
    e.x(&[a], b)?;
    e.x(&joined(controls, [b]), a)?;
    e.x(&[a], b)
}
