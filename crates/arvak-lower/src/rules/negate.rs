//! Two's complement negation.

use arvak_arith::{Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;
use crate::predicate::Predicate;
use crate::rule::{DecompositionRule, Emitter};

/// Rules for this family, in priority order.
pub fn rules() -> Vec<DecompositionRule> {
    vec![negate()]
}

/// `-x = ~x + 1`.
pub fn negate() -> DecompositionRule {
    DecompositionRule::new(
        "negate",
        OperationTag::Negate,
        Predicate::always(),
        |input, e| do_negate(e, input.register(0), input.controls()),
    )
}

pub fn do_negate(e: &mut Emitter, target: &Register, controls: &[QubitId]) -> LowerResult<()> {
    e.on(Operation::MultiNot, target, controls)?;
    e.on(Operation::Increment, target, controls)
}
