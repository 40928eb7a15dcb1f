//! The arithmetic decomposition library.
//!
//! One module per operation family. Each exposes `rules()` in priority
//! order, a constructor per rule and the `do_*` emitters the rules share.
//! Only rules for one tag of each inverse pair are registered (`Add`,
//! `Increment`, `ModularAddition`, `ModularDouble`); the other direction is
//! served by inverted candidates.

use arvak_arith::QubitId;

use crate::rule::DecompositionRule;

pub mod addition;
pub mod bootstrap;
pub mod comparison;
pub mod increment;
pub mod modular_addition;
pub mod modular_bimultiplication;
pub mod modular_double;
pub mod modular_negate;
pub mod modular_scaled_addition;
pub mod multi_not;
pub mod negate;
pub mod offset;
pub mod phase_gradient;
pub mod pivot_flip;
pub mod reverse_bits;
pub mod rotate_bits;
pub mod scale;
pub mod scaled_addition;
pub mod swap;

/// Every rule of the library, in family order.
pub fn all() -> Vec<DecompositionRule> {
    let families = [
        swap::rules(),
        addition::rules(),
        bootstrap::rules(),
        increment::rules(),
        modular_addition::rules(),
        modular_bimultiplication::rules(),
        modular_double::rules(),
        modular_negate::rules(),
        modular_scaled_addition::rules(),
        multi_not::rules(),
        negate::rules(),
        offset::rules(),
        phase_gradient::rules(),
        pivot_flip::rules(),
        comparison::rules(),
        reverse_bits::rules(),
        rotate_bits::rules(),
        scale::rules(),
        scaled_addition::rules(),
    ];
    families.into_iter().flatten().collect()
}

/// `controls` followed by `extra`.
pub(crate) fn joined(controls: &[QubitId], extra: impl IntoIterator<Item = QubitId>) -> Vec<QubitId> {
    let mut all = controls.to_vec();
    all.extend(extra);
    all
}
