//! Reversible arithmetic operations.
//!
//! [`Operation`] is a closed set of variants. Each variant knows its inverse,
//! how many registers it acts on, and how it permutes computational basis
//! states. Parameters that would make a variant irreversible cannot be
//! represented: the modular and scaling variants carry validated newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dyadic::Dyadic;
use crate::error::{ArithError, ArithResult};
use crate::modular::{inverse_mod_pow2, mask, mul_mod, multiplicative_inverse, reduce};

/// Discriminant of an [`Operation`], without parameters.
///
/// Rule repositories are keyed by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperationTag {
    // Primitives
    X,
    Swap,
    ZPow,

    // Register arithmetic
    Add,
    Subtract,
    Increment,
    Decrement,
    MultiNot,
    Negate,
    Offset,
    Scale,
    ScaledAddition,

    // Comparison
    PredictOffsetOverflow,
    XorOffsetCarrySignals,
    LessThanConstant,

    // Permutations of bits and values
    PivotFlip,
    ConstPivotFlip,
    ReverseBits,
    RotateBits,

    // Modular arithmetic
    ModularOffset,
    ModularAddition,
    ModularSubtraction,
    ModularDouble,
    ModularUndouble,
    ModularNegate,
    ModularScaledAddition,
    ModularBimultiplication,

    // Phase
    PhaseGradient,
}

impl OperationTag {
    /// Tag of the inverse operation.
    pub fn inverse(self) -> OperationTag {
        match self {
            OperationTag::Add => OperationTag::Subtract,
            OperationTag::Subtract => OperationTag::Add,
            OperationTag::Increment => OperationTag::Decrement,
            OperationTag::Decrement => OperationTag::Increment,
            OperationTag::ModularAddition => OperationTag::ModularSubtraction,
            OperationTag::ModularSubtraction => OperationTag::ModularAddition,
            OperationTag::ModularDouble => OperationTag::ModularUndouble,
            OperationTag::ModularUndouble => OperationTag::ModularDouble,
            other => other,
        }
    }

    /// Check whether the operation is register arithmetic rather than a gate.
    pub fn is_arithmetic(self) -> bool {
        !matches!(
            self,
            OperationTag::X | OperationTag::Swap | OperationTag::ZPow | OperationTag::PhaseGradient
        )
    }
}

/// A strictly positive modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Modulus(u64);

impl Modulus {
    /// Validate a modulus.
    pub fn new(modulus: i64) -> ArithResult<Self> {
        if modulus <= 0 {
            return Err(ArithError::NonPositiveModulus(modulus));
        }
        Ok(Self(modulus as u64))
    }

    /// The modulus value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for Modulus {
    type Error = ArithError;

    fn try_from(value: i64) -> ArithResult<Self> {
        Self::new(value)
    }
}

impl From<Modulus> for i64 {
    fn from(m: Modulus) -> i64 {
        m.0 as i64
    }
}

/// A strictly positive odd modulus, for operations that divide by two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OddModulus(u64);

impl OddModulus {
    /// Validate an odd modulus for `operation`.
    pub fn new(modulus: i64, operation: OperationTag) -> ArithResult<Self> {
        let m = Modulus::new(modulus)?.get();
        if m % 2 == 0 {
            return Err(ArithError::EvenModulus {
                operation,
                modulus: m,
            });
        }
        Ok(Self(m))
    }

    /// The modulus value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    /// The modular inverse of two, `(m + 1) / 2`.
    pub fn half(self) -> u64 {
        self.0.div_ceil(2)
    }
}

impl TryFrom<i64> for OddModulus {
    type Error = ArithError;

    fn try_from(value: i64) -> ArithResult<Self> {
        Self::new(value, OperationTag::ModularDouble)
    }
}

impl From<OddModulus> for i64 {
    fn from(m: OddModulus) -> i64 {
        m.0 as i64
    }
}

/// An odd integer factor, invertible modulo every power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OddFactor(i64);

impl OddFactor {
    /// Validate an odd factor.
    pub fn new(factor: i64) -> ArithResult<Self> {
        if factor & 1 == 0 {
            return Err(ArithError::EvenFactor(factor));
        }
        Ok(Self(factor))
    }

    /// The factor value.
    #[inline]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for OddFactor {
    type Error = ArithError;

    fn try_from(value: i64) -> ArithResult<Self> {
        Self::new(value)
    }
}

impl From<OddFactor> for i64 {
    fn from(f: OddFactor) -> i64 {
        f.0
    }
}

/// A factor paired with its inverse modulo a positive modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct Bimultiplier {
    factor: u64,
    inverse_factor: u64,
    modulus: u64,
}

impl Bimultiplier {
    /// Validate `factor` modulo `modulus`; fails when no inverse exists.
    pub fn new(factor: i64, modulus: i64) -> ArithResult<Self> {
        let m = Modulus::new(modulus)?.get();
        let inverse_factor = multiplicative_inverse(factor, m).ok_or(ArithError::NotInvertible {
            factor,
            modulus: m,
        })?;
        Ok(Self {
            factor: reduce(factor, m),
            inverse_factor,
            modulus: m,
        })
    }

    /// The forward factor, reduced modulo the modulus.
    pub fn factor(&self) -> u64 {
        self.factor
    }

    /// The inverse factor.
    pub fn inverse_factor(&self) -> u64 {
        self.inverse_factor
    }

    /// The modulus.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Swap the factor and its inverse.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            factor: self.inverse_factor,
            inverse_factor: self.factor,
            modulus: self.modulus,
        }
    }

    /// Product of two bimultipliers with the same modulus.
    pub fn merged(&self, other: &Bimultiplier) -> Option<Self> {
        if self.modulus != other.modulus {
            return None;
        }
        Some(Self {
            factor: mul_mod(self.factor, other.factor, self.modulus),
            inverse_factor: mul_mod(self.inverse_factor, other.inverse_factor, self.modulus),
            modulus: self.modulus,
        })
    }
}

impl TryFrom<(i64, i64)> for Bimultiplier {
    type Error = ArithError;

    fn try_from((factor, modulus): (i64, i64)) -> ArithResult<Self> {
        Self::new(factor, modulus)
    }
}

impl From<Bimultiplier> for (i64, i64) {
    fn from(b: Bimultiplier) -> (i64, i64) {
        (b.factor as i64, b.modulus as i64)
    }
}

/// A reversible operation on one or more registers.
///
/// Register order is fixed per variant. Two-register arithmetic takes
/// `(input, target)`; comparisons take `(value, target_bit)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Toggle a single qubit.
    X,
    /// Exchange two single qubits.
    Swap,
    /// Phase a single qubit by `Z^p`.
    ZPow(Dyadic),

    /// `target += input`.
    Add,
    /// `target -= input`.
    Subtract,
    /// `target += 1`.
    Increment,
    /// `target -= 1`.
    Decrement,
    /// Toggle every qubit of the register.
    MultiNot,
    /// `target = -target`.
    Negate,
    /// `target += k`, wrapping at the register width.
    Offset(i64),
    /// `bit ^= (value + k) overflows the value register`.
    PredictOffsetOverflow(u64),
    /// `target ^= carry-out signals of (query + k)`, one signal per bit.
    XorOffsetCarrySignals(u64),
    /// `bit ^= value < k`.
    LessThanConstant(i64),

    /// `x = pivot - x - 1` when `x < pivot`.
    PivotFlip,
    /// `x = p - x - 1` when `x < p`.
    ConstPivotFlip(u64),
    /// Reverse the bit order of the register.
    ReverseBits,
    /// Rotate bits towards the most significant end.
    RotateBits(i64),

    /// `target *= factor * inverse_factor⁻¹`, modulo the register span.
    Scale {
        /// Forward factor.
        factor: OddFactor,
        /// Factor whose inverse is applied.
        inverse_factor: OddFactor,
    },
    /// `target += input * k`.
    ScaledAddition(i64),

    /// `x = (x + offset) % modulus` for in-range `x`.
    ModularOffset {
        /// Offset, reduced modulo the modulus.
        offset: u64,
        /// The modulus.
        modulus: Modulus,
    },
    /// `target = (target + input) % m` when both are in range.
    ModularAddition(Modulus),
    /// `target = (target - input) % m` when both are in range.
    ModularSubtraction(Modulus),
    /// `x = 2x % m`.
    ModularDouble(OddModulus),
    /// `x = x / 2 % m`.
    ModularUndouble(OddModulus),
    /// `x = -x % m`.
    ModularNegate(Modulus),
    /// `target = (target + input * factor) % m`.
    ModularScaledAddition {
        /// Factor, reduced modulo the modulus.
        factor: u64,
        /// The modulus.
        modulus: OddModulus,
    },
    /// `(x, y) = (x * f % m, y * f⁻¹ % m)`.
    ModularBimultiplication(Bimultiplier),

    /// Phase each basis state `|v>` by `exp * v / 2^n` turns.
    PhaseGradient(Dyadic),
}

impl Operation {
    /// `ModularOffset(offset mod modulus, modulus)`.
    pub fn modular_offset(offset: i64, modulus: i64) -> ArithResult<Self> {
        let modulus = Modulus::new(modulus)?;
        Ok(Operation::ModularOffset {
            offset: reduce(offset, modulus.get()),
            modulus,
        })
    }

    /// `ModularAddition(modulus)`.
    pub fn modular_addition(modulus: i64) -> ArithResult<Self> {
        Ok(Operation::ModularAddition(Modulus::new(modulus)?))
    }

    /// `ModularSubtraction(modulus)`.
    pub fn modular_subtraction(modulus: i64) -> ArithResult<Self> {
        Ok(Operation::ModularSubtraction(Modulus::new(modulus)?))
    }

    /// `ModularDouble(modulus)`; the modulus must be odd.
    pub fn modular_double(modulus: i64) -> ArithResult<Self> {
        Ok(Operation::ModularDouble(OddModulus::new(
            modulus,
            OperationTag::ModularDouble,
        )?))
    }

    /// `ModularUndouble(modulus)`; the modulus must be odd.
    pub fn modular_undouble(modulus: i64) -> ArithResult<Self> {
        Ok(Operation::ModularUndouble(OddModulus::new(
            modulus,
            OperationTag::ModularUndouble,
        )?))
    }

    /// `ModularNegate(modulus)`.
    pub fn modular_negate(modulus: i64) -> ArithResult<Self> {
        Ok(Operation::ModularNegate(Modulus::new(modulus)?))
    }

    /// `ModularScaledAddition(factor mod modulus, modulus)`; the modulus must be odd.
    pub fn modular_scaled_addition(factor: i64, modulus: i64) -> ArithResult<Self> {
        let modulus = OddModulus::new(modulus, OperationTag::ModularScaledAddition)?;
        Ok(Operation::ModularScaledAddition {
            factor: reduce(factor, modulus.get()),
            modulus,
        })
    }

    /// `ModularBimultiplication(factor, modulus)`.
    pub fn modular_bimultiplication(factor: i64, modulus: i64) -> ArithResult<Self> {
        Ok(Operation::ModularBimultiplication(Bimultiplier::new(
            factor, modulus,
        )?))
    }

    /// `Scale(factor, inverse_factor)`; both factors must be odd.
    pub fn scale(factor: i64, inverse_factor: i64) -> ArithResult<Self> {
        Ok(Operation::Scale {
            factor: OddFactor::new(factor)?,
            inverse_factor: OddFactor::new(inverse_factor)?,
        })
    }

    /// The variant's tag.
    pub fn tag(&self) -> OperationTag {
        match self {
            Operation::X => OperationTag::X,
            Operation::Swap => OperationTag::Swap,
            Operation::ZPow(_) => OperationTag::ZPow,
            Operation::Add => OperationTag::Add,
            Operation::Subtract => OperationTag::Subtract,
            Operation::Increment => OperationTag::Increment,
            Operation::Decrement => OperationTag::Decrement,
            Operation::MultiNot => OperationTag::MultiNot,
            Operation::Negate => OperationTag::Negate,
            Operation::Offset(_) => OperationTag::Offset,
            Operation::PredictOffsetOverflow(_) => OperationTag::PredictOffsetOverflow,
            Operation::XorOffsetCarrySignals(_) => OperationTag::XorOffsetCarrySignals,
            Operation::LessThanConstant(_) => OperationTag::LessThanConstant,
            Operation::PivotFlip => OperationTag::PivotFlip,
            Operation::ConstPivotFlip(_) => OperationTag::ConstPivotFlip,
            Operation::ReverseBits => OperationTag::ReverseBits,
            Operation::RotateBits(_) => OperationTag::RotateBits,
            Operation::Scale { .. } => OperationTag::Scale,
            Operation::ScaledAddition(_) => OperationTag::ScaledAddition,
            Operation::ModularOffset { .. } => OperationTag::ModularOffset,
            Operation::ModularAddition(_) => OperationTag::ModularAddition,
            Operation::ModularSubtraction(_) => OperationTag::ModularSubtraction,
            Operation::ModularDouble(_) => OperationTag::ModularDouble,
            Operation::ModularUndouble(_) => OperationTag::ModularUndouble,
            Operation::ModularNegate(_) => OperationTag::ModularNegate,
            Operation::ModularScaledAddition { .. } => OperationTag::ModularScaledAddition,
            Operation::ModularBimultiplication(_) => OperationTag::ModularBimultiplication,
            Operation::PhaseGradient(_) => OperationTag::PhaseGradient,
        }
    }

    /// Number of registers the operation takes.
    pub fn arity(&self) -> usize {
        match self {
            Operation::Swap
            | Operation::Add
            | Operation::Subtract
            | Operation::PredictOffsetOverflow(_)
            | Operation::XorOffsetCarrySignals(_)
            | Operation::LessThanConstant(_)
            | Operation::PivotFlip
            | Operation::ScaledAddition(_)
            | Operation::ModularAddition(_)
            | Operation::ModularSubtraction(_)
            | Operation::ModularScaledAddition { .. }
            | Operation::ModularBimultiplication(_) => 2,
            _ => 1,
        }
    }

    /// Registers whose size is fixed by the variant, as `(index, size)`.
    pub fn fixed_register_sizes(&self) -> &'static [(usize, usize)] {
        match self {
            Operation::X | Operation::ZPow(_) => &[(0, 1)],
            Operation::Swap => &[(0, 1), (1, 1)],
            Operation::PredictOffsetOverflow(_) | Operation::LessThanConstant(_) => &[(1, 1)],
            _ => &[],
        }
    }

    /// Check whether the variant only changes phases.
    pub fn is_phase_only(&self) -> bool {
        matches!(self, Operation::ZPow(_) | Operation::PhaseGradient(_))
    }

    /// The inverse operation.
    pub fn inverse(&self) -> Operation {
        match self {
            Operation::ZPow(p) => Operation::ZPow(-*p),
            Operation::Add => Operation::Subtract,
            Operation::Subtract => Operation::Add,
            Operation::Increment => Operation::Decrement,
            Operation::Decrement => Operation::Increment,
            Operation::Offset(k) => Operation::Offset(k.wrapping_neg()),
            Operation::RotateBits(r) => Operation::RotateBits(r.wrapping_neg()),
            Operation::Scale {
                factor,
                inverse_factor,
            } => Operation::Scale {
                factor: *inverse_factor,
                inverse_factor: *factor,
            },
            Operation::ScaledAddition(k) => Operation::ScaledAddition(k.wrapping_neg()),
            Operation::ModularOffset { offset, modulus } => Operation::ModularOffset {
                offset: (modulus.get() - offset % modulus.get()) % modulus.get(),
                modulus: *modulus,
            },
            Operation::ModularAddition(m) => Operation::ModularSubtraction(*m),
            Operation::ModularSubtraction(m) => Operation::ModularAddition(*m),
            Operation::ModularDouble(m) => Operation::ModularUndouble(*m),
            Operation::ModularUndouble(m) => Operation::ModularDouble(*m),
            Operation::ModularScaledAddition { factor, modulus } => {
                Operation::ModularScaledAddition {
                    factor: (modulus.get() - factor % modulus.get()) % modulus.get(),
                    modulus: *modulus,
                }
            }
            Operation::ModularBimultiplication(b) => Operation::ModularBimultiplication(b.inverse()),
            Operation::PhaseGradient(e) => Operation::PhaseGradient(-*e),
            // Self-inverse variants.
            other => other.clone(),
        }
    }

    /// Combine `self` followed by `other` on the same registers into one operation.
    pub fn merge(&self, other: &Operation) -> Option<Operation> {
        match (self, other) {
            (Operation::Offset(a), Operation::Offset(b)) => Some(Operation::Offset(a.wrapping_add(*b))),
            (Operation::RotateBits(a), Operation::RotateBits(b)) => {
                Some(Operation::RotateBits(a.checked_add(*b)?))
            }
            (Operation::ScaledAddition(a), Operation::ScaledAddition(b)) => {
                Some(Operation::ScaledAddition(a.wrapping_add(*b)))
            }
            (Operation::ModularBimultiplication(a), Operation::ModularBimultiplication(b)) => {
                Some(Operation::ModularBimultiplication(a.merged(b)?))
            }
            (Operation::PhaseGradient(a), Operation::PhaseGradient(b)) => {
                Some(Operation::PhaseGradient(a.checked_add(b)?))
            }
            (Operation::ZPow(a), Operation::ZPow(b)) => Some(Operation::ZPow(a.checked_add(b)?)),
            _ => None,
        }
    }

    /// Action on basis states.
    ///
    /// `sizes[i]` is the width of register `i` and `values[i]` its value.
    /// Registers wider than 64 qubits cannot be represented. Phase-only
    /// variants act as the identity.
    pub fn apply(&self, sizes: &[usize], values: &[u64]) -> Vec<u64> {
        let m0 = sizes.first().map_or(0, |&n| mask(n));
        let m1 = sizes.get(1).map_or(0, |&n| mask(n));
        let v = values.first().copied().unwrap_or(0);
        let w = values.get(1).copied().unwrap_or(0);

        match self {
            Operation::X => vec![(v ^ 1) & m0],
            Operation::Swap => vec![w, v],
            Operation::ZPow(_) | Operation::PhaseGradient(_) => values.to_vec(),

            Operation::Add => vec![v, w.wrapping_add(v) & m1],
            Operation::Subtract => vec![v, w.wrapping_sub(v) & m1],
            Operation::Increment => vec![v.wrapping_add(1) & m0],
            Operation::Decrement => vec![v.wrapping_sub(1) & m0],
            Operation::MultiNot => vec![!v & m0],
            Operation::Negate => vec![v.wrapping_neg() & m0],
            Operation::Offset(k) => vec![v.wrapping_add(*k as u64) & m0],
            Operation::PredictOffsetOverflow(k) => {
                let overflow = (v as u128 + *k as u128) >> sizes[0] != 0;
                vec![v, w ^ u64::from(overflow)]
            }
            Operation::XorOffsetCarrySignals(k) => {
                let sum = v as u128 + *k as u128;
                let carries = ((sum ^ v as u128 ^ *k as u128) >> 1) as u64;
                vec![v, (w ^ carries) & m1]
            }
            Operation::LessThanConstant(k) => {
                let less = (v as i128) < *k as i128;
                vec![v, w ^ u64::from(less)]
            }

            Operation::PivotFlip => vec![v, pivot_flip(v, w)],
            Operation::ConstPivotFlip(p) => vec![pivot_flip(*p, v)],
            Operation::ReverseBits => {
                let n = sizes[0];
                if n == 0 {
                    vec![v]
                } else {
                    vec![v.reverse_bits() >> (64 - n)]
                }
            }
            Operation::RotateBits(amount) => {
                let n = sizes[0];
                if n == 0 {
                    return vec![v];
                }
                let r = amount.rem_euclid(n as i64) as u32;
                if r == 0 {
                    vec![v]
                } else {
                    vec![((v << r) | (v >> (n as u32 - r))) & m0]
                }
            }

            Operation::Scale {
                factor,
                inverse_factor,
            } => {
                let net = net_scale_factor(*factor, *inverse_factor, sizes[0]);
                vec![v.wrapping_mul(net) & m0]
            }
            Operation::ScaledAddition(k) => vec![v, w.wrapping_add(v.wrapping_mul(*k as u64)) & m1],

            Operation::ModularOffset { offset, modulus } => {
                let m = modulus.get();
                if v >= m {
                    vec![v]
                } else {
                    vec![((v as u128 + (*offset % m) as u128) % m as u128) as u64]
                }
            }
            Operation::ModularAddition(modulus) => {
                let m = modulus.get();
                if v >= m || w >= m {
                    vec![v, w]
                } else {
                    vec![v, ((w as u128 + v as u128) % m as u128) as u64]
                }
            }
            Operation::ModularSubtraction(modulus) => {
                let m = modulus.get();
                if v >= m || w >= m {
                    vec![v, w]
                } else {
                    vec![v, ((w as u128 + m as u128 - v as u128) % m as u128) as u64]
                }
            }
            Operation::ModularDouble(modulus) => {
                let m = modulus.get();
                if v >= m { vec![v] } else { vec![mul_mod(v, 2, m)] }
            }
            Operation::ModularUndouble(modulus) => {
                let m = modulus.get();
                if v >= m {
                    vec![v]
                } else {
                    vec![mul_mod(v, modulus.half(), m)]
                }
            }
            Operation::ModularNegate(modulus) => {
                let m = modulus.get();
                if v >= m { vec![v] } else { vec![(m - v) % m] }
            }
            Operation::ModularScaledAddition { factor, modulus } => {
                let m = modulus.get();
                if v >= m || w >= m {
                    vec![v, w]
                } else {
                    let sum = w as u128 + v as u128 * (*factor % m) as u128;
                    vec![v, (sum % m as u128) as u64]
                }
            }
            Operation::ModularBimultiplication(b) => {
                let m = b.modulus();
                if v >= m || w >= m {
                    vec![v, w]
                } else {
                    vec![mul_mod(v, b.factor(), m), mul_mod(w, b.inverse_factor(), m)]
                }
            }
        }
    }
}

fn pivot_flip(pivot: u64, x: u64) -> u64 {
    if x >= pivot { x } else { pivot - x - 1 }
}

/// `factor * inverse_factor⁻¹ mod 2^width`.
pub fn net_scale_factor(factor: OddFactor, inverse_factor: OddFactor, width: usize) -> u64 {
    let inv = inverse_mod_pow2(inverse_factor.get() as u64);
    (factor.get() as u64).wrapping_mul(inv) & mask(width)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::X => write!(f, "X"),
            Operation::Swap => write!(f, "Swap"),
            Operation::ZPow(p) => write!(f, "Z^{p}"),
            Operation::Add => write!(f, "Add"),
            Operation::Subtract => write!(f, "Subtract"),
            Operation::Increment => write!(f, "Increment"),
            Operation::Decrement => write!(f, "Decrement"),
            Operation::MultiNot => write!(f, "MultiNot"),
            Operation::Negate => write!(f, "Negate"),
            Operation::Offset(k) => write!(f, "{}{k}", if *k >= 0 { "+" } else { "" }),
            Operation::PredictOffsetOverflow(k) => write!(f, "PredictOffsetOverflow({k})"),
            Operation::XorOffsetCarrySignals(k) => write!(f, "XorOffsetCarrySignals({k})"),
            Operation::LessThanConstant(k) => write!(f, "LessThanConstant({k})"),
            Operation::PivotFlip => write!(f, "PivotFlip"),
            Operation::ConstPivotFlip(p) => write!(f, "Flip<{p}"),
            Operation::ReverseBits => write!(f, "ReverseBits"),
            Operation::RotateBits(r) if *r < 0 => write!(f, ">>>{}", r.unsigned_abs()),
            Operation::RotateBits(r) => write!(f, "<<<{r}"),
            Operation::Scale {
                factor,
                inverse_factor,
            } => write!(f, "Scale({}, {})", factor.get(), inverse_factor.get()),
            Operation::ScaledAddition(k) => write!(f, "ScaledAddition({k})"),
            Operation::ModularOffset { offset, modulus } => {
                write!(f, "+{offset} % {}", modulus.get())
            }
            Operation::ModularAddition(m) => write!(f, "ModularAddition({})", m.get()),
            Operation::ModularSubtraction(m) => write!(f, "ModularSubtraction({})", m.get()),
            Operation::ModularDouble(m) => write!(f, "×2 % {}", m.get()),
            Operation::ModularUndouble(m) => write!(f, "÷2 % {}", m.get()),
            Operation::ModularNegate(m) => write!(f, "×-1 % {}", m.get()),
            Operation::ModularScaledAddition { factor, modulus } => {
                write!(f, "ModularScaledAddition({factor}, {})", modulus.get())
            }
            Operation::ModularBimultiplication(b) => write!(
                f,
                "ModularBimultiplication({}, {})",
                b.factor(),
                b.modulus()
            ),
            Operation::PhaseGradient(e) => write!(f, "PhaseGradient^{e}"),
        }
    }
}
