//! Exact dyadic rationals for phase exponents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// A rational number `numerator / 2^log2_denominator`.
///
/// Values are kept normalized: either the denominator is 1 or the numerator
/// is odd. Normalization makes structural equality coincide with numeric
/// equality, so dyadic exponents can live inside hashed cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dyadic {
    numerator: i64,
    log2_denominator: u32,
}

impl Dyadic {
    /// Zero.
    pub const ZERO: Dyadic = Dyadic {
        numerator: 0,
        log2_denominator: 0,
    };

    /// Build `numerator / 2^log2_denominator`, normalized.
    pub fn new(numerator: i64, log2_denominator: u32) -> Self {
        let mut numerator = numerator;
        let mut log2_denominator = log2_denominator;
        if numerator == 0 {
            return Self::ZERO;
        }
        while log2_denominator > 0 && numerator % 2 == 0 {
            numerator /= 2;
            log2_denominator -= 1;
        }
        Self {
            numerator,
            log2_denominator,
        }
    }

    /// An integer value.
    pub fn integer(value: i64) -> Self {
        Self::new(value, 0)
    }

    /// Numerator of the normalized fraction.
    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    /// Base-2 logarithm of the normalized denominator.
    pub fn log2_denominator(&self) -> u32 {
        self.log2_denominator
    }

    /// Check whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Check whether the value is an even integer.
    ///
    /// `Z^p` is the identity exactly when `p` is an even integer.
    pub fn is_even_integer(&self) -> bool {
        self.log2_denominator == 0 && self.numerator % 2 == 0
    }

    /// Divide by `2^shift`.
    #[must_use]
    pub fn div_pow2(&self, shift: u32) -> Self {
        Self::new(self.numerator, self.log2_denominator + shift)
    }

    /// Exact sum, or `None` if the common numerator overflows.
    pub fn checked_add(&self, other: &Dyadic) -> Option<Dyadic> {
        let d = self.log2_denominator.max(other.log2_denominator);
        let lhs = self
            .numerator
            .checked_mul(1i64.checked_shl(d - self.log2_denominator)?)?;
        let rhs = other
            .numerator
            .checked_mul(1i64.checked_shl(d - other.log2_denominator)?)?;
        Some(Self::new(lhs.checked_add(rhs)?, d))
    }

    /// Approximate floating-point value.
    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / (self.log2_denominator as f64).exp2()
    }
}

impl Default for Dyadic {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Neg for Dyadic {
    type Output = Dyadic;

    fn neg(self) -> Dyadic {
        Dyadic {
            numerator: -self.numerator,
            log2_denominator: self.log2_denominator,
        }
    }
}

impl From<i64> for Dyadic {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl fmt::Display for Dyadic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.log2_denominator == 0 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/2^{}", self.numerator, self.log2_denominator)
        }
    }
}
