//! Qubit identities and little-endian registers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, Range, RangeFrom, RangeTo};

/// Stable identifier of a qubit, assigned by the host at allocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// An ordered sequence of qubits read as an unsigned little-endian integer.
///
/// Bit 0 (the first qubit) is the least significant. A register has no
/// identity of its own: two registers are equal when they hold the same
/// qubits in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register(Vec<QubitId>);

impl Register {
    /// Create a register from qubits, least significant first.
    pub fn new(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self(qubits.into_iter().collect())
    }

    /// Create an empty register.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Register of consecutive ids `start..start + len`.
    pub fn contiguous(start: u32, len: u32) -> Self {
        Self((start..start + len).map(QubitId).collect())
    }

    /// Single-qubit register.
    pub fn single(qubit: QubitId) -> Self {
        Self(vec![qubit])
    }

    /// Number of qubits.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the register holds no qubits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The qubits, least significant first.
    #[inline]
    pub fn qubits(&self) -> &[QubitId] {
        &self.0
    }

    /// Iterate over the qubits.
    pub fn iter(&self) -> std::slice::Iter<'_, QubitId> {
        self.0.iter()
    }

    /// Least significant qubit.
    pub fn first(&self) -> Option<QubitId> {
        self.0.first().copied()
    }

    /// Most significant qubit.
    pub fn last(&self) -> Option<QubitId> {
        self.0.last().copied()
    }

    /// Qubit at `index`, if present.
    pub fn get(&self, index: usize) -> Option<QubitId> {
        self.0.get(index).copied()
    }

    /// Sub-register over `range`, clamped to the register bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self(self.0[start..end].to_vec())
    }

    /// Qubits from `start` to the end.
    #[must_use]
    pub fn from_bit(&self, start: usize) -> Self {
        self.slice(start..self.len())
    }

    /// The lowest `len` qubits.
    #[must_use]
    pub fn low(&self, len: usize) -> Self {
        self.slice(0..len)
    }

    /// All qubits except the most significant one.
    #[must_use]
    pub fn without_last(&self) -> Self {
        self.slice(0..self.len().saturating_sub(1))
    }

    /// Split into `[..mid]` and `[mid..]`.
    pub fn split_at(&self, mid: usize) -> (Self, Self) {
        (self.low(mid), self.from_bit(mid))
    }

    /// Concatenate `other` above this register's most significant bit.
    #[must_use]
    pub fn concat(&self, other: &Register) -> Self {
        let mut qubits = self.0.clone();
        qubits.extend_from_slice(&other.0);
        Self(qubits)
    }

    /// Prepend a qubit as the new least significant bit.
    #[must_use]
    pub fn with_low(&self, qubit: QubitId) -> Self {
        let mut qubits = Vec::with_capacity(self.len() + 1);
        qubits.push(qubit);
        qubits.extend_from_slice(&self.0);
        Self(qubits)
    }

    /// Append a qubit as the new most significant bit.
    #[must_use]
    pub fn with_high(&self, qubit: QubitId) -> Self {
        let mut qubits = self.0.clone();
        qubits.push(qubit);
        Self(qubits)
    }

    /// Same qubits in reverse significance order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    /// Check whether `qubit` belongs to this register.
    pub fn contains(&self, qubit: QubitId) -> bool {
        self.0.contains(&qubit)
    }
}

impl Index<usize> for Register {
    type Output = QubitId;

    fn index(&self, index: usize) -> &QubitId {
        &self.0[index]
    }
}

impl Index<RangeFrom<usize>> for Register {
    type Output = [QubitId];

    fn index(&self, range: RangeFrom<usize>) -> &[QubitId] {
        &self.0[range]
    }
}

impl Index<RangeTo<usize>> for Register {
    type Output = [QubitId];

    fn index(&self, range: RangeTo<usize>) -> &[QubitId] {
        &self.0[range]
    }
}

impl From<Vec<QubitId>> for Register {
    fn from(qubits: Vec<QubitId>) -> Self {
        Self(qubits)
    }
}

impl From<&[QubitId]> for Register {
    fn from(qubits: &[QubitId]) -> Self {
        Self(qubits.to_vec())
    }
}

impl From<QubitId> for Register {
    fn from(qubit: QubitId) -> Self {
        Self::single(qubit)
    }
}

impl FromIterator<QubitId> for Register {
    fn from_iter<I: IntoIterator<Item = QubitId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Register {
    type Item = QubitId;
    type IntoIter = std::vec::IntoIter<QubitId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Register {
    type Item = &'a QubitId;
    type IntoIter = std::slice::Iter<'a, QubitId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, q) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{q}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(3)), "q3");
        assert_eq!(format!("{}", Register::contiguous(0, 2)), "[q0, q1]");
    }

    #[test]
    fn test_slicing_is_clamped() {
        let reg = Register::contiguous(10, 4);
        assert_eq!(reg.slice(1..3), Register::new([QubitId(11), QubitId(12)]));
        assert_eq!(reg.from_bit(4), Register::empty());
        assert_eq!(reg.from_bit(9), Register::empty());
        assert_eq!(reg.without_last().len(), 3);
        assert_eq!(Register::empty().without_last(), Register::empty());
    }

    #[test]
    fn test_concat_and_reverse() {
        let a = Register::contiguous(0, 2);
        let b = Register::contiguous(5, 1);
        let joined = a.concat(&b);
        assert_eq!(joined.qubits(), &[QubitId(0), QubitId(1), QubitId(5)]);
        assert_eq!(joined.reversed().first(), Some(QubitId(5)));
        assert_eq!(b.with_low(QubitId(9)).first(), Some(QubitId(9)));
        assert_eq!(b.with_high(QubitId(9)).last(), Some(QubitId(9)));
    }
}
