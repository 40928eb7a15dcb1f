//! Whole-permutation simulation over every basis state at once.

use arvak_arith::{Command, QubitId, Register};
use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::layout::Layout;

/// Largest qubit count for which every basis state is tracked.
pub const MAX_EXHAUSTIVE_QUBITS: usize = 20;

/// Tracks the image of every computational basis state.
///
/// Entry `i` of the state table is where the circuit sends basis state `i`.
/// Bit `k` of a state is the qubit at layout position `k`.
#[derive(Debug, Clone)]
pub struct PermutationSimulator {
    layout: Layout,
    images: Vec<u128>,
}

impl Default for PermutationSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl PermutationSimulator {
    /// Simulator over zero qubits: a single empty basis state.
    pub fn new() -> Self {
        Self {
            layout: Layout::new(),
            images: vec![0],
        }
    }

    /// Allocate a register of `n` qubits.
    pub fn allocate(&mut self, n: usize) -> SimResult<Register> {
        self.reserve(n)?;
        let before = self.layout.len();
        let reg = self.layout.allocate(n)?;
        for k in before..self.layout.len() {
            self.double(k);
        }
        Ok(reg)
    }

    /// Track externally allocated qubits.
    pub fn track(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> SimResult<()> {
        for q in qubits {
            if self.layout.position(q).is_ok() {
                continue;
            }
            self.reserve(1)?;
            self.layout.track(q)?;
            self.double(self.layout.len() - 1);
        }
        Ok(())
    }

    fn reserve(&self, extra: usize) -> SimResult<()> {
        let requested = self.layout.len() + extra;
        if requested > MAX_EXHAUSTIVE_QUBITS {
            return Err(SimError::StateSpaceTooLarge {
                requested,
                max: MAX_EXHAUSTIVE_QUBITS,
            });
        }
        Ok(())
    }

    /// A fresh qubit at position `k` is untouched by everything so far.
    fn double(&mut self, k: usize) {
        let bit = 1u128 << k;
        let upper: Vec<u128> = self.images.iter().map(|s| s | bit).collect();
        self.images.extend(upper);
    }

    /// Number of tracked qubits.
    pub fn num_qubits(&self) -> usize {
        self.layout.len()
    }

    /// Apply one command to every basis state.
    pub fn apply(&mut self, command: &Command) -> SimResult<()> {
        for image in &mut self.images {
            *image = self.layout.apply(*image, command)?;
        }
        Ok(())
    }

    /// Apply commands in order.
    pub fn run<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) -> SimResult<()> {
        for cmd in commands {
            self.apply(cmd)?;
        }
        Ok(())
    }

    /// Image of each basis state, indexed by input state.
    pub fn get_permutation(&self) -> &[u128] {
        &self.images
    }

    /// Check that the circuit acts on `registers` as `permutation` does.
    ///
    /// `permutation` maps register sizes and input values to output values;
    /// outputs are reduced modulo each register's span. Inputs with a
    /// register value at or above its entry in `limits` are not checked.
    /// Qubits outside `registers` must come back unchanged.
    pub fn permutation_equals<F>(
        &self,
        registers: &[Register],
        permutation: F,
        limits: Option<&[u64]>,
    ) -> SimResult<()>
    where
        F: Fn(&[usize], &[u64]) -> Vec<u64>,
    {
        let sizes: Vec<usize> = registers.iter().map(Register::len).collect();
        let mut covered = 0u128;
        for q in registers.iter().flat_map(Register::iter) {
            covered |= 1u128 << self.layout.position(*q)?;
        }

        let mut checked = 0usize;
        for (input, &image) in self.images.iter().enumerate() {
            let input = input as u128;
            let values = registers
                .iter()
                .map(|reg| self.layout.read(input, reg))
                .collect::<SimResult<Vec<_>>>()?;
            let in_domain = limits.is_none_or(|limits| {
                values.iter().zip(limits).all(|(v, limit)| v < limit)
            });
            if !in_domain {
                continue;
            }

            let expected = reduce_outputs(&sizes, permutation(&sizes, &values));
            let actual = registers
                .iter()
                .map(|reg| self.layout.read(image, reg))
                .collect::<SimResult<Vec<_>>>()?;
            if expected != actual {
                return Err(SimError::Mismatch {
                    input: values,
                    expected,
                    actual,
                });
            }
            if image & !covered != input & !covered {
                return Err(SimError::SideEffect { input: values });
            }
            checked += 1;
        }
        trace!(checked, "permutation verified");
        Ok(())
    }
}

/// Reduce each output modulo `2^size`.
pub(crate) fn reduce_outputs(sizes: &[usize], outputs: Vec<u64>) -> Vec<u64> {
    outputs
        .into_iter()
        .zip(sizes)
        .map(|(v, &n)| if n >= 64 { v } else { v & ((1u64 << n) - 1) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_arith::Operation;

    #[test]
    fn test_identity_on_allocation() {
        let mut sim = PermutationSimulator::new();
        let a = sim.allocate(2).unwrap();
        let _b = sim.allocate(1).unwrap();
        assert_eq!(sim.get_permutation(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        sim.permutation_equals(&[a], |_, v| v.to_vec(), None).unwrap();
    }

    #[test]
    fn test_increment_permutation() {
        let mut sim = PermutationSimulator::new();
        let t = sim.allocate(3).unwrap();
        sim.apply(&Command::single(Operation::Increment, t.clone()).unwrap())
            .unwrap();
        sim.permutation_equals(&[t.clone()], |_, v| vec![v[0] + 1], None)
            .unwrap();
        let err = sim
            .permutation_equals(&[t], |_, v| vec![v[0]], None)
            .unwrap_err();
        assert!(matches!(err, SimError::Mismatch { .. }));
    }

    #[test]
    fn test_side_effect_detected() {
        let mut sim = PermutationSimulator::new();
        let t = sim.allocate(1).unwrap();
        let other = sim.allocate(1).unwrap();
        sim.apply(&Command::x(other[0])).unwrap();
        let err = sim
            .permutation_equals(&[t], |_, v| v.to_vec(), None)
            .unwrap_err();
        assert!(matches!(err, SimError::SideEffect { .. }));
    }

    #[test]
    fn test_limits_skip_out_of_domain() {
        let mut sim = PermutationSimulator::new();
        let t = sim.allocate(3).unwrap();
        sim.apply(&Command::single(Operation::ConstPivotFlip(5), t.clone()).unwrap())
            .unwrap();
        sim.permutation_equals(&[t.clone()], |_, v| vec![4 - v[0]], Some(&[5]))
            .unwrap();
        assert!(sim.permutation_equals(&[t], |_, v| vec![4 - v[0].min(4)], None).is_err());
    }

    #[test]
    fn test_too_many_qubits() {
        let mut sim = PermutationSimulator::new();
        assert!(matches!(
            sim.allocate(MAX_EXHAUSTIVE_QUBITS + 1),
            Err(SimError::StateSpaceTooLarge { .. })
        ));
    }
}
