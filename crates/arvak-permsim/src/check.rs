//! Circuit checks against an expected register permutation.
//!
//! Both checks allocate one register per requested size, let `actions`
//! build the circuit over those registers, and compare the simulated result
//! with `permutation`. The exhaustive check visits every basis state; the
//! fuzz check samples random register values, optionally below `limits`.

use arvak_arith::{Command, Register};
use rand::Rng;
use tracing::debug;

use crate::classical::ClassicalSimulator;
use crate::error::{SimError, SimResult};
use crate::permutation::{PermutationSimulator, reduce_outputs};

/// Exhaustively check the circuit produced by `actions`.
pub fn check_permutation_circuit<P, A>(
    register_sizes: &[usize],
    permutation: P,
    actions: A,
    limits: Option<&[u64]>,
) -> SimResult<()>
where
    P: Fn(&[usize], &[u64]) -> Vec<u64>,
    A: FnOnce(&[Register]) -> Vec<Command>,
{
    let mut sim = PermutationSimulator::new();
    let registers = register_sizes
        .iter()
        .map(|&n| sim.allocate(n))
        .collect::<SimResult<Vec<_>>>()?;

    let commands = actions(&registers);
    debug!(
        commands = commands.len(),
        qubits = sim.num_qubits(),
        "exhaustive permutation check"
    );
    sim.run(&commands)?;
    sim.permutation_equals(&registers, permutation, limits)
}

/// Check the circuit produced by `actions` on `trials` random inputs.
pub fn fuzz_permutation_circuit<P, A, R>(
    register_sizes: &[usize],
    permutation: P,
    actions: A,
    limits: Option<&[u64]>,
    trials: usize,
    rng: &mut R,
) -> SimResult<()>
where
    P: Fn(&[usize], &[u64]) -> Vec<u64>,
    A: FnOnce(&[Register]) -> Vec<Command>,
    R: Rng,
{
    let mut template = ClassicalSimulator::new();
    let registers = register_sizes
        .iter()
        .map(|&n| template.allocate(n))
        .collect::<SimResult<Vec<_>>>()?;

    let commands = actions(&registers);
    debug!(commands = commands.len(), trials, "fuzzed permutation check");

    for _ in 0..trials {
        let inputs: Vec<u64> = register_sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let span = if n >= 64 { u64::MAX } else { 1u64 << n };
                let limit = limits.and_then(|l| l.get(i).copied()).unwrap_or(span).min(span);
                if limit == 0 { 0 } else { rng.gen_range(0..limit) }
            })
            .collect();

        let mut sim = template.clone();
        for (reg, &value) in registers.iter().zip(&inputs) {
            sim.write_register(reg, value)?;
        }
        sim.run(&commands)?;

        let expected = reduce_outputs(register_sizes, permutation(register_sizes, &inputs));
        let actual = registers
            .iter()
            .map(|reg| sim.read_register(reg))
            .collect::<SimResult<Vec<_>>>()?;
        if expected != actual {
            return Err(SimError::Mismatch {
                input: inputs,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Values to try for a parameter ranging over `0..n`.
///
/// Small ranges are covered completely; larger ones get one random sample.
pub fn cover(n: u64, cut: u64) -> Vec<u64> {
    if n < cut {
        (0..n).collect()
    } else {
        vec![rand::thread_rng().gen_range(0..n)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_arith::Operation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_exhaustive_swap() {
        check_permutation_circuit(
            &[1, 1],
            |_, v| vec![v[1], v[0]],
            |regs| vec![Command::swap(regs[0][0], regs[1][0]).unwrap()],
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_fuzz_detects_wrong_circuit() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = fuzz_permutation_circuit(
            &[20, 20],
            |_, v| vec![v[0], v[1] + v[0]],
            |regs| vec![Command::subtract(regs[0].clone(), regs[1].clone()).unwrap()],
            None,
            50,
            &mut rng,
        );
        assert!(matches!(result, Err(SimError::Mismatch { .. })));
    }

    #[test]
    fn test_fuzz_respects_limits() {
        let mut rng = StdRng::seed_from_u64(3);
        let op = Operation::modular_offset(3, 11).unwrap();
        fuzz_permutation_circuit(
            &[30],
            |_, v| vec![(v[0] + 3) % 11],
            |regs| vec![Command::single(op, regs[0].clone()).unwrap()],
            Some(&[11]),
            100,
            &mut rng,
        )
        .unwrap();
    }

    #[test]
    fn test_cover() {
        assert_eq!(cover(3, 10), vec![0, 1, 2]);
        let sample = cover(1000, 10);
        assert_eq!(sample.len(), 1);
        assert!(sample[0] < 1000);
    }
}
