//! Test harness: simulate a single rule's output against the operation.

use arvak_arith::modular::mask;
use arvak_arith::{Command, Operation, Register};
use arvak_permsim::{check_permutation_circuit, fuzz_permutation_circuit};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::rule::{DecompositionRule, RuleInput};

/// Largest circuit checked over every basis state.
const EXHAUSTIVE_QUBITS: usize = 12;

/// Random inputs tried on larger circuits.
const FUZZ_TRIALS: usize = 300;

/// Check that `rule` implements `operation` on registers of `sizes`.
///
/// The circuit is laid out as `[controls, workspace, registers...]`. The
/// expected action applies `operation` only when every control is set and
/// leaves controls and workspace unchanged. Inputs at or above `limits`
/// (one entry per operation register) are skipped.
///
/// Returns the number of emitted commands.
pub(crate) fn check_rule(
    rule: &DecompositionRule,
    operation: Operation,
    sizes: &[usize],
    controls: usize,
    workspace: usize,
    limits: Option<&[u64]>,
) -> usize {
    let mut all_sizes = vec![controls, workspace];
    all_sizes.extend_from_slice(sizes);
    let all_limits: Option<Vec<u64>> = limits.map(|l| {
        let mut out = vec![u64::MAX, u64::MAX];
        out.extend_from_slice(l);
        out
    });

    let expected = |s: &[usize], v: &[u64]| {
        let mut out = v.to_vec();
        if v[0] == mask(s[0]) {
            let args = operation.apply(&s[2..], &v[2..]);
            out[2..].copy_from_slice(&args);
        }
        out
    };

    let mut emitted = 0;
    let actions = |regs: &[Register]| {
        let cmd = Command::new(operation.clone(), regs[2..].to_vec())
            .unwrap()
            .with_controls(regs[0].iter().copied())
            .unwrap();
        let input = RuleInput::new(&cmd, regs[1].qubits());
        assert!(
            rule.applies(&input),
            "{} does not apply to {cmd} with {workspace} workspace qubits",
            rule.name()
        );
        let out = rule.decompose(&input).unwrap();
        emitted = out.len();
        out
    };

    let total: usize = all_sizes.iter().sum();
    let result = if total <= EXHAUSTIVE_QUBITS {
        check_permutation_circuit(&all_sizes, expected, actions, all_limits.as_deref())
    } else {
        let mut rng = StdRng::seed_from_u64(total as u64);
        fuzz_permutation_circuit(
            &all_sizes,
            expected,
            actions,
            all_limits.as_deref(),
            FUZZ_TRIALS,
            &mut rng,
        )
    };
    if let Err(err) = result {
        panic!("{} failed on {sizes:?}: {err}", rule.name());
    }
    emitted
}

/// Decompose `operation` once and return the emitted commands.
pub(crate) fn emit(
    rule: &DecompositionRule,
    operation: Operation,
    sizes: &[usize],
    controls: usize,
    workspace: usize,
) -> Vec<Command> {
    let mut next = 0u32;
    let mut take = |n: usize| {
        let reg = Register::contiguous(next, n as u32);
        next += n as u32;
        reg
    };
    let ctrl = take(controls);
    let ws = take(workspace);
    let regs: Vec<Register> = sizes.iter().map(|&n| take(n)).collect();
    let cmd = Command::new(operation, regs)
        .unwrap()
        .with_controls(ctrl.iter().copied())
        .unwrap();
    rule.decompose(&RuleInput::new(&cmd, ws.qubits())).unwrap()
}
