//! The whole-permutation and single-state simulators must agree.

use arvak_arith::{Command, Operation, QubitId, Register};
use arvak_permsim::{ClassicalSimulator, PermutationSimulator, SimError};
use proptest::prelude::*;

/// Helper: a command over the two 3-qubit registers `a` (q0..q2) and `b` (q3..q5).
fn build(choice: u8, param: i64, control: Option<u32>) -> Command {
    let a = Register::contiguous(0, 3);
    let b = Register::contiguous(3, 3);
    let cmd = match choice % 6 {
        0 => Command::add(a, b).unwrap(),
        1 => Command::subtract(b, a).unwrap(),
        2 => Command::single(Operation::Offset(param), a).unwrap(),
        3 => Command::single(Operation::RotateBits(param), b).unwrap(),
        4 => Command::new(Operation::PivotFlip, vec![a, b]).unwrap(),
        _ => Command::x(QubitId(param.rem_euclid(6) as u32)),
    };
    match control {
        Some(c) if !cmd.touches(QubitId(c)) => cmd.with_controls([QubitId(c)]).unwrap(),
        _ => cmd,
    }
}

fn arb_circuit() -> impl Strategy<Value = Vec<Command>> {
    prop::collection::vec(
        (any::<u8>(), -20_i64..20, prop::option::of(0_u32..7))
            .prop_map(|(choice, param, control)| build(choice, param, control)),
        0..12,
    )
}

// ---------------------------------------------------------------------------
// Agreement
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn classical_matches_permutation(circuit in arb_circuit(), input in 0_u128..128) {
        let mut perm = PermutationSimulator::new();
        let all = perm.allocate(7).unwrap();
        perm.run(&circuit).unwrap();

        let mut single = ClassicalSimulator::new();
        let same = single.allocate(7).unwrap();
        prop_assert_eq!(&all, &same);
        single.write_register(&same, input as u64).unwrap();
        single.run(&circuit).unwrap();

        prop_assert_eq!(perm.get_permutation()[input as usize], single.raw_state());
    }

    #[test]
    fn circuits_are_permutations(circuit in arb_circuit()) {
        let mut perm = PermutationSimulator::new();
        perm.allocate(7).unwrap();
        perm.run(&circuit).unwrap();
        let mut images = perm.get_permutation().to_vec();
        images.sort_unstable();
        let identity: Vec<u128> = (0..128).collect();
        prop_assert_eq!(images, identity);
    }
}

// ---------------------------------------------------------------------------
// Tracking external qubits
// ---------------------------------------------------------------------------

#[test]
fn tracked_qubits_behave_like_allocated_ones() {
    let mut sim = PermutationSimulator::new();
    sim.track([QubitId(40), QubitId(41)]).unwrap();
    let reg = Register::new([QubitId(40), QubitId(41)]);
    sim.apply(&Command::single(Operation::Increment, reg.clone()).unwrap())
        .unwrap();
    sim.permutation_equals(&[reg], |_, v| vec![v[0] + 1], None)
        .unwrap();
}

#[test]
fn unknown_qubit_is_reported() {
    let mut sim = ClassicalSimulator::new();
    sim.allocate(1).unwrap();
    let err = sim.apply(&Command::x(QubitId(9))).unwrap_err();
    assert_eq!(err, SimError::UnknownQubit(QubitId(9)));
}
