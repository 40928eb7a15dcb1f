//! Borrowable workspace qubits.

use arvak_arith::{Command, QubitId};

/// Live qubits the command does not touch, sorted by id.
///
/// These are the qubits a rule may borrow as dirty workspace. Their values
/// are unknown and must be restored before the rule's output ends.
pub fn workspace(command: &Command, live_qubits: &[QubitId]) -> Vec<QubitId> {
    let mut free: Vec<QubitId> = live_qubits
        .iter()
        .copied()
        .filter(|&q| !command.touches(q))
        .collect();
    free.sort_unstable();
    free.dedup();
    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_arith::{Operation, Register};

    #[test]
    fn test_excludes_targets_and_controls() {
        let cmd = Command::single(Operation::Increment, Register::contiguous(2, 2))
            .unwrap()
            .with_controls([QubitId(5)])
            .unwrap();
        let live: Vec<QubitId> = (0..7).rev().map(QubitId).collect();
        assert_eq!(
            workspace(&cmd, &live),
            vec![QubitId(0), QubitId(1), QubitId(4), QubitId(6)]
        );
    }

    #[test]
    fn test_empty_live_set() {
        let cmd = Command::x(QubitId(0));
        assert!(workspace(&cmd, &[]).is_empty());
    }
}
