//! Single basis-state simulation.

use arvak_arith::{Command, QubitId, Register};

use crate::error::SimResult;
use crate::layout::Layout;

/// Tracks one computational basis state through a reversible circuit.
#[derive(Debug, Clone, Default)]
pub struct ClassicalSimulator {
    layout: Layout,
    state: u128,
}

impl ClassicalSimulator {
    /// Empty simulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-initialized register of `n` qubits.
    pub fn allocate(&mut self, n: usize) -> SimResult<Register> {
        self.layout.allocate(n)
    }

    /// Track externally allocated qubits, initialized to zero.
    pub fn track(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> SimResult<()> {
        for q in qubits {
            self.layout.track(q)?;
        }
        Ok(())
    }

    /// Set a register's value.
    pub fn write_register(&mut self, register: &Register, value: u64) -> SimResult<()> {
        self.state = self.layout.write(self.state, register, value)?;
        Ok(())
    }

    /// Read a register's value.
    pub fn read_register(&self, register: &Register) -> SimResult<u64> {
        self.layout.read(self.state, register)
    }

    /// Read a single qubit.
    pub fn read_bit(&self, qubit: QubitId) -> SimResult<bool> {
        self.layout.read_bit(self.state, qubit)
    }

    /// Apply one command.
    pub fn apply(&mut self, command: &Command) -> SimResult<()> {
        self.state = self.layout.apply(self.state, command)?;
        Ok(())
    }

    /// Apply commands in order.
    pub fn run<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) -> SimResult<()> {
        for cmd in commands {
            self.apply(cmd)?;
        }
        Ok(())
    }

    /// The packed state of every tracked qubit.
    pub fn raw_state(&self) -> u128 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_arith::Operation;

    #[test]
    fn test_add_into_target() {
        let mut sim = ClassicalSimulator::new();
        let a = sim.allocate(3).unwrap();
        let b = sim.allocate(3).unwrap();
        sim.write_register(&a, 5).unwrap();
        sim.write_register(&b, 6).unwrap();
        sim.apply(&Command::add(a.clone(), b.clone()).unwrap()).unwrap();
        assert_eq!(sim.read_register(&a).unwrap(), 5);
        assert_eq!(sim.read_register(&b).unwrap(), 3);
    }

    #[test]
    fn test_run_sequence() {
        let mut sim = ClassicalSimulator::new();
        let t = sim.allocate(4).unwrap();
        let cmds = [
            Command::single(Operation::Offset(9), t.clone()).unwrap(),
            Command::single(Operation::RotateBits(1), t.clone()).unwrap(),
        ];
        sim.run(&cmds).unwrap();
        assert_eq!(sim.read_register(&t).unwrap(), 0b0011);
        assert!(sim.read_bit(t[0]).unwrap());
    }
}
