//! Qubit-to-bit layout shared by the simulators.

use arvak_arith::{Command, Operation, QubitId, Register};
use rustc_hash::FxHashMap;

use crate::error::{SimError, SimResult};

/// Maximum number of qubits a packed basis state can hold.
pub const MAX_QUBITS: usize = 128;

/// Assigns every tracked qubit a bit position inside a `u128` basis state.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    positions: FxHashMap<QubitId, u32>,
    next_id: u32,
}

impl Layout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked qubits.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check whether no qubit is tracked.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Allocate `n` fresh qubits as a register.
    pub fn allocate(&mut self, n: usize) -> SimResult<Register> {
        let mut qubits = Vec::with_capacity(n);
        for _ in 0..n {
            while self.positions.contains_key(&QubitId(self.next_id)) {
                self.next_id += 1;
            }
            let q = QubitId(self.next_id);
            self.track(q)?;
            qubits.push(q);
        }
        Ok(Register::new(qubits))
    }

    /// Start tracking an externally allocated qubit.
    pub fn track(&mut self, qubit: QubitId) -> SimResult<()> {
        if self.positions.contains_key(&qubit) {
            return Ok(());
        }
        if self.positions.len() >= MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                requested: self.positions.len() + 1,
                max: MAX_QUBITS,
            });
        }
        let position = self.positions.len() as u32;
        self.positions.insert(qubit, position);
        Ok(())
    }

    /// Bit position of `qubit`.
    pub fn position(&self, qubit: QubitId) -> SimResult<u32> {
        self.positions
            .get(&qubit)
            .copied()
            .ok_or(SimError::UnknownQubit(qubit))
    }

    /// Read a qubit from a packed state.
    pub fn read_bit(&self, state: u128, qubit: QubitId) -> SimResult<bool> {
        Ok((state >> self.position(qubit)?) & 1 == 1)
    }

    /// Read a register from a packed state.
    pub fn read(&self, state: u128, register: &Register) -> SimResult<u64> {
        if register.len() > 64 {
            return Err(SimError::RegisterTooWide(register.len()));
        }
        let mut value = 0u64;
        for (i, &q) in register.iter().enumerate() {
            if self.read_bit(state, q)? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    /// Overwrite a register inside a packed state.
    pub fn write(&self, state: u128, register: &Register, value: u64) -> SimResult<u128> {
        let mut state = state;
        for (i, &q) in register.iter().enumerate() {
            let bit = 1u128 << self.position(q)?;
            if i < 64 && (value >> i) & 1 == 1 {
                state |= bit;
            } else {
                state &= !bit;
            }
        }
        Ok(state)
    }

    /// Apply one command to a packed state.
    pub fn apply(&self, state: u128, command: &Command) -> SimResult<u128> {
        for &c in command.controls() {
            if !self.read_bit(state, c)? {
                return Ok(state);
            }
        }

        if let Operation::X = command.operation() {
            let mut state = state;
            for &q in command.registers().iter().flat_map(Register::iter) {
                state ^= 1u128 << self.position(q)?;
            }
            return Ok(state);
        }
        if command.operation().is_phase_only() {
            return Ok(state);
        }

        let sizes = command.register_sizes();
        let values = command
            .registers()
            .iter()
            .map(|reg| self.read(state, reg))
            .collect::<SimResult<Vec<_>>>()?;
        let outputs = command.operation().apply(&sizes, &values);

        let mut state = state;
        for (reg, value) in command.registers().iter().zip(outputs) {
            state = self.write(state, reg, value)?;
        }
        Ok(state)
    }
}
