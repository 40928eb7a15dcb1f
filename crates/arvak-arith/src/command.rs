//! Commands: operations bound to registers and controls.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArithError, ArithResult};
use crate::modular::span;
use crate::operation::{Operation, OperationTag};
use crate::qubit::{QubitId, Register};

/// Widest register a constant-carrying operation may act on.
pub const MAX_CONSTANT_WIDTH: usize = 64;

/// An operation applied to concrete registers, conditioned on controls.
///
/// With no controls the operation always executes. Otherwise it applies
/// only when every control qubit is set, and is the identity elsewhere.
/// Controls form a set: they are stored sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    operation: Operation,
    registers: Vec<Register>,
    controls: Vec<QubitId>,
    tags: Vec<String>,
}

impl Command {
    /// Bind `operation` to `registers`, validating their shape.
    pub fn new(operation: Operation, registers: Vec<Register>) -> ArithResult<Self> {
        let cmd = Self {
            operation,
            registers,
            controls: Vec::new(),
            tags: Vec::new(),
        };
        cmd.validate()?;
        Ok(cmd)
    }

    /// Apply `operation` to a single register.
    pub fn single(operation: Operation, target: impl Into<Register>) -> ArithResult<Self> {
        Self::new(operation, vec![target.into()])
    }

    /// Toggle `target`.
    pub fn x(target: QubitId) -> Self {
        Self {
            operation: Operation::X,
            registers: vec![Register::single(target)],
            controls: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Exchange `a` and `b`.
    pub fn swap(a: QubitId, b: QubitId) -> ArithResult<Self> {
        Self::new(Operation::Swap, vec![Register::single(a), Register::single(b)])
    }

    /// `target += input`.
    pub fn add(input: Register, target: Register) -> ArithResult<Self> {
        Self::new(Operation::Add, vec![input, target])
    }

    /// `target -= input`.
    pub fn subtract(input: Register, target: Register) -> ArithResult<Self> {
        Self::new(Operation::Subtract, vec![input, target])
    }

    /// Condition the command on `controls`, in addition to existing ones.
    pub fn with_controls(mut self, controls: impl IntoIterator<Item = QubitId>) -> ArithResult<Self> {
        self.controls.extend(controls);
        self.controls.sort_unstable();
        self.controls.dedup();
        self.check_distinct_qubits()?;
        Ok(self)
    }

    /// Attach a provenance tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Attach several provenance tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Put `tags` ahead of the existing tags.
    #[must_use]
    pub fn with_leading_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        let mut all: Vec<String> = tags.into_iter().collect();
        all.append(&mut self.tags);
        self.tags = all;
        self
    }

    /// The same registers, controls and tags with the inverse operation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            operation: self.operation.inverse(),
            registers: self.registers.clone(),
            controls: self.controls.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Replace the operation, keeping qubits and tags.
    ///
    /// The caller guarantees the new operation accepts the same shape.
    #[must_use]
    pub fn with_operation(&self, operation: Operation) -> Self {
        Self {
            operation,
            registers: self.registers.clone(),
            controls: self.controls.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Rename every qubit through `map`.
    ///
    /// `map` must be injective on this command's qubits.
    #[must_use]
    pub fn remap(&self, map: impl Fn(QubitId) -> QubitId) -> Self {
        let registers = self
            .registers
            .iter()
            .map(|reg| reg.iter().map(|&q| map(q)).collect())
            .collect();
        let mut controls: Vec<QubitId> = self.controls.iter().map(|&q| map(q)).collect();
        controls.sort_unstable();
        Self {
            operation: self.operation.clone(),
            registers,
            controls,
            tags: self.tags.clone(),
        }
    }

    /// The operation.
    #[inline]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// The operation's tag.
    #[inline]
    pub fn tag(&self) -> OperationTag {
        self.operation.tag()
    }

    /// Target registers in operation order.
    #[inline]
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Register at `index`.
    pub fn register(&self, index: usize) -> Option<&Register> {
        self.registers.get(index)
    }

    /// Control qubits, sorted.
    #[inline]
    pub fn controls(&self) -> &[QubitId] {
        &self.controls
    }

    /// Provenance tags.
    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Width of each target register.
    pub fn register_sizes(&self) -> Vec<usize> {
        self.registers.iter().map(Register::len).collect()
    }

    /// Number of target qubits across all registers.
    pub fn target_qubit_count(&self) -> usize {
        self.registers.iter().map(Register::len).sum()
    }

    /// Target qubits then controls, in encounter order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.registers
            .iter()
            .flat_map(|reg| reg.iter().copied())
            .chain(self.controls.iter().copied())
    }

    /// Check whether the command touches `qubit`.
    pub fn touches(&self, qubit: QubitId) -> bool {
        self.qubits().any(|q| q == qubit)
    }

    fn validate(&self) -> ArithResult<()> {
        let tag = self.operation.tag();
        let expected = self.operation.arity();
        if self.registers.len() != expected {
            return Err(ArithError::RegisterCountMismatch {
                operation: tag,
                expected,
                got: self.registers.len(),
            });
        }

        for &(index, size) in self.operation.fixed_register_sizes() {
            let got = self.registers[index].len();
            if got != size {
                return Err(ArithError::RegisterSizeMismatch {
                    operation: tag,
                    index,
                    expected: size,
                    got,
                });
            }
        }

        if matches!(tag, OperationTag::XorOffsetCarrySignals | OperationTag::ModularBimultiplication) {
            let (left, right) = (self.registers[0].len(), self.registers[1].len());
            if left != right {
                return Err(ArithError::UnequalRegisters {
                    operation: tag,
                    left,
                    right,
                });
            }
        }

        if carries_constant(tag) {
            for reg in &self.registers {
                if reg.len() > MAX_CONSTANT_WIDTH {
                    return Err(ArithError::RegisterTooWide {
                        operation: tag,
                        max: MAX_CONSTANT_WIDTH,
                        got: reg.len(),
                    });
                }
            }
        }

        self.check_parameter_range()?;
        self.check_distinct_qubits()
    }

    fn check_parameter_range(&self) -> ArithResult<()> {
        let tag = self.operation.tag();
        let width = |index: usize| self.registers[index].len();
        let fits = |modulus: u64, index: usize| -> ArithResult<()> {
            if modulus as u128 > span(width(index)) {
                return Err(ArithError::ModulusExceedsRegister {
                    modulus,
                    width: width(index),
                });
            }
            Ok(())
        };
        let below_span = |offset: u64, index: usize, inclusive: bool| -> ArithResult<()> {
            let limit = span(width(index));
            let ok = if inclusive {
                offset as u128 <= limit
            } else {
                (offset as u128) < limit
            };
            if !ok {
                return Err(ArithError::OffsetOutOfRange {
                    operation: tag,
                    offset,
                    width: width(index),
                });
            }
            Ok(())
        };

        match &self.operation {
            Operation::ModularOffset { modulus, .. }
            | Operation::ModularNegate(modulus) => fits(modulus.get(), 0),
            Operation::ModularDouble(m) | Operation::ModularUndouble(m) => fits(m.get(), 0),
            Operation::ModularAddition(m) | Operation::ModularSubtraction(m) => fits(m.get(), 1),
            Operation::ModularScaledAddition { modulus, .. } => fits(modulus.get(), 1),
            Operation::ModularBimultiplication(b) => {
                fits(b.modulus(), 0)?;
                fits(b.modulus(), 1)
            }
            Operation::PredictOffsetOverflow(k) | Operation::XorOffsetCarrySignals(k) => {
                below_span(*k, 0, false)
            }
            Operation::ConstPivotFlip(p) => below_span(*p, 0, true),
            _ => Ok(()),
        }
    }

    fn check_distinct_qubits(&self) -> ArithResult<()> {
        let mut seen: Vec<QubitId> = self.qubits().collect();
        seen.sort_unstable();
        for pair in seen.windows(2) {
            if pair[0] == pair[1] {
                return Err(ArithError::DuplicateQubit {
                    qubit: pair[0],
                    operation: self.operation.tag(),
                });
            }
        }
        Ok(())
    }
}

fn carries_constant(tag: OperationTag) -> bool {
    matches!(
        tag,
        OperationTag::Offset
            | OperationTag::PredictOffsetOverflow
            | OperationTag::XorOffsetCarrySignals
            | OperationTag::LessThanConstant
            | OperationTag::ConstPivotFlip
            | OperationTag::Scale
            | OperationTag::ScaledAddition
            | OperationTag::ModularOffset
            | OperationTag::ModularAddition
            | OperationTag::ModularSubtraction
            | OperationTag::ModularDouble
            | OperationTag::ModularUndouble
            | OperationTag::ModularNegate
            | OperationTag::ModularScaledAddition
            | OperationTag::ModularBimultiplication
    )
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        if !self.controls.is_empty() {
            write!(f, " ctrl{}", Register::from(self.controls.as_slice()))?;
        }
        for reg in &self.registers {
            write!(f, " {reg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(start: u32, len: u32) -> Register {
        Register::contiguous(start, len)
    }

    #[test]
    fn test_register_count_checked() {
        let err = Command::new(Operation::Add, vec![reg(0, 2)]).unwrap_err();
        assert!(matches!(
            err,
            ArithError::RegisterCountMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_fixed_sizes_checked() {
        let err = Command::new(Operation::PredictOffsetOverflow(1), vec![reg(0, 3), reg(3, 2)])
            .unwrap_err();
        assert!(matches!(err, ArithError::RegisterSizeMismatch { index: 1, .. }));
        let err = Command::new(
            Operation::modular_bimultiplication(2, 7).unwrap(),
            vec![reg(0, 3), reg(3, 4)],
        )
        .unwrap_err();
        assert!(matches!(err, ArithError::UnequalRegisters { left: 3, right: 4, .. }));
    }

    #[test]
    fn test_duplicate_qubits_rejected() {
        let err = Command::add(reg(0, 3), reg(2, 3)).unwrap_err();
        assert!(matches!(err, ArithError::DuplicateQubit { qubit: QubitId(2), .. }));

        let cmd = Command::single(Operation::Increment, reg(0, 3)).unwrap();
        assert!(cmd.clone().with_controls([QubitId(1)]).is_err());
        let cmd = cmd.with_controls([QubitId(9), QubitId(5), QubitId(9)]).unwrap();
        assert_eq!(cmd.controls(), &[QubitId(5), QubitId(9)]);
    }

    #[test]
    fn test_parameter_ranges() {
        let op = Operation::modular_offset(1, 13).unwrap();
        assert!(Command::single(op.clone(), reg(0, 4)).is_ok());
        assert!(matches!(
            Command::single(op, reg(0, 3)),
            Err(ArithError::ModulusExceedsRegister { modulus: 13, width: 3 })
        ));
        assert!(Command::new(Operation::PredictOffsetOverflow(7), vec![reg(0, 3), reg(3, 1)]).is_ok());
        assert!(Command::new(Operation::PredictOffsetOverflow(8), vec![reg(0, 3), reg(3, 1)]).is_err());
        assert!(Command::single(Operation::ConstPivotFlip(8), reg(0, 3)).is_ok());
        assert!(Command::single(Operation::ConstPivotFlip(9), reg(0, 3)).is_err());
        assert!(matches!(
            Command::single(Operation::Offset(1), reg(0, 65)),
            Err(ArithError::RegisterTooWide { got: 65, .. })
        ));
        assert!(Command::single(Operation::MultiNot, reg(0, 65)).is_ok());
    }

    #[test]
    fn test_inverse_and_remap() {
        let cmd = Command::add(reg(0, 2), reg(2, 2))
            .unwrap()
            .with_controls([QubitId(7)])
            .unwrap()
            .with_tag("mul");
        let inv = cmd.inverse();
        assert_eq!(inv.operation(), &Operation::Subtract);
        assert_eq!(inv.controls(), cmd.controls());
        assert_eq!(inv.tags(), &["mul".to_string()]);

        let moved = cmd.remap(|q| QubitId(q.0 + 10));
        assert_eq!(moved.register(0), Some(&reg(10, 2)));
        assert_eq!(moved.controls(), &[QubitId(17)]);
        assert_eq!(moved.target_qubit_count(), 4);
        assert_eq!(format!("{}", Command::x(QubitId(1))), "X [q1]");
    }
}
