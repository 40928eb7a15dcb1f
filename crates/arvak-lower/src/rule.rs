//! Decomposition rules and the emitter their decomposers write into.

use std::fmt;
use std::sync::Arc;

use arvak_arith::{Command, Operation, OperationTag, QubitId, Register};

use crate::error::{LowerError, LowerResult};
use crate::predicate::Predicate;

/// What a rule sees: the command being decomposed and its workspace.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    command: &'a Command,
    workspace: &'a [QubitId],
}

impl<'a> RuleInput<'a> {
    /// Bundle a command with the qubits it may borrow.
    pub fn new(command: &'a Command, workspace: &'a [QubitId]) -> Self {
        Self { command, workspace }
    }

    /// The command being decomposed.
    pub fn command(&self) -> &'a Command {
        self.command
    }

    /// The operation being decomposed.
    pub fn operation(&self) -> &'a Operation {
        self.command.operation()
    }

    /// The command's controls.
    pub fn controls(&self) -> &'a [QubitId] {
        self.command.controls()
    }

    /// Target register `index`.
    ///
    /// Commands are validated on construction, so every index below the
    /// operation's arity exists.
    pub fn register(&self, index: usize) -> &'a Register {
        &self.command.registers()[index]
    }

    /// Borrowable workspace qubits, sorted by id.
    pub fn workspace(&self) -> &'a [QubitId] {
        self.workspace
    }

    /// The first `n` workspace qubits as a register.
    pub fn dirty(&self, n: usize) -> LowerResult<Register> {
        if self.workspace.len() < n {
            return Err(LowerError::InsufficientWorkspace {
                needed: n,
                available: self.workspace.len(),
            });
        }
        Ok(Register::from(&self.workspace[..n]))
    }

    /// The first workspace qubit.
    pub fn dirty_qubit(&self) -> LowerResult<QubitId> {
        self.workspace
            .first()
            .copied()
            .ok_or(LowerError::InsufficientWorkspace {
                needed: 1,
                available: 0,
            })
    }
}

/// Collects the commands a decomposer produces.
///
/// Commands without target qubits are dropped, so decomposers can slice
/// registers freely without guarding every empty case.
#[derive(Debug, Default)]
pub struct Emitter {
    commands: Vec<Command>,
}

impl Emitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already built command.
    pub fn emit(&mut self, command: Command) {
        if command.target_qubit_count() > 0 {
            self.commands.push(command);
        }
    }

    /// Append `operation` on `registers`, controlled by `controls`.
    pub fn op(
        &mut self,
        operation: Operation,
        registers: Vec<Register>,
        controls: &[QubitId],
    ) -> LowerResult<()> {
        let cmd = Command::new(operation, registers)?.with_controls(controls.iter().copied())?;
        self.emit(cmd);
        Ok(())
    }

    /// Append a single-register `operation` on `target`.
    pub fn on(
        &mut self,
        operation: Operation,
        target: &Register,
        controls: &[QubitId],
    ) -> LowerResult<()> {
        self.op(operation, vec![target.clone()], controls)
    }

    /// Append a toggle of `target` controlled by `controls`.
    pub fn x(&mut self, controls: &[QubitId], target: QubitId) -> LowerResult<()> {
        let cmd = Command::x(target).with_controls(controls.iter().copied())?;
        self.emit(cmd);
        Ok(())
    }

    /// Number of commands collected.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check whether nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands collected so far.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Take the collected commands.
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

/// A decomposer writes an equivalent sequence for its input into the emitter.
pub type Decomposer = Arc<dyn Fn(&RuleInput<'_>, &mut Emitter) -> LowerResult<()> + Send + Sync>;

/// A named (predicate, decomposer) pair attached to an operation tag.
#[derive(Clone)]
pub struct DecompositionRule {
    name: &'static str,
    tag: OperationTag,
    predicate: Predicate,
    decomposer: Decomposer,
}

impl DecompositionRule {
    /// Create a rule for commands carrying `tag`.
    pub fn new<F>(name: &'static str, tag: OperationTag, predicate: Predicate, decomposer: F) -> Self
    where
        F: Fn(&RuleInput<'_>, &mut Emitter) -> LowerResult<()> + Send + Sync + 'static,
    {
        Self {
            name,
            tag,
            predicate,
            decomposer: Arc::new(decomposer),
        }
    }

    /// The rule's name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Tag of the operations the rule decomposes.
    pub fn tag(&self) -> OperationTag {
        self.tag
    }

    /// The rule's applicability condition.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Check whether the rule may decompose `input`.
    pub fn applies(&self, input: &RuleInput<'_>) -> bool {
        input.command().tag() == self.tag && self.predicate.evaluate(input)
    }

    /// Run the decomposer.
    pub fn decompose(&self, input: &RuleInput<'_>) -> LowerResult<Vec<Command>> {
        let mut emitter = Emitter::new();
        (self.decomposer)(input, &mut emitter)?;
        Ok(emitter.into_commands())
    }
}

impl fmt::Debug for DecompositionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecompositionRule")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("predicate", &self.predicate.to_string())
            .finish_non_exhaustive()
    }
}
