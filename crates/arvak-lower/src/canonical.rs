//! Qubit-independent command shapes.

use rustc_hash::FxHashMap;

use arvak_arith::{Command, Operation, QubitId};

/// Cache key: the operation, the relabeled layout and the workspace size.
///
/// Two commands share a key exactly when they differ only by an injective
/// renaming of their qubits and see the same number of workspace qubits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    operation: Operation,
    layout: Vec<Vec<u32>>,
    controls: Vec<u32>,
    available: usize,
}

impl CanonicalKey {
    /// The operation with its parameters.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Number of workspace qubits the shape was decomposed with.
    pub fn available(&self) -> usize {
        self.available
    }
}

/// A command relabeled onto synthetic qubits `0..used + available`.
#[derive(Debug, Clone)]
pub struct Canonical {
    command: Command,
    key: CanonicalKey,
    used: usize,
    available: usize,
    restore: Vec<QubitId>,
}

/// Relabel `command` and the rest of `live_qubits` onto synthetic ids.
///
/// Register qubits come first in register order, then controls, then the
/// remaining live qubits sorted by id.
pub fn canonicalize(command: &Command, live_qubits: &[QubitId]) -> Canonical {
    let mut forward: FxHashMap<QubitId, QubitId> = FxHashMap::default();
    let mut restore: Vec<QubitId> = Vec::new();
    for q in command.qubits() {
        forward.entry(q).or_insert_with(|| {
            restore.push(q);
            QubitId((restore.len() - 1) as u32)
        });
    }
    let used = restore.len();

    let mut rest: Vec<QubitId> = live_qubits
        .iter()
        .copied()
        .filter(|q| !forward.contains_key(q))
        .collect();
    rest.sort_unstable();
    rest.dedup();
    let available = rest.len();
    restore.extend(rest);

    let relabeled = command.remap(|q| forward.get(&q).copied().unwrap_or(q));
    let key = CanonicalKey {
        operation: relabeled.operation().clone(),
        layout: relabeled
            .registers()
            .iter()
            .map(|reg| reg.iter().map(|q| q.0).collect())
            .collect(),
        controls: relabeled.controls().iter().map(|q| q.0).collect(),
        available,
    };

    Canonical {
        command: relabeled,
        key,
        used,
        available,
        restore,
    }
}

impl Canonical {
    /// The relabeled command.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The cache key.
    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    /// Number of qubits the command touches.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of live qubits available as workspace.
    pub fn available(&self) -> usize {
        self.available
    }

    /// The synthetic live set `0..used + available`.
    pub fn synthetic_live(&self) -> Vec<QubitId> {
        (0..(self.used + self.available) as u32).map(QubitId).collect()
    }

    /// Map synthetic commands back onto the real qubits.
    ///
    /// Each restored command carries `tags` ahead of its own tags.
    pub fn restore(&self, commands: &[Command], tags: &[String]) -> Vec<Command> {
        commands
            .iter()
            .map(|cmd| {
                cmd.remap(|q| self.restore.get(q.0 as usize).copied().unwrap_or(q))
                    .with_leading_tags(tags.iter().cloned())
            })
            .collect()
    }
}
