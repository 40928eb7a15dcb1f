//! The host interface and the standard capability filter.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use arvak_arith::{Command, Operation, OperationTag, QubitId, Register};

use crate::error::LowerResult;

/// What the lowering engine needs from its surrounding execution engine.
pub trait Host {
    /// Check whether the target instruction set runs `command` directly.
    fn is_primitive(&self, command: &Command) -> bool;

    /// Qubits currently allocated in the surrounding computation.
    fn live_qubits(&self) -> Vec<QubitId>;
}

/// A custom accept or reject check.
pub type CommandFilter = Arc<dyn Fn(&Command) -> bool + Send + Sync>;

/// Configurable primitive-gate filter.
///
/// A command is available when no ban criterion matches and at least one
/// allow criterion does. The flag and tag fields deserialize from JSON;
/// custom filters are attached in code.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitedCapability {
    /// Accept everything not banned.
    pub allow_all: bool,
    /// Accept arithmetic operations and toggles with any number of controls.
    pub allow_arithmetic: bool,
    /// Accept toggles with at most two controls.
    pub allow_toffoli: bool,
    /// Accept toggles with any number of controls.
    pub allow_nots_with_many_controls: bool,
    /// Accept uncontrolled single-qubit operations.
    pub allow_single_qubit_gates: bool,
    /// Accept single-qubit operations with any number of controls.
    pub allow_single_qubit_gates_with_controls: bool,
    /// Accept operations with one of these tags.
    pub allow_operations: Vec<OperationTag>,
    /// Reject operations with one of these tags.
    pub ban_operations: Vec<OperationTag>,
    /// Extra accept check.
    #[serde(skip)]
    pub allow_custom: Option<CommandFilter>,
    /// Extra reject check.
    #[serde(skip)]
    pub ban_custom: Option<CommandFilter>,
}

impl LimitedCapability {
    /// Accept everything.
    pub fn all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    /// Accept toggle gates with at most two controls.
    pub fn toffoli() -> Self {
        Self {
            allow_toffoli: true,
            ..Self::default()
        }
    }

    /// Parse the flag and tag fields from JSON.
    pub fn from_json(json: &str) -> LowerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Also accept operations tagged `tag`.
    #[must_use]
    pub fn allowing(mut self, tag: OperationTag) -> Self {
        self.allow_operations.push(tag);
        self
    }

    /// Reject operations tagged `tag`.
    #[must_use]
    pub fn banning(mut self, tag: OperationTag) -> Self {
        self.ban_operations.push(tag);
        self
    }

    /// Also accept commands matching `filter`.
    #[must_use]
    pub fn with_allow_custom<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Command) -> bool + Send + Sync + 'static,
    {
        self.allow_custom = Some(Arc::new(filter));
        self
    }

    /// Reject commands matching `filter`.
    #[must_use]
    pub fn with_ban_custom<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Command) -> bool + Send + Sync + 'static,
    {
        self.ban_custom = Some(Arc::new(filter));
        self
    }

    /// Check whether `command` may be executed directly.
    pub fn is_available(&self, command: &Command) -> bool {
        let tag = command.tag();
        if self.ban_operations.contains(&tag) {
            return false;
        }
        if self.ban_custom.as_ref().is_some_and(|ban| ban(command)) {
            return false;
        }

        let is_x = matches!(command.operation(), Operation::X);
        let single_target = command.target_qubit_count() == 1;
        self.allow_all
            || (self.allow_arithmetic && (tag.is_arithmetic() || is_x))
            || (self.allow_toffoli && is_x && command.controls().len() <= 2)
            || (self.allow_nots_with_many_controls && is_x)
            || (self.allow_single_qubit_gates && single_target && command.controls().is_empty())
            || (self.allow_single_qubit_gates_with_controls && single_target)
            || self.allow_operations.contains(&tag)
            || self.allow_custom.as_ref().is_some_and(|allow| allow(command))
    }
}

impl fmt::Debug for LimitedCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitedCapability")
            .field("allow_all", &self.allow_all)
            .field("allow_arithmetic", &self.allow_arithmetic)
            .field("allow_toffoli", &self.allow_toffoli)
            .field(
                "allow_nots_with_many_controls",
                &self.allow_nots_with_many_controls,
            )
            .field("allow_single_qubit_gates", &self.allow_single_qubit_gates)
            .field(
                "allow_single_qubit_gates_with_controls",
                &self.allow_single_qubit_gates_with_controls,
            )
            .field("allow_operations", &self.allow_operations)
            .field("ban_operations", &self.ban_operations)
            .field("allow_custom", &self.allow_custom.is_some())
            .field("ban_custom", &self.ban_custom.is_some())
            .finish()
    }
}

/// A host with a fixed capability and a simple qubit pool.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    capability: LimitedCapability,
    live: Vec<QubitId>,
    next: u32,
}

impl StaticHost {
    /// Create a host with no qubits.
    pub fn new(capability: LimitedCapability) -> Self {
        Self {
            capability,
            live: Vec::new(),
            next: 0,
        }
    }

    /// Allocate `n` fresh qubits.
    pub fn allocate(&mut self, n: usize) -> Register {
        let reg = Register::contiguous(self.next, n as u32);
        self.next += n as u32;
        self.live.extend(reg.iter().copied());
        reg
    }

    /// Return qubits to the pool; their ids are not reused.
    pub fn release(&mut self, register: &Register) {
        self.live.retain(|q| !register.contains(*q));
    }

    /// The capability filter.
    pub fn capability(&self) -> &LimitedCapability {
        &self.capability
    }

    /// Replace the capability filter.
    pub fn set_capability(&mut self, capability: LimitedCapability) {
        self.capability = capability;
    }
}

impl Host for StaticHost {
    fn is_primitive(&self, command: &Command) -> bool {
        self.capability.is_available(command)
    }

    fn live_qubits(&self) -> Vec<QubitId> {
        self.live.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(controls: u32) -> Command {
        Command::x(QubitId(0))
            .with_controls((1..=controls).map(QubitId))
            .unwrap()
    }

    #[test]
    fn test_toffoli_limits_controls() {
        let cap = LimitedCapability::toffoli();
        assert!(cap.is_available(&toggle(0)));
        assert!(cap.is_available(&toggle(2)));
        assert!(!cap.is_available(&toggle(3)));
        let inc = Command::single(Operation::Increment, Register::contiguous(0, 2)).unwrap();
        assert!(!cap.is_available(&inc));
    }

    #[test]
    fn test_ban_overrides_allow() {
        let cap = LimitedCapability::all().banning(OperationTag::Increment);
        let inc = Command::single(Operation::Increment, Register::contiguous(0, 2)).unwrap();
        assert!(!cap.is_available(&inc));
        assert!(cap.is_available(&toggle(5)));

        let cap = LimitedCapability::all().with_ban_custom(|c| c.controls().len() > 3);
        assert!(!cap.is_available(&toggle(4)));
    }

    #[test]
    fn test_single_qubit_flags() {
        let z = Command::single(Operation::ZPow(arvak_arith::Dyadic::new(1, 2)), QubitId(0))
            .unwrap()
            .with_controls([QubitId(1)])
            .unwrap();
        let plain = LimitedCapability {
            allow_single_qubit_gates: true,
            ..Default::default()
        };
        assert!(!plain.is_available(&z));
        let with_controls = LimitedCapability {
            allow_single_qubit_gates_with_controls: true,
            ..Default::default()
        };
        assert!(with_controls.is_available(&z));
    }

    #[test]
    fn test_allowed_tags_and_custom() {
        let cap = LimitedCapability::toffoli().allowing(OperationTag::Swap);
        assert!(cap.is_available(&Command::swap(QubitId(0), QubitId(1)).unwrap()));
        let cap = LimitedCapability::default().with_allow_custom(|c| c.tags().is_empty());
        assert!(cap.is_available(&toggle(7)));
        assert!(!LimitedCapability::default().is_available(&toggle(0)));
    }

    #[test]
    fn test_capability_from_json() {
        let cap = LimitedCapability::from_json(
            r#"{"allow_toffoli": true, "ban_operations": ["Swap"], "allow_operations": ["Swap", "Increment"]}"#,
        )
        .unwrap();
        assert!(cap.allow_toffoli);
        assert!(!cap.is_available(&Command::swap(QubitId(0), QubitId(1)).unwrap()));
        let inc = Command::single(Operation::Increment, Register::contiguous(0, 2)).unwrap();
        assert!(cap.is_available(&inc));
        assert!(LimitedCapability::from_json("{\"allow_toffoli\": 3}").is_err());
    }

    #[test]
    fn test_static_host_pool() {
        let mut host = StaticHost::new(LimitedCapability::toffoli());
        let a = host.allocate(3);
        let b = host.allocate(2);
        assert_eq!(b[0], QubitId(3));
        assert_eq!(host.live_qubits().len(), 5);
        host.release(&a);
        assert_eq!(host.live_qubits(), vec![QubitId(3), QubitId(4)]);
        assert!(host.is_primitive(&toggle(1)));
    }
}
