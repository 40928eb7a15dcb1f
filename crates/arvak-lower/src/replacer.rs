//! The recursive lowering engine.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use arvak_arith::{Command, QubitId};

use crate::canonical::{Canonical, CanonicalKey, canonicalize};
use crate::error::{LowerError, LowerResult};
use crate::host::Host;
use crate::optimizer::{LocalOptimizer, MergeRule};
use crate::repository::{Candidate, RuleSet};
use crate::workspace::workspace;

/// Picks one of the applicable candidates for a command.
///
/// The returned index must be below the candidate count.
pub type Chooser = Arc<dyn Fn(&Command, &[Candidate<'_>]) -> usize + Send + Sync>;

/// Engine switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringOptions {
    /// Run the local optimizer over each decomposition before recursing.
    pub local_optimization: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            local_optimization: true,
        }
    }
}

/// Counters accumulated across lowerings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoweringStats {
    /// Decomposers run.
    pub decompositions: usize,
    /// Shapes served from the cache.
    pub cache_hits: usize,
    /// Commands accepted by the host unchanged.
    pub primitives: usize,
}

#[derive(Debug, Clone)]
enum CacheEntry {
    InProgress,
    Resolved(Arc<Vec<Command>>),
}

/// Lowers arithmetic commands to the host's primitive gates.
///
/// Each non-primitive command is relabeled onto synthetic qubits, looked up
/// in the shape cache, and otherwise decomposed by the first applicable
/// rule (or the one the chooser picks). Sub-commands are lowered the same
/// way. Resolved shapes are cached for the engine's lifetime.
pub struct AutoReplacer<H: Host> {
    host: H,
    rules: RuleSet,
    chooser: Option<Chooser>,
    optimizer: LocalOptimizer,
    options: LoweringOptions,
    cache: FxHashMap<CanonicalKey, CacheEntry>,
    stats: LoweringStats,
}

impl<H: Host> AutoReplacer<H> {
    /// Engine with the standard rule library.
    pub fn new(host: H) -> Self {
        AutoReplacerBuilder::new().build(host)
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to allocate qubits.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The rule repository.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The engine switches.
    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    /// Counters since construction or the last [`reset`](Self::reset).
    pub fn stats(&self) -> LoweringStats {
        self.stats
    }

    /// Number of cached shapes.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop the cache and zero the counters.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.stats = LoweringStats::default();
    }

    /// Lower `command` against the host's live qubits.
    pub fn lower(&mut self, command: &Command) -> LowerResult<Vec<Command>> {
        let live = self.host.live_qubits();
        self.lower_within(command, &live)
    }

    /// Lower a sequence of commands, concatenating the results.
    pub fn lower_all(&mut self, commands: &[Command]) -> LowerResult<Vec<Command>> {
        let live = self.host.live_qubits();
        let mut out = Vec::new();
        for cmd in commands {
            out.extend(self.lower_within(cmd, &live)?);
        }
        Ok(out)
    }

    /// Lower `command`, borrowing workspace from `live_qubits`.
    #[instrument(skip(self, command, live_qubits), fields(op = %command.operation()))]
    pub fn lower_within(
        &mut self,
        command: &Command,
        live_qubits: &[QubitId],
    ) -> LowerResult<Vec<Command>> {
        info!("Lowering {}", command);
        match self.lower_recursive(command, live_qubits) {
            Ok(out) => {
                info!(
                    gates = out.len(),
                    decompositions = self.stats.decompositions,
                    cache_hits = self.stats.cache_hits,
                    "Lowering complete"
                );
                Ok(out)
            }
            Err(err) => {
                self.cache
                    .retain(|_, entry| !matches!(entry, CacheEntry::InProgress));
                warn!("Lowering failed: {}", err);
                Err(err)
            }
        }
    }

    fn lower_recursive(
        &mut self,
        command: &Command,
        live_qubits: &[QubitId],
    ) -> LowerResult<Vec<Command>> {
        if self.host.is_primitive(command) {
            self.stats.primitives += 1;
            trace!("Primitive {}", command);
            return Ok(vec![command.clone()]);
        }

        let canon = canonicalize(command, live_qubits);
        let resolved = match self.cache.get(canon.key()) {
            Some(CacheEntry::InProgress) => {
                return Err(LowerError::CyclicDecomposition {
                    tag: command.tag(),
                    command: command.to_string(),
                });
            }
            Some(CacheEntry::Resolved(cmds)) => {
                let cmds = Arc::clone(cmds);
                self.stats.cache_hits += 1;
                debug!(gates = cmds.len(), "Cache hit for {}", canon.command());
                cmds
            }
            None => {
                let cmds = Arc::new(self.resolve(&canon)?);
                self.cache
                    .insert(canon.key().clone(), CacheEntry::Resolved(Arc::clone(&cmds)));
                cmds
            }
        };
        Ok(canon.restore(&resolved, command.tags()))
    }

    fn resolve(&mut self, canon: &Canonical) -> LowerResult<Vec<Command>> {
        self.cache
            .insert(canon.key().clone(), CacheEntry::InProgress);
        let synthetic = canon.synthetic_live();
        let command = canon.command();
        let ws = workspace(command, &synthetic);

        let raw = {
            let candidates = self.rules.candidates(command, &ws);
            if candidates.is_empty() {
                return Err(LowerError::NoApplicableDecomposition {
                    tag: command.tag(),
                    command: command.to_string(),
                    workspace: ws.len(),
                });
            }
            let index = self
                .chooser
                .as_ref()
                .map_or(0, |choose| choose(command, &candidates));
            let chosen = candidates
                .get(index)
                .ok_or(LowerError::ChooserOutOfRange {
                    index,
                    len: candidates.len(),
                })?;
            debug!(
                rule = chosen.rule().name(),
                inverted = chosen.is_inverted(),
                workspace = ws.len(),
                "Decomposing {}",
                command
            );
            chosen.decompose(command, &ws)?
        };
        self.stats.decompositions += 1;

        let raw = if self.options.local_optimization {
            self.optimizer.run(raw)
        } else {
            raw
        };

        let mut flat = Vec::new();
        for sub in &raw {
            flat.extend(self.lower_recursive(sub, &synthetic)?);
        }
        Ok(flat)
    }
}

impl<H: Host + fmt::Debug> fmt::Debug for AutoReplacer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoReplacer")
            .field("host", &self.host)
            .field("rules", &self.rules.len())
            .field("optimizer", &self.optimizer)
            .field("options", &self.options)
            .field("cache_len", &self.cache.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AutoReplacer`].
#[derive(Default)]
pub struct AutoReplacerBuilder {
    rules: Option<RuleSet>,
    chooser: Option<Chooser>,
    optimizer: LocalOptimizer,
    options: LoweringOptions,
}

impl AutoReplacerBuilder {
    /// Builder with the standard rules and default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `rules` instead of the standard library.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Pick candidates with `chooser` instead of taking the first.
    #[must_use]
    pub fn with_chooser<F>(mut self, chooser: F) -> Self
    where
        F: Fn(&Command, &[Candidate<'_>]) -> usize + Send + Sync + 'static,
    {
        self.chooser = Some(Arc::new(chooser));
        self
    }

    /// Add a merge rule to the local optimizer.
    #[must_use]
    pub fn with_merge_rule(mut self, rule: impl MergeRule + 'static) -> Self {
        self.optimizer.add_rule(rule);
        self
    }

    /// Replace the engine switches.
    #[must_use]
    pub fn with_options(mut self, options: LoweringOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the engine around `host`.
    pub fn build<H: Host>(self, host: H) -> AutoReplacer<H> {
        AutoReplacer {
            host,
            rules: self.rules.unwrap_or_else(RuleSet::standard),
            chooser: self.chooser,
            optimizer: self.optimizer,
            options: self.options,
            cache: FxHashMap::default(),
            stats: LoweringStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LimitedCapability, StaticHost};
    use crate::predicate::Predicate;
    use crate::rule::DecompositionRule;
    use arvak_arith::{Operation, OperationTag, Register};

    fn negate_via_not_and_increment() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.register(DecompositionRule::new(
            "negate",
            OperationTag::Negate,
            Predicate::always(),
            |input, e| {
                let t = input.register(0);
                e.on(Operation::MultiNot, t, input.controls())?;
                e.on(Operation::Increment, t, input.controls())
            },
        ));
        rules.register(DecompositionRule::new(
            "multi_not",
            OperationTag::MultiNot,
            Predicate::always(),
            |input, e| {
                for &q in input.register(0).iter() {
                    e.x(input.controls(), q)?;
                }
                Ok(())
            },
        ));
        rules
    }

    fn increment_host() -> StaticHost {
        StaticHost::new(LimitedCapability::toffoli().allowing(OperationTag::Increment))
    }

    #[test]
    fn test_primitive_passes_through() {
        let mut engine = AutoReplacer::new(StaticHost::new(LimitedCapability::toffoli()));
        let cmd = Command::x(QubitId(0)).with_tag("keep");
        assert_eq!(engine.lower(&cmd).unwrap(), vec![cmd]);
        assert_eq!(engine.stats().primitives, 1);
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_decomposes_recursively_with_tags() {
        let mut engine = AutoReplacerBuilder::new()
            .with_rules(negate_via_not_and_increment())
            .build(increment_host());
        let cmd = Command::single(Operation::Negate, Register::contiguous(0, 2))
            .unwrap()
            .with_tag("neg");
        let out = engine.lower(&cmd).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| c.tags() == ["neg".to_string()]));
        assert_eq!(out[2].operation(), &Operation::Increment);
        assert_eq!(engine.stats().decompositions, 2);
    }

    #[test]
    fn test_cache_reuses_shape() {
        let mut engine = AutoReplacerBuilder::new()
            .with_rules(negate_via_not_and_increment())
            .build(increment_host());
        let a = Command::single(Operation::Negate, Register::contiguous(0, 3)).unwrap();
        let b = Command::single(Operation::Negate, Register::contiguous(10, 3)).unwrap();
        let out_a = engine.lower(&a).unwrap();
        let decompositions = engine.stats().decompositions;
        let out_b = engine.lower(&b).unwrap();
        assert_eq!(engine.stats().decompositions, decompositions);
        assert_eq!(engine.stats().cache_hits, 1);
        let shifted: Vec<Command> = out_a.iter().map(|c| c.remap(|q| QubitId(q.0 + 10))).collect();
        assert_eq!(shifted, out_b);

        engine.reset();
        assert_eq!(engine.cache_len(), 0);
        assert_eq!(engine.stats(), LoweringStats::default());
    }

    #[test]
    fn test_missing_rule_reports_shape() {
        let mut engine = AutoReplacerBuilder::new()
            .with_rules(RuleSet::new())
            .build(StaticHost::new(LimitedCapability::toffoli()));
        let cmd = Command::single(Operation::Increment, Register::contiguous(0, 3)).unwrap();
        let err = engine.lower(&cmd).unwrap_err();
        assert!(matches!(
            err,
            LowerError::NoApplicableDecomposition {
                tag: OperationTag::Increment,
                workspace: 0,
                ..
            }
        ));
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut rules = RuleSet::new();
        rules.register(DecompositionRule::new(
            "loop",
            OperationTag::Increment,
            Predicate::always(),
            |input, e| {
                e.emit(input.command().clone());
                Ok(())
            },
        ));
        let mut engine = AutoReplacerBuilder::new()
            .with_rules(rules)
            .build(StaticHost::new(LimitedCapability::toffoli()));
        let cmd = Command::single(Operation::Increment, Register::contiguous(0, 3)).unwrap();
        assert!(matches!(
            engine.lower(&cmd),
            Err(LowerError::CyclicDecomposition { .. })
        ));
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_chooser_out_of_range() {
        let mut engine = AutoReplacerBuilder::new()
            .with_rules(negate_via_not_and_increment())
            .with_chooser(|_, candidates| candidates.len())
            .build(increment_host());
        let cmd = Command::single(Operation::Negate, Register::contiguous(0, 2)).unwrap();
        // Negate is its own inverse, so the rule is offered forward and inverted.
        assert!(matches!(
            engine.lower(&cmd),
            Err(LowerError::ChooserOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_options_from_json() {
        let options: LoweringOptions = serde_json::from_str("{}").unwrap();
        assert!(options.local_optimization);
        let options: LoweringOptions =
            serde_json::from_str(r#"{"local_optimization": false}"#).unwrap();
        assert!(!options.local_optimization);
    }
}
