//! Node -> severity index built from the host log buffer.
//!
//! The index is never updated incrementally. A log arrival only marks it
//! dirty; the next idle tick re-scans the whole snapshot, so after a rebuild
//! the mapping matches the log exactly and nothing stale survives.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::event_bus::{EventBus, LogMessageEvent};
use super::host::{LogSource, NodeId};

/// Raw host mode bit for an error entry.
pub const MODE_ERROR: u32 = 256;
/// Raw host mode bit for a warning entry.
pub const MODE_WARNING: u32 = 512;
/// Raw host mode bit for an info entry.
pub const MODE_INFO: u32 = 1024;

/// Severity of a single log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    fn bit(self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Error => 4,
        }
    }

    /// Host mode bit for this severity.
    pub fn mode_bit(self) -> u32 {
        match self {
            Severity::Info => MODE_INFO,
            Severity::Warning => MODE_WARNING,
            Severity::Error => MODE_ERROR,
        }
    }
}

/// Set of severities attached to one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeveritySet(u8);

impl SeveritySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn of(severities: &[Severity]) -> Self {
        severities.iter().fold(Self::empty(), |set, s| set.with(*s))
    }

    /// Decode host mode bits; unknown bits are ignored.
    pub fn from_mode_bits(mode: u32) -> Self {
        Severity::ALL
            .into_iter()
            .filter(|s| mode & s.mode_bit() != 0)
            .fold(Self::empty(), |set, s| set.with(s))
    }

    pub fn with(mut self, severity: Severity) -> Self {
        self.insert(severity);
        self
    }

    pub fn insert(&mut self, severity: Severity) {
        self.0 |= severity.bit();
    }

    pub fn contains(&self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Members in badge order: info, warning, error.
    pub fn iter(&self) -> impl Iterator<Item = Severity> + '_ {
        Severity::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

/// Fire-and-forget "log changed" flag. Cheap to clone and safe to set from
/// any thread.
#[derive(Debug, Clone, Default)]
pub struct LogSignal {
    dirty: Arc<AtomicBool>,
}

impl LogSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal wired to `LogMessageEvent` on `bus`.
    pub fn subscribed(bus: &EventBus) -> Self {
        let signal = Self::new();
        let flag = Arc::clone(&signal.dirty);
        bus.subscribe::<LogMessageEvent, _>(move |_| flag.store(true, Ordering::Release));
        signal
    }

    pub fn notify(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

/// Aggregated severities per node.
#[derive(Debug, Default)]
pub struct LogCorrelationIndex {
    entries: HashMap<NodeId, SeveritySet>,
    signal: LogSignal,
    /// A fetch failure was already reported.
    failure_reported: bool,
}

impl LogCorrelationIndex {
    pub fn new(signal: LogSignal) -> Self {
        Self {
            entries: HashMap::new(),
            signal,
            failure_reported: false,
        }
    }

    pub fn signal(&self) -> &LogSignal {
        &self.signal
    }

    pub fn severity(&self, node: NodeId) -> SeveritySet {
        self.entries.get(&node).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> &HashMap<NodeId, SeveritySet> {
        &self.entries
    }

    /// Idle-tick hook: rebuild when dirty and allowed. Returns true when a
    /// rebuild ran. The dirty flag survives while rebuilding is not allowed.
    pub fn tick<S: LogSource + ?Sized>(&mut self, source: &mut S, allowed: bool, report_failures: bool) -> bool {
        if !allowed || !self.signal.is_dirty() {
            return false;
        }
        self.signal.take();
        self.rebuild(source, report_failures)
    }

    /// Clear and re-scan the full log snapshot. On fetch failure the index
    /// keeps its previous state. Returns true on success.
    pub fn rebuild<S: LogSource + ?Sized>(&mut self, source: &mut S, report_failures: bool) -> bool {
        let entries = match source.snapshot() {
            Ok(entries) => entries,
            Err(e) => {
                if report_failures && !self.failure_reported {
                    warn!(
                        "Could not read log entries ({}); consider disabling warning badges if this persists",
                        e
                    );
                    self.failure_reported = true;
                }
                return false;
            }
        };

        let mut index: HashMap<NodeId, SeveritySet> = HashMap::new();
        let mut dropped = 0usize;
        for entry in &entries {
            let Some(node) = entry.context.and_then(|obj| source.owning_node(obj)) else {
                dropped += 1;
                continue;
            };
            let flags = SeveritySet::from_mode_bits(entry.mode);
            let slot = index.entry(node).or_default();
            *slot = slot.union(flags);
        }

        debug!(
            "Log index rebuilt: {} entries, {} nodes, {} unattributed",
            entries.len(),
            index.len(),
            dropped
        );
        self.entries = index;
        true
    }
}
