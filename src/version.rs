//! Versioned values and their vector clocks.
//!
//! The store keeps concurrent writes side by side instead of collapsing
//! them at write time. Every stored value carries a [`Version`]: one
//! counter per writing node plus a wall-clock timestamp. A read may
//! therefore surface several [`VersionedValue`]s for one key; picking a
//! winner is the resolver's job, not this module's.

use serde::Deserialize;
use serde::Serialize;

/// One node's counter inside a vector clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEntry {
    pub node_id: u16,
    pub version: u64,
}

/// Logical version of a stored value.
///
/// `entries` hold the per-node write counters; `timestamp` is the
/// server-assigned wall-clock time of the last write, which the default
/// conflict policy orders by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub entries: Vec<ClockEntry>,
    pub timestamp: u64,
}

impl Version {
    /// Version with no clock entries and the given timestamp.
    pub fn with_timestamp(timestamp: u64) -> Self {
        Self {
            entries: Vec::new(),
            timestamp,
        }
    }

    /// Counter recorded for `node_id`, 0 when the node never wrote.
    pub fn counter_for(&self, node_id: u16) -> u64 {
        self.entries
            .iter()
            .find(|entry| entry.node_id == node_id)
            .map(|entry| entry.version)
            .unwrap_or(0)
    }

    /// Advances `node_id`'s counter and refreshes the timestamp.
    ///
    /// Used for optimistic re-put flows: read, resolve, increment the
    /// clock for the node that will coordinate the write, put back.
    pub fn increment(
        &mut self,
        node_id: u16,
        timestamp: u64,
    ) {
        match self.entries.iter_mut().find(|entry| entry.node_id == node_id) {
            Some(entry) => entry.version += 1,
            None => self.entries.push(ClockEntry { node_id, version: 1 }),
        }
        self.timestamp = timestamp;
    }
}

/// A `(value, version)` pair as returned by a read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

impl VersionedValue {
    pub fn new(
        value: impl Into<Vec<u8>>,
        version: Version,
    ) -> Self {
        Self {
            value: value.into(),
            version,
        }
    }
}
