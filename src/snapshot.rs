//! Materialized per-cycle snapshots
//!
//! The loop never hands views its live channel collection; it builds an
//! immutable `Snapshot` once per cycle and every view gets a reference to
//! that same value. A snapshot therefore always reflects exactly one
//! completed cycle, never a mix of two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One channel's state as captured for a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Channel name (the backend symbol)
    pub name: String,

    /// Last successfully parsed value; `None` until the first success
    pub value: Option<f64>,

    /// When the value was last refreshed
    pub updated_at: Option<DateTime<Utc>>,

    /// Message of the most recent failed update, cleared on success
    pub error: Option<String>,
}

/// The complete set of channel samples for one polling cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Count of completed cycles, starting at 1 (0 = none completed yet)
    pub cycle: u64,

    /// When this snapshot was materialized
    pub taken_at: DateTime<Utc>,

    /// When the sampling loop was constructed
    pub started_at: DateTime<Utc>,

    /// Samples in channel (selection) order
    pub samples: Vec<Sample>,
}

impl Snapshot {
    /// Look up a sample by channel name
    pub fn sample(&self, name: &str) -> Option<&Sample> {
        self.samples.iter().find(|sample| sample.name == name)
    }

    /// Number of channels currently carrying a value
    pub fn value_count(&self) -> usize {
        self.samples.iter().filter(|s| s.value.is_some()).count()
    }

    /// Number of channels whose most recent update failed
    pub fn error_count(&self) -> usize {
        self.samples.iter().filter(|s| s.error.is_some()).count()
    }
}
