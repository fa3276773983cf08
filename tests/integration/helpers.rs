//! Helper backends and views for integration tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use metric_sampler::actors::sampler::SamplerHandle;
use metric_sampler::backend::{BackendResult, MetricBackend};
use metric_sampler::snapshot::Snapshot;
use metric_sampler::views::View;

/// Interval long enough that no timer tick lands during a test
pub const LONG_INTERVAL: Duration = Duration::from_secs(3600);

/// Backend with a fixed discovery list and per-symbol scripted outcomes
///
/// Each `query_value` call pops the front of that symbol's script; once
/// the script is exhausted the fallback value is served. The shared state
/// sits behind a std Mutex, which is fine here: nothing awaits while the
/// lock is held.
pub struct ScriptedBackend {
    names: Vec<String>,
    scripts: Mutex<HashMap<String, VecDeque<BackendResult<f64>>>>,
    fallback: f64,
}

impl ScriptedBackend {
    pub fn new(names: &[&str], fallback: f64) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            scripts: Mutex::new(HashMap::new()),
            fallback,
        }
    }

    /// Queue outcomes for one symbol, served in order before the fallback
    pub fn script(self, symbol: &str, outcomes: Vec<BackendResult<f64>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), outcomes.into());
        self
    }
}

#[async_trait]
impl MetricBackend for ScriptedBackend {
    async fn discover(&self) -> BackendResult<Vec<String>> {
        Ok(self.names.clone())
    }

    async fn query_value(&self, symbol: &str) -> BackendResult<f64> {
        if let Some(script) = self.scripts.lock().unwrap().get_mut(symbol)
            && let Some(outcome) = script.pop_front()
        {
            return outcome;
        }
        Ok(self.fallback)
    }
}

/// View recording every snapshot it is notified with
pub struct RecordingView {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl RecordingView {
    pub fn new() -> (Self, Arc<Mutex<Vec<Snapshot>>>) {
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                snapshots: snapshots.clone(),
            },
            snapshots,
        )
    }
}

impl View for RecordingView {
    fn name(&self) -> &str {
        "recording"
    }

    fn notify(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

/// View that rejects every snapshot, counting the attempts
pub struct FailingView {
    attempts: Arc<AtomicUsize>,
}

impl FailingView {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        (
            Self {
                attempts: attempts.clone(),
            },
            attempts,
        )
    }
}

impl View for FailingView {
    fn name(&self) -> &str {
        "failing"
    }

    fn notify(&mut self, _snapshot: &Snapshot) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("this view never accepts a snapshot")
    }
}

/// View appending `(tag, cycle)` to a shared log, for ordering assertions
pub struct TaggedView {
    tag: &'static str,
    log: Arc<Mutex<Vec<(&'static str, u64)>>>,
}

impl TaggedView {
    pub fn new(tag: &'static str, log: Arc<Mutex<Vec<(&'static str, u64)>>>) -> Self {
        Self { tag, log }
    }
}

impl View for TaggedView {
    fn name(&self) -> &str {
        self.tag
    }

    fn notify(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.log.lock().unwrap().push((self.tag, snapshot.cycle));
        Ok(())
    }
}

pub fn patterns(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// Wait until the startup cycle (the immediate first timer tick) is done
///
/// With [`LONG_INTERVAL`] no further tick can land afterwards, so cycle
/// numbers become deterministic for the rest of the test.
pub async fn wait_for_first_cycle(handle: &SamplerHandle) -> Snapshot {
    loop {
        let snapshot = handle.snapshot().await.unwrap();
        if snapshot.cycle >= 1 {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
