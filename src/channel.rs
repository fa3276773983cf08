//! A single pollable measurement bound to one backend symbol

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::{BackendError, BackendResult, MetricBackend};
use crate::snapshot::Sample;

/// One named, pollable numeric measurement
///
/// Channels are created at selection time and live exactly as long as the
/// loop that owns them; identities are fixed after construction and only the
/// value state mutates from cycle to cycle.
pub struct Channel {
    name: String,
    backend: Arc<dyn MetricBackend>,
    value: Option<f64>,
    updated_at: Option<DateTime<Utc>>,
    last_error: Option<BackendError>,
}

impl Channel {
    /// Bind a channel to one backend symbol
    pub fn new(name: impl Into<String>, backend: Arc<dyn MetricBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
            value: None,
            updated_at: None,
            last_error: None,
        }
    }

    /// List every channel name the backend currently offers
    ///
    /// Runs once, before the loop starts; a failure here is fatal to
    /// initialization rather than something to retry.
    pub async fn discover(backend: &dyn MetricBackend) -> BackendResult<Vec<String>> {
        backend.discover().await
    }

    /// Pull the latest value for this channel and record the outcome
    ///
    /// On success the value and timestamp are refreshed and any earlier
    /// error cleared. On failure the previous value (or unset state) is
    /// kept and the error recorded; classifying and logging the failure is
    /// the caller's job.
    pub async fn update(&mut self) -> BackendResult<f64> {
        match self.backend.query_value(&self.name).await {
            Ok(value) => {
                self.value = Some(value);
                self.updated_at = Some(Utc::now());
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last successfully parsed value; `None` until the first success
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// The most recent failed update, if the last update failed
    pub fn last_error(&self) -> Option<&BackendError> {
        self.last_error.as_ref()
    }

    /// Immutable projection of the current state
    pub fn sample(&self) -> Sample {
        Sample {
            name: self.name.clone(),
            value: self.value,
            updated_at: self.updated_at,
            error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("updated_at", &self.updated_at)
            .field("last_error", &self.last_error)
            .finish()
    }
}
