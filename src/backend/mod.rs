//! The metrics source behind the sampling loop
//!
//! The loop never talks to a concrete source directly; it goes through the
//! `MetricBackend` trait, so any provider of named numeric channels is
//! substitutable.
//!
//! ## Design
//!
//! - **Trait-based**: `MetricBackend` is the single seam to the source
//! - **Async**: all operations are async for compatibility with Tokio
//! - **Two operations**: name discovery (startup) and per-channel value
//!   queries (every cycle)
//!
//! ## Implementations
//!
//! - **HTTP** (`HttpBackend`): polls a `sampler-agent` (or anything speaking
//!   the same contract) over HTTP
//! - tests script their own in-memory implementations
//!
//! ## Usage
//!
//! ```no_run
//! use metric_sampler::backend::{HttpBackend, MetricBackend};
//! use metric_sampler::config::BackendConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = HttpBackend::new(&BackendConfig::new("http://127.0.0.1:51411"));
//!     let names = backend.discover().await?;
//!     println!("{} channels available", names.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

pub mod error;
pub mod http;

pub use error::{BackendError, BackendResult};
pub use http::HttpBackend;

/// Trait for metrics sources
///
/// A backend is an opaque provider of named numeric channels. Connection
/// setup happens before the sampler sees the backend; both methods assume a
/// ready source.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; the sampler holds the backend as
/// `Arc<dyn MetricBackend>` and shares it with every channel.
///
/// ## Error Handling
///
/// Methods return `BackendResult<T>`. Only `BackendError::Parse` is treated
/// as recoverable by the sampling loop; see the error module.
#[async_trait]
pub trait MetricBackend: Send + Sync {
    /// List every channel name the source currently offers
    ///
    /// Called once, before the loop starts. Duplicates are the source's
    /// concern and are passed through unchanged.
    async fn discover(&self) -> BackendResult<Vec<String>>;

    /// Fetch the latest value for one channel
    ///
    /// Called once per selected channel per cycle. Malformed data must map
    /// to `BackendError::Parse` so the loop can isolate it.
    async fn query_value(&self, symbol: &str) -> BackendResult<f64>;
}
