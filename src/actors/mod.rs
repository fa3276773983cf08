//! Actor-based sampling loop
//!
//! The whole loop is one actor: a single async task that owns the channel
//! collection and the registered views. Everything else talks to it through
//! message passing, so channel state is never shared and never locked.
//!
//! ## Architecture Overview
//!
//! ```text
//!   SamplerHandle (cloneable)
//!        │ commands (mpsc)
//!        ▼
//!   Sampler task ──── per cycle ────▶ Channel 1..n (updated in order)
//!        │                                  │
//!        │ oneshot replies                  ▼
//!        ◀────────────────────────── Snapshot ──▶ View 1..m (in order)
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: one mpsc channel carries control messages (PollNow,
//!    AddView, Snapshot, Stop)
//! 2. **Request/Response**: oneshot channels answer snapshot queries
//! 3. **Fan-out**: views are plain trait objects the actor calls
//!    synchronously; a broadcast channel would lose the ordering and
//!    delivery guarantees views rely on

pub mod messages;
pub mod sampler;

pub use messages::SamplerCommand;
pub use sampler::{Sampler, SamplerHandle};
