//! Message types for controlling a running sampler

use tokio::sync::oneshot;

use crate::snapshot::Snapshot;
use crate::views::View;

/// Commands accepted by a running [`Sampler`](super::sampler::Sampler)
///
/// Commands are taken between cycles, never mid-cycle. See the sampler docs
/// for the exact stop semantics.
pub enum SamplerCommand {
    /// Run one full cycle immediately (views included) and reply with the
    /// snapshot it produced
    ///
    /// Bypasses the interval timer; the timer keeps its own schedule.
    PollNow {
        respond_to: oneshot::Sender<Snapshot>,
    },

    /// Register a view
    ///
    /// The view starts receiving notifications with the next completed
    /// cycle. Earlier cycles are not replayed.
    AddView { view: Box<dyn View> },

    /// Reply with the current snapshot without triggering a cycle
    Snapshot {
        respond_to: oneshot::Sender<Snapshot>,
    },

    /// Stop the loop
    ///
    /// Cooperative: a cycle that is already running finishes first, and no
    /// further cycle begins once the command is taken.
    Stop,
}
