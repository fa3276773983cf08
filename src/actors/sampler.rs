//! Sampler - the periodic poll-and-dispatch loop
//!
//! The sampler owns every selected channel and every registered view and
//! runs them from a single task. One cycle means: update each channel in
//! selection order, materialize an immutable snapshot, hand that snapshot
//! to each view in registration order.
//!
//! ## Key contracts
//!
//! 1. **Fixed channel set** - discovery and pattern selection happen once,
//!    in [`Sampler::new`]; afterwards only channel values change
//! 2. **Failure isolation** - one channel's bad cycle never skips the other
//!    channels or the view notifications for that cycle
//! 3. **Ordered fan-out** - every view sees every completed cycle exactly
//!    once, in registration order, with a snapshot that cannot change under
//!    its feet
//! 4. **Cooperative stop** - a stop never interrupts a cycle that is
//!    already running
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → update channels → materialize Snapshot → notify views
//!     ↑
//!     └─── Commands (PollNow, AddView, Snapshot, Stop)
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::backend::MetricBackend;
use crate::channel::Channel;
use crate::patterns::{self, PatternSet};
use crate::snapshot::Snapshot;
use crate::views::View;

use super::messages::SamplerCommand;

/// Actor that polls a fixed set of channels at a fixed interval
///
/// Construction performs discovery and selection; [`Sampler::run`] then
/// cycles until stopped. All mutation happens inside the actor task, so no
/// lock is ever held around channel state.
pub struct Sampler {
    /// Channels in selection order; fixed after construction
    channels: Vec<Channel>,

    /// Views in registration order
    views: Vec<Box<dyn View>>,

    /// Wall-clock pause between timer-driven cycles
    interval_duration: Duration,

    /// When this sampler was constructed
    started_at: DateTime<Utc>,

    /// Completed cycles so far
    cycles: u64,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<SamplerCommand>,
}

impl Sampler {
    /// Discover, select, and bind channels, returning the sampler and the
    /// handle that controls it
    ///
    /// Startup is all-or-nothing: a zero interval, a malformed glob
    /// pattern, or a failed discovery query is an error here, and nothing
    /// starts. An empty selection is not an error; the loop then cycles
    /// with no channels and views still get (empty) snapshots.
    pub async fn new(
        backend: Arc<dyn MetricBackend>,
        metric_patterns: &[String],
        interval_duration: Duration,
    ) -> Result<(Self, SamplerHandle)> {
        if interval_duration.is_zero() {
            bail!("interval must be a positive duration");
        }

        info!(
            "will query backend every {} seconds",
            interval_duration.as_secs_f64()
        );

        let set = PatternSet::compile(metric_patterns).context("invalid metric pattern")?;

        let discovered = Channel::discover(backend.as_ref())
            .await
            .context("channel discovery failed")?;

        let selected = patterns::select(&discovered, &set);

        debug!(
            "selected {} of {} discovered channels with patterns {:?}",
            selected.len(),
            discovered.len(),
            set.sources()
        );

        let mut channels = Vec::with_capacity(selected.len());
        for name in selected {
            info!("adding {name}");
            channels.push(Channel::new(name, Arc::clone(&backend)));
        }

        let (command_tx, command_rx) = mpsc::channel(32);

        let sampler = Self {
            channels,
            views: Vec::new(),
            interval_duration,
            started_at: Utc::now(),
            cycles: 0,
            command_rx,
        };

        Ok((sampler, SamplerHandle { sender: command_tx }))
    }

    /// Register a view before the loop starts
    ///
    /// Once [`run`](Self::run) has been spawned, registration goes through
    /// [`SamplerHandle::add_view`] instead.
    pub fn add_view(&mut self, view: Box<dyn View>) {
        debug!("registering view '{}'", view.name());
        self.views.push(view);
    }

    /// Read-only access to the channel collection, in selection order
    pub fn measurements(&self) -> &[Channel] {
        &self.channels
    }

    /// Run the loop until stopped
    ///
    /// The first cycle starts immediately; afterwards one cycle runs per
    /// interval tick. Returns when a Stop command arrives or every handle
    /// has been dropped. Commands are only taken between cycles, so a stop
    /// never interrupts a running cycle; a stop arriving during the
    /// inter-cycle wait cuts that wait short.
    #[instrument(skip(self), fields(channels = self.channels.len()))]
    pub async fn run(mut self) {
        debug!("starting sampler");

        let mut ticker = interval(self.interval_duration);

        loop {
            tokio::select! {
                // Timer tick - run one cycle
                _ = ticker.tick() => {
                    self.cycle().await;
                }

                // Handle commands
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        SamplerCommand::PollNow { respond_to } => {
                            debug!("received PollNow command");
                            let snapshot = self.cycle().await;
                            let _ = respond_to.send(snapshot);
                        }

                        SamplerCommand::AddView { view } => {
                            debug!("registering view '{}'", view.name());
                            self.views.push(view);
                        }

                        SamplerCommand::Snapshot { respond_to } => {
                            let _ = respond_to.send(self.snapshot());
                        }

                        SamplerCommand::Stop => {
                            debug!("received stop command");
                            break;
                        }
                    }
                }

                // Command channel closed - exit
                else => {
                    warn!("command channel closed, stopping");
                    break;
                }
            }
        }

        debug!("sampler stopped after {} cycles", self.cycles);
    }

    /// Run one full cycle
    ///
    /// Every channel is updated in selection order; a failed update is
    /// logged and recorded on the channel, and the cycle moves on. The
    /// materialized snapshot then goes to every view in registration
    /// order, with failing views isolated the same way.
    async fn cycle(&mut self) -> Snapshot {
        self.cycles += 1;

        trace!("cycle {} starting", self.cycles);

        for channel in &mut self.channels {
            match channel.update().await {
                Ok(value) => trace!("{} = {value}", channel.name()),
                Err(err) if err.is_parse_failure() => {
                    warn!("skipping {} this cycle: {err}", channel.name());
                }
                Err(err) => {
                    error!("failed to update {}: {err}", channel.name());
                }
            }
        }

        let snapshot = self.snapshot();

        for view in &mut self.views {
            if let Err(err) = view.notify(&snapshot) {
                error!("view '{}' failed to process cycle: {err:#}", view.name());
            }
        }

        snapshot
    }

    /// Materialize the current channel state as an immutable snapshot
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycle: self.cycles,
            taken_at: Utc::now(),
            started_at: self.started_at,
            samples: self.channels.iter().map(Channel::sample).collect(),
        }
    }
}

/// Handle for controlling a running [`Sampler`]
///
/// This handle provides a typed API for sending commands to the actor.
/// It can be cloned and shared across threads.
#[derive(Clone)]
pub struct SamplerHandle {
    /// Command sender
    sender: mpsc::Sender<SamplerCommand>,
}

impl SamplerHandle {
    /// Construct a sampler and run it as a background task
    ///
    /// Convenience for embedding; use [`Sampler::new`] plus
    /// [`Sampler::run`] to own the task (and its join handle) yourself.
    pub async fn spawn(
        backend: Arc<dyn MetricBackend>,
        metric_patterns: &[String],
        interval_duration: Duration,
    ) -> Result<Self> {
        let (sampler, handle) = Sampler::new(backend, metric_patterns, interval_duration).await?;

        tokio::spawn(sampler.run());

        Ok(handle)
    }

    /// Run one cycle immediately and return the snapshot it produced
    ///
    /// This bypasses the interval timer: views are notified exactly as for
    /// a timer-driven cycle.
    pub async fn poll_now(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SamplerCommand::PollNow { respond_to: tx })
            .await
            .ok()
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive snapshot")
    }

    /// Register a view; it sees cycles completed after registration only
    pub async fn add_view(&self, view: Box<dyn View>) -> Result<()> {
        self.sender
            .send(SamplerCommand::AddView { view })
            .await
            .ok()
            .context("failed to send AddView command")?;
        Ok(())
    }

    /// Fetch the current snapshot without triggering a cycle
    ///
    /// Before the first completed cycle this returns cycle 0 with every
    /// channel unset.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SamplerCommand::Snapshot { respond_to: tx })
            .await
            .ok()
            .context("failed to send Snapshot command")?;

        rx.await.context("failed to receive snapshot")
    }

    /// Ask the loop to stop
    ///
    /// Cooperative: a cycle that is already running completes (views
    /// included) before the loop exits, and no further cycle begins.
    pub async fn stop(&self) -> Result<()> {
        self.sender
            .send(SamplerCommand::Stop)
            .await
            .ok()
            .context("failed to send Stop command")?;
        Ok(())
    }
}
