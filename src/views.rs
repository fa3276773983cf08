//! Views - consumers of per-cycle snapshots
//!
//! A view is anything registered with the sampler to receive each completed
//! cycle. Views are called synchronously, in registration order, and get a
//! shared reference to the cycle's immutable snapshot; they never touch the
//! live channel collection. An error from one view is logged and isolated,
//! exactly like a failing channel: later views are still notified and the
//! loop keeps running.
//!
//! The built-ins are deliberately small stand-ins for real display
//! components: a tracing summary line, an aligned text table, and one JSON
//! object per cycle.

use std::io::Write;

use anyhow::Result;
use tracing::info;

use crate::snapshot::Snapshot;

/// A consumer notified once per completed cycle
pub trait View: Send {
    /// Name used in logs when this view misbehaves
    fn name(&self) -> &str;

    /// Receive one completed cycle's snapshot
    fn notify(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// View that logs a one-line summary of every cycle
#[derive(Debug, Default)]
pub struct LogView;

impl View for LogView {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&mut self, snapshot: &Snapshot) -> Result<()> {
        info!(
            "cycle {}: {}/{} channels carry a value, {} failing",
            snapshot.cycle,
            snapshot.value_count(),
            snapshot.samples.len(),
            snapshot.error_count()
        );
        Ok(())
    }
}

/// View that writes an aligned name/value table per cycle
pub struct TableView<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TableView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> View for TableView<W> {
    fn name(&self) -> &str {
        "table"
    }

    fn notify(&mut self, snapshot: &Snapshot) -> Result<()> {
        let width = snapshot
            .samples
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);

        writeln!(
            self.out,
            "cycle {} at {} ({} channels)",
            snapshot.cycle,
            snapshot.taken_at.format("%H:%M:%S"),
            snapshot.samples.len()
        )?;

        for sample in &snapshot.samples {
            let value = match sample.value {
                Some(v) => format!("{v:.2}"),
                None => "-".to_string(),
            };

            match &sample.error {
                Some(err) => writeln!(
                    self.out,
                    "{:<width$}  {:>14}  ! {}",
                    sample.name, value, err
                )?,
                None => writeln!(self.out, "{:<width$}  {:>14}", sample.name, value)?,
            }
        }

        writeln!(self.out)?;
        self.out.flush()?;

        Ok(())
    }
}

/// View that writes each snapshot as one JSON object per line
pub struct JsonView<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> View for JsonView<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn notify(&mut self, snapshot: &Snapshot) -> Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)?;
        self.out.flush()?;

        Ok(())
    }
}
