//! Observer hooks for hosts that want per-tick visibility without reaching
//! into the simulation's internals.

use std::io::Write;

use tracing::warn;

use haul_agent::DeliveryRecord;
use haul_core::Tick;

use crate::error::{SimError, SimResult};

/// Callbacks invoked by [`Sim::tick`](crate::Sim::tick).  All methods have
/// empty defaults so observers implement only what they care about.
pub trait SimObserver {
    fn on_tick_start(&mut self, _now: Tick) {}
    fn on_tick_end(&mut self, _now: Tick) {}
    fn on_delivery(&mut self, _now: Tick, _record: &DeliveryRecord) {}
    fn on_sim_end(&mut self, _now: Tick) {}
}

/// The do-nothing observer, for hosts that only want the end state.
#[derive(Default)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

// ── DeliveryLog ───────────────────────────────────────────────────────────────

/// CSV log of every completed delivery: tick, hauler, source, destination,
/// kind, amount.
///
/// Write errors are remembered rather than surfaced mid-run (the observer
/// interface is infallible by design); [`finish`](Self::finish) reports the
/// first one.
pub struct DeliveryLog<W: Write> {
    writer: csv::Writer<W>,
    error: Option<SimError>,
}

impl<W: Write> DeliveryLog<W> {
    pub fn new(inner: W) -> SimResult<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(["tick", "hauler", "source", "destination", "kind", "amount"])?;
        Ok(Self { writer, error: None })
    }

    /// Flush and return the underlying writer, or the first deferred error.
    pub fn finish(mut self) -> SimResult<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer
            .into_inner()
            .map_err(|e| SimError::Io(e.into_error()))
    }
}

impl<W: Write> SimObserver for DeliveryLog<W> {
    fn on_delivery(&mut self, now: Tick, record: &DeliveryRecord) {
        if self.error.is_some() {
            return;
        }
        let row = [
            now.0.to_string(),
            record.hauler.0.to_string(),
            record.source.0.to_string(),
            record.destination.0.to_string(),
            record.kind.to_string(),
            record.amount.to_string(),
        ];
        if let Err(err) = self.writer.write_record(&row) {
            warn!(%now, "delivery log write failed: {err}");
            self.error = Some(err.into());
        }
    }
}
