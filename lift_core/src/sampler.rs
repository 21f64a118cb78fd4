//! Background analog sampling and the shared raw-sample value.
//!
//! The raw knob position is a single `u32` with exactly one writer. The writer
//! half ([`SampleWriter`]) cannot be cloned, so ownership enforces the
//! single-producer rule; readers hold cheap [`SampleHandle`] clones. Stores use
//! release ordering and loads use acquire, and a `u32` is never torn.
//!
//! [`Sampler`] owns the converter on its own thread, starts it once, and
//! publishes each conversion through the writer. It tracks the last successful
//! conversion for stall detection and is shut down and joined on drop.
use crossbeam_channel as xch;
use eyre::WrapErr;
use lift_traits::{AnalogInput, Clock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use crate::config::SamplerCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Create the writer/reader pair for one shared sample, starting at `initial`.
pub fn sample_channel(initial: u32) -> (SampleWriter, SampleHandle) {
    let cell = Arc::new(AtomicU32::new(initial));
    (
        SampleWriter { cell: cell.clone() },
        SampleHandle { cell },
    )
}

/// The single producer side of the shared sample.
#[derive(Debug)]
pub struct SampleWriter {
    cell: Arc<AtomicU32>,
}

impl SampleWriter {
    #[inline]
    pub fn publish(&mut self, raw: u32) {
        self.cell.store(raw, Ordering::Release);
    }
}

/// Read-only view of the shared sample.
#[derive(Debug, Clone)]
pub struct SampleHandle {
    cell: Arc<AtomicU32>,
}

impl SampleHandle {
    #[inline]
    pub fn get(&self) -> u32 {
        self.cell.load(Ordering::Acquire)
    }
}

pub struct Sampler {
    last_ok: Arc<AtomicU32>,
    conversions: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
    /// Dropping the sender wakes the thread out of its pacing wait.
    shutdown_tx: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Start `input` and spawn the sampling thread.
    ///
    /// Fails when the converter cannot be started or the thread cannot be spawned;
    /// read errors after that are counted and logged, never fatal.
    pub fn spawn<A, C>(
        mut input: A,
        mut writer: SampleWriter,
        cfg: &SamplerCfg,
        clock: C,
    ) -> Result<Self>
    where
        A: AnalogInput + Send + 'static,
        C: Clock + Send + 'static,
    {
        input
            .start()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("starting analog input")?;

        let (shutdown_tx, shutdown_rx) = xch::bounded::<()>(0);
        let last_ok = Arc::new(AtomicU32::new(clock.now_ms()));
        let last_ok_clone = last_ok.clone();
        let conversions = Arc::new(AtomicU64::new(0));
        let conversions_clone = conversions.clone();
        let errors = Arc::new(AtomicU64::new(0));
        let errors_clone = errors.clone();
        let period = Duration::from_micros(crate::util::period_us(cfg.rate_hz));
        let timeout = Duration::from_millis(cfg.timeout_ms);

        let join_handle = std::thread::Builder::new()
            .name("lift-sampler".into())
            .spawn(move || {
                loop {
                    match input.read(timeout) {
                        Ok(v) => {
                            writer.publish(v);
                            last_ok_clone.store(clock.now_ms(), Ordering::Relaxed);
                            conversions_clone.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            let n = errors_clone.fetch_add(1, Ordering::Relaxed) + 1;
                            if n.is_power_of_two() {
                                tracing::warn!(error = %map_hw_error(&*e), errors = n, "adc read failed");
                            }
                        }
                    }
                    match shutdown_rx.recv_timeout(period) {
                        Err(xch::RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                tracing::trace!("Sampler thread exiting cleanly");
            })
            .wrap_err("spawning sampler thread")?;

        tracing::debug!(rate_hz = cfg.rate_hz, "sampler started");
        Ok(Self {
            last_ok,
            conversions,
            errors,
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(join_handle),
        })
    }

    /// Milliseconds since the last successful conversion, on the sampler's clock.
    ///
    /// A conversion stamped after `now_ms` (the thread ran past the caller's
    /// reading) counts as 0, not as a near-`u32::MAX` wrap.
    pub fn stalled_for(&self, now_ms: u32) -> u32 {
        let since = now_ms.wrapping_sub(self.last_ok.load(Ordering::Relaxed));
        if since > i32::MAX.unsigned_abs() { 0 } else { since }
    }

    pub fn conversions(&self) -> u64 {
        self.conversions.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        // Disconnecting the channel ends the thread's current wait immediately;
        // an in-flight read finishes first (bounded by the conversion timeout).
        drop(self.shutdown_tx.take());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Sampler thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "Sampler thread panicked during shutdown");
                }
            }
        }
    }
}
