#[cfg(feature = "hardware")]
pub mod gpio;
#[cfg(feature = "hardware")]
pub mod mcp3208;

pub mod error;
pub mod util;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lift_traits::{AnalogInput, BreakSensor, Clock, Direction, InputReader, StepDriver};

use crate::error::HwError;

/// Simulated analog converter (speed potentiometer).
///
/// Holds a constant level that can be moved from another thread through
/// [`SimulatedAnalog::level`], or sweeps back and forth between two bounds.
pub struct SimulatedAnalog {
    level: Arc<AtomicU32>,
    sweep: Option<Sweep>,
    latency: Duration,
    started: bool,
}

struct Sweep {
    lo: u32,
    hi: u32,
    step: u32,
    rising: bool,
}

impl SimulatedAnalog {
    pub fn constant(value: u32) -> Self {
        SimulatedAnalog {
            level: Arc::new(AtomicU32::new(value)),
            sweep: None,
            latency: Duration::ZERO,
            started: false,
        }
    }

    /// Triangle sweep between `lo` and `hi`, moving `step` counts per conversion.
    pub fn sweep(lo: u32, hi: u32, step: u32) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        SimulatedAnalog {
            level: Arc::new(AtomicU32::new(lo)),
            sweep: Some(Sweep {
                lo,
                hi,
                step: step.max(1),
                rising: true,
            }),
            latency: Duration::ZERO,
            started: false,
        }
    }

    /// Make every conversion take `latency`. A read whose timeout is shorter
    /// waits out the timeout and fails with [`HwError::Timeout`].
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Shared handle to the current level; storing into it moves the knob.
    pub fn level(&self) -> Arc<AtomicU32> {
        self.level.clone()
    }
}

impl AnalogInput for SimulatedAnalog {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.started = true;
        tracing::debug!("simulated adc started");
        Ok(())
    }

    fn read(
        &mut self,
        timeout: Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        if !self.started {
            return Err(Box::new(HwError::NotStarted));
        }
        if self.latency > timeout {
            std::thread::sleep(timeout);
            return Err(Box::new(HwError::Timeout));
        }
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let v = self.level.load(Ordering::Relaxed);
        if let Some(s) = self.sweep.as_mut() {
            let next = if s.rising {
                v.saturating_add(s.step).min(s.hi)
            } else {
                v.saturating_sub(s.step).max(s.lo)
            };
            if next == s.hi || next == s.lo {
                s.rising = next == s.lo;
            }
            self.level.store(next, Ordering::Relaxed);
        }
        Ok(v)
    }
}

/// Observer for a [`SimulatedStepDriver`]; clones share the driver's counters.
#[derive(Debug, Clone, Default)]
pub struct StepProbe {
    position: Arc<AtomicI64>,
    pulses: Arc<AtomicU64>,
    energized: Arc<AtomicBool>,
}

impl StepProbe {
    /// Net open-loop position (CW steps minus CCW steps).
    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Relaxed)
    }
    pub fn pulses(&self) -> u64 {
        self.pulses.load(Ordering::Relaxed)
    }
    pub fn is_energized(&self) -> bool {
        self.energized.load(Ordering::Relaxed)
    }
}

/// Simulated step/dir driver that counts pulses instead of toggling pins.
#[derive(Debug, Default)]
pub struct SimulatedStepDriver {
    probe: StepProbe,
}

impl SimulatedStepDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> StepProbe {
        self.probe.clone()
    }
}

impl StepDriver for SimulatedStepDriver {
    fn pulse(&mut self, dir: Direction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.probe.is_energized() {
            return Err(Box::new(HwError::Released));
        }
        let delta = match dir {
            Direction::Cw => 1,
            Direction::Ccw => -1,
        };
        self.probe.position.fetch_add(delta, Ordering::Relaxed);
        self.probe.pulses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(dir = dir.as_str(), "simulated step");
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.probe.energized.store(false, Ordering::Relaxed);
        tracing::debug!("simulated coils released");
        Ok(())
    }

    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.probe.energized.store(true, Ordering::Relaxed);
        tracing::debug!("simulated coils energized");
        Ok(())
    }
}

/// Handle used to inject interruptions into a [`ScriptedBreakSensor`].
#[derive(Debug, Clone, Default)]
pub struct BreakTrigger {
    pending: Arc<Mutex<VecDeque<u8>>>,
}

impl BreakTrigger {
    /// Queue one interruption at `position`.
    pub fn trip(&self, position: u8) {
        if let Ok(mut q) = self.pending.lock() {
            q.push_back(position);
        }
    }
}

/// Break sensor fed by a [`BreakTrigger`]; each queued trip is reported exactly once.
#[derive(Debug, Default)]
pub struct ScriptedBreakSensor {
    trigger: BreakTrigger,
}

impl ScriptedBreakSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> BreakTrigger {
        self.trigger.clone()
    }
}

impl BreakSensor for ScriptedBreakSensor {
    fn poll(&mut self) -> Option<u8> {
        self.trigger.pending.lock().ok()?.pop_front()
    }
}

/// Break sensor that reports an interruption every `every_ms`, cycling through
/// `floors` positions. Used by host simulation runs.
pub struct PeriodicBreakSensor<C: Clock> {
    clock: C,
    every_ms: u32,
    floors: u8,
    next_floor: u8,
    last_ms: u32,
}

impl<C: Clock> PeriodicBreakSensor<C> {
    pub fn new(clock: C, every_ms: u32, floors: u8) -> Self {
        let last_ms = clock.now_ms();
        Self {
            clock,
            every_ms: every_ms.max(1),
            floors: floors.max(1),
            next_floor: 0,
            last_ms,
        }
    }
}

impl<C: Clock> BreakSensor for PeriodicBreakSensor<C> {
    fn poll(&mut self) -> Option<u8> {
        if self.clock.ms_since(self.last_ms) < self.every_ms {
            return None;
        }
        self.last_ms = self.last_ms.wrapping_add(self.every_ms);
        let floor = self.next_floor;
        self.next_floor = (self.next_floor + 1) % self.floors;
        Some(floor)
    }
}

/// Manually operated button panel; clones share state.
#[derive(Debug, Clone)]
pub struct SimulatedButtons {
    pressed: Arc<Vec<AtomicBool>>,
}

impl SimulatedButtons {
    pub fn new(channels: usize) -> Self {
        Self {
            pressed: Arc::new((0..channels).map(|_| AtomicBool::new(false)).collect()),
        }
    }

    pub fn press(&self, channel: u8) {
        if let Some(b) = self.pressed.get(usize::from(channel)) {
            b.store(true, Ordering::Relaxed);
        }
    }

    pub fn release(&self, channel: u8) {
        if let Some(b) = self.pressed.get(usize::from(channel)) {
            b.store(false, Ordering::Relaxed);
        }
    }
}

impl InputReader for SimulatedButtons {
    fn is_pressed(&mut self, channel: u8) -> bool {
        self.pressed
            .get(usize::from(channel))
            .is_some_and(|b| b.load(Ordering::Relaxed))
    }
}

/// Buttons that press `channel` for `width_ms` out of every `every_ms`.
pub struct PulsedButtons<C: Clock> {
    clock: C,
    channel: u8,
    every_ms: u32,
    width_ms: u32,
}

impl<C: Clock> PulsedButtons<C> {
    pub fn new(clock: C, channel: u8, every_ms: u32, width_ms: u32) -> Self {
        let every_ms = every_ms.max(1);
        Self {
            clock,
            channel,
            every_ms,
            width_ms: width_ms.min(every_ms),
        }
    }
}

impl<C: Clock> InputReader for PulsedButtons<C> {
    fn is_pressed(&mut self, channel: u8) -> bool {
        channel == self.channel && self.clock.now_ms() % self.every_ms < self.width_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_traits::ManualClock;

    #[test]
    fn test_simulated_adc_requires_start() {
        let mut adc = SimulatedAnalog::constant(1700);
        assert!(adc.read(Duration::from_millis(1)).is_err());
        adc.start().unwrap();
        assert_eq!(adc.read(Duration::from_millis(1)).unwrap(), 1700);
        adc.level().store(3300, Ordering::Relaxed);
        assert_eq!(adc.read(Duration::from_millis(1)).unwrap(), 3300);
    }

    #[test]
    fn test_slow_conversion_times_out() {
        let mut adc = SimulatedAnalog::constant(900).with_latency(Duration::from_millis(20));
        adc.start().unwrap();
        let err = adc.read(Duration::from_millis(2)).unwrap_err();
        assert!(matches!(err.downcast_ref::<HwError>(), Some(HwError::Timeout)));
        assert_eq!(adc.read(Duration::from_millis(50)).unwrap(), 900);
    }

    #[test]
    fn test_sweep_turns_at_bounds() {
        let mut adc = SimulatedAnalog::sweep(100, 300, 100);
        adc.start().unwrap();
        let seq: Vec<u32> = (0..6)
            .map(|_| adc.read(Duration::ZERO).unwrap())
            .collect();
        assert_eq!(seq, vec![100, 200, 300, 200, 100, 200]);
    }

    #[test]
    fn test_simulated_driver_counts_and_guards_release() {
        let mut drv = SimulatedStepDriver::new();
        let probe = drv.probe();
        assert!(drv.pulse(Direction::Cw).is_err());
        drv.energize().unwrap();
        drv.pulse(Direction::Cw).unwrap();
        drv.pulse(Direction::Cw).unwrap();
        drv.pulse(Direction::Ccw).unwrap();
        assert_eq!(probe.pulses(), 3);
        assert_eq!(probe.position(), 1);
        drv.release().unwrap();
        assert!(!probe.is_energized());
    }

    #[test]
    fn test_scripted_break_reports_each_trip_once() {
        let mut sensor = ScriptedBreakSensor::new();
        let trig = sensor.trigger();
        assert_eq!(sensor.poll(), None);
        trig.trip(3);
        assert_eq!(sensor.poll(), Some(3));
        assert_eq!(sensor.poll(), None);
    }

    #[test]
    fn test_periodic_break_cycles_floors() {
        let clock = ManualClock::new();
        let mut sensor = PeriodicBreakSensor::new(clock.clone(), 100, 2);
        clock.advance(99);
        assert_eq!(sensor.poll(), None);
        clock.advance(1);
        assert_eq!(sensor.poll(), Some(0));
        assert_eq!(sensor.poll(), None);
        clock.advance(100);
        assert_eq!(sensor.poll(), Some(1));
        clock.advance(100);
        assert_eq!(sensor.poll(), Some(0));
    }

    #[test]
    fn test_buttons_unknown_channel_reads_released() {
        let mut panel = SimulatedButtons::new(3);
        panel.press(1);
        assert!(panel.is_pressed(1));
        assert!(!panel.is_pressed(0));
        assert!(!panel.is_pressed(7));
        panel.release(1);
        assert!(!panel.is_pressed(1));
    }
}
