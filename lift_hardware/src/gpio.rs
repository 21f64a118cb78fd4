//! Raspberry Pi GPIO devices: step/dir driver, photo-interrupter array and call buttons.
use std::time::Duration;

use lift_traits::{BreakSensor, Direction, InputReader, StepDriver};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::{debug, trace};

use crate::error::{HwError, Result};
use crate::util::spin_for;

/// Minimum STEP high time for common A4988/DRV8825 carriers.
const STEP_PULSE_WIDTH: Duration = Duration::from_micros(4);

fn gpio() -> Result<Gpio> {
    Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))
}

fn output(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    gpio.get(pin)
        .map(|p| p.into_output_low())
        .map_err(|e| HwError::Gpio(format!("open output pin {pin}: {e}")))
}

fn input_pullup(gpio: &Gpio, pin: u8) -> Result<InputPin> {
    gpio.get(pin)
        .map(|p| p.into_input_pullup())
        .map_err(|e| HwError::Gpio(format!("open input pin {pin}: {e}")))
}

pub struct GpioStepDriver {
    step: OutputPin,
    dir: OutputPin,
    /// Active-low enable line (EN on A4988/DRV8825), if wired.
    enable: Option<OutputPin>,
}

impl GpioStepDriver {
    pub fn new(step_pin: u8, dir_pin: u8, enable_pin: Option<u8>) -> Result<Self> {
        let gpio = gpio()?;
        let step = output(&gpio, step_pin)?;
        let dir = output(&gpio, dir_pin)?;
        let mut enable = enable_pin.map(|p| output(&gpio, p)).transpose()?;
        if let Some(en) = enable.as_mut() {
            en.set_high();
        }
        debug!(step_pin, dir_pin, ?enable_pin, "step driver ready");
        Ok(Self { step, dir, enable })
    }
}

impl StepDriver for GpioStepDriver {
    fn pulse(&mut self, dir: Direction) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match dir {
            Direction::Cw => self.dir.set_high(),
            Direction::Ccw => self.dir.set_low(),
        }
        self.step.set_high();
        spin_for(STEP_PULSE_WIDTH);
        self.step.set_low();
        trace!(dir = dir.as_str(), "step");
        Ok(())
    }

    fn release(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.step.set_low();
        if let Some(en) = self.enable.as_mut() {
            en.set_high();
        }
        Ok(())
    }

    fn energize(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(en) = self.enable.as_mut() {
            en.set_low();
        }
        Ok(())
    }
}

/// One photo-interrupter per floor. A floor is reported on the poll where its
/// beam goes from clear to broken.
pub struct GpioBreakSensor {
    sensors: Vec<InputPin>,
    broken: Vec<bool>,
    /// Broken beam reads low when true (open-collector sensors with pull-up).
    active_low: bool,
}

impl GpioBreakSensor {
    pub fn new(pins: &[u8], active_low: bool) -> Result<Self> {
        let gpio = gpio()?;
        let sensors = pins
            .iter()
            .map(|&p| input_pullup(&gpio, p))
            .collect::<Result<Vec<_>>>()?;
        let broken = vec![false; sensors.len()];
        debug!(?pins, active_low, "photo sensors ready");
        Ok(Self {
            sensors,
            broken,
            active_low,
        })
    }
}

impl BreakSensor for GpioBreakSensor {
    fn poll(&mut self) -> Option<u8> {
        for (floor, pin) in self.sensors.iter().enumerate() {
            let now_broken = pin.is_low() == self.active_low;
            let was_broken = self.broken[floor];
            if now_broken == was_broken {
                continue;
            }
            self.broken[floor] = now_broken;
            if now_broken {
                // Remaining floors keep their old state and are reported on later polls.
                return u8::try_from(floor).ok();
            }
        }
        None
    }
}

/// Momentary push buttons to ground, one pin per channel.
pub struct GpioButtons {
    pins: Vec<InputPin>,
}

impl GpioButtons {
    pub fn new(pins: &[u8]) -> Result<Self> {
        let gpio = gpio()?;
        let pins = pins
            .iter()
            .map(|&p| input_pullup(&gpio, p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { pins })
    }
}

impl InputReader for GpioButtons {
    fn is_pressed(&mut self, channel: u8) -> bool {
        self.pins
            .get(usize::from(channel))
            .is_some_and(|p| p.is_low())
    }
}
