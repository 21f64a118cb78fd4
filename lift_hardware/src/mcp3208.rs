use std::time::{Duration, Instant};

use lift_traits::AnalogInput;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};

/// SPI clock for the MCP3208 at 3.3 V (datasheet max is 1 MHz at 2.7 V).
const SPI_CLOCK_HZ: u32 = 1_000_000;

/// 12-bit SPI ADC, single-ended on one channel.
pub struct Mcp3208 {
    spi: Spi,
    channel: u8,
    started: bool,
}

impl Mcp3208 {
    pub fn new(bus: u8, slave_select: u8, channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::Spi(format!("mcp3208 has channels 0..=7, got {channel}")));
        }
        let bus = match bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(HwError::Spi(format!("unsupported spi bus {other}"))),
        };
        let ss = match slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(HwError::Spi(format!("unsupported slave select {other}"))),
        };
        let spi = Spi::new(bus, ss, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self {
            spi,
            channel,
            started: false,
        })
    }

    fn convert(&mut self) -> Result<u32> {
        // Start bit, single-ended, channel D2..D0 spread over the first two bytes.
        let tx = [
            0x06 | (self.channel >> 2),
            (self.channel & 0x03) << 6,
            0x00,
        ];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u32::from(rx[1] & 0x0F) << 8) | u32::from(rx[2]);
        trace!(raw, channel = self.channel, "mcp3208 conversion");
        Ok(raw)
    }
}

impl AnalogInput for Mcp3208 {
    fn start(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // First conversion after power-up settles the sample cap; discard it.
        self.convert()?;
        self.started = true;
        Ok(())
    }

    fn read(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        if !self.started {
            return Err(Box::new(HwError::NotStarted));
        }
        let t0 = Instant::now();
        let raw = self.convert()?;
        // A transfer that blocked past the deadline is stale by the time it returns.
        if t0.elapsed() > timeout {
            return Err(Box::new(HwError::Timeout));
        }
        Ok(raw)
    }
}
