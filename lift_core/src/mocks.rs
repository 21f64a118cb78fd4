//! Test and helper doubles for lift_core.

use lift_traits::{AnalogInput, Diagnostic, DiagnosticSink, Direction, StepDriver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Keeps every emitted diagnostic; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, pred: impl Fn(&Diagnostic) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut g) => g.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, event: &Diagnostic) {
        match self.events.lock() {
            Ok(mut g) => g.push(*event),
            Err(poisoned) => poisoned.into_inner().push(*event),
        }
    }
}

/// Drops every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _event: &Diagnostic) {}
}

/// An analog input whose conversions always fail; `start` can be made to fail too.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAnalog {
    pub fail_start: bool,
}

impl AnalogInput for FailingAnalog {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_start {
            return Err(Box::new(std::io::Error::other("adc not responding")));
        }
        Ok(())
    }

    fn read(&mut self, _timeout: Duration) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("conversion timeout")))
    }
}

/// A step driver that rejects every pulse; release and energize succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyDriver;

impl StepDriver for FaultyDriver {
    fn pulse(&mut self, _dir: Direction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("step line stuck")))
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
