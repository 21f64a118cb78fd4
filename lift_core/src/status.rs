//! Observable states of the control loop and the step engine.

/// Pause/resume state owned by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Speed is applied and the engine runs.
    #[default]
    Active,
    /// A beam break stopped the car; waiting for the hold period and an acknowledgment.
    Paused,
}

impl LoopMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopMode::Active => "active",
            LoopMode::Paused => "paused",
        }
    }
}

/// Step engine run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
}
