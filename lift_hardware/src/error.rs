use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc conversion timeout")]
    Timeout,
    #[error("adc read before start()")]
    NotStarted,
    #[error("step pulse while coils are released")]
    Released,
}

pub type Result<T> = std::result::Result<T, HwError>;
