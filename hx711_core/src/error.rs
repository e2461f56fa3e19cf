use hx711_traits::PinError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A GPIO operation failed; the underlying cause is kept verbatim.
    #[error("gpio error: {0}")]
    Gpio(#[source] PinError),
    /// The chip did not signal data-ready within the poll budget.
    #[error("data-ready timeout")]
    Timeout,
    /// A median computation collected zero valid raw samples.
    #[error("no valid samples: {0}")]
    NoSample(String),
    /// A checked precondition failed (bad reading count, weight, or scale).
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Cooperative stop observed between raw reads.
    #[error("stopped")]
    Stopped,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may reasonably retry the failed operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Timeout | Error::NoSample(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(Error::Timeout.is_recoverable());
        assert!(Error::NoSample("all readings discarded".into()).is_recoverable());
        assert!(!Error::InvalidInput("scale factor must be non-zero").is_recoverable());
        assert!(!Error::Gpio("pin busy".into()).is_recoverable());
    }
}
