use thiserror::Error;

use crate::core::account::AccountId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InflationError {
    #[error("Inflation not due: close time {close_time} is before next window {next_window}")]
    NotTime {
        close_time: u64,
        next_window: u64,
    },

    #[error("Arithmetic fault: {0}")]
    ArithmeticFault(String),

    #[error("Conservation violation: expected supply drift {expected_drift}, got {actual_drift}")]
    ConservationViolation {
        expected_drift: i128,
        actual_drift: i128,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl InflationError {
    /// Fatal errors mean the node computed something it cannot agree on
    /// with the network; the caller must halt instead of continuing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InflationError::ArithmeticFault(_) | InflationError::ConservationViolation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InflationError>;

impl From<std::io::Error> for InflationError {
    fn from(err: std::io::Error) -> Self {
        InflationError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for InflationError {
    fn from(err: serde_json::Error) -> Self {
        InflationError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for InflationError {
    fn from(err: hex::FromHexError) -> Self {
        InflationError::Config(format!("invalid hex: {}", err))
    }
}
