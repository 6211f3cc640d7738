//! Persistence error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record exists but cannot be decoded
    #[error("Corrupt session record for {call_id}: {message}")]
    Corrupt { call_id: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store task failed: {0}")]
    Task(String),
}

impl From<hotel_voice_core::Error> for StoreError {
    fn from(err: hotel_voice_core::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
