//! Error types for slot-engine operations.
//!
//! Almost every failure is a rejected argument. The exception is
//! `SlotUnavailable`: the request was well formed but the chosen slot is
//! booked, past or outside the schedule. There is no I/O underneath, so
//! nothing here is retryable.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unsupported duration: {0} minutes (supported: 30, 60)")]
    UnsupportedDuration(u32),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),
}

impl SlotError {
    /// True when the input itself is malformed; false when a valid request
    /// conflicts with the current bookings or clock.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, SlotError::SlotUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
