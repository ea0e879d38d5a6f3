//! Error types shared by the store, inventory, reservation and moderation layers

use crate::models::BookingStatus;
use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to the store or applying a rule
#[derive(Debug, Error)]
pub enum Error {
    /// Input was rejected before anything was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Moderation attempted on a booking that already left `pending`
    #[error("booking {id} is already {status}")]
    StateConflict { id: String, status: BookingStatus },

    /// Network failure or timeout reaching the store or identity provider
    #[error("transport error: {0}")]
    Transport(String),

    /// The token was refused; the session must re-authenticate
    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("nothing stored at {path}")]
    NotFound { path: String },

    /// Non-success response that is not an authorization failure
    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// A stored document does not have the expected shape
    #[error("malformed document at {path}: {message}")]
    Decode { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("check-in date is required")]
    MissingCheckIn,

    #[error("check-out date is required")]
    MissingCheckOut,

    #[error("requester address is required")]
    MissingAddress,

    #[error("guest count {0} is outside 1..=10")]
    GuestsOutOfRange(u32),

    #[error("check-out {check_out} must be after check-in {check_in}")]
    CheckOutNotAfterCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("price must be a positive number, got {0}")]
    InvalidPrice(f64),

    #[error("listing name must not be blank")]
    BlankName,

    #[error("category name must not be blank")]
    BlankCategory,

    #[error("invalid document id {0:?}")]
    InvalidId(String),
}

impl Error {
    pub(crate) fn decode(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
