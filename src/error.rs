use crate::domain::reservation::{ReservationId, ReservationStatus};
use crate::domain::room::RoomTypeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BookingError>;

/// Crate-wide error taxonomy for the reservation core.
///
/// Each variant maps onto a transport-facing [`ErrorClass`] so that callers
/// (REST layer, CLI harness) can render a consistent response without matching
/// on individual variants.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("check-out date must be after check-in date")]
    InvalidDateRange,
    #[error("guest count {guests} is not within room capacity {capacity}")]
    CapacityExceeded { guests: u32, capacity: u32 },
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("reservation {0} not found")]
    ReservationNotFound(ReservationId),
    #[error("room type {0} not found")]
    RoomTypeNotFound(RoomTypeId),
    #[error("requesting principal does not own this reservation")]
    NotAuthorized,
    #[error("reservation {id} is {status}; operation not allowed in this state")]
    InvalidState {
        id: ReservationId,
        status: ReservationStatus,
    },
    #[error("room type {room_type} has no availability for the requested dates")]
    NoAvailability { room_type: RoomTypeId },
    #[error("reservation was modified concurrently")]
    ConcurrentUpdate,
    #[error("webhook signature verification failed: {0}")]
    SignatureVerification(String),
    #[error("payment processor unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Transport-facing classification of a [`BookingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    SignatureRejected,
    Unavailable,
    Internal,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not-found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::SignatureRejected => "signature-rejected",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

impl BookingError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidDateRange | Self::CapacityExceeded { .. } | Self::Validation { .. } => {
                ErrorClass::Validation
            }
            Self::ReservationNotFound(_) | Self::RoomTypeNotFound(_) => ErrorClass::NotFound,
            Self::NotAuthorized => ErrorClass::Forbidden,
            Self::InvalidState { .. } | Self::NoAvailability { .. } | Self::ConcurrentUpdate => {
                ErrorClass::Conflict
            }
            Self::SignatureVerification(_) => ErrorClass::SignatureRejected,
            Self::ServiceUnavailable(_) => ErrorClass::Unavailable,
            Self::Storage(_) | Self::Internal(_) => ErrorClass::Internal,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BookingError {
    fn from(e: rocksdb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
