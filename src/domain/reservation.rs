use crate::domain::room::RoomTypeId;
use crate::error::{BookingError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-allocated reservation identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The owner key of a reservation: exactly one of an authenticated user id or
/// an anonymous session token, fixed at creation and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Principal {
    User(String),
    Session(String),
}

impl fmt::Display for Principal {
    /// Session tokens are truncated for display so they never land whole in
    /// log output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Session(token) => {
                let shown: String = token.chars().take(8).collect();
                write!(f, "session:{shown}…")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    /// The full transition table of the reservation state machine. Every
    /// status mutation goes through this check; `Cancelled` has no exits.
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Input to the store's atomic check-and-reserve; identity, status, and
/// version are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub owner: Principal,
    pub room_type: RoomTypeId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: u32,
    pub guest_names: Vec<String>,
    pub total_price: Decimal,
}

/// A persisted reservation.
///
/// The `version` counter backs the store's optimistic compare-and-swap, so a
/// cancel racing a webhook confirmation resolves to exactly one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub owner: Principal,
    pub room_type: RoomTypeId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: u32,
    pub guest_names: Vec<String>,
    pub total_price: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl Reservation {
    pub fn ensure_owned_by(&self, principal: &Principal) -> Result<()> {
        if &self.owner == principal {
            Ok(())
        } else {
            Err(BookingError::NotAuthorized)
        }
    }

    /// Edits and deletes are only legal while the reservation is `Pending`.
    pub fn ensure_editable(&self) -> Result<()> {
        if self.status == ReservationStatus::Pending {
            Ok(())
        } else {
            Err(self.invalid_state())
        }
    }

    pub fn confirm(&mut self) -> Result<()> {
        self.transition(ReservationStatus::Confirmed)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(ReservationStatus::Cancelled)
    }

    /// Half-open stay overlap: a check-out day does not collide with a
    /// same-day check-in.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in < check_out && check_in < self.check_out
    }

    fn transition(&mut self, next: ReservationStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            self.status = next;
            Ok(())
        } else {
            Err(self.invalid_state())
        }
    }

    fn invalid_state(&self) -> BookingError {
        BookingError::InvalidState {
            id: self.id,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reservation(status: ReservationStatus) -> Reservation {
        Reservation {
            id: ReservationId(1),
            owner: Principal::User("alice".into()),
            room_type: RoomTypeId(1),
            check_in: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 11, 15).unwrap(),
            guest_count: 2,
            guest_names: vec!["Alice".into(), "Bob".into()],
            total_price: dec!(1250.00),
            status,
            created_at: Utc::now(),
            version: 0,
        }
    }

    #[test]
    fn test_transition_table() {
        use ReservationStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_confirm_from_pending() {
        let mut r = reservation(ReservationStatus::Pending);
        assert!(r.confirm().is_ok());
        assert_eq!(r.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut r = reservation(ReservationStatus::Cancelled);
        assert!(matches!(r.confirm(), Err(BookingError::InvalidState { .. })));
        assert!(matches!(r.cancel(), Err(BookingError::InvalidState { .. })));
        assert_eq!(r.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_cancel_confirmed() {
        let mut r = reservation(ReservationStatus::Confirmed);
        assert!(r.cancel().is_ok());
        assert_eq!(r.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_ownership_check() {
        let r = reservation(ReservationStatus::Pending);
        assert!(r.ensure_owned_by(&Principal::User("alice".into())).is_ok());
        assert!(matches!(
            r.ensure_owned_by(&Principal::User("mallory".into())),
            Err(BookingError::NotAuthorized)
        ));
        // A session token never matches a user id, even with equal text.
        assert!(matches!(
            r.ensure_owned_by(&Principal::Session("alice".into())),
            Err(BookingError::NotAuthorized)
        ));
    }

    #[test]
    fn test_half_open_overlap() {
        let r = reservation(ReservationStatus::Pending);
        let d = |day| NaiveDate::from_ymd_opt(2025, 11, day).unwrap();
        assert!(r.overlaps(d(12), d(14)));
        assert!(r.overlaps(d(14), d(20)));
        // Back-to-back stays share a day without colliding
        assert!(!r.overlaps(d(15), d(18)));
        assert!(!r.overlaps(d(5), d(10)));
    }

    #[test]
    fn test_session_token_display_truncated() {
        let p = Principal::Session("tok_abcdef123456789".into());
        let shown = p.to_string();
        assert!(shown.starts_with("session:tok_abcd"));
        assert!(!shown.contains("123456789"));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::from_str::<ReservationStatus>("\"CANCELLED\"").unwrap(),
            ReservationStatus::Cancelled
        );
    }
}
