use crate::domain::money::Rate;
use crate::error::{BookingError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Number of nights in a stay; at least 1.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        Err(BookingError::InvalidDateRange)
    } else {
        Ok(nights)
    }
}

/// Total price for a stay: rate × integer night count, exact decimal
/// arithmetic. Overflow is an error, never a wrap or a rounding.
pub fn total_for_stay(rate: Rate, nights: i64) -> Result<Decimal> {
    rate.value()
        .checked_mul(Decimal::from(nights))
        .ok_or_else(|| BookingError::Validation {
            field: "totalPrice",
            reason: format!("{} x {nights} nights overflows", rate.value()),
        })
}

pub fn validate_capacity(guest_count: u32, capacity: u32) -> Result<()> {
    if guest_count == 0 || guest_count > capacity {
        Err(BookingError::CapacityExceeded {
            guests: guest_count,
            capacity,
        })
    } else {
        Ok(())
    }
}

pub fn validate_guest_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(BookingError::Validation {
            field: "guestNames",
            reason: "at least one guest name is required".to_string(),
        });
    }
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(BookingError::Validation {
            field: "guestNames",
            reason: "guest names must not be blank".to_string(),
        });
    }
    Ok(())
}
