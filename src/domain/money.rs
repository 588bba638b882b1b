use crate::error::{BookingError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A validated nightly rate.
///
/// Wraps `rust_decimal::Decimal` to enforce the pricing rules: strictly
/// positive, at most two decimal places. Totals derived from a `Rate` by an
/// integer night count are therefore always representable in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(BookingError::Validation {
                field: "pricePerNight",
                reason: "rate must be positive".to_string(),
            });
        }
        if value.normalize().scale() > 2 {
            return Err(BookingError::Validation {
                field: "pricePerNight",
                reason: format!("rate {value} has more than two decimal places"),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = BookingError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

/// Converts a two-decimal total into an integral minor-unit amount (cents).
///
/// The conversion is exact by construction; a total that is not representable
/// in whole cents is an error, never a rounding.
pub fn minor_units(total: Decimal) -> Result<i64> {
    let cents = total
        .checked_mul(dec!(100))
        .ok_or_else(|| BookingError::Validation {
            field: "totalPrice",
            reason: format!("total {total} overflows minor units"),
        })?;
    if cents.normalize().scale() != 0 {
        return Err(BookingError::Validation {
            field: "totalPrice",
            reason: format!("total {total} is not representable in whole cents"),
        });
    }
    cents.to_i64().ok_or_else(|| BookingError::Validation {
        field: "totalPrice",
        reason: format!("total {total} exceeds the minor-unit range"),
    })
}
