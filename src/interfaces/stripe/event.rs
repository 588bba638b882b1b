use crate::domain::reservation::ReservationId;
use serde::Deserialize;
use std::collections::HashMap;

/// The event type that confirms a reservation; every other type is
/// acknowledged and ignored.
pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Metadata key carrying the correlation id back from the processor.
pub const RESERVATION_ID_KEY: &str = "reservationId";

/// Raw webhook payload shape: `{id, type, data: {object: {metadata: {...}}}}`.
///
/// Only the fields the reconciliation needs are modeled; everything else in
/// the processor's payload is ignored by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: EventObject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventObject {
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeEvent {
    /// Extracts the correlated reservation id from intent metadata. Absent or
    /// non-numeric values yield `None`; the caller acknowledges and logs.
    pub fn reservation_id(&self) -> Option<ReservationId> {
        self.data
            .object
            .metadata
            .get(RESERVATION_ID_KEY)?
            .parse()
            .ok()
            .map(ReservationId)
    }
}
