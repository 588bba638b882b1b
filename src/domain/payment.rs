use crate::domain::reservation::ReservationId;
use serde::{Deserialize, Serialize};

/// All reservation pricing is denominated in US dollars; multi-currency
/// conversion is out of scope.
pub const CURRENCY: &str = "usd";

/// Outbound request to the payment gateway. The reservation id rides along as
/// intent metadata and comes back on the webhook as the correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRequest {
    pub reservation: ReservationId,
    pub amount_minor: i64,
    pub currency: &'static str,
}

/// Processor-side payment intent, as returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}
