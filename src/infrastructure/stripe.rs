use crate::domain::payment::{IntentRequest, PaymentIntent};
use crate::domain::ports::PaymentGateway;
use crate::error::{BookingError, Result};
use crate::interfaces::stripe::event::RESERVATION_ID_KEY;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the live processor client, wired by the binary; library
/// code never reads the environment.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    client_secret: String,
}

/// Payment gateway adapter against the processor's HTTP API.
///
/// Calls are synchronous with a bounded timeout and are never retried here;
/// timeouts and transport failures surface as `ServiceUnavailable`, leaving
/// the reservation `Pending` and safe for the caller to retry.
pub struct StripeGateway {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BookingError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent> {
        let amount = request.amount_minor.to_string();
        let reservation = request.reservation.to_string();
        let metadata_key = concat_metadata_key(RESERVATION_ID_KEY);
        let form = [
            ("amount", amount.as_str()),
            ("currency", request.currency),
            ("payment_method_types[]", "card"),
            (metadata_key.as_str(), reservation.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.config.base_url))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    BookingError::ServiceUnavailable(e.to_string())
                } else {
                    BookingError::Internal(format!("payment intent request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(BookingError::ServiceUnavailable(format!(
                "processor returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BookingError::Internal(format!(
                "payment intent rejected with {status}: {body}"
            )));
        }

        let body: IntentBody = response
            .json()
            .await
            .map_err(|e| BookingError::Internal(format!("malformed intent response: {e}")))?;
        Ok(PaymentIntent {
            client_secret: body.client_secret,
            amount: request.amount_minor,
            currency: request.currency.to_string(),
        })
    }
}

fn concat_metadata_key(key: &str) -> String {
    format!("metadata[{key}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::CURRENCY;
    use crate::domain::reservation::ReservationId;

    #[test]
    fn test_metadata_key_shape() {
        assert_eq!(
            concat_metadata_key(RESERVATION_ID_KEY),
            "metadata[reservationId]"
        );
    }

    #[tokio::test]
    async fn test_unreachable_processor_is_service_unavailable() {
        // Nothing listens on this port
        let mut config = StripeConfig::new("sk_test_x");
        config.base_url = "http://127.0.0.1:1".to_string();
        config.timeout = Duration::from_millis(200);
        let gateway = StripeGateway::new(config).unwrap();

        let err = gateway
            .create_intent(IntentRequest {
                reservation: ReservationId(1),
                amount_minor: 1000,
                currency: CURRENCY,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::ServiceUnavailable(_)));
    }
}
