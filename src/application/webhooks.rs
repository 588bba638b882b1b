use crate::domain::ports::{ConfirmationNotifierBox, ReservationStoreBox};
use crate::domain::reservation::{ReservationId, ReservationStatus};
use crate::error::{BookingError, Result};
use crate::interfaces::stripe::event::{PAYMENT_SUCCEEDED, StripeEvent};
use crate::interfaces::stripe::signature::WebhookVerifier;
use chrono::Utc;
use serde::Serialize;

/// Bounded retries for the confirm CAS; a webhook losing more races than this
/// is reported back to the processor for redelivery.
const MAX_CONFIRM_ATTEMPTS: u32 = 3;

/// Typed acknowledgement for a processed-or-ignored webhook delivery.
///
/// Everything here maps to a 2xx at the transport; only signature and
/// infrastructure failures surface as errors, which the processor retries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "disposition", rename_all = "camelCase")]
pub enum WebhookAck {
    /// The reservation transitioned to `Confirmed`.
    Confirmed { reservation: ReservationId },
    /// Duplicate delivery: the reservation was already confirmed.
    Duplicate { reservation: ReservationId },
    /// Event type carries no reservation effect.
    Ignored { event_type: String },
    /// Correlation missing or unusable; acknowledged and logged, never
    /// rejected — a rejection would cause unbounded processor retries.
    Discarded { reason: String },
}

/// Ingests raw webhook deliveries from the payment processor and reconciles
/// them with reservations.
///
/// Delivery is at-least-once and unordered; processing is idempotent per
/// reservation, deduplicated by the reservation's current status rather than
/// by event id (no event log is retained).
pub struct WebhookProcessor {
    verifier: WebhookVerifier,
    store: ReservationStoreBox,
    notifier: ConfirmationNotifierBox,
}

impl WebhookProcessor {
    pub fn new(
        verifier: WebhookVerifier,
        store: ReservationStoreBox,
        notifier: ConfirmationNotifierBox,
    ) -> Self {
        Self {
            verifier,
            store,
            notifier,
        }
    }

    /// Verifies the signature over the raw payload bytes, then correlates and
    /// applies the event. Nothing is parsed before the signature checks out.
    pub async fn process(&self, payload: &[u8], signature_header: &str) -> Result<WebhookAck> {
        self.verifier.verify(payload, signature_header, Utc::now())?;

        let event: StripeEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "webhook payload is not a parseable event");
                return Ok(WebhookAck::Discarded {
                    reason: "unparseable payload".to_string(),
                });
            }
        };

        if event.event_type != PAYMENT_SUCCEEDED {
            return Ok(WebhookAck::Ignored {
                event_type: event.event_type,
            });
        }

        let Some(id) = event.reservation_id() else {
            tracing::warn!(
                event = %event.id,
                "payment-succeeded event has no usable reservation id in metadata"
            );
            return Ok(WebhookAck::Discarded {
                reason: "missing reservation correlation".to_string(),
            });
        };

        self.confirm(id).await
    }

    async fn confirm(&self, id: ReservationId) -> Result<WebhookAck> {
        for _ in 0..MAX_CONFIRM_ATTEMPTS {
            let Some(mut reservation) = self.store.get(id).await? else {
                tracing::warn!(reservation = %id, "webhook references an unknown reservation");
                return Ok(WebhookAck::Discarded {
                    reason: format!("unknown reservation {id}"),
                });
            };

            match reservation.status {
                ReservationStatus::Confirmed => {
                    return Ok(WebhookAck::Duplicate { reservation: id });
                }
                ReservationStatus::Cancelled => {
                    tracing::warn!(
                        reservation = %id,
                        "payment succeeded for a cancelled reservation; not reinstating"
                    );
                    return Ok(WebhookAck::Discarded {
                        reason: format!("reservation {id} is cancelled"),
                    });
                }
                ReservationStatus::Pending => {
                    let expected_version = reservation.version;
                    reservation.confirm()?;
                    match self.store.update(reservation, expected_version).await {
                        Ok(stored) => {
                            tracing::info!(reservation = %id, "reservation confirmed by webhook");
                            if let Err(e) = self.notifier.reservation_confirmed(&stored).await {
                                // Fire-and-forget: a notifier failure never
                                // fails the delivery.
                                tracing::error!(reservation = %id, error = %e, "confirmation notification failed");
                            }
                            return Ok(WebhookAck::Confirmed { reservation: id });
                        }
                        Err(BookingError::ConcurrentUpdate) => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        Err(BookingError::ConcurrentUpdate)
    }
}
