use crate::domain::money;
use crate::domain::payment::{CURRENCY, IntentRequest, PaymentIntent};
use crate::domain::ports::{PaymentGatewayBox, ReservationStoreBox};
use crate::domain::reservation::{ReservationId, ReservationStatus};
use crate::error::{BookingError, Result};

/// The payment-intent bridge.
///
/// Creating an intent never transitions reservation state; confirmation is
/// deferred entirely to the verified webhook, which is the only path that
/// proves the processor saw the money.
pub struct PaymentService {
    store: ReservationStoreBox,
    gateway: PaymentGatewayBox,
}

impl PaymentService {
    pub fn new(store: ReservationStoreBox, gateway: PaymentGatewayBox) -> Self {
        Self { store, gateway }
    }

    /// Requests a payment intent for a `Pending` reservation, tagging it with
    /// the reservation id as correlation metadata. The decimal total converts
    /// to minor units exactly; two-decimal pricing makes this lossless.
    pub async fn create_intent(&self, id: ReservationId) -> Result<PaymentIntent> {
        let reservation = self
            .store
            .get(id)
            .await?
            .ok_or(BookingError::ReservationNotFound(id))?;

        if reservation.status != ReservationStatus::Pending {
            return Err(BookingError::InvalidState {
                id,
                status: reservation.status,
            });
        }

        let amount_minor = money::minor_units(reservation.total_price)?;
        let intent = self
            .gateway
            .create_intent(IntentRequest {
                reservation: id,
                amount_minor,
                currency: CURRENCY,
            })
            .await?;
        tracing::info!(
            reservation = %id,
            amount = amount_minor,
            currency = CURRENCY,
            "payment intent created"
        );
        Ok(intent)
    }
}
