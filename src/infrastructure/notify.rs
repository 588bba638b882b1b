use crate::domain::ports::ConfirmationNotifier;
use crate::domain::reservation::{Reservation, ReservationId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Notifier adapter that records confirmations in the log. The real mail
/// collaborator lives outside this crate.
#[derive(Default, Clone)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConfirmationNotifier for TracingNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> Result<()> {
        tracing::info!(
            reservation = %reservation.id,
            owner = %reservation.owner,
            check_in = %reservation.check_in,
            total = %reservation.total_price,
            "confirmation notification sent"
        );
        Ok(())
    }
}

/// Test double that records which reservations were confirmed.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    confirmed: Arc<Mutex<Vec<ReservationId>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn confirmed(&self) -> Vec<ReservationId> {
        self.confirmed.lock().await.clone()
    }
}

#[async_trait]
impl ConfirmationNotifier for RecordingNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> Result<()> {
        self.confirmed.lock().await.push(reservation.id);
        Ok(())
    }
}
