use super::payment::{IntentRequest, PaymentIntent};
use super::reservation::{NewReservation, Principal, Reservation, ReservationId};
use super::room::{RoomType, RoomTypeId};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence port for reservations.
///
/// Mutations are transactional read-check-write: `reserve` and `revise` bundle
/// the availability check with the write, and `update`/`remove` compare the
/// caller's `expected_version` against the stored one, failing with
/// `ConcurrentUpdate` on a lost race.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Atomic check-and-reserve: refuses with `NoAvailability` when the count
    /// of date-overlapping, non-cancelled reservations of the same room type
    /// has reached `inventory`. Allocates the identity, stores as `Pending`.
    async fn reserve(&self, new: NewReservation, inventory: u32) -> Result<Reservation>;

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>>;

    /// Compare-and-swap write; returns the stored reservation with its
    /// version bumped.
    async fn update(&self, updated: Reservation, expected_version: u64) -> Result<Reservation>;

    /// CAS write plus an availability re-check that excludes the reservation
    /// itself, for date/room edits.
    async fn revise(
        &self,
        updated: Reservation,
        expected_version: u64,
        inventory: u32,
    ) -> Result<Reservation>;

    /// CAS delete.
    async fn remove(&self, id: ReservationId, expected_version: u64) -> Result<()>;

    async fn list_by_owner(&self, owner: &Principal) -> Result<Vec<Reservation>>;
}

/// Read-only port onto the external room catalog.
#[async_trait]
pub trait RoomCatalog: Send + Sync {
    async fn room_type(&self, id: RoomTypeId) -> Result<Option<RoomType>>;
}

/// Port onto the external payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent>;
}

/// Fire-and-forget notification on payment confirmation.
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> Result<()>;
}

pub type ReservationStoreBox = Box<dyn ReservationStore>;
pub type RoomCatalogBox = Box<dyn RoomCatalog>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type ConfirmationNotifierBox = Box<dyn ConfirmationNotifier>;
