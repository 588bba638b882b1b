use crate::domain::pricing;
use crate::domain::ports::{ReservationStoreBox, RoomCatalogBox};
use crate::domain::reservation::{
    NewReservation, Principal, Reservation, ReservationId, ReservationStatus,
};
use crate::domain::room::{RoomType, RoomTypeId};
use crate::error::{BookingError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wire shape of a create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub room_type_id: RoomTypeId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: u32,
    pub guest_names: Vec<String>,
}

/// Reservation detail view with hotel fields resolved through the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetail {
    pub id: ReservationId,
    pub status: ReservationStatus,
    pub total_price: Decimal,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: u32,
    pub guest_names: Vec<String>,
    pub hotel_name: String,
    pub hotel_city: String,
    pub hotel_image: String,
    pub room_id: RoomTypeId,
}

impl ReservationDetail {
    fn assemble(reservation: &Reservation, room: &RoomType) -> Self {
        Self {
            id: reservation.id,
            status: reservation.status,
            total_price: reservation.total_price,
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            guest_count: reservation.guest_count,
            guest_names: reservation.guest_names.clone(),
            hotel_name: room.hotel.name.clone(),
            hotel_city: room.hotel.city.clone(),
            hotel_image: room.hotel.image.clone(),
            room_id: room.id,
        }
    }
}

/// The reservation lifecycle controller.
///
/// Every operation takes the requesting [`Principal`] explicitly; the service
/// carries no ambient session state. Status mutations go through the entity's
/// transition table and the store's compare-and-swap, so a concurrent webhook
/// confirmation and a cancel resolve to exactly one outcome.
pub struct ReservationService {
    store: ReservationStoreBox,
    catalog: RoomCatalogBox,
}

impl ReservationService {
    pub fn new(store: ReservationStoreBox, catalog: RoomCatalogBox) -> Self {
        Self { store, catalog }
    }

    /// Validates the request, computes the price, and persists a `Pending`
    /// reservation through the store's atomic check-and-reserve.
    pub async fn create(
        &self,
        principal: &Principal,
        request: BookingRequest,
    ) -> Result<ReservationDetail> {
        let room = self.resolve_room(request.room_type_id).await?;
        let total_price = Self::validate_and_price(&request, &room)?;

        let new = NewReservation {
            owner: principal.clone(),
            room_type: room.id,
            check_in: request.check_in,
            check_out: request.check_out,
            guest_count: request.guest_count,
            guest_names: request.guest_names,
            total_price,
        };
        let reservation = self.store.reserve(new, room.total_inventory).await?;
        tracing::info!(
            reservation = %reservation.id,
            owner = %principal,
            room_type = %room.id,
            total = %total_price,
            "reservation created"
        );
        Ok(ReservationDetail::assemble(&reservation, &room))
    }

    /// Re-runs the full validation and pricing against the (possibly new)
    /// room type. Only legal while the reservation is `Pending`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: ReservationId,
        request: BookingRequest,
    ) -> Result<ReservationDetail> {
        let reservation = self.load_owned(principal, id).await?;
        reservation.ensure_editable()?;

        let room = self.resolve_room(request.room_type_id).await?;
        let total_price = Self::validate_and_price(&request, &room)?;

        let expected_version = reservation.version;
        let mut updated = reservation;
        updated.room_type = room.id;
        updated.check_in = request.check_in;
        updated.check_out = request.check_out;
        updated.guest_count = request.guest_count;
        updated.guest_names = request.guest_names;
        updated.total_price = total_price;

        let stored = self
            .store
            .revise(updated, expected_version, room.total_inventory)
            .await?;
        tracing::info!(reservation = %stored.id, owner = %principal, "reservation updated");
        Ok(ReservationDetail::assemble(&stored, &room))
    }

    /// Transitions to `Cancelled` from `Pending` or `Confirmed`. `Cancelled`
    /// is terminal; cancelling again is an invalid-state error.
    pub async fn cancel(&self, principal: &Principal, id: ReservationId) -> Result<ReservationDetail> {
        let mut reservation = self.load_owned(principal, id).await?;
        let expected_version = reservation.version;
        reservation.cancel()?;
        let stored = self.store.update(reservation, expected_version).await?;
        tracing::info!(reservation = %stored.id, owner = %principal, "reservation cancelled");
        let room = self.resolve_room(stored.room_type).await?;
        Ok(ReservationDetail::assemble(&stored, &room))
    }

    /// Removes a reservation outright; only legal while `Pending`.
    pub async fn delete(&self, principal: &Principal, id: ReservationId) -> Result<()> {
        let reservation = self.load_owned(principal, id).await?;
        reservation.ensure_editable()?;
        self.store.remove(id, reservation.version).await?;
        tracing::info!(reservation = %id, owner = %principal, "reservation deleted");
        Ok(())
    }

    pub async fn get(&self, principal: &Principal, id: ReservationId) -> Result<ReservationDetail> {
        let reservation = self.load_owned(principal, id).await?;
        let room = self.resolve_room(reservation.room_type).await?;
        Ok(ReservationDetail::assemble(&reservation, &room))
    }

    /// All reservations owned by the principal, as detail views.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<ReservationDetail>> {
        let reservations = self.store.list_by_owner(principal).await?;
        let mut details = Vec::with_capacity(reservations.len());
        for reservation in &reservations {
            let room = self.resolve_room(reservation.room_type).await?;
            details.push(ReservationDetail::assemble(reservation, &room));
        }
        Ok(details)
    }

    fn validate_and_price(request: &BookingRequest, room: &RoomType) -> Result<Decimal> {
        pricing::validate_capacity(request.guest_count, room.capacity)?;
        pricing::validate_guest_names(&request.guest_names)?;
        let nights = pricing::nights_between(request.check_in, request.check_out)?;
        pricing::total_for_stay(room.rate, nights)
    }

    async fn resolve_room(&self, id: RoomTypeId) -> Result<RoomType> {
        self.catalog
            .room_type(id)
            .await?
            .ok_or(BookingError::RoomTypeNotFound(id))
    }

    async fn load_owned(&self, principal: &Principal, id: ReservationId) -> Result<Reservation> {
        let reservation = self
            .store
            .get(id)
            .await?
            .ok_or(BookingError::ReservationNotFound(id))?;
        reservation.ensure_owned_by(principal)?;
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Rate;
    use crate::domain::room::HotelSummary;
    use crate::infrastructure::in_memory::{InMemoryReservationStore, InMemoryRoomCatalog};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn room(id: u64, capacity: u32, rate: Decimal, inventory: u32) -> RoomType {
        RoomType {
            id: RoomTypeId(id),
            capacity,
            rate: Rate::new(rate).unwrap(),
            total_inventory: inventory,
            hotel: HotelSummary {
                name: "Grand Plaza".into(),
                city: "Madrid".into(),
                image: "plaza.jpg".into(),
            },
        }
    }

    fn service() -> ReservationService {
        let store = InMemoryReservationStore::new();
        let catalog = InMemoryRoomCatalog::new(vec![
            room(1, 2, dec!(250.00), 5),
            room(2, 4, dec!(199.00), 1),
        ]);
        ReservationService::new(Box::new(store), Box::new(catalog))
    }

    fn request(room_id: u64) -> BookingRequest {
        BookingRequest {
            room_type_id: RoomTypeId(room_id),
            check_in: date(2025, 11, 10),
            check_out: date(2025, 11, 15),
            guest_count: 2,
            guest_names: vec!["Alice".into(), "Bob".into()],
        }
    }

    fn alice() -> Principal {
        Principal::User("alice".into())
    }

    #[tokio::test]
    async fn test_create_prices_exactly() {
        let svc = service();
        let detail = svc.create(&alice(), request(1)).await.unwrap();
        assert_eq!(detail.status, ReservationStatus::Pending);
        assert_eq!(detail.total_price, dec!(1250.00));
        assert_eq!(detail.hotel_name, "Grand Plaza");
        assert_eq!(detail.hotel_city, "Madrid");
        assert_eq!(detail.room_id, RoomTypeId(1));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_dates() {
        let svc = service();
        let mut req = request(1);
        req.check_out = req.check_in;
        assert!(matches!(
            svc.create(&alice(), req).await,
            Err(BookingError::InvalidDateRange)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_over_capacity() {
        let svc = service();
        let mut req = request(1);
        req.guest_count = 3;
        assert!(matches!(
            svc.create(&alice(), req).await,
            Err(BookingError::CapacityExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_unknown_room() {
        let svc = service();
        assert!(matches!(
            svc.create(&alice(), request(99)).await,
            Err(BookingError::RoomTypeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_recomputes_price() {
        let svc = service();
        let created = svc.create(&alice(), request(1)).await.unwrap();

        let mut req = request(2);
        req.check_out = date(2025, 11, 12); // 2 nights at 199.00
        let updated = svc.update(&alice(), created.id, req).await.unwrap();
        assert_eq!(updated.total_price, dec!(398.00));
        assert_eq!(updated.room_id, RoomTypeId(2));
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let svc = service();
        let created = svc.create(&alice(), request(1)).await.unwrap();
        let err = svc
            .update(&Principal::User("mallory".into()), created.id, request(1))
            .await;
        assert!(matches!(err, Err(BookingError::NotAuthorized)));
    }

    #[tokio::test]
    async fn test_cancel_then_edit_fails() {
        let svc = service();
        let created = svc.create(&alice(), request(1)).await.unwrap();
        let cancelled = svc.cancel(&alice(), created.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        assert!(matches!(
            svc.update(&alice(), created.id, request(1)).await,
            Err(BookingError::InvalidState { .. })
        ));
        // Cancelled is terminal: cancelling again is an error
        assert!(matches!(
            svc.cancel(&alice(), created.id).await,
            Err(BookingError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_pending_only() {
        let svc = service();
        let created = svc.create(&alice(), request(1)).await.unwrap();
        svc.delete(&alice(), created.id).await.unwrap();
        assert!(matches!(
            svc.get(&alice(), created.id).await,
            Err(BookingError::ReservationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_per_owner() {
        let svc = service();
        svc.create(&alice(), request(1)).await.unwrap();
        svc.create(&Principal::Session("tok_1".into()), request(1))
            .await
            .unwrap();

        let mine = svc.list(&alice()).await.unwrap();
        assert_eq!(mine.len(), 1);
        let theirs = svc.list(&Principal::Session("tok_1".into())).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_ne!(mine[0].id, theirs[0].id);
    }

    #[tokio::test]
    async fn test_inventory_exhaustion() {
        let svc = service();
        // Room 2 has a single unit
        svc.create(&alice(), request(2)).await.unwrap();
        assert!(matches!(
            svc.create(&alice(), request(2)).await,
            Err(BookingError::NoAvailability { .. })
        ));

        // Non-overlapping dates are fine
        let mut req = request(2);
        req.check_in = date(2025, 11, 15);
        req.check_out = date(2025, 11, 18);
        assert!(svc.create(&alice(), req).await.is_ok());
    }
}
