use crate::domain::ports::{ReservationStore, RoomCatalog};
use crate::domain::reservation::{
    NewReservation, Principal, Reservation, ReservationId, ReservationStatus,
};
use crate::domain::room::{RoomType, RoomTypeId};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    seq: u64,
    reservations: HashMap<ReservationId, Reservation>,
}

impl Inner {
    /// Overlapping, non-cancelled reservations of `room_type`, optionally
    /// excluding one reservation (for edits against itself).
    fn active_overlaps(
        &self,
        room_type: RoomTypeId,
        check_in: chrono::NaiveDate,
        check_out: chrono::NaiveDate,
        exclude: Option<ReservationId>,
    ) -> u32 {
        self.reservations
            .values()
            .filter(|r| {
                r.room_type == room_type
                    && r.status != ReservationStatus::Cancelled
                    && Some(r.id) != exclude
                    && r.overlaps(check_in, check_out)
            })
            .count() as u32
    }
}

/// A thread-safe in-memory reservation store.
///
/// A single `Arc<RwLock<..>>` holds the id sequence and the map, so
/// check-and-reserve and the version-checked writes are atomic under the
/// write lock. `Clone` shares the underlying state, which is how one store
/// backs all three services.
#[derive(Default, Clone)]
pub struct InMemoryReservationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn reserve(&self, new: NewReservation, inventory: u32) -> Result<Reservation> {
        let mut inner = self.inner.write().await;
        let taken = inner.active_overlaps(new.room_type, new.check_in, new.check_out, None);
        if taken >= inventory {
            return Err(BookingError::NoAvailability {
                room_type: new.room_type,
            });
        }

        inner.seq += 1;
        let reservation = Reservation {
            id: ReservationId(inner.seq),
            owner: new.owner,
            room_type: new.room_type,
            check_in: new.check_in,
            check_out: new.check_out,
            guest_count: new.guest_count,
            guest_names: new.guest_names,
            total_price: new.total_price,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
            version: 0,
        };
        inner.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let inner = self.inner.read().await;
        Ok(inner.reservations.get(&id).cloned())
    }

    async fn update(&self, updated: Reservation, expected_version: u64) -> Result<Reservation> {
        let mut inner = self.inner.write().await;
        let current = inner
            .reservations
            .get(&updated.id)
            .ok_or(BookingError::ReservationNotFound(updated.id))?;
        if current.version != expected_version {
            return Err(BookingError::ConcurrentUpdate);
        }
        let mut stored = updated;
        stored.version = expected_version + 1;
        inner.reservations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn revise(
        &self,
        updated: Reservation,
        expected_version: u64,
        inventory: u32,
    ) -> Result<Reservation> {
        let mut inner = self.inner.write().await;
        let current = inner
            .reservations
            .get(&updated.id)
            .ok_or(BookingError::ReservationNotFound(updated.id))?;
        if current.version != expected_version {
            return Err(BookingError::ConcurrentUpdate);
        }
        let taken = inner.active_overlaps(
            updated.room_type,
            updated.check_in,
            updated.check_out,
            Some(updated.id),
        );
        if taken >= inventory {
            return Err(BookingError::NoAvailability {
                room_type: updated.room_type,
            });
        }
        let mut stored = updated;
        stored.version = expected_version + 1;
        inner.reservations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn remove(&self, id: ReservationId, expected_version: u64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let current = inner
            .reservations
            .get(&id)
            .ok_or(BookingError::ReservationNotFound(id))?;
        if current.version != expected_version {
            return Err(BookingError::ConcurrentUpdate);
        }
        inner.reservations.remove(&id);
        Ok(())
    }

    async fn list_by_owner(&self, owner: &Principal) -> Result<Vec<Reservation>> {
        let inner = self.inner.read().await;
        let mut reservations: Vec<Reservation> = inner
            .reservations
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| r.id);
        Ok(reservations)
    }
}

/// In-memory room catalog adapter, loadable from a JSON array of room types.
#[derive(Default, Clone)]
pub struct InMemoryRoomCatalog {
    rooms: Arc<HashMap<RoomTypeId, RoomType>>,
}

impl InMemoryRoomCatalog {
    pub fn new(rooms: Vec<RoomType>) -> Self {
        Self {
            rooms: Arc::new(rooms.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

#[async_trait]
impl RoomCatalog for InMemoryRoomCatalog {
    async fn room_type(&self, id: RoomTypeId) -> Result<Option<RoomType>> {
        Ok(self.rooms.get(&id).cloned())
    }
}
