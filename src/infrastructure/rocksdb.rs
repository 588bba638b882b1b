use crate::domain::ports::ReservationStore;
use crate::domain::reservation::{
    NewReservation, Principal, Reservation, ReservationId, ReservationStatus,
};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for reservation records.
pub const CF_RESERVATIONS: &str = "reservations";
/// Column Family for store metadata (the id sequence).
pub const CF_META: &str = "meta";

const SEQ_KEY: &[u8] = b"seq";

/// A persistent reservation store backed by RocksDB.
///
/// Values are serde_json-encoded reservations keyed by big-endian id. All
/// mutations run under a process-wide write mutex, so check-and-reserve and
/// the version-checked writes stay atomic. `Clone` shares the underlying
/// `Arc<DB>` and the lock.
#[derive(Clone)]
pub struct RocksDbReservationStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbReservationStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_reservations = ColumnFamilyDescriptor::new(CF_RESERVATIONS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_reservations, cf_meta])?;
        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BookingError::Storage(format!("column family {name} not found")))
    }

    fn read(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let cf = self.cf(CF_RESERVATIONS)?;
        match self.db.get_cf(cf, id.0.to_be_bytes())? {
            Some(bytes) => {
                let reservation = serde_json::from_slice(&bytes).map_err(|e| {
                    BookingError::Storage(format!("failed to decode reservation {id}: {e}"))
                })?;
                Ok(Some(reservation))
            }
            None => Ok(None),
        }
    }

    fn write(&self, reservation: &Reservation) -> Result<()> {
        let cf = self.cf(CF_RESERVATIONS)?;
        let value = serde_json::to_vec(reservation).map_err(|e| {
            BookingError::Storage(format!("failed to encode reservation {}: {e}", reservation.id))
        })?;
        self.db.put_cf(cf, reservation.id.0.to_be_bytes(), value)?;
        Ok(())
    }

    fn next_id(&self) -> Result<ReservationId> {
        let cf = self.cf(CF_META)?;
        let current = match self.db.get_cf(cf, SEQ_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| BookingError::Storage("corrupt id sequence".to_string()))?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        self.db.put_cf(cf, SEQ_KEY, next.to_be_bytes())?;
        Ok(ReservationId(next))
    }

    fn scan(&self) -> Result<Vec<Reservation>> {
        let cf = self.cf(CF_RESERVATIONS)?;
        let mut reservations = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) =
                item.map_err(|e| BookingError::Storage(format!("iteration failed: {e}")))?;
            let reservation: Reservation = serde_json::from_slice(&value)
                .map_err(|e| BookingError::Storage(format!("failed to decode reservation: {e}")))?;
            reservations.push(reservation);
        }
        Ok(reservations)
    }

    fn active_overlaps(
        &self,
        room_type: crate::domain::room::RoomTypeId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> Result<u32> {
        let count = self
            .scan()?
            .into_iter()
            .filter(|r| {
                r.room_type == room_type
                    && r.status != ReservationStatus::Cancelled
                    && Some(r.id) != exclude
                    && r.overlaps(check_in, check_out)
            })
            .count();
        Ok(count as u32)
    }

    fn check_version(&self, id: ReservationId, expected_version: u64) -> Result<Reservation> {
        let current = self.read(id)?.ok_or(BookingError::ReservationNotFound(id))?;
        if current.version != expected_version {
            return Err(BookingError::ConcurrentUpdate);
        }
        Ok(current)
    }
}

#[async_trait]
impl ReservationStore for RocksDbReservationStore {
    async fn reserve(&self, new: NewReservation, inventory: u32) -> Result<Reservation> {
        let _guard = self.write_lock.lock().await;
        let taken = self.active_overlaps(new.room_type, new.check_in, new.check_out, None)?;
        if taken >= inventory {
            return Err(BookingError::NoAvailability {
                room_type: new.room_type,
            });
        }

        let reservation = Reservation {
            id: self.next_id()?,
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
        self.write(&reservation)?;
        Ok(reservation)
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>> {
        self.read(id)
    }

    async fn update(&self, updated: Reservation, expected_version: u64) -> Result<Reservation> {
        let _guard = self.write_lock.lock().await;
        self.check_version(updated.id, expected_version)?;
        let mut stored = updated;
        stored.version = expected_version + 1;
        self.write(&stored)?;
        Ok(stored)
    }

    async fn revise(
        &self,
        updated: Reservation,
        expected_version: u64,
        inventory: u32,
    ) -> Result<Reservation> {
        let _guard = self.write_lock.lock().await;
        self.check_version(updated.id, expected_version)?;
        let taken = self.active_overlaps(
            updated.room_type,
            updated.check_in,
            updated.check_out,
            Some(updated.id),
        )?;
        if taken >= inventory {
            return Err(BookingError::NoAvailability {
                room_type: updated.room_type,
            });
        }
        let mut stored = updated;
        stored.version = expected_version + 1;
        self.write(&stored)?;
        Ok(stored)
    }

    async fn remove(&self, id: ReservationId, expected_version: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.check_version(id, expected_version)?;
        let cf = self.cf(CF_RESERVATIONS)?;
        self.db.delete_cf(cf, id.0.to_be_bytes())?;
        Ok(())
    }

    async fn list_by_owner(&self, owner: &Principal) -> Result<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .scan()?
            .into_iter()
            .filter(|r| &r.owner == owner)
            .collect();
        reservations.sort_by_key(|r| r.id);
        Ok(reservations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::RoomTypeId;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn new_reservation() -> NewReservation {
        NewReservation {
            owner: Principal::User("alice".into()),
            room_type: RoomTypeId(1),
            check_in: date(10),
            check_out: date(15),
            guest_count: 2,
            guest_names: vec!["Alice".into()],
            total_price: dec!(1250.00),
        }
    }

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDbReservationStore::open(dir.path()).unwrap();
        assert!(store.db.cf_handle(CF_RESERVATIONS).is_some());
        assert!(store.db.cf_handle(CF_META).is_some());
    }

    #[tokio::test]
    async fn test_reserve_and_reload() {
        let dir = tempdir().unwrap();
        let store = RocksDbReservationStore::open(dir.path()).unwrap();

        let r = store.reserve(new_reservation(), 5).await.unwrap();
        assert_eq!(r.id, ReservationId(1));

        let loaded = store.get(r.id).await.unwrap().unwrap();
        assert_eq!(loaded, r);
        assert_eq!(loaded.total_price, dec!(1250.00));
    }

    #[tokio::test]
    async fn test_sequence_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDbReservationStore::open(dir.path()).unwrap();
            store.reserve(new_reservation(), 5).await.unwrap();
        }
        let store = RocksDbReservationStore::open(dir.path()).unwrap();
        let r = store.reserve(new_reservation(), 5).await.unwrap();
        assert_eq!(r.id, ReservationId(2));
    }

    #[tokio::test]
    async fn test_cas_update() {
        let dir = tempdir().unwrap();
        let store = RocksDbReservationStore::open(dir.path()).unwrap();
        let r = store.reserve(new_reservation(), 5).await.unwrap();

        let mut confirmed = r.clone();
        confirmed.confirm().unwrap();
        let stored = store.update(confirmed, r.version).await.unwrap();
        assert_eq!(stored.version, 1);

        let mut stale = r.clone();
        stale.cancel().unwrap();
        assert!(matches!(
            store.update(stale, r.version).await,
            Err(BookingError::ConcurrentUpdate)
        ));
    }

    #[tokio::test]
    async fn test_inventory_enforced() {
        let dir = tempdir().unwrap();
        let store = RocksDbReservationStore::open(dir.path()).unwrap();
        store.reserve(new_reservation(), 1).await.unwrap();
        assert!(matches!(
            store.reserve(new_reservation(), 1).await,
            Err(BookingError::NoAvailability { .. })
        ));
    }
}
