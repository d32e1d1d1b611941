//! Exclusive section around writes to one technician's day.
//!
//! Searches read without locking, so two concurrent bookings can both see a
//! free slot. Writers that need a guarantee take a reservation for the
//! technician-day first; the backing mechanism lives outside the engine.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Held for the duration of a write. Dropping it releases the reservation.
pub struct ReservationGuard {
    held: Option<OwnedMutexGuard<()>>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl ReservationGuard {
    pub fn unlocked() -> Self {
        Self {
            held: None,
            on_release: None,
        }
    }
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        // Unlock first so the release hook sees the final reference count
        drop(self.held.take());
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

#[async_trait]
pub trait ReservationLock: Send + Sync {
    async fn acquire(&self, technician_id: Uuid, date: NaiveDate) -> Result<ReservationGuard>;
}

/// No exclusivity: concurrent writers are not detected
pub struct NoReservations;

#[async_trait]
impl ReservationLock for NoReservations {
    async fn acquire(&self, _technician_id: Uuid, _date: NaiveDate) -> Result<ReservationGuard> {
        Ok(ReservationGuard::unlocked())
    }
}

type SlotMap = HashMap<(Uuid, NaiveDate), Arc<tokio::sync::Mutex<()>>>;

/// Per-technician-day mutex, effective within one worker process only.
/// Entries live only while a holder or waiter exists.
#[derive(Default)]
pub struct LocalReservations {
    slots: Arc<Mutex<SlotMap>>,
}

impl LocalReservations {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots.lock().len()
    }
}

#[async_trait]
impl ReservationLock for LocalReservations {
    async fn acquire(&self, technician_id: Uuid, date: NaiveDate) -> Result<ReservationGuard> {
        let key = (technician_id, date);
        let slot = self.slots.lock().entry(key).or_default().clone();
        let held = slot.lock_owned().await;

        let slots = Arc::clone(&self.slots);
        let on_release = move || {
            let mut slots = slots.lock();
            // Waiters clone the entry under this lock, so a count of one means nobody else needs it
            if slots.get(&key).is_some_and(|entry| Arc::strong_count(entry) == 1) {
                slots.remove(&key);
            }
        };

        Ok(ReservationGuard {
            held: Some(held),
            on_release: Some(Box::new(on_release)),
        })
    }
}
