//! Scheduling engine: the collaborators and policy shared by slot search and
//! route sequencing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulingPolicy;
use crate::defaults::DEFAULT_STORE_TIMEOUT_SECS;
use crate::error::SchedulingError;
use crate::services::civil_time::{calendar_for, CivilCalendar};
use crate::services::clock::{Clock, ClockGuard, SystemClock};
use crate::services::geocoding::Geocoder;
use crate::services::reservation::{NoReservations, ReservationLock};
use crate::services::route_order::{NearestNeighborOrderer, RouteOrderer};
use crate::services::store::AvailabilityStore;

/// Per-request cancellation and deadline applied to store calls
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub cancel: CancellationToken,
    pub timeout: Option<Duration>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            timeout: Some(Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS)),
        }
    }
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            timeout: Some(timeout),
        }
    }
}

pub struct SchedulingEngine {
    pub(crate) store: Arc<dyn AvailabilityStore>,
    pub(crate) geocoder: Arc<dyn Geocoder>,
    pub(crate) orderer: Arc<dyn RouteOrderer>,
    pub(crate) reservations: Arc<dyn ReservationLock>,
    pub(crate) calendar: Arc<dyn CivilCalendar>,
    pub(crate) guard: ClockGuard,
    pub(crate) policy: SchedulingPolicy,
}

impl SchedulingEngine {
    pub fn new(
        store: Arc<dyn AvailabilityStore>,
        geocoder: Arc<dyn Geocoder>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            store,
            geocoder,
            orderer: Arc::new(NearestNeighborOrderer),
            reservations: Arc::new(NoReservations),
            calendar: calendar_for(&policy),
            guard: ClockGuard::new(&policy.timezone, Arc::new(SystemClock)),
            policy,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.guard = ClockGuard::new(&self.policy.timezone, clock);
        self
    }

    pub fn with_orderer(mut self, orderer: Arc<dyn RouteOrderer>) -> Self {
        self.orderer = orderer;
        self
    }

    pub fn with_reservations(mut self, reservations: Arc<dyn ReservationLock>) -> Self {
        self.reservations = reservations;
        self
    }

    /// Run a store call under the request's cancellation token and deadline
    pub(crate) async fn call_store<T, F>(&self, opts: &CallOptions, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let work = async move {
            match opts.timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(SchedulingError::DeadlineExceeded(operation).into()),
                },
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = opts.cancel.cancelled() => Err(SchedulingError::Cancelled(operation).into()),
            result = work => result,
        }
    }
}
