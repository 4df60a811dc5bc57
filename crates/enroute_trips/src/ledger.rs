use enroute_geo::Coordinate;
use jiff::{Zoned, tz::TimeZone};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    error::{StoreError, TripError},
    store::{KeyValueStore, TRIP_HISTORY_BACKUP_KEY, TRIP_HISTORY_KEY},
    trip::{Role, Trip, TripHistory},
};

/// Tracks the trip in progress and the history of completed ones.
///
/// The whole history is written back to the store under [`TRIP_HISTORY_KEY`] every time a
/// trip completes. A failed write is logged and never undoes the in-memory state.
pub struct TripLedger<S, C = SystemClock> {
    store: S,
    clock: C,
    time_zone: TimeZone,
    active: Option<Trip>,
    history: TripHistory,
}

impl<S: KeyValueStore> TripLedger<S, SystemClock> {
    pub fn open(store: S) -> Result<Self, StoreError> {
        Self::load(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TripLedger<S, C> {
    /// Empty ledger. Whatever the store holds is left untouched until the next write.
    pub fn new(store: S, clock: C) -> Self {
        TripLedger {
            store,
            clock,
            time_zone: TimeZone::system(),
            active: None,
            history: TripHistory::new(),
        }
    }

    /// Ledger seeded with the persisted history. A history that no longer deserializes is
    /// copied to [`TRIP_HISTORY_BACKUP_KEY`] and the ledger starts empty.
    pub fn load(store: S, clock: C) -> Result<Self, StoreError> {
        let history = match store.get(TRIP_HISTORY_KEY)? {
            Some(value) => match TripHistory::deserialize(&value) {
                Ok(history) => history,
                Err(err) => {
                    warn!(
                        "unreadable trip history moved to {}: {}",
                        TRIP_HISTORY_BACKUP_KEY, err
                    );
                    store.put(TRIP_HISTORY_BACKUP_KEY, value)?;
                    TripHistory::new()
                }
            },
            None => TripHistory::new(),
        };

        debug!("loaded {} completed trips", history.len());

        Ok(TripLedger {
            history,
            ..Self::new(store, clock)
        })
    }

    /// Time zone used for the civil date and times recorded on trips.
    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn active_trip(&self) -> Option<&Trip> {
        self.active.as_ref()
    }

    pub fn history(&self) -> &TripHistory {
        &self.history
    }

    pub fn start_trip(
        &mut self,
        role: Role,
        current_location: Option<Coordinate>,
    ) -> Result<&Trip, TripError> {
        let origin = current_location.ok_or(TripError::NoActiveLocation)?;
        if self.active.is_some() {
            return Err(TripError::TripAlreadyActive);
        }

        let trip = Trip::begin(role, origin, &self.now());
        info!("trip {} started as {:?}", trip.id, role);

        Ok(self.active.insert(trip))
    }

    /// Closes the active trip and appends it to the history.
    pub fn end_trip(&mut self, current_location: Option<Coordinate>) -> Result<&Trip, TripError> {
        if self.active.is_none() {
            return Err(TripError::NoActiveTrip);
        }
        let location = current_location.ok_or(TripError::NoActiveLocation)?;
        let trip = self.active.take().ok_or(TripError::NoActiveTrip)?;

        let trip = trip.complete(location, &self.now());
        info!(
            "trip {} completed: {:.2} km in {} min",
            trip.id, trip.distance_km, trip.duration_min
        );

        self.history.push(trip);
        if let Err(err) = self.persist() {
            error!("failed to persist trip history: {}", err);
        }

        self.history.last().ok_or(TripError::NoActiveTrip)
    }

    /// Forgets every completed trip, in memory and in the store. The active trip is kept.
    pub fn clear_history(&mut self) -> Result<(), StoreError> {
        self.history.clear();
        self.store.remove(TRIP_HISTORY_KEY)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let value = serde_json::to_value(&self.history)?;
        self.store.put(TRIP_HISTORY_KEY, value)
    }

    fn now(&self) -> Zoned {
        self.clock.now().to_zoned(self.time_zone.clone())
    }
}
