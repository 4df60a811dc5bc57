pub mod clock;
pub mod error;
pub mod ledger;
pub mod location;
pub mod rendezvous;
pub mod store;
pub mod tracker;
pub mod trip;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LocationError, StoreError, TripError};
pub use ledger::TripLedger;
pub use location::{LocationSource, PositionSample, WatchOptions};
pub use rendezvous::Rendezvous;
pub use store::{
    JsonFileStore, KeyValueStore, MemoryStore, TRIP_HISTORY_BACKUP_KEY, TRIP_HISTORY_KEY,
};
pub use tracker::{LocationTracker, PositionUpdates, TrackerState};
pub use trip::{Role, Trip, TripHistory};
