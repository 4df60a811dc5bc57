use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripError {
    #[error("No trip is in progress")]
    NoActiveTrip,

    #[error("A trip is already in progress")]
    TripAlreadyActive,

    #[error("Current location is unknown")]
    NoActiveLocation,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key {0:?}")]
    InvalidKey(String),
}
