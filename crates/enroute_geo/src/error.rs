use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Speed must be strictly positive, got {0} km/h")]
    InvalidSpeed(f64),

    #[error("Coordinate out of range: {latitude},{longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Cannot parse coordinate from {0:?}, expected \"lat,lon\"")]
    Parse(String),
}
