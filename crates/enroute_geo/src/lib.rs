pub mod coordinate;
pub mod distance;
pub mod error;
pub mod polyline;

pub use coordinate::Coordinate;
pub use distance::{
    FALLBACK_SPEED_KMH, INTER_CITY_SPEED_KMH, deg_to_rad, distance_km, eta_between, eta_minutes,
    path_length_km, rad_to_deg,
};
pub use error::GeoError;
pub use polyline::{
    DecodedPolyline, PolylineError, decode_polyline, decode_polyline_strict, encode_polyline,
};
