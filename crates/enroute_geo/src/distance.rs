use std::f64::consts::PI;

use crate::{coordinate::Coordinate, error::GeoError};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average speed assumed for straight-line estimates between two parties.
pub const INTER_CITY_SPEED_KMH: f64 = 30.0;

/// Average speed assumed by the offline route synthesis.
pub const FALLBACK_SPEED_KMH: f64 = 25.0;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

/// Great-circle distance in kilometers (haversine).
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    if from == to {
        return 0.0;
    }

    let lat1_rad = deg_to_rad(from.latitude);
    let lat2_rad = deg_to_rad(to.latitude);

    let delta_lat = deg_to_rad(to.latitude - from.latitude);
    let delta_lon = deg_to_rad(to.longitude - from.longitude);

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Sum of the distances between consecutive points.
pub fn path_length_km(path: &[Coordinate]) -> f64 {
    path.windows(2)
        .map(|pair| distance_km(pair[0], pair[1]))
        .sum()
}

/// Minutes needed to cover `distance_km` at `speed_kmh`, rounded to the nearest minute.
pub fn eta_minutes(distance_km: f64, speed_kmh: f64) -> Result<u32, GeoError> {
    if speed_kmh.is_nan() || speed_kmh <= 0.0 {
        return Err(GeoError::InvalidSpeed(speed_kmh));
    }

    Ok((distance_km / speed_kmh * 60.0).round().max(0.0) as u32)
}

/// Straight-line estimate between two optional positions. `None` while either end is unknown.
pub fn eta_between(
    from: Option<Coordinate>,
    to: Option<Coordinate>,
    speed_kmh: f64,
) -> Result<Option<u32>, GeoError> {
    match (from, to) {
        (Some(from), Some(to)) => eta_minutes(distance_km(from, to), speed_kmh).map(Some),
        _ => Ok(None),
    }
}
