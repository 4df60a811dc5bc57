use enroute_geo::{Coordinate, GeoError};
use enroute_trips::Role;

/// `"34.261,-6.583"`, latitude first, range checked.
pub fn parse_coordinate(input: &str) -> Result<Coordinate, String> {
    input.parse().map_err(|err: GeoError| err.to_string())
}

pub fn parse_role(input: &str) -> Result<Role, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "driver" => Ok(Role::Driver),
        "rider" | "student" => Ok(Role::Rider),
        _ => Err(String::from("Expected driver or rider")),
    }
}

pub fn parse_speed(input: &str) -> Result<f64, String> {
    match input.parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => Ok(speed),
        _ => Err(String::from("Speed must be a positive number of km/h")),
    }
}
