use enroute_geo::{Coordinate, encode_polyline};
use serde::{Deserialize, Serialize};

/// Which link of the provider chain produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Primary,
    Secondary,
    Fallback,
}

/// Route as produced by a single provider, before the chain tags it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub distance_km: f64,
    pub duration_min: u32,
    pub path: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance_km: f64,
    pub duration_min: u32,
    /// Ordered (lat, lon) points, never empty.
    pub path: Vec<Coordinate>,
    pub source_tag: RouteSource,
}

impl RouteResult {
    pub fn new(route: ProviderRoute, source_tag: RouteSource) -> Self {
        Self {
            distance_km: route.distance_km.max(0.0),
            duration_min: route.duration_min,
            path: route.path,
            source_tag,
        }
    }

    pub fn eta_minutes(&self) -> u32 {
        self.duration_min
    }

    pub fn encoded_path(&self) -> String {
        encode_polyline(&self.path)
    }
}

pub(crate) fn meters_to_km(meters: f64) -> f64 {
    meters / 1000.0
}

pub(crate) fn seconds_to_minutes(seconds: f64) -> u32 {
    (seconds / 60.0).round().max(0.0) as u32
}

pub(crate) fn millis_to_minutes(millis: f64) -> u32 {
    seconds_to_minutes(millis / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversions() {
        assert_eq!(meters_to_km(1520.0), 1.52);
        assert_eq!(seconds_to_minutes(89.0), 1);
        assert_eq!(seconds_to_minutes(91.0), 2);
        assert_eq!(millis_to_minutes(600_000.0), 10);
        assert_eq!(millis_to_minutes(29_000.0), 0);
    }

    #[test]
    fn source_tag_serializes_in_snake_case() {
        let result = RouteResult::new(
            ProviderRoute {
                distance_km: 1.0,
                duration_min: 3,
                path: vec![Coordinate::new(34.261, -6.583)],
            },
            RouteSource::Fallback,
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source_tag"], "fallback");
        assert_eq!(json["duration_min"], 3);
    }
}
