//! Offline route synthesis used when no remote provider answers.
//!
//! The path is built from a hand-tuned waypoint template picked from the side the origin
//! lies on relative to the destination. Templates are stored as (Δlat, Δlon) offsets from
//! the destination so the synthesized path always ends exactly on it.

use enroute_geo::{Coordinate, FALLBACK_SPEED_KMH, distance_km, path_length_km};
use serde::{Deserialize, Serialize};

use crate::route_result::ProviderRoute;

/// Below this straight-line distance the route is the direct segment.
pub const TRIVIAL_DISTANCE_KM: f64 = 0.2;

/// Per-axis offset (about 330 m) beyond which the origin counts as lying on one side.
pub const DIRECTION_THRESHOLD_DEG: f64 = 0.003;

pub const CONGESTION_FACTOR: f64 = 1.3;

pub const MIN_DURATION_MIN: u32 = 2;

type Offset = (f64, f64);

// The first entry of each template is a generic entry point and is replaced by the origin.
const NORTH_TEMPLATE: &[Offset] = &[
    (0.0100, 0.0008),
    (0.0062, 0.0011),
    (0.0041, 0.0016),
    (0.0023, 0.0009),
    (0.0009, 0.0004),
    (0.0, 0.0),
];

const SOUTH_TEMPLATE: &[Offset] = &[
    (-0.0100, -0.0006),
    (-0.0064, -0.0012),
    (-0.0038, -0.0015),
    (-0.0019, -0.0007),
    (-0.0008, -0.0002),
    (0.0, 0.0),
];

const EAST_TEMPLATE: &[Offset] = &[
    (0.0004, 0.0110),
    (0.0009, 0.0071),
    (0.0013, 0.0044),
    (0.0006, 0.0021),
    (0.0002, 0.0008),
    (0.0, 0.0),
];

const WEST_TEMPLATE: &[Offset] = &[
    (-0.0003, -0.0110),
    (-0.0010, -0.0069),
    (-0.0012, -0.0040),
    (-0.0005, -0.0019),
    (-0.0001, -0.0007),
    (0.0, 0.0),
];

const CENTER_TEMPLATE: &[Offset] = &[
    (0.0015, -0.0015),
    (0.0009, -0.0006),
    (0.0003, -0.0002),
    (0.0, 0.0),
];

/// Side of the destination the origin lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Center,
}

impl Direction {
    /// Checks are made in the order North, South, East, West; the first match wins.
    pub fn of(origin: Coordinate, destination: Coordinate) -> Direction {
        if origin.latitude > destination.latitude + DIRECTION_THRESHOLD_DEG {
            Direction::North
        } else if origin.latitude < destination.latitude - DIRECTION_THRESHOLD_DEG {
            Direction::South
        } else if origin.longitude > destination.longitude + DIRECTION_THRESHOLD_DEG {
            Direction::East
        } else if origin.longitude < destination.longitude - DIRECTION_THRESHOLD_DEG {
            Direction::West
        } else {
            Direction::Center
        }
    }

    fn template(self) -> &'static [Offset] {
        match self {
            Direction::North => NORTH_TEMPLATE,
            Direction::South => SOUTH_TEMPLATE,
            Direction::East => EAST_TEMPLATE,
            Direction::West => WEST_TEMPLATE,
            Direction::Center => CENTER_TEMPLATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRoute {
    /// `None` when the origin was close enough for a direct segment.
    pub direction: Option<Direction>,
    pub route: ProviderRoute,
}

/// Deterministic, I/O free router. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRouter;

impl FallbackRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn direction(&self, origin: Coordinate, destination: Coordinate) -> Direction {
        Direction::of(origin, destination)
    }

    pub fn route(&self, origin: Coordinate, destination: Coordinate) -> FallbackRoute {
        if distance_km(origin, destination) < TRIVIAL_DISTANCE_KM {
            return FallbackRoute {
                direction: None,
                route: route_along(vec![origin, destination]),
            };
        }

        let direction = Direction::of(origin, destination);

        let mut path = Vec::with_capacity(direction.template().len());
        path.push(origin);
        path.extend(
            direction
                .template()
                .iter()
                .skip(1)
                .map(|(d_lat, d_lon)| {
                    Coordinate::wrapped(destination.latitude + d_lat, destination.longitude + d_lon)
                }),
        );

        FallbackRoute {
            direction: Some(direction),
            route: route_along(path),
        }
    }
}

fn route_along(path: Vec<Coordinate>) -> ProviderRoute {
    let distance_km = path_length_km(&path);

    ProviderRoute {
        distance_km,
        duration_min: fallback_duration_min(distance_km),
        path,
    }
}

/// Travel time at the fallback speed inflated by the congestion factor, never below the floor.
pub fn fallback_duration_min(distance_km: f64) -> u32 {
    let minutes = (distance_km / FALLBACK_SPEED_KMH * 60.0 * CONGESTION_FACTOR).round();
    (minutes.max(0.0) as u32).max(MIN_DURATION_MIN)
}
