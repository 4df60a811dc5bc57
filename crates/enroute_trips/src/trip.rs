use enroute_geo::{Coordinate, distance_km};
use jiff::{
    SignedDuration, Timestamp, Zoned,
    civil::{Date, Time},
    tz::TimeZone,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Driver,
    #[serde(alias = "student")]
    Rider,
}

/// A journey between two instants. Immutable once it has an end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TripRecord")]
pub struct Trip {
    pub id: String,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Option<Time>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub duration_min: u32,
    pub distance_km: f64,
    pub start_location: Coordinate,
    /// The start location until the trip completes.
    pub end_location: Coordinate,
    pub role: Role,
}

/// Stored form of a [`Trip`]. Also reads records written before instants were kept:
/// `duration` / `distance` keys, `"HH:MM"` wall-clock times, an empty `endTime` and a
/// `userType` role. Such records are taken to be in UTC.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TripRecord {
    id: String,
    date: Date,
    #[serde(deserialize_with = "wall_clock")]
    start_time: Time,
    #[serde(default, deserialize_with = "optional_wall_clock")]
    end_time: Option<Time>,
    #[serde(default)]
    started_at: Option<Timestamp>,
    #[serde(default)]
    ended_at: Option<Timestamp>,
    #[serde(alias = "duration")]
    duration_min: f64,
    #[serde(alias = "distance")]
    distance_km: f64,
    start_location: Coordinate,
    end_location: Coordinate,
    #[serde(alias = "userType")]
    role: Role,
}

impl TryFrom<TripRecord> for Trip {
    type Error = jiff::Error;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        let duration_min = record.duration_min.round().max(0.0) as u32;

        let started_at = match record.started_at {
            Some(started_at) => started_at,
            None => record
                .date
                .to_datetime(record.start_time)
                .to_zoned(TimeZone::UTC)?
                .timestamp(),
        };

        let ended_at = match (record.ended_at, record.end_time) {
            (Some(ended_at), _) => Some(ended_at),
            (None, Some(_)) => Some(
                started_at.checked_add(SignedDuration::from_mins(i64::from(duration_min)))?,
            ),
            (None, None) => None,
        };

        Ok(Trip {
            id: record.id,
            date: record.date,
            start_time: record.start_time,
            end_time: record.end_time,
            started_at,
            ended_at,
            duration_min,
            distance_km: record.distance_km.max(0.0),
            start_location: record.start_location,
            end_location: record.end_location,
            role: record.role,
        })
    }
}

fn parse_wall_clock(input: &str) -> Result<Time, jiff::Error> {
    input
        .parse::<Time>()
        .or_else(|_| Time::strptime("%H:%M", input))
}

fn wall_clock<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    let input = String::deserialize(deserializer)?;
    parse_wall_clock(&input).map_err(serde::de::Error::custom)
}

fn optional_wall_clock<'de, D>(deserializer: D) -> Result<Option<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(input) if !input.trim().is_empty() => parse_wall_clock(&input)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl Trip {
    pub(crate) fn begin(role: Role, origin: Coordinate, now: &Zoned) -> Self {
        Trip {
            id: Uuid::new_v4().to_string(),
            date: now.date(),
            start_time: now.time(),
            end_time: None,
            started_at: now.timestamp(),
            ended_at: None,
            duration_min: 0,
            distance_km: 0.0,
            start_location: origin,
            end_location: origin,
            role,
        }
    }

    /// Straight-line distance from the start location, whole minutes rounded to nearest.
    pub(crate) fn complete(self, location: Coordinate, now: &Zoned) -> Self {
        let elapsed = now.timestamp().duration_since(self.started_at);
        let duration_min = (elapsed.as_secs_f64() / 60.0).round().max(0.0) as u32;

        Trip {
            end_time: Some(now.time()),
            ended_at: Some(now.timestamp()),
            duration_min,
            distance_km: distance_km(self.start_location, location),
            end_location: location,
            ..self
        }
    }

    pub fn is_completed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Completed trips, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripHistory(Vec<Trip>);

impl TripHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, trip: Trip) {
        self.0.push(trip);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trip> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&Trip> {
        self.0.last()
    }

    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &Trip> {
        self.0.iter().filter(move |trip| trip.role == role)
    }

    pub fn total_distance_km(&self) -> f64 {
        self.0.iter().map(|trip| trip.distance_km).sum()
    }

    pub fn total_duration_min(&self) -> u64 {
        self.0.iter().map(|trip| u64::from(trip.duration_min)).sum()
    }
}

impl<'a> IntoIterator for &'a TripHistory {
    type Item = &'a Trip;
    type IntoIter = std::slice::Iter<'a, Trip>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
