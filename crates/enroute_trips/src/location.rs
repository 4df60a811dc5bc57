use async_trait::async_trait;
use enroute_geo::Coordinate;
use jiff::{SignedDuration, Timestamp};
use tokio::sync::mpsc;

use crate::error::LocationError;

pub const DEFAULT_MIN_DISTANCE_M: f64 = 10.0;
pub const DEFAULT_MIN_INTERVAL: SignedDuration = SignedDuration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub timestamp: Timestamp,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, timestamp: Timestamp) -> Self {
        PositionSample {
            coordinate,
            timestamp,
        }
    }
}

/// Spacing between two delivered samples. Both thresholds must be crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub min_distance_m: f64,
    pub min_interval: SignedDuration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

/// Platform positioning service.
///
/// The subscription opened by [`LocationSource::watch`] lives as long as the returned
/// receiver: dropping it cancels the subscription.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// One-shot fix. `None` when permission is refused or no fix is available.
    async fn current_position(&self) -> Option<Coordinate>;

    async fn watch(
        &self,
        options: WatchOptions,
    ) -> Result<mpsc::Receiver<PositionSample>, LocationError>;
}
