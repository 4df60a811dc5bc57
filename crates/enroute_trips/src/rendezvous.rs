use enroute_geo::{Coordinate, INTER_CITY_SPEED_KMH, eta_between};
use serde::Serialize;

/// Driver and rider positions converging on a pickup, with the current ETA estimate.
///
/// Moving either party refreshes the estimate with a straight-line guess at
/// [`INTER_CITY_SPEED_KMH`]. A routed estimate can replace it through
/// [`Rendezvous::set_estimated_minutes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendezvous {
    driver: Option<Coordinate>,
    rider: Option<Coordinate>,
    estimated_minutes: Option<u32>,
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo fixture around Kenitra.
    pub fn kenitra() -> Self {
        let mut rendezvous = Self::new();
        rendezvous.update_driver(Coordinate::new(34.261, -6.583));
        rendezvous.update_rider(Coordinate::new(34.2702, -6.5802));
        rendezvous
    }

    pub fn driver(&self) -> Option<Coordinate> {
        self.driver
    }

    pub fn rider(&self) -> Option<Coordinate> {
        self.rider
    }

    pub fn estimated_minutes(&self) -> Option<u32> {
        self.estimated_minutes
    }

    /// Both positions, driver first, once both are known.
    pub fn endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        self.driver.zip(self.rider)
    }

    pub fn update_driver(&mut self, position: Coordinate) -> Option<u32> {
        self.driver = Some(position);
        self.refresh_estimate()
    }

    pub fn update_rider(&mut self, position: Coordinate) -> Option<u32> {
        self.rider = Some(position);
        self.refresh_estimate()
    }

    pub fn set_estimated_minutes(&mut self, minutes: u32) {
        self.estimated_minutes = Some(minutes);
    }

    fn refresh_estimate(&mut self) -> Option<u32> {
        if let Ok(Some(minutes)) = eta_between(self.driver, self.rider, INTER_CITY_SPEED_KMH) {
            self.estimated_minutes = Some(minutes);
        }
        self.estimated_minutes
    }
}
