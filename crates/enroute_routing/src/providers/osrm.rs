use std::time::Duration;

use async_trait::async_trait;
use enroute_geo::Coordinate;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::RoutingConfig,
    error::ProviderError,
    provider::RouteProvider,
    providers::{build_http_client, read_success_body},
    route_result::{ProviderRoute, meters_to_km, seconds_to_minutes},
};

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/driving/";

#[derive(Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters
    distance: f64,

    /// Seconds
    duration: f64,

    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    /// [lon, lat] pairs
    coordinates: Vec<[f64; 2]>,
}

pub struct OsrmRouteClientParams {
    pub osrm_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl From<&RoutingConfig> for OsrmRouteClientParams {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            osrm_url: config.osrm_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout,
        }
    }
}

/// Driving routes from an OSRM server, geometry requested as GeoJSON.
pub struct OsrmRouteClient {
    params: OsrmRouteClientParams,
    client: reqwest::Client,
}

impl OsrmRouteClient {
    pub fn new(params: OsrmRouteClientParams) -> Result<Self, ProviderError> {
        let client = build_http_client(&params.user_agent, params.timeout)?;
        Ok(Self { params, client })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        let mut url = self.params.osrm_url.trim_end_matches('/').to_string();
        url.push_str(OSRM_ROUTE_API_PATH);
        url.push_str(&format!(
            "{},{};{},{}",
            origin.longitude, origin.latitude, destination.longitude, destination.latitude
        ));
        url
    }
}

#[async_trait]
impl RouteProvider for OsrmRouteClient {
    fn name(&self) -> &str {
        "osrm"
    }

    #[tracing::instrument(skip(self))]
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ProviderRoute, ProviderError> {
        let response = self
            .client
            .get(self.route_url(origin, destination))
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let body = read_success_body(response).await?;
        debug!("OSRM: received {} bytes", body.len());

        parse_route_response(&body)
    }
}

fn parse_route_response(body: &str) -> Result<ProviderRoute, ProviderError> {
    let response: OsrmRouteResponse = serde_json::from_str(body)?;
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(ProviderError::NoRoute)?;

    let path: Vec<Coordinate> = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| Coordinate::new(lat, lon))
        .collect();

    if path.is_empty() {
        return Err(ProviderError::IncompleteResponse(String::from(
            "route geometry has no coordinates",
        )));
    }

    Ok(ProviderRoute {
        distance_km: meters_to_km(route.distance),
        duration_min: seconds_to_minutes(route.duration),
        path,
    })
}
