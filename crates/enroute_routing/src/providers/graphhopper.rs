use std::time::Duration;

use async_trait::async_trait;
use enroute_geo::{Coordinate, decode_polyline};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::RoutingConfig,
    error::ProviderError,
    provider::RouteProvider,
    providers::{build_http_client, read_success_body},
    route_result::{ProviderRoute, meters_to_km, millis_to_minutes},
};

pub const GRAPHHOPPER_ROUTE_API_PATH: &str = "/route";

/// The route is always requested for a car.
const DRIVING_PROFILE: &str = "car";

#[derive(Deserialize)]
struct GraphHopperRouteResponse {
    #[serde(default)]
    paths: Vec<GraphHopperPath>,
}

#[derive(Deserialize)]
struct GraphHopperPath {
    /// Meters
    distance: f64,

    /// Milliseconds
    time: f64,

    /// Encoded polyline, only present with `points_encoded=true`
    points: String,
}

pub struct GraphHopperRouteClientParams {
    pub url: String,
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl From<&RoutingConfig> for GraphHopperRouteClientParams {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            url: config.graphhopper_url.clone(),
            api_key: config.graphhopper_api_key.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout,
        }
    }
}

pub struct GraphHopperRouteClient {
    params: GraphHopperRouteClientParams,
    client: reqwest::Client,
}

impl GraphHopperRouteClient {
    pub fn new(params: GraphHopperRouteClientParams) -> Result<Self, ProviderError> {
        let client = build_http_client(&params.user_agent, params.timeout)?;
        Ok(Self { params, client })
    }

    fn query(&self, origin: Coordinate, destination: Coordinate) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("point", format!("{},{}", origin.latitude, origin.longitude)),
            (
                "point",
                format!("{},{}", destination.latitude, destination.longitude),
            ),
            ("profile", String::from(DRIVING_PROFILE)),
            ("points_encoded", String::from("true")),
            ("instructions", String::from("false")),
        ];

        if let Some(key) = &self.params.api_key {
            query.push(("key", key.clone()));
        }

        query
    }
}

#[async_trait]
impl RouteProvider for GraphHopperRouteClient {
    fn name(&self) -> &str {
        "graphhopper"
    }

    #[tracing::instrument(skip(self))]
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ProviderRoute, ProviderError> {
        let url = format!(
            "{}{}",
            self.params.url.trim_end_matches('/'),
            GRAPHHOPPER_ROUTE_API_PATH
        );

        let response = self
            .client
            .get(url)
            .query(&self.query(origin, destination))
            .send()
            .await?;

        let body = read_success_body(response).await?;
        debug!("GraphHopperApi: received {} bytes", body.len());

        parse_route_response(&body)
    }
}

fn parse_route_response(body: &str) -> Result<ProviderRoute, ProviderError> {
    let response: GraphHopperRouteResponse = serde_json::from_str(body)?;
    let path = response
        .paths
        .into_iter()
        .next()
        .ok_or(ProviderError::NoRoute)?;

    let decoded = decode_polyline(&path.points);
    if decoded.truncated {
        warn!(
            "GraphHopperApi: truncated polyline, keeping {} decoded points",
            decoded.coordinates.len()
        );
    }

    if decoded.coordinates.is_empty() {
        return Err(ProviderError::IncompleteResponse(String::from(
            "path has no decodable points",
        )));
    }

    Ok(ProviderRoute {
        distance_km: meters_to_km(path.distance),
        duration_min: millis_to_minutes(path.time),
        path: decoded.coordinates,
    })
}
