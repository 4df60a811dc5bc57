use std::time::Duration;

use enroute_geo::{Coordinate, distance_km};
use tracing::{debug, info, warn};

use crate::{
    config::{DEFAULT_REQUEST_TIMEOUT, RoutingConfig},
    error::ProviderError,
    fallback::{FallbackRouter, TRIVIAL_DISTANCE_KM},
    provider::RouteProvider,
    providers::{
        graphhopper::{GraphHopperRouteClient, GraphHopperRouteClientParams},
        osrm::{OsrmRouteClient, OsrmRouteClientParams},
    },
    route_result::{ProviderRoute, RouteResult, RouteSource},
};

struct ChainLink {
    source: RouteSource,
    provider: Box<dyn RouteProvider>,
}

/// Remote providers tried one after the other, in priority order, with the
/// [`FallbackRouter`] as the terminal link. A provider is attempted at most once per call.
pub struct RouteProviderChain {
    links: Vec<ChainLink>,
    fallback: FallbackRouter,
    attempt_timeout: Duration,
}

impl RouteProviderChain {
    pub fn builder() -> RouteProviderChainBuilder {
        RouteProviderChainBuilder::default()
    }

    /// OSRM as primary, GraphHopper as secondary.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, ProviderError> {
        let osrm = OsrmRouteClient::new(OsrmRouteClientParams::from(config))?;
        let graphhopper = GraphHopperRouteClient::new(GraphHopperRouteClientParams::from(config))?;

        Ok(Self::builder()
            .primary(osrm)
            .secondary(graphhopper)
            .attempt_timeout(config.request_timeout)
            .build())
    }

    /// Always yields a usable route: provider failures are logged and fall through.
    #[tracing::instrument(skip(self))]
    pub async fn get_route(&self, origin: Coordinate, destination: Coordinate) -> RouteResult {
        if distance_km(origin, destination) < TRIVIAL_DISTANCE_KM {
            debug!("origin is next to the destination, skipping remote providers");
            return self.fallback_route(origin, destination);
        }

        for link in &self.links {
            debug!("trying {:?} provider {}", link.source, link.provider.name());

            match self.attempt(link, origin, destination).await {
                Ok(route) => return RouteResult::new(route, link.source),
                Err(err) => warn!(
                    "{:?} provider {} failed ({:?}): {}",
                    link.source,
                    link.provider.name(),
                    err.kind(),
                    err
                ),
            }
        }

        info!("all remote providers failed, synthesizing route offline");
        self.fallback_route(origin, destination)
    }

    async fn attempt(
        &self,
        link: &ChainLink,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ProviderRoute, ProviderError> {
        let route = tokio::time::timeout(
            self.attempt_timeout,
            link.provider.route(origin, destination),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.attempt_timeout))??;

        if route.path.is_empty() {
            return Err(ProviderError::NoRoute);
        }

        Ok(route)
    }

    fn fallback_route(&self, origin: Coordinate, destination: Coordinate) -> RouteResult {
        let fallback = self.fallback.route(origin, destination);
        RouteResult::new(fallback.route, RouteSource::Fallback)
    }
}

pub struct RouteProviderChainBuilder {
    primary: Option<Box<dyn RouteProvider>>,
    secondary: Option<Box<dyn RouteProvider>>,
    attempt_timeout: Duration,
}

impl Default for RouteProviderChainBuilder {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
            attempt_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RouteProviderChainBuilder {
    pub fn primary(mut self, provider: impl RouteProvider + 'static) -> Self {
        self.primary = Some(Box::new(provider));
        self
    }

    pub fn secondary(mut self, provider: impl RouteProvider + 'static) -> Self {
        self.secondary = Some(Box::new(provider));
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn build(self) -> RouteProviderChain {
        let links = [
            (RouteSource::Primary, self.primary),
            (RouteSource::Secondary, self.secondary),
        ]
        .into_iter()
        .filter_map(|(source, provider)| provider.map(|provider| ChainLink { source, provider }))
        .collect();

        RouteProviderChain {
            links,
            fallback: FallbackRouter::new(),
            attempt_timeout: self.attempt_timeout,
        }
    }
}
