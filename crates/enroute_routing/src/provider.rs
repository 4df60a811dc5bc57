use async_trait::async_trait;
use enroute_geo::Coordinate;

use crate::{error::ProviderError, route_result::ProviderRoute};

/// A remote routing service. Implementations hold only read-only configuration,
/// every call is independent.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ProviderRoute, ProviderError>;
}
