pub mod chain;
pub mod config;
pub mod error;
pub mod fallback;
pub mod provider;
pub mod providers;
pub mod route_result;

pub use chain::{RouteProviderChain, RouteProviderChainBuilder};
pub use config::RoutingConfig;
pub use error::{FailureKind, ProviderError};
pub use fallback::{Direction, FallbackRoute, FallbackRouter};
pub use provider::RouteProvider;
pub use route_result::{ProviderRoute, RouteResult, RouteSource};
