use std::time::Duration;

use jiff::SpanRelativeTo;
use tracing::warn;

pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_GRAPHHOPPER_URL: &str = "https://graphhopper.com/api/1";
pub const DEFAULT_USER_AGENT: &str = concat!("enroute/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

const OSRM_URL_ENV_VAR: &str = "ENROUTE_OSRM_URL";
const GRAPHHOPPER_URL_ENV_VAR: &str = "ENROUTE_GRAPHHOPPER_URL";
const GRAPHHOPPER_API_KEY_ENV_VAR: &str = "GRAPHHOPPER_API_KEY";
const USER_AGENT_ENV_VAR: &str = "ENROUTE_USER_AGENT";
const REQUEST_TIMEOUT_ENV_VAR: &str = "ENROUTE_REQUEST_TIMEOUT";

/// Read-only settings shared by the remote providers.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub osrm_url: String,
    pub graphhopper_url: String,
    pub graphhopper_api_key: Option<String>,
    pub user_agent: String,
    /// Upper bound for a single provider attempt.
    pub request_timeout: Duration,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            graphhopper_url: DEFAULT_GRAPHHOPPER_URL.to_string(),
            graphhopper_api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RoutingConfig {
    /// Overrides the defaults with whatever is set in the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(OSRM_URL_ENV_VAR) {
            config.osrm_url = url;
        }

        if let Some(url) = lookup(GRAPHHOPPER_URL_ENV_VAR) {
            config.graphhopper_url = url;
        }

        config.graphhopper_api_key = lookup(GRAPHHOPPER_API_KEY_ENV_VAR).filter(|k| !k.is_empty());

        if let Some(user_agent) = lookup(USER_AGENT_ENV_VAR) {
            config.user_agent = user_agent;
        }

        if let Some(timeout) = lookup(REQUEST_TIMEOUT_ENV_VAR) {
            match parse_duration(&timeout) {
                Ok(timeout) => config.request_timeout = timeout,
                Err(err) => warn!(
                    "Ignoring {}={:?}: {}, using {:?}",
                    REQUEST_TIMEOUT_ENV_VAR, timeout, err, config.request_timeout
                ),
            }
        }

        config
    }
}

/// Accepts `"8s"`, `"PT8S"`, `"1m 30s"` or a plain number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let signed = if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        duration
    } else if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        duration
    } else if let Ok(seconds) = input.trim().parse::<u64>() {
        jiff::SignedDuration::from_secs(seconds as i64)
    } else {
        return Err(String::from("Invalid duration"));
    };

    if signed.is_zero() || signed.is_negative() {
        return Err(String::from("Duration must be positive"));
    }

    Duration::try_from(signed).map_err(|err| err.to_string())
}
