// Ping request/response DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Single-hostname ping request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SinglePing {
    #[validate(length(min = 1, max = 1000))]
    pub hostname: String,
}

/// Multi-hostname ping request; duplicates are omitted
#[derive(Debug, Deserialize, ToSchema)]
pub struct ManyPings {
    pub hostname_list: Vec<String>,
}

/// Outcome of pinging one hostname
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SinglePingResponse {
    pub hostname: String,
    pub live: bool,
    /// Round-trip time in milliseconds when live
    pub delay: Option<f64>,
    pub message: String,
}

/// Aggregated outcome of a multi-hostname ping
#[derive(Debug, Serialize, ToSchema)]
pub struct ManyPingsResponse {
    pub live: usize,
    pub not_live: usize,
    pub results: Vec<SinglePingResponse>,
}

/// Timeout query parameter shared by both ping endpoints
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PingParams {
    /// Timeout in seconds for every ping
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    2
}
