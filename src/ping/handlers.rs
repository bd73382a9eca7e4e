// ICMP ping utility endpoints

use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError, ICMP};
use validator::Validate;

use crate::ping::models::{ManyPings, ManyPingsResponse, PingParams, SinglePing, SinglePingResponse};

/// Upper bound on hostnames per multi-ping request
const MAX_HOSTNAMES: usize = 50;

const MSG_TIMED_OUT: &str = "Timed out";
const MSG_INVALID_HOST: &str = "Name or service not known, invalid hostname";
const MSG_UNKNOWN: &str = "Unknown error";
const MSG_TOO_MANY: &str = "Too many hostnames. Maximum number is 50.";

async fn resolve(hostname: &str) -> Option<IpAddr> {
    // lookup_host needs a port; it is discarded after resolution
    let mut addrs = tokio::net::lookup_host((hostname, 0)).await.ok()?;
    addrs.next().map(|addr| addr.ip())
}

async fn ping_addr(addr: IpAddr, timeout: Duration) -> Result<Duration, SurgeError> {
    let config = match addr {
        IpAddr::V4(_) => Config::default(),
        IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
    };
    let client = Client::new(&config)?;
    let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
    pinger.timeout(timeout);

    let payload = [0u8; 56];
    let (_packet, rtt) = pinger.ping(PingSequence(0), &payload).await?;
    Ok(rtt)
}

/// Ping one hostname, mapping every failure mode to its legacy message.
pub async fn make_ping(hostname: &str, timeout: Duration) -> SinglePingResponse {
    let Some(addr) = resolve(hostname).await else {
        return SinglePingResponse {
            hostname: hostname.to_string(),
            live: false,
            delay: None,
            message: MSG_INVALID_HOST.to_string(),
        };
    };

    match ping_addr(addr, timeout).await {
        Ok(rtt) => {
            let delay = rtt.as_secs_f64() * 1000.0;
            SinglePingResponse {
                hostname: hostname.to_string(),
                live: true,
                delay: Some(delay),
                message: format!("Ping response in {} ms", delay),
            }
        }
        Err(SurgeError::Timeout { .. }) => SinglePingResponse {
            hostname: hostname.to_string(),
            live: false,
            delay: None,
            message: MSG_TIMED_OUT.to_string(),
        },
        Err(e) => {
            tracing::debug!("Ping to {} failed: {}", hostname, e);
            SinglePingResponse {
                hostname: hostname.to_string(),
                live: false,
                delay: None,
                message: MSG_UNKNOWN.to_string(),
            }
        }
    }
}

/// Filter a hostname list down to the set that will actually be pinged.
///
/// Duplicates are omitted (first occurrence kept); an over-long list is
/// rejected outright rather than truncated.
pub fn plan_pings(hostname_list: &[String]) -> Result<Vec<&str>, &'static str> {
    if hostname_list.len() > MAX_HOSTNAMES {
        return Err(MSG_TOO_MANY);
    }
    let mut seen = HashSet::new();
    Ok(hostname_list
        .iter()
        .map(String::as_str)
        .filter(|h| seen.insert(*h))
        .collect())
}

/// ICMP ping a single hostname or IP address
/// POST /v1/ping/single
#[utoipa::path(
    post,
    path = "/v1/ping/single",
    request_body = SinglePing,
    params(PingParams),
    responses(
        (status = 200, description = "Host is live", body = SinglePingResponse),
        (status = 400, description = "Host did not answer", body = SinglePingResponse)
    ),
    tag = "ping"
)]
pub async fn make_single_ping(
    Query(params): Query<PingParams>,
    Json(payload): Json<SinglePing>,
) -> Response {
    if payload.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Request validation failed" })),
        )
            .into_response();
    }

    let result = make_ping(&payload.hostname, Duration::from_secs(params.timeout)).await;
    if result.live {
        Json(result).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(result)).into_response()
    }
}

/// ICMP ping up to 50 hostnames concurrently.
///
/// `results` is not necessarily in the order of `hostname_list`; duplicated
/// hostnames are omitted.
/// POST /v1/ping/many
#[utoipa::path(
    post,
    path = "/v1/ping/many",
    request_body = ManyPings,
    params(PingParams),
    responses(
        (status = 200, description = "Aggregated ping results", body = ManyPingsResponse),
        (status = 400, description = "Too many hostnames")
    ),
    tag = "ping"
)]
pub async fn make_many_pings(
    Query(params): Query<PingParams>,
    Json(payload): Json<ManyPings>,
) -> Response {
    let hostnames = match plan_pings(&payload.hostname_list) {
        Ok(hostnames) => hostnames,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
                .into_response()
        }
    };

    let timeout = Duration::from_secs(params.timeout);
    let results =
        futures::future::join_all(hostnames.into_iter().map(|h| make_ping(h, timeout))).await;

    let live = results.iter().filter(|r| r.live).count();
    let not_live = results.len() - live;

    Json(ManyPingsResponse {
        live,
        not_live,
        results,
    })
    .into_response()
}
