/// External API clients module
use crate::domain::{BoundingBox, RawState};
use crate::errors::{AppError, AppResult, FeedError};
use crate::rules::UNKNOWN_CALLSIGN;
use crate::utils::{num, text};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

static NULL: Value = Value::Null;

/// Source of aircraft state vectors for an area
#[async_trait]
pub trait StateFeed: Send + Sync {
    /// States currently inside `bbox`. An empty list is a valid answer.
    async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<RawState>, FeedError>;
}

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout_seconds: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("airport-watch/0.1")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// OpenSky Network `states/all` client
pub struct OpenSkyClient {
    http_client: HttpClient,
    base_url: String,
}

impl OpenSkyClient {
    pub fn new(base_url: String, timeout_seconds: u64) -> AppResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout_seconds)?,
            base_url,
        })
    }
}

#[async_trait]
impl StateFeed for OpenSkyClient {
    async fn fetch_states(&self, bbox: &BoundingBox) -> Result<Vec<RawState>, FeedError> {
        let resp = self
            .http_client
            .get_client()
            .get(&self.base_url)
            .query(&[
                ("lamin", bbox.min_lat),
                ("lomin", bbox.min_lon),
                ("lamax", bbox.max_lat),
                ("lomax", bbox.max_lon),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let body = resp.bytes().await?;
        let json: Value =
            serde_json::from_slice(&body).map_err(|e| FeedError::Decode(e.to_string()))?;
        parse_states(&json)
    }
}

/// Decode a `states/all` body. Malformed rows are dropped.
pub fn parse_states(body: &Value) -> Result<Vec<RawState>, FeedError> {
    if !body.is_object() {
        return Err(FeedError::Decode("response is not a JSON object".to_string()));
    }

    let rows = match body.get("states") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(rows)) => rows,
        Some(_) => return Err(FeedError::Decode("`states` is not an array".to_string())),
    };

    let mut states = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match parse_state_row(row) {
            Ok(state) => states.push(state),
            Err(e) => debug!("skipping feed row {}: {}", i, e),
        }
    }
    Ok(states)
}

/// Positional state vector: 0 icao24, 1 callsign, 5 lon, 6 lat, 7 baro altitude,
/// 8 on_ground, 9 velocity, 10 true track, 11 vertical rate
pub fn parse_state_row(row: &Value) -> AppResult<RawState> {
    let fields = row
        .as_array()
        .ok_or_else(|| AppError::MalformedRecord("state row is not an array".to_string()))?;
    let field = |i: usize| fields.get(i).unwrap_or(&NULL);

    let icao24 = text(field(0))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::MalformedRecord("state row has no icao24".to_string()))?;

    Ok(RawState {
        icao24,
        callsign: text(field(1)).unwrap_or_else(|| UNKNOWN_CALLSIGN.to_string()),
        longitude: num(field(5)),
        latitude: num(field(6)),
        altitude_m: num(field(7)),
        on_ground: field(8).as_bool().unwrap_or(false),
        velocity_ms: num(field(9)),
        heading: num(field(10)),
        vertrate: num(field(11)),
    })
}
