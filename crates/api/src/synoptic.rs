//! Latest station observations from the Synoptic Data mesonet API.
//!
//! `GET {base}/stations/latest` returns:
//!
//! - `.SUMMARY.RESPONSE_CODE`, 1 on success, 2 when no station matched, anything else is an error
//!   such as a bad token (still sent with HTTP 200)
//! - `.SUMMARY.NUMBER_OF_OBJECTS`, the number of stations with a reading inside `within` minutes
//! - `.STATION[]` with `.STID`, `.NAME` and `.OBSERVATIONS`
//! - `.OBSERVATIONS.<field>.{value,date_time}` for each reported field, e.g. `air_temp_value_1`
//!
//! Stations without a recent reading are left out of `.STATION[]` entirely.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use serde_json::Value;
use std::{collections::HashMap, time::Duration};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{RawObservation, Variable};

pub const DEFAULT_SYNOPTIC_URL: &str = "https://api.synopticdata.com/v2/";
/// SDGE, HPWREN, SC-EDISON
pub const DEFAULT_NETWORKS: &str = "139,81,231";
pub const DEFAULT_WITHIN_MINUTES: u32 = 20;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("Error response from synoptic: {0}")]
    Status(StatusCode),
    #[error("Failed to decode synoptic response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Synoptic rejected the request with code {code}: {message}")]
    Rejected { code: i64, message: String },
}

/// Source of the latest observation per station.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Latest observation for each station that has one; others are omitted.
    async fn fetch_latest(
        &self,
        station_ids: &[String],
    ) -> Result<Vec<RawObservation>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct SynopticConfig {
    pub base_url: String,
    pub token: String,
    pub networks: String,
    pub within_minutes: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub user_agent: String,
}

pub struct SynopticClient {
    config: SynopticConfig,
    client: ClientWithMiddleware,
}

impl SynopticClient {
    pub fn new(config: SynopticConfig) -> Result<Self, FetchError> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            Client::builder()
                .user_agent(&config.user_agent)
                .timeout(config.timeout)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self { config, client })
    }

    fn latest_url(&self) -> String {
        format!(
            "{}/stations/latest",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ObservationSource for SynopticClient {
    async fn fetch_latest(
        &self,
        station_ids: &[String],
    ) -> Result<Vec<RawObservation>, FetchError> {
        if station_ids.is_empty() {
            return Ok(vec![]);
        }

        let url = self.latest_url();
        let stid = station_ids.join(",");
        let within = self.config.within_minutes.to_string();
        debug!("requesting: {} stid={}", url, stid);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("token", self.config.token.as_str()),
                ("within", within.as_str()),
                ("network", self.config.networks.as_str()),
                ("stid", stid.as_str()),
                ("obtimezone", "UTC"),
                ("output", "json"),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        let observations = parse_latest(&body)?;
        info!(
            "synoptic returned {} of {} requested stations",
            observations.len(),
            station_ids.len()
        );
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(rename = "SUMMARY", default)]
    summary: Summary,
    #[serde(rename = "STATION", default)]
    station: Vec<Station>,
}

const RESPONSE_OK: i64 = 1;
const RESPONSE_NO_RESULTS: i64 = 2;

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(rename = "NUMBER_OF_OBJECTS")]
    number_of_objects: Option<usize>,
    #[serde(rename = "RESPONSE_CODE")]
    response_code: Option<i64>,
    #[serde(rename = "RESPONSE_MESSAGE")]
    response_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Station {
    #[serde(rename = "STID")]
    stid: String,
    #[serde(rename = "NAME", default)]
    name: Option<String>,
    #[serde(rename = "OBSERVATIONS", default)]
    observations: HashMap<String, Value>,
}

impl Station {
    fn reading(&self, variable: Variable) -> Option<&Value> {
        self.observations.get(variable.name())
    }

    fn value(&self, variable: Variable) -> Option<f64> {
        self.reading(variable)
            .and_then(|reading| reading.get("value"))
            .and_then(Value::as_f64)
    }

    fn observed_at(&self) -> Option<OffsetDateTime> {
        let date_time = Variable::RAW.iter().find_map(|variable| {
            self.reading(*variable)
                .and_then(|reading| reading.get("date_time"))
                .and_then(Value::as_str)
        })?;
        match OffsetDateTime::parse(date_time, &Rfc3339) {
            Ok(observed_at) => Some(observed_at),
            Err(e) => {
                warn!(
                    "station {} has unparsable date_time {}: {}",
                    self.stid, date_time, e
                );
                None
            }
        }
    }
}

impl From<Station> for RawObservation {
    fn from(station: Station) -> Self {
        let mut observation = RawObservation::new(station.stid.clone());
        observation.observed_at = station.observed_at();
        for variable in Variable::RAW {
            observation.set_value(variable, station.value(variable));
        }
        observation.name = station.name.unwrap_or_default();
        observation
    }
}

/// Decode a `stations/latest` response body.
pub fn parse_latest(body: &str) -> Result<Vec<RawObservation>, FetchError> {
    let response: LatestResponse = serde_json::from_str(body)?;
    let message = response.summary.response_message.unwrap_or_default();

    match response.summary.response_code {
        Some(RESPONSE_OK) | None => {}
        Some(RESPONSE_NO_RESULTS) => {
            debug!("synoptic returned no stations: {}", message);
            return Ok(vec![]);
        }
        Some(code) => return Err(FetchError::Rejected { code, message }),
    }

    match response.summary.number_of_objects {
        Some(0) => {
            debug!("synoptic returned no stations: {}", message);
            return Ok(vec![]);
        }
        Some(_) => {}
        None => warn!("synoptic summary has no object count: {}", message),
    }
    Ok(response.station.into_iter().map(RawObservation::from).collect())
}
