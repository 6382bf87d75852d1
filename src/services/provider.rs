// src/services/provider.rs
use std::fmt;
use std::time::Duration;

use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{HistoryRange, HistoryTimeline, Selection, Snapshot};

pub const DEFAULT_BASE_URL: &str = "https://disease.sh/v3/covid-19";

/// The upstream enforces no timeout of its own; without a bound here a hung
/// transport would pin a logical request in Loading forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Any failure of an outbound provider call. Malformed payloads are
/// normalized to this type at the fetch boundary and never passed through.
#[derive(Debug)]
pub enum ProviderError {
    Transport(reqwest::Error),
    Status { url: String, status: StatusCode },
    Malformed { detail: String },
}

impl ProviderError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ProviderError::Malformed {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderError::Transport(e) => write!(f, "provider transport failure: {}", e),
            ProviderError::Status { url, status } => {
                write!(f, "provider returned {} for {}", status, url)
            }
            ProviderError::Malformed { detail } => {
                write!(f, "malformed provider payload: {}", detail)
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e)
    }
}

/// Read-only client for the disease.sh data provider.
pub struct ProviderClient {
    http: Client,
    base_url: String,
}

impl ProviderClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(ProviderClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// One snapshot covering the whole world.
    pub async fn global_snapshot(&self) -> Result<Snapshot, ProviderError> {
        let url = format!("{}/all", self.base_url);
        let body = self.get_text(&url).await?;
        parse_snapshot(&body, "Global")
    }

    /// One snapshot for a named entity.
    pub async fn entity_snapshot(&self, name: &str) -> Result<Snapshot, ProviderError> {
        let url = format!("{}/countries/{}", self.base_url, name);
        let body = self.get_text(&url).await?;
        parse_snapshot(&body, name)
    }

    pub async fn snapshot(&self, selection: &Selection) -> Result<Snapshot, ProviderError> {
        match selection {
            Selection::Global => self.global_snapshot().await,
            Selection::Entity(name) => self.entity_snapshot(name).await,
        }
    }

    /// Current snapshots for every known entity.
    pub async fn entities(&self) -> Result<Vec<Snapshot>, ProviderError> {
        let url = format!("{}/countries", self.base_url);
        let body = self.get_text(&url).await?;
        parse_entities(&body)
    }

    /// Historical series for the selection over the requested range. Global
    /// histories arrive as a bare timeline; entity histories come wrapped
    /// in a `{country, timeline}` envelope.
    pub async fn history(
        &self,
        selection: &Selection,
        range: HistoryRange,
    ) -> Result<HistoryTimeline, ProviderError> {
        let url = match selection {
            Selection::Global => {
                format!("{}/historical/all?lastdays={}", self.base_url, range.lastdays())
            }
            Selection::Entity(name) => {
                format!("{}/historical/{}?lastdays={}", self.base_url, name, range.lastdays())
            }
        };
        let body = self.get_text(&url).await?;
        parse_history(&body, selection)
    }

    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        info!("Fetching provider data from {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!("Provider returned {} for {}", status, url);
            return Err(ProviderError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.text().await?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    country: Option<String>,
    cases: u64,
    deaths: u64,
    #[serde(default)]
    recovered: Option<u64>,
    #[serde(default)]
    today_cases: Option<i64>,
    #[serde(default)]
    today_deaths: Option<i64>,
    #[serde(default)]
    country_info: Option<RawCountryInfo>,
}

#[derive(Debug, Deserialize)]
struct RawCountryInfo {
    #[serde(default)]
    flag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntityHistory {
    timeline: HistoryTimeline,
}

impl RawSnapshot {
    fn into_snapshot(self, fallback_scope: &str) -> Snapshot {
        Snapshot {
            scope: self
                .country
                .unwrap_or_else(|| fallback_scope.to_string()),
            cases: self.cases,
            deaths: self.deaths,
            recovered: self.recovered.unwrap_or(0),
            today_cases: self.today_cases.unwrap_or(0),
            today_deaths: self.today_deaths.unwrap_or(0),
            flag: self.country_info.and_then(|info| info.flag),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::malformed(e.to_string()))
}

pub(crate) fn parse_snapshot(body: &str, scope: &str) -> Result<Snapshot, ProviderError> {
    let raw: RawSnapshot = decode(body)?;
    Ok(raw.into_snapshot(scope))
}

pub(crate) fn parse_entities(body: &str) -> Result<Vec<Snapshot>, ProviderError> {
    let raw: Vec<RawSnapshot> = decode(body)?;
    let mut entities = Vec::with_capacity(raw.len());
    for entry in raw {
        if entry.country.is_none() {
            warn!("Skipping entity snapshot without a country name");
            continue;
        }
        entities.push(entry.into_snapshot(""));
    }
    Ok(entities)
}

pub(crate) fn parse_history(
    body: &str,
    selection: &Selection,
) -> Result<HistoryTimeline, ProviderError> {
    match selection {
        Selection::Global => decode(body),
        Selection::Entity(_) => {
            let raw: RawEntityHistory = decode(body)?;
            Ok(raw.timeline)
        }
    }
}
