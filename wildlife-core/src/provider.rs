use crate::{
    FetchError,
    location::Resolution,
    model::{ClimateReport, Envelope, SpeciesPage},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod gbif;
pub mod openmeteo;

pub use gbif::GbifSpeciesFetcher;
pub use openmeteo::OpenMeteoClimateFetcher;

pub const USER_AGENT: &str = concat!("wildlife-insight/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Gbif,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gbif => "gbif",
            ProviderId::OpenMeteo => "openmeteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Gbif, ProviderId::OpenMeteo]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Gbif => "https://api.gbif.org/v1",
            ProviderId::OpenMeteo => "https://api.open-meteo.com/v1",
        }
    }

    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ProviderId::Gbif => "/species/search",
            ProviderId::OpenMeteo => "/forecast",
        }
    }

    /// Name used in user-facing error messages.
    pub fn api_name(&self) -> &'static str {
        match self {
            ProviderId::Gbif => "GBIF API",
            ProviderId::OpenMeteo => "Open Meteo API",
        }
    }

    /// What a call to this provider fetches.
    pub fn subject(&self) -> &'static str {
        match self {
            ProviderId::Gbif => "species data",
            ProviderId::OpenMeteo => "climate data",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "gbif" => Ok(ProviderId::Gbif),
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: gbif, openmeteo."
            )),
        }
    }
}

/// Connection settings for one upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpSettings {
    pub fn for_provider(id: ProviderId) -> Self {
        Self {
            base_url: id.default_base_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, id: ProviderId) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), id.endpoint_path())
    }
}

#[async_trait]
pub trait SpeciesSource: Send + Sync + Debug {
    async fn fetch_species(&self, name: &str) -> Envelope<SpeciesPage>;
}

#[async_trait]
pub trait ClimateSource: Send + Sync + Debug {
    async fn fetch_climate_data(&self, location: &str) -> Envelope<ClimateReport>;

    /// Forecast for coordinates that were already resolved.
    async fn fetch_resolved(&self, resolution: Resolution) -> Envelope<ClimateReport>;
}

/// Client plus settings shared by both fetchers.
///
/// Client construction is deferred into the `Result` so that a broken TLS
/// backend surfaces as an `Unexpected` envelope instead of a panic.
#[derive(Debug, Clone)]
pub(crate) struct Upstream {
    id: ProviderId,
    endpoint: String,
    http: Result<Client, FetchError>,
}

impl Upstream {
    pub(crate) fn new(id: ProviderId, settings: &HttpSettings) -> Self {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FetchError::Unexpected(e.to_string()));

        Self {
            id,
            endpoint: settings.endpoint(id),
            http,
        }
    }

    pub(crate) fn id(&self) -> ProviderId {
        self.id
    }

    /// One GET against the endpoint; the decoded body must be a JSON object.
    pub(crate) async fn get_object<Q>(&self, query: &Q) -> Result<Map<String, Value>, FetchError>
    where
        Q: serde::Serialize + ?Sized + Sync,
    {
        let http = self.http.as_ref().map_err(|e| e.clone())?;

        tracing::info!(provider = %self.id, endpoint = %self.endpoint, "Requesting {}", self.id.subject());

        let res = http
            .get(&self.endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(self.id, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        let body: Value = res
            .json()
            .await
            .map_err(|e| FetchError::from_transport(self.id, e))?;

        match body {
            Value::Object(map) => Ok(map),
            other => {
                tracing::debug!(provider = %self.id, body = %truncate_body(&other.to_string()), "Response is not a JSON object");
                Err(FetchError::InvalidResponse(self.id))
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
