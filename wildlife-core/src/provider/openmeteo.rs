use async_trait::async_trait;

use crate::{
    location::{self, Resolution},
    model::{ClimateReport, Envelope},
};

use super::{ClimateSource, HttpSettings, ProviderId, Upstream};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Current conditions plus a daily forecast from Open-Meteo.
#[derive(Debug, Clone)]
pub struct OpenMeteoClimateFetcher {
    upstream: Upstream,
}

impl OpenMeteoClimateFetcher {
    pub fn new(settings: &HttpSettings) -> Self {
        Self {
            upstream: Upstream::new(ProviderId::OpenMeteo, settings),
        }
    }

    /// Unknown locations are answered with the default coordinates.
    pub async fn fetch(&self, location: &str) -> Envelope<ClimateReport> {
        self.fetch_for(location::resolve(location)).await
    }

    pub async fn fetch_for(&self, resolution: Resolution) -> Envelope<ClimateReport> {
        let lat = resolution.coordinates.lat.to_string();
        let lon = resolution.coordinates.lon.to_string();

        tracing::info!(
            location = %resolution.query,
            lat = %lat,
            lon = %lon,
            fallback = resolution.is_fallback(),
            "Fetching climate data"
        );

        let query = [
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("current_weather", "true"),
            ("daily", DAILY_FIELDS),
            ("timezone", "auto"),
        ];

        let result = self.upstream.get_object(&query).await;

        match result {
            Ok(body) => Envelope::Success(ClimateReport::new(resolution, body)),
            Err(err) => {
                tracing::warn!(provider = %self.upstream.id(), location = %resolution.query, error = %err, "Climate fetch failed");
                Envelope::Failure(err)
            }
        }
    }
}

impl Default for OpenMeteoClimateFetcher {
    fn default() -> Self {
        Self::new(&HttpSettings::for_provider(ProviderId::OpenMeteo))
    }
}

#[async_trait]
impl ClimateSource for OpenMeteoClimateFetcher {
    async fn fetch_climate_data(&self, location: &str) -> Envelope<ClimateReport> {
        self.fetch(location).await
    }

    async fn fetch_resolved(&self, resolution: Resolution) -> Envelope<ClimateReport> {
        self.fetch_for(resolution).await
    }
}
