use async_trait::async_trait;

use crate::model::{Envelope, SpeciesPage};

use super::{HttpSettings, ProviderId, SpeciesSource, Upstream};

/// Species search against the GBIF API.
#[derive(Debug, Clone)]
pub struct GbifSpeciesFetcher {
    upstream: Upstream,
}

impl GbifSpeciesFetcher {
    pub fn new(settings: &HttpSettings) -> Self {
        Self {
            upstream: Upstream::new(ProviderId::Gbif, settings),
        }
    }

    /// The name goes out verbatim, empty included.
    pub async fn fetch(&self, name: &str) -> Envelope<SpeciesPage> {
        tracing::info!(species = name, "Fetching species");

        let envelope: Envelope<SpeciesPage> = self
            .upstream
            .get_object(&[("q", name)])
            .await
            .map(SpeciesPage::new)
            .into();

        if let Some(err) = envelope.error() {
            tracing::warn!(provider = %self.upstream.id(), species = name, error = %err, "Species fetch failed");
        }

        envelope
    }
}

impl Default for GbifSpeciesFetcher {
    fn default() -> Self {
        Self::new(&HttpSettings::for_provider(ProviderId::Gbif))
    }
}

#[async_trait]
impl SpeciesSource for GbifSpeciesFetcher {
    async fn fetch_species(&self, name: &str) -> Envelope<SpeciesPage> {
        self.fetch(name).await
    }
}
