//! Input handed to the agent pipeline: both envelopes, gathered in order.

use crate::{
    model::{ClimateReport, Envelope, SpeciesPage},
    provider::{ClimateSource, SpeciesSource},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchBrief {
    pub species_query: String,
    pub location_query: String,
    pub species: Envelope<SpeciesPage>,
    pub climate: Envelope<ClimateReport>,
}

impl ResearchBrief {
    /// Species first, then climate. One upstream call each.
    pub async fn gather(
        species_source: &dyn SpeciesSource,
        climate_source: &dyn ClimateSource,
        species: &str,
        location: &str,
    ) -> Self {
        let species_envelope = species_source.fetch_species(species).await;
        let climate_envelope = climate_source.fetch_climate_data(location).await;

        let brief = Self {
            species_query: species.to_string(),
            location_query: location.to_string(),
            species: species_envelope,
            climate: climate_envelope,
        };

        tracing::info!(
            species,
            location,
            errors = brief.has_errors(),
            "Research brief gathered"
        );
        brief
    }

    pub fn has_errors(&self) -> bool {
        !self.species.is_success() || !self.climate.is_success()
    }

    /// Labelled JSON blocks for prompt interpolation.
    pub fn to_prompt_context(&self) -> String {
        let mut out = format!(
            "Species data for '{}' (fetch_species):\n{}\n\n",
            self.species_query,
            self.species.to_tool_output()
        );

        out.push_str(&format!(
            "Climate data for '{}' (fetch_climate_data):\n{}\n",
            self.location_query,
            self.climate.to_tool_output()
        ));

        let fallback = matches!(&self.climate, Envelope::Success(report) if report.resolution().is_fallback());
        if fallback {
            out.push_str(&format!(
                "\nNote: '{}' is not a supported location; the climate data above is for the default location.\n",
                self.location_query
            ));
        }
        out
    }
}
