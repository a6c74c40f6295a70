//! Core library for the `wildlife` CLI.
//!
//! This crate defines:
//! - Location resolution for the climate lookup
//! - Species (GBIF) and climate (Open-Meteo) fetchers that never fail outright
//! - The result envelope both fetchers return, and its JSON shape
//! - Configuration, terminal formatting and the brief handed to the agent layer
//!
//! It is used by `wildlife-cli`, but can also be reused by other binaries or services.

pub mod brief;
pub mod config;
pub mod error;
pub mod format;
pub mod location;
pub mod model;
pub mod provider;

pub use brief::ResearchBrief;
pub use config::{Config, ProviderConfig};
pub use error::{FetchError, FetchErrorKind};
pub use location::{Coordinates, LocationMatch, Resolution};
pub use model::{ClimateReport, Envelope, Payload, SpeciesPage};
pub use provider::{
    ClimateSource, GbifSpeciesFetcher, HttpSettings, OpenMeteoClimateFetcher, ProviderId,
    SpeciesSource,
};

/// Species lookup with default settings.
pub async fn fetch_species(name: &str) -> Envelope<SpeciesPage> {
    GbifSpeciesFetcher::default().fetch(name).await
}

/// Climate lookup with default settings.
pub async fn fetch_climate_data(location: &str) -> Envelope<ClimateReport> {
    OpenMeteoClimateFetcher::default().fetch(location).await
}
