use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use wildlife_core::{
    Config, GbifSpeciesFetcher, OpenMeteoClimateFetcher, ProviderConfig, ProviderId,
    ResearchBrief,
    format::{format_climate, format_species},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wildlife", version, about = "Species and climate lookups for wildlife research")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search GBIF for a species.
    Species {
        /// Species name; defaults to the configured species.
        name: Option<String>,

        /// Print the raw envelope as JSON.
        #[arg(long)]
        json: bool,

        /// Maximum number of taxa to list.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Current weather and daily forecast for a location.
    Climate {
        /// Location name; defaults to the configured location.
        location: Option<String>,

        /// Print the raw envelope as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Fetch both and print the context handed to the agent pipeline.
    Brief {
        #[arg(long)]
        species: Option<String>,

        #[arg(long)]
        location: Option<String>,
    },

    /// Configure connection settings for a provider.
    Configure {
        /// Provider short name, e.g. "gbif" or "openmeteo".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Species { name, json, limit } => {
                let name = name.as_deref().unwrap_or(config.species());
                let fetcher = GbifSpeciesFetcher::new(&config.http_settings(ProviderId::Gbif));
                let envelope = fetcher.fetch(name).await;

                if json {
                    println!("{}", envelope.to_tool_output());
                } else {
                    print!("{}", format_species(&envelope, limit));
                }
            }
            Command::Climate { location, json } => {
                let location = location.as_deref().unwrap_or(config.location());
                let fetcher =
                    OpenMeteoClimateFetcher::new(&config.http_settings(ProviderId::OpenMeteo));
                let envelope = fetcher.fetch(location).await;

                if json {
                    println!("{}", envelope.to_tool_output());
                } else {
                    print!("{}", format_climate(&envelope));
                }
            }
            Command::Brief { species, location } => {
                let species = species.as_deref().unwrap_or(config.species());
                let location = location.as_deref().unwrap_or(config.location());

                let brief = ResearchBrief::gather(
                    &GbifSpeciesFetcher::new(&config.http_settings(ProviderId::Gbif)),
                    &OpenMeteoClimateFetcher::new(&config.http_settings(ProviderId::OpenMeteo)),
                    species,
                    location,
                )
                .await;

                print!("{}", brief.to_prompt_context());
            }
            Command::Configure { provider } => {
                let id = ProviderId::try_from(provider.as_str())?;
                configure(config, id)?;
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config, id: ProviderId) -> Result<()> {
    let current = config.http_settings(id);

    let base_url = Text::new(&format!("Base URL for {}:", id.api_name()))
        .with_default(&current.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    let timeout_secs = CustomType::<u64>::new("Request timeout in seconds:")
        .with_default(current.timeout.as_secs())
        .with_validator(|secs: &u64| {
            if *secs == 0 {
                Ok(inquire::validator::Validation::Invalid(
                    "Timeout must be at least one second".into(),
                ))
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()
        .context("Failed to read timeout")?;

    let base_url = (base_url.trim() != id.default_base_url()).then(|| base_url.trim().to_string());
    config.upsert_provider(
        id,
        ProviderConfig {
            base_url,
            timeout_secs: Some(timeout_secs),
        },
    );
    config.save()?;

    println!(
        "Saved {} settings to {}",
        id,
        Config::config_file_path()?.display()
    );
    Ok(())
}
