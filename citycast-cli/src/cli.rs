use anyhow::Context;
use clap::{Parser, Subcommand};
use citycast_core::{
    CityListing, Config, Coordinates, ListingRequest, ServiceId, listing::city_directory_from_config,
    provider::forecast_provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Browse world cities and their weather forecasts")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and endpoint for a service.
    Configure {
        /// Service short name: "openweather" or "opendatasoft".
        service: String,
    },

    /// List cities, sorted by country within each page.
    Cities {
        /// Search text; replaces browsing and disables paging.
        #[arg(short, long)]
        query: Option<String>,

        /// Number of pages to load while browsing.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the daily forecast for a coordinate pair.
    Forecast {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// Print JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { service } => configure(&service),
            Command::Cities { query, pages, json } => cities(query, pages, json).await,
            Command::Forecast {
                latitude,
                longitude,
                json,
            } => forecast(Coordinates::new(latitude, longitude), json).await,
        }
    }
}

fn configure(service: &str) -> anyhow::Result<()> {
    let id = ServiceId::try_from(service)?;
    let mut config = Config::load()?;

    let key_prompt = if id.requires_api_key() {
        format!("API key for {id}:")
    } else {
        format!("API key for {id} (optional, leave empty for none):")
    };
    let api_key = Password::new(&key_prompt)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() && id.requires_api_key() {
        anyhow::bail!("An API key is required for {id}.");
    }
    if !api_key.is_empty() {
        config.upsert_service_api_key(id, api_key.to_string());
    }

    let base_url = Text::new("Base URL:")
        .with_default(config.service_base_url(id))
        .prompt()
        .context("Failed to read base URL")?;
    let base_url = base_url.trim();
    if base_url.is_empty() || base_url == id.default_base_url() {
        config.set_service_base_url(id, None);
    } else {
        config.set_service_base_url(id, Some(base_url.to_string()));
    }

    config.save()?;
    println!(
        "Saved {id} configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn cities(query: Option<String>, pages: u32, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let directory = city_directory_from_config(&config);
    let mut listing = CityListing::new();

    let first = match query {
        Some(q) if !q.trim().is_empty() => ListingRequest::search(q),
        _ => ListingRequest::browse(0),
    };

    listing
        .search(directory.as_ref(), first)
        .await
        .context("Failed to fetch cities")?;

    let mut loaded = 1;
    while loaded < pages {
        let Some(next) = listing.next_request() else {
            break;
        };
        listing
            .search(directory.as_ref(), next)
            .await
            .context("Failed to fetch cities")?;
        loaded += 1;
    }

    tracing::info!(pages = loaded, cities = listing.cities().len(), "listing loaded");
    let view = listing.view();
    if json {
        println!("{}", serde_json::to_string_pretty(view.cities)?);
    } else {
        print!("{}", render::cities_table(view.cities));
        if view.has_more {
            println!("\nMore cities available; pass --pages {} to load more.", pages + 1);
        }
    }
    Ok(())
}

async fn forecast(at: Coordinates, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = forecast_provider_from_config(&config).with_context(|| {
        format!(
            "Hint: run `citycast configure {}` and enter your API key.",
            ServiceId::OpenWeather
        )
    })?;

    let forecast = provider
        .forecast(at)
        .await
        .context("Failed to fetch weather data")?;
    let days = forecast.daily();
    tracing::info!(
        observations = forecast.observations.len(),
        days = days.len(),
        "forecast aggregated"
    );

    if json {
        let out = serde_json::json!({
            "location": forecast.location,
            "days": days,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render::forecast_report(&forecast.location, &days));
    }
    Ok(())
}
