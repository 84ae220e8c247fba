use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use nowcast_core::{
    Config, Coordinates, FixedLocation, IpLocation, LocationService, SourceId, WeatherSource,
    source::{default_source_from_config, source_from_config},
};

use crate::{consent::ConsentingLocation, session::Session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "Current weather where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a weather source.
    Configure {
        /// Source short name, e.g. "openweather" or "weatherapi".
        source: String,

        /// Make this source the default even if another one is configured.
        #[arg(long)]
        default: bool,
    },

    /// Ask for your location and show the current weather there.
    Show {
        /// Weather source to use instead of the configured default.
        #[arg(long)]
        source: Option<String>,

        /// Latitude of a fixed location; skips the location lookup.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of a fixed location; skips the location lookup.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Share the location without asking first.
        #[arg(long, short)]
        yes: bool,

        /// Print the final screen as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { source, default } => configure(&source, default),
            Command::Show { source, lat, lon, yes, json } => {
                let config = Config::load()?;

                let weather: Box<dyn WeatherSource> = match source {
                    Some(id) => source_from_config(SourceId::try_from(id.as_str())?, &config)?,
                    None => default_source_from_config(&config)?,
                };

                let fixed = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
                    _ => config.location,
                };
                let location: Arc<dyn LocationService> = match fixed {
                    Some(coordinates) => Arc::new(FixedLocation(coordinates)),
                    None => Arc::new(ConsentingLocation::new(IpLocation::new(), yes)),
                };

                Session::new(location, Arc::from(weather), yes, json).run().await.map(|_| ())
            }
        }
    }
}

fn configure(source: &str, make_default: bool) -> anyhow::Result<()> {
    let id = SourceId::try_from(source)?;
    let mut config = Config::load()?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    let verb = if config.is_source_configured(id) { "Replaced" } else { "Saved" };
    config.upsert_source_api_key(id, api_key.to_string());
    if make_default {
        config.set_default_source(id);
    }
    config.save()?;

    println!("{verb} API key for {id} in {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["nowcast", "show", "--lat", "33.57", "--lon", "-7.59"])
            .expect("valid arguments");

        let Command::Show { lat, lon, yes, json, source } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(lat, Some(33.57));
        assert_eq!(lon, Some(-7.59));
        assert!(!yes && !json);
        assert!(source.is_none());
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["nowcast", "show", "--lat", "33.57"]).is_err());
    }

    #[test]
    fn configure_takes_a_source_name() {
        let cli = Cli::try_parse_from(["nowcast", "configure", "weatherapi", "--default"]).unwrap();
        let Command::Configure { source, default } = cli.command else {
            panic!("expected configure");
        };
        assert_eq!(source, "weatherapi");
        assert!(default);
    }
}
