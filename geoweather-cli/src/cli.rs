use anyhow::Context;
use clap::{Parser, Subcommand};
use geoweather_core::{
    Config, Coordinates, WeatherFetcher, location_from_config, source_from_config,
};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use tracing::info;

use crate::output::ConsoleSink;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Current weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and, optionally, a fixed location.
    Configure,

    /// Print the current weather where this machine is, or at a given place.
    Show {
        /// Latitude in decimal degrees; skips location lookup.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees; skips location lookup.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Place to geocode instead of locating this machine, e.g. "London,GB".
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        place: Option<String>,

        /// Refuse automatic location lookup.
        #[arg(long)]
        no_locate: bool,

        /// Print a short summary instead of the raw JSON payload.
        #[arg(long)]
        summary: bool,
    },

    /// Print where the configuration file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show {
                lat,
                lon,
                place,
                no_locate,
                summary,
            } => {
                let config = Config::load()?;
                let weather = source_from_config(&config)?;
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let location =
                    location_from_config(&config, explicit, place.as_deref(), !no_locate)?;

                let fetcher = WeatherFetcher::new(location, weather);
                fetcher.run(&ConsoleSink::new(summary)).await;
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }
    config.set_api_key(api_key.to_string());

    let fixed = Confirm::new("Use a fixed location instead of looking it up?")
        .with_default(config.fixed_coordinates().is_some())
        .prompt()
        .context("Failed to read answer")?;

    if fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 51.5074")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. -0.1278")
            .prompt()
            .context("Failed to read longitude")?;
        config.set_fixed_coordinates(Some(Coordinates::new(latitude, longitude)));
    } else {
        config.set_fixed_coordinates(None);
    }

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "geoweather",
            "show",
            "--lat",
            "51.5074",
            "--lon",
            "-0.1278",
        ])
        .expect("valid arguments");
        match cli.command {
            Command::Show { lat, lon, .. } => {
                assert_eq!(lat, Some(51.5074));
                assert_eq!(lon, Some(-0.1278));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["geoweather", "show", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn show_flags() {
        let cli = Cli::try_parse_from(["geoweather", "show", "--no-locate", "--summary"])
            .expect("valid arguments");
        match cli.command {
            Command::Show {
                lat,
                no_locate,
                summary,
                ..
            } => {
                assert!(lat.is_none());
                assert!(no_locate);
                assert!(summary);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_accepts_place() {
        let cli = Cli::try_parse_from(["geoweather", "show", "--place", "London,GB"])
            .expect("valid arguments");
        match cli.command {
            Command::Show { place, lat, .. } => {
                assert_eq!(place.as_deref(), Some("London,GB"));
                assert!(lat.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn place_conflicts_with_coordinates() {
        let res = Cli::try_parse_from([
            "geoweather",
            "show",
            "--place",
            "London,GB",
            "--lat",
            "1.0",
            "--lon",
            "2.0",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
