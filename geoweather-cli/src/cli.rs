use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use geoweather_core::{
    AssumeOnline, Config, ConnectivityChecker, Coordinate, FixedLocation, Outcome,
    SystemConnectivity, Trigger, TriggerResult, UnitSystem, WeatherError, WeatherWorkflow,
    client_from_config,
};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;

use crate::render;

/// Locale variables consulted for the region, highest precedence first.
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MEASUREMENT", "LANG"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Current weather for your location")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, units, region and default location.
    Configure,

    /// Show the current weather.
    Show {
        /// Latitude in decimal degrees; defaults to the configured location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// "metric" or "imperial"; defaults to what the region uses.
        #[arg(long)]
        units: Option<String>,

        /// Region code such as "US"; defaults to config, then the locale.
        #[arg(long)]
        region: Option<String>,

        /// Offer to refresh after each result.
        #[arg(long)]
        watch: bool,

        /// Skip the network interface check.
        #[arg(long)]
        assume_online: bool,
    },

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, units, region, watch, assume_online } => {
                let coordinate = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)?),
                    _ => None,
                };
                show(ShowArgs { coordinate, units, region, watch, assume_online }).await
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

struct ShowArgs {
    coordinate: Option<Coordinate>,
    units: Option<String>,
    region: Option<String>,
    watch: bool,
    assume_online: bool,
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(units) = args.units.as_deref() {
        config.units = Some(UnitSystem::try_from(units)?);
    }

    let locale = locale_from_env(|key| std::env::var(key).ok());
    let region = args.region.or_else(|| config.effective_region(locale.as_deref()));
    let settings = config.workflow_settings(region.as_deref())?;
    let unit_system = settings.unit_system;

    let coordinate = match args.coordinate {
        Some(coordinate) => Some(coordinate),
        None => config.default_coordinate()?,
    };

    let connectivity: Box<dyn ConnectivityChecker> = if args.assume_online {
        Box::new(AssumeOnline)
    } else {
        Box::new(SystemConnectivity::default())
    };

    let workflow = WeatherWorkflow::new(
        Box::new(FixedLocation::new(coordinate)),
        connectivity,
        client_from_config(&config)?,
        settings,
    );

    let mut trigger = Trigger::Startup;
    let mut last_error: Option<WeatherError> = None;

    loop {
        debug!(?trigger, "triggering weather workflow");
        let result = workflow.trigger(trigger).await;
        debug!(?result, "weather workflow finished");

        match result {
            TriggerResult::Completed(Outcome::Done(report)) => {
                println!("{}", render::report(&report, unit_system));
                last_error = None;
            }
            TriggerResult::Completed(Outcome::Failed(err)) => {
                eprintln!("{}", render::failure(&err));
                last_error = Some(err);
            }
            TriggerResult::Ignored | TriggerResult::Superseded => {}
        }

        if !args.watch {
            break;
        }
        let again = Confirm::new("Refresh?")
            .with_default(true)
            .prompt()
            .context("Failed to read refresh answer")?;
        if !again {
            break;
        }
        trigger = Trigger::Refresh;
    }

    if let Some(err) = last_error {
        bail!("{err}");
    }
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    const AUTO: &str = "auto (follow region)";
    let choice = Select::new("Units:", vec![AUTO, "metric", "imperial"])
        .prompt()
        .context("Failed to read unit choice")?;
    config.units = match choice {
        AUTO => None,
        other => Some(UnitSystem::try_from(other)?),
    };

    let region = Text::new("Region code (e.g. US, PT):")
        .with_default(config.region.as_deref().unwrap_or_default())
        .with_help_message("Leave empty to derive it from the locale")
        .prompt()
        .context("Failed to read region")?;
    let region = region.trim();
    config.region = (!region.is_empty()).then(|| region.to_string());

    let set_location = Confirm::new("Store a default location?")
        .with_default(config.location.is_some())
        .prompt()
        .context("Failed to read answer")?;
    if set_location {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number")
            .prompt()
            .context("Failed to read longitude")?;
        config.set_default_coordinate(Coordinate::new(latitude, longitude)?);
    } else {
        config.location = None;
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

/// First non-empty locale variable, looked up via `get`.
fn locale_from_env(get: impl Fn(&str) -> Option<String>) -> Option<String> {
    LOCALE_VARS.iter().filter_map(|var| get(var)).find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn lc_all_wins() {
        let get = env(&[("LANG", "pt_PT.UTF-8"), ("LC_ALL", "en_US.UTF-8")]);
        assert_eq!(locale_from_env(get).as_deref(), Some("en_US.UTF-8"));
    }

    #[test]
    fn empty_values_are_skipped() {
        let get = env(&[("LC_ALL", ""), ("LC_MEASUREMENT", "my_MM"), ("LANG", "C")]);
        assert_eq!(locale_from_env(get).as_deref(), Some("my_MM"));
    }

    #[test]
    fn no_locale() {
        assert_eq!(locale_from_env(env(&[])), None);
    }

    #[test]
    fn parses_show_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "geoweather", "show", "--lat", "-33.86", "--lon", "-151.2", "--units", "imperial",
            "--watch",
        ])
        .unwrap();

        match cli.command {
            Command::Show { lat, lon, units, watch, assume_online, .. } => {
                assert_eq!(lat, Some(-33.86));
                assert_eq!(lon, Some(-151.2));
                assert_eq!(units.as_deref(), Some("imperial"));
                assert!(watch);
                assert!(!assume_online);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["geoweather", "show", "--lat", "10"]).is_err());
    }
}
