use anyhow::{Context, bail};
use citycast_core::{
    BoardSnapshot, CityQuery, CityState, Config, ForecastBoard, presenter::build_view_model,
    provider_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Forecast cards for your favourite cities")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the WeatherAPI key and forecast horizon.
    Configure,

    /// Fetch and show forecasts for every configured city.
    Show {
        /// Number of forecast days; defaults to the configured value.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
        days: Option<u8>,

        /// Print the view models as JSON once every city has finished.
        #[arg(long)]
        json: bool,
    },

    /// List configured cities.
    Cities,

    /// Add a city, or update the coordinates of an existing one.
    AddCity {
        city: String,
        #[arg(allow_negative_numbers = true)]
        latitude: String,
        #[arg(allow_negative_numbers = true)]
        longitude: String,
    },

    /// Remove a city by name.
    RemoveCity { city: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { days, json } => show(days, json).await,
            Command::Cities => {
                let config = Config::load()?;
                for city in &config.cities {
                    println!("{:<16} {:>8}, {:>8}", city.city, city.latitude, city.longitude);
                }
                Ok(())
            }
            Command::AddCity { city, latitude, longitude } => {
                let mut config = Config::load()?;
                config.upsert_city(CityQuery::new(city.trim(), latitude.trim(), longitude.trim()));
                config.save()?;
                println!("Saved {city}.");
                Ok(())
            }
            Command::RemoveCity { city } => {
                let mut config = Config::load()?;
                if !config.remove_city(&city) {
                    bail!(
                        "City '{city}' is not configured.\n\
                         Hint: run `citycast cities` to list them."
                    );
                }
                config.save()?;
                println!("Removed {city}.");
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Leave empty to keep the current key")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let days = CustomType::<u8>::new("Forecast days:")
        .with_default(config.days)
        .with_error_message("Please enter a whole number between 1 and 255")
        .prompt()
        .context("Failed to read forecast days")?;

    if days == 0 {
        bail!("Forecast days must be at least 1");
    }

    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.api_key = Some(api_key.to_string());
    }
    config.days = days;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(days: Option<u8>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    if config.cities.is_empty() {
        bail!("No cities configured.\nHint: run `citycast add-city <city> <lat> <lon>`.");
    }

    let provider = provider_from_config(&config)?;
    let days = days.unwrap_or(config.days);
    tracing::debug!(days, cities = config.cities.len(), "fetching forecasts");
    let board = ForecastBoard::spawn(provider, &config.cities, days);

    let snapshot = if json {
        let snapshot = board.wait().await;
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot.view_models())
                .context("Failed to serialize forecasts to JSON")?
        );
        snapshot
    } else {
        // Print each card as soon as its city resolves.
        let mut printed = vec![false; config.cities.len()];
        let mut rx = board.subscribe();
        loop {
            print_new_cards(&rx.borrow_and_update(), &mut printed);
            if rx.changed().await.is_err() {
                break;
            }
        }

        let snapshot = board.wait().await;
        print_new_cards(&snapshot, &mut printed);
        snapshot
    };

    for (query, err) in snapshot.failures() {
        eprintln!("{}: forecast unavailable ({err})", query.city);
    }

    if snapshot.view_models().is_empty() {
        bail!("No forecasts could be fetched");
    }

    Ok(())
}

fn print_new_cards(snapshot: &BoardSnapshot, printed: &mut [bool]) {
    for (slot, done) in snapshot.slots().iter().zip(printed.iter_mut()) {
        if *done {
            continue;
        }
        if let CityState::Ready(response) = &slot.state {
            println!("{}", render::card(&build_view_model(response)));
            *done = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_city_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["citycast", "add-city", "Sydney", "-33.88", "151.22"])
            .expect("parses");

        match cli.command {
            Command::AddCity { city, latitude, longitude } => {
                assert_eq!(city, "Sydney");
                assert_eq!(latitude, "-33.88");
                assert_eq!(longitude, "151.22");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_rejects_zero_days() {
        assert!(Cli::try_parse_from(["citycast", "show", "--days", "0"]).is_err());

        let cli = Cli::try_parse_from(["citycast", "-v", "show", "--days", "3", "--json"])
            .expect("parses");
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Show { days: Some(3), json: true }));
    }
}
