//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weatherapi.com forecast client
//! - Presentation of raw forecasts as view models
//! - Concurrent fetching for a set of cities
//!
//! It is used by `citycast-cli`, but can also be reused by other binaries or services.

pub mod board;
pub mod config;
pub mod error;
pub mod model;
pub mod presenter;
pub mod provider;

pub use board::{BoardSnapshot, CityState, ForecastBoard, fetch_all};
pub use config::Config;
pub use error::FetchError;
pub use model::{CityQuery, DailyForecast, ForecastRequest, ForecastResponse, ForecastViewModel};
pub use provider::{ForecastProvider, provider_from_config, weatherapi::WeatherApiProvider};
