//! Turns provider payloads into display-ready records.
//!
//! Everything here is pure and total: absent or odd input degrades to an
//! empty or passed-through value instead of an error.

use std::fmt;

use chrono::NaiveDate;

use crate::model::{
    CurrentConditions, DailyForecast, ForecastDay, ForecastResponse, ForecastViewModel,
};

/// Relative humidity bucket used in the summary sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl HumidityTier {
    pub fn classify(humidity_pct: u8) -> Self {
        match humidity_pct {
            80..=u8::MAX => Self::VeryHigh,
            60..=79 => Self::High,
            40..=59 => Self::Moderate,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very high",
        }
    }
}

impl fmt::Display for HumidityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wind strength bucket, classified from miles per hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindTier {
    Calm,
    Light,
    Moderate,
    Strong,
}

impl WindTier {
    pub fn classify(wind_mph: f64) -> Self {
        if wind_mph < 1.0 {
            Self::Calm
        } else if wind_mph < 10.0 {
            Self::Light
        } else if wind_mph < 20.0 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for WindTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spells out a 16-point compass code. Matching is case-sensitive and any
/// other input comes back as-is.
pub fn compass_direction(code: &str) -> &str {
    match code {
        "N" => "north",
        "NNE" => "north-northeast",
        "NE" => "northeast",
        "ENE" => "east-northeast",
        "E" => "east",
        "ESE" => "east-southeast",
        "SE" => "southeast",
        "SSE" => "south-southeast",
        "S" => "south",
        "SSW" => "south-southwest",
        "SW" => "southwest",
        "WSW" => "west-southwest",
        "W" => "west",
        "WNW" => "west-northwest",
        "NW" => "northwest",
        "NNW" => "north-northwest",
        other => other,
    }
}

/// One-sentence description of the current conditions, or `""` when there
/// are none.
pub fn summarize(current: Option<&CurrentConditions>) -> String {
    let Some(current) = current else {
        return String::new();
    };

    format!(
        "Overall, the weather is {} with {} winds coming from the {}. \
         The temperature feels like {}°C, and humidity is {}.",
        current.condition.text.to_lowercase(),
        WindTier::classify(current.wind_mph),
        compass_direction(&current.wind_dir),
        format_number(current.temp_c),
        HumidityTier::classify(current.humidity),
    )
}

/// Maps provider forecast days onto display entries, one for one and in order.
pub fn reshape_forecast(days: &[ForecastDay]) -> Vec<DailyForecast> {
    days.iter()
        .map(|cast| DailyForecast {
            temp: format_number(cast.day.avgtemp_c),
            icon: absolute_icon_url(&cast.day.condition.icon),
            date: format_short_date(&cast.date),
        })
        .collect()
}

/// Shortest rendering of a reading: `28.0` -> `28`, `-0.0` -> `0`.
pub fn format_number(value: f64) -> String {
    // `-0.0 == 0.0`, so this also drops the sign of negative zero.
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// The provider hands out protocol-relative icon URLs (`//cdn...`).
pub fn absolute_icon_url(icon: &str) -> String {
    format!("https:{icon}")
}

/// `2024-01-23` -> `Jan 23`. Anything that is not an ISO date is returned
/// unchanged.
pub fn format_short_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%b %-d").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn build_view_model(response: &ForecastResponse) -> ForecastViewModel {
    let current = &response.current;

    ForecastViewModel {
        city: response.location.name.clone(),
        temperature: format_number(current.temp_c),
        weather_text: current.condition.text.clone(),
        wind_speed: current.wind_kph,
        humidity: current.humidity,
        visibility: current.vis_km,
        summary: summarize(Some(current)),
        forecasts: reshape_forecast(&response.forecast.forecastday),
    }
}
