use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One configured city and the coordinates sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityQuery {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
}

impl CityQuery {
    pub fn new(
        city: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self { city: city.into(), latitude: latitude.into(), longitude: longitude.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub latitude: String,
    pub longitude: String,
    pub days: u8,
}

impl ForecastRequest {
    /// Coordinates must be non-empty and `days` at least one.
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        days: u8,
    ) -> Result<Self, FetchError> {
        let latitude = latitude.into();
        let longitude = longitude.into();

        if latitude.trim().is_empty() || longitude.trim().is_empty() {
            return Err(FetchError::new("latitude and longitude must not be empty"));
        }
        if days == 0 {
            return Err(FetchError::new("forecast days must be at least 1"));
        }

        Ok(Self { latitude, longitude, days })
    }

    pub fn for_city(city: &CityQuery, days: u8) -> Result<Self, FetchError> {
        Self::new(city.latitude.as_str(), city.longitude.as_str(), days)
    }

    /// Value of the `q` query parameter, `lat,lon`.
    pub fn location_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

// Provider payload. Only the fields we read are modelled; serde skips the rest.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: Location,
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub wind_dir: String,
    pub humidity: u8,
    pub vis_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feelslike_c: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub day: DaySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub avgtemp_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxtemp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mintemp_c: Option<f64>,
    pub condition: Condition,
}

/// Display-ready record for one city, rebuilt on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastViewModel {
    pub city: String,
    pub temperature: String,
    pub weather_text: String,
    pub wind_speed: f64,
    pub humidity: u8,
    pub visibility: f64,
    pub summary: String,
    pub forecasts: Vec<DailyForecast>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub temp: String,
    pub icon: String,
    pub date: String,
}
