use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{ConditionEntry, Readings, WeatherRequest, WeatherSnapshot};

use super::{WeatherSource, truncate_body};

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";

#[derive(Debug, Clone)]
pub struct WeatherApiSource {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiSource {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self { api_key, base_url: base_url.into(), http: Client::new() }
    }
}

/// Buckets WeatherAPI.com condition codes into the short OpenWeather-style
/// vocabulary used for theming.
/// See https://www.weatherapi.com/docs/weather_conditions.json
fn condition_code(code: u32) -> &'static str {
    match code {
        1000 => "Clear",
        1003 | 1006 | 1009 => "Clouds",
        1030 | 1135 | 1147 => "Mist",
        1072 | 1150 | 1153 | 1168 | 1171 => "Drizzle",
        1063 | 1180..=1201 | 1240..=1246 => "Rain",
        1066 | 1069 | 1114 | 1117 | 1204..=1237 | 1249..=1264 => "Snow",
        1087 | 1273..=1282 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: f64,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    mintemp_c: f64,
    maxtemp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    day: WaDay,
}

#[derive(Debug, Deserialize, Default)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
    #[serde(default)]
    forecast: WaForecast,
}

impl WaResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot> {
        let ts = self.current.last_updated_epoch.or(self.location.localtime_epoch);
        let observed_at = ts.and_then(|ts| DateTime::from_timestamp(ts, 0)).unwrap_or_else(Utc::now);

        let location_name = format!("{}, {}", self.location.name, self.location.country);
        let wind_speed = self.current.wind_kph / 3.6;

        let (temp_min, temp_max) = self
            .forecast
            .forecastday
            .first()
            .map(|d| (d.day.mintemp_c, d.day.maxtemp_c))
            .unwrap_or((self.current.temp_c, self.current.temp_c));

        let code = condition_code(self.current.condition.code);
        let conditions = vec![ConditionEntry::new(code, code).with_detail(self.current.condition.text)];

        let readings = Readings {
            feels_like: self.current.feelslike_c,
            temp_min,
            temp_max,
            humidity: self.current.humidity,
        };

        WeatherSnapshot::new("weatherapi", location_name, observed_at, readings, wind_speed, conditions)
            .context("WeatherAPI response is incomplete")
    }
}

#[async_trait]
impl WeatherSource for WeatherApiSource {
    async fn fetch(&self, request: &WeatherRequest) -> Result<WeatherSnapshot> {
        let url = format!("{}/v1/forecast.json", self.base_url);
        let q = format!("{},{}", request.coordinates.latitude, request.coordinates.longitude);

        tracing::info!(coordinates = %request.coordinates, "fetching WeatherAPI current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", q.as_str()),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI current JSON")?;

        parsed.into_snapshot()
    }
}
