//! Weather sources: the services that turn coordinates into a
//! [`WeatherSnapshot`].

use crate::{
    Config, WeatherRequest, WeatherSnapshot,
    source::{openweather::OpenWeatherSource, weatherapi::WeatherApiSource},
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    OpenWeather,
    WeatherApi,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::OpenWeather => "openweather",
            SourceId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::OpenWeather, SourceId::WeatherApi]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    /// Case-insensitive match on the short names used in the config file
    /// and on the command line.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if let Some(id) = Self::all().iter().find(|id| id.as_str().eq_ignore_ascii_case(value)) {
            return Ok(*id);
        }

        let known: Vec<&str> = Self::all().iter().map(SourceId::as_str).collect();
        Err(anyhow!("Unknown weather source '{value}'. Known sources: {}.", known.join(", ")))
    }
}

/// Implementations return an error rather than a partially filled snapshot.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, request: &WeatherRequest) -> anyhow::Result<WeatherSnapshot>;
}

/// Build the client for `id` with the API key stored in `config`.
pub fn source_from_config(id: SourceId, config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let Some(api_key) = config.source_api_key(id) else {
        return Err(anyhow!(
            "Weather source '{id}' has no API key yet.\n\
             Hint: run `nowcast configure {id}` to store one."
        ));
    };
    let api_key = api_key.to_owned();

    Ok(match id {
        SourceId::OpenWeather => Box::new(OpenWeatherSource::new(api_key)),
        SourceId::WeatherApi => Box::new(WeatherApiSource::new(api_key)),
    })
}

pub fn default_source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    source_from_config(config.default_source_id()?, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
