//! Mapping from weather data to display choices.
//!
//! Everything here is a pure function of its inputs: the same snapshot always
//! produces the same [`PresentationDescriptor`].

use serde::Serialize;

use crate::model::{ConditionEntry, WeatherSnapshot};

/// Above this feels-like temperature the screen shows the sun.
pub const SUNNY_ABOVE: f64 = 25.0;
/// Below this feels-like temperature the screen shows a snowflake.
pub const SNOWY_BELOW: f64 = 0.0;

/// Condition code assumed when a snapshot carries none.
const FALLBACK_CODE: &str = "Clear";
/// Label for the cloud icon when no condition entry is available.
const FALLBACK_CLOUD_LABEL: &str = "Clouds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Clear,
    Clouds,
    Rain,
    Snow,
    Default,
}

/// Named colour, as used by the background gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Yellow,
    Gray,
    White,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Gray => "gray",
            Color::White => "white",
        }
    }
}

/// Vertical background gradient, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gradient {
    pub top: Color,
    pub bottom: Color,
}

impl ThemeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Clear => "clear",
            ThemeId::Clouds => "clouds",
            ThemeId::Rain => "rain",
            ThemeId::Snow => "snow",
            ThemeId::Default => "default",
        }
    }

    pub fn gradient(&self) -> Gradient {
        let (top, bottom) = match self {
            ThemeId::Clear => (Color::Blue, Color::Yellow),
            ThemeId::Clouds => (Color::Gray, Color::White),
            ThemeId::Rain => (Color::Blue, Color::Gray),
            ThemeId::Snow => (Color::White, Color::Blue),
            ThemeId::Default => (Color::Blue, Color::White),
        };
        Gradient { top, bottom }
    }
}

impl std::fmt::Display for ThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconId {
    Sun,
    Snowflake,
    Cloud,
}

impl IconId {
    pub fn symbol(&self) -> &'static str {
        match self {
            IconId::Sun => "☀",
            IconId::Snowflake => "❄",
            IconId::Cloud => "☁",
        }
    }
}

/// Emphasis for the large temperature figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Warm,
    Neutral,
}

/// Display choices derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationDescriptor {
    pub theme: ThemeId,
    pub icon: IconId,
    pub label: String,
    pub temperature: String,
    pub accent: Accent,
}

/// Background theme for a condition code. Missing codes count as "Clear".
pub fn theme_for(code: Option<&str>) -> ThemeId {
    match code.unwrap_or(FALLBACK_CODE) {
        "Clear" => ThemeId::Clear,
        "Clouds" => ThemeId::Clouds,
        "Rain" => ThemeId::Rain,
        "Snow" => ThemeId::Snow,
        _ => ThemeId::Default,
    }
}

/// Icon and label for a feels-like temperature.
///
/// Both thresholds are exclusive: 0 and 25 fall through to the cloud icon,
/// which is labelled with the primary condition.
pub fn icon_and_label_for(feels_like: f64, primary: Option<&ConditionEntry>) -> (IconId, String) {
    if feels_like > SUNNY_ABOVE {
        (IconId::Sun, "Sunny".to_string())
    } else if feels_like < SNOWY_BELOW {
        (IconId::Snowflake, "Snowy".to_string())
    } else {
        let label = primary.map_or(FALLBACK_CLOUD_LABEL, |c| c.label.as_str());
        (IconId::Cloud, label.to_string())
    }
}

pub fn accent_for(feels_like: f64) -> Accent {
    if feels_like > SUNNY_ABOVE { Accent::Warm } else { Accent::Neutral }
}

/// Rounds half away from zero. Every formatter in this module goes through
/// here so the screen never mixes policies.
fn round_for_display(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    // -0.4 rounds to -0.0, which would print as "-0".
    Some(if rounded == 0.0 { 0.0 } else { rounded })
}

fn format_rounded(value: f64, suffix: &str) -> String {
    match round_for_display(value) {
        Some(v) => format!("{v:.0}{suffix}"),
        None => format!("--{suffix}"),
    }
}

pub fn format_temperature(value: f64) -> String {
    format_rounded(value, "°")
}

pub fn format_wind_speed(meters_per_second: f64) -> String {
    format_rounded(meters_per_second, " m/s")
}

pub fn format_humidity(percent: f64) -> String {
    format_rounded(percent, "%")
}

pub fn describe(snapshot: &WeatherSnapshot) -> PresentationDescriptor {
    let primary = snapshot.primary_condition();
    let feels_like = snapshot.readings.feels_like;
    let (icon, label) = icon_and_label_for(feels_like, Some(primary));

    PresentationDescriptor {
        theme: theme_for(Some(primary.code.as_str())),
        icon,
        label,
        temperature: format_temperature(feels_like),
        accent: accent_for(feels_like),
    }
}
