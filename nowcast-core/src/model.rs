use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub coordinates: Coordinates,
}

/// One classification of the current weather, e.g. code "Rain".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    /// Short categorical code ("Clear", "Clouds", "Rain", "Snow", ...).
    pub code: String,
    /// Label shown to the user.
    pub label: String,
    /// Longer provider description, if any ("light rain").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ConditionEntry {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self { code: code.into(), label: label.into(), detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Temperatures in °C, humidity in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("weather snapshot has no condition entries")]
    EmptyConditions,
}

/// Immutable read of the current weather at one location.
///
/// Always carries at least one condition entry; the first one is the one
/// shown on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub source: String,
    pub location_name: String,
    pub observed_at: DateTime<Utc>,
    pub readings: Readings,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    conditions: Vec<ConditionEntry>,
}

impl WeatherSnapshot {
    pub fn new(
        source: impl Into<String>,
        location_name: impl Into<String>,
        observed_at: DateTime<Utc>,
        readings: Readings,
        wind_speed: f64,
        conditions: Vec<ConditionEntry>,
    ) -> Result<Self, SnapshotError> {
        if conditions.is_empty() {
            return Err(SnapshotError::EmptyConditions);
        }

        Ok(Self {
            source: source.into(),
            location_name: location_name.into(),
            observed_at,
            readings,
            wind_speed,
            conditions,
        })
    }

    pub fn conditions(&self) -> &[ConditionEntry] {
        &self.conditions
    }

    /// The authoritative condition for display.
    pub fn primary_condition(&self) -> &ConditionEntry {
        // Non-empty by construction.
        &self.conditions[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> Readings {
        Readings { feels_like: 12.0, temp_min: 9.0, temp_max: 14.0, humidity: 70.0 }
    }

    #[test]
    fn snapshot_rejects_empty_conditions() {
        let err =
            WeatherSnapshot::new("test", "Lyon", Utc::now(), readings(), 3.0, vec![]).unwrap_err();
        assert_eq!(err, SnapshotError::EmptyConditions);
    }

    #[test]
    fn first_condition_is_primary() {
        let snapshot = WeatherSnapshot::new(
            "test",
            "Lyon",
            Utc::now(),
            readings(),
            3.0,
            vec![ConditionEntry::new("Rain", "Rain"), ConditionEntry::new("Mist", "Mist")],
        )
        .expect("snapshot with conditions");

        assert_eq!(snapshot.primary_condition().code, "Rain");
        assert_eq!(snapshot.conditions().len(), 2);
    }

    #[test]
    fn coordinates_display_uses_four_decimals() {
        let c = Coordinates::new(45.764043, 4.835659);
        assert_eq!(c.to_string(), "45.7640,4.8357");
    }
}
