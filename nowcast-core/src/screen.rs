//! Screen state and view models.
//!
//! [`AppState`] is the single source of truth; [`reducer`] applies actions to
//! it and [`AppState::screen`] re-derives what should be on screen after every
//! change. Nothing here knows how the screen is drawn.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;

use crate::{
    location::PermissionState,
    model::{Coordinates, WeatherSnapshot},
    presentation::{
        PresentationDescriptor, describe, format_humidity, format_temperature, format_wind_speed,
    },
};

pub const WELCOME_TITLE: &str = "Welcome to the Weather App";
pub const WELCOME_PROMPT: &str = "Please share your current location to get the weather in your area";
pub const SHARE_LOCATION: &str = "Share current location";

/// Weather data lifecycle: Empty → Loading → Loaded/Unavailable
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherState {
    #[default]
    Empty,
    Loading(Coordinates),
    Loaded(WeatherSnapshot),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub permission: PermissionState,
    pub weather: WeatherState,
}

impl Default for AppState {
    fn default() -> Self {
        Self { permission: PermissionState::Unrequested, weather: WeatherState::Empty }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user pressed the share-location button and a request went out.
    LocationRequested,
    /// The location gate settled.
    LocationResolved(PermissionState),
    WeatherDidLoad(WeatherSnapshot),
    WeatherDidError(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    FetchWeather(Coordinates),
}

pub fn reducer(state: &mut AppState, action: Action) -> Option<Effect> {
    match action {
        Action::LocationRequested => {
            state.permission = PermissionState::Requested;
            state.weather = WeatherState::Empty;
            None
        }

        Action::LocationResolved(permission) => {
            let coordinates = permission.coordinates();
            state.permission = permission;
            let coordinates = coordinates?;
            state.weather = WeatherState::Loading(coordinates);
            Some(Effect::FetchWeather(coordinates))
        }

        Action::WeatherDidLoad(snapshot) => {
            state.weather = WeatherState::Loaded(snapshot);
            None
        }

        Action::WeatherDidError(msg) => {
            state.weather = WeatherState::Unavailable(msg);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelcomeView {
    pub title: &'static str,
    pub prompt: &'static str,
    pub action: &'static str,
    /// Why the previous attempt failed, if it did.
    pub notice: Option<String>,
}

impl WelcomeView {
    fn new(notice: Option<String>) -> Self {
        Self { title: WELCOME_TITLE, prompt: WELCOME_PROMPT, action: SHARE_LOCATION, notice }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub icon: &'static str,
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub location_name: String,
    pub date_line: String,
    pub details: Vec<DetailRow>,
    pub presentation: PresentationDescriptor,
}

impl WeatherView {
    pub fn new<Tz>(snapshot: &WeatherSnapshot, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let r = &snapshot.readings;
        let details = vec![
            DetailRow { icon: "thermometer", name: "Min temp", value: format_temperature(r.temp_min) },
            DetailRow { icon: "thermometer", name: "Max temp", value: format_temperature(r.temp_max) },
            DetailRow { icon: "wind", name: "Wind speed", value: format_wind_speed(snapshot.wind_speed) },
            DetailRow { icon: "humidity", name: "Humidity", value: format_humidity(r.humidity) },
        ];

        Self {
            location_name: snapshot.location_name.clone(),
            date_line: format!("Today, {}", now.format("%b %-d, %H:%M")),
            details,
            presentation: describe(snapshot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Welcome(WelcomeView),
    Locating,
    Loading,
    Weather(WeatherView),
    Unavailable { message: String },
}

impl AppState {
    pub fn screen<Tz>(&self, now: &DateTime<Tz>) -> Screen
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match &self.weather {
            WeatherState::Loaded(snapshot) => return Screen::Weather(WeatherView::new(snapshot, now)),
            WeatherState::Unavailable(message) => {
                return Screen::Unavailable { message: message.clone() };
            }
            WeatherState::Loading(_) => return Screen::Loading,
            WeatherState::Empty => {}
        }

        match &self.permission {
            PermissionState::Unrequested => Screen::Welcome(WelcomeView::new(None)),
            PermissionState::Requested => Screen::Locating,
            PermissionState::Denied(e) => Screen::Welcome(WelcomeView::new(Some(e.to_string()))),
            PermissionState::Granted(_) => Screen::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        location::PermissionError,
        model::{ConditionEntry, Readings},
        presentation::{IconId, ThemeId},
    };
    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 25, 14, 5, 0).unwrap()
    }

    fn snapshot(feels_like: f64, code: &str) -> WeatherSnapshot {
        WeatherSnapshot::new(
            "test",
            "Marrakesh",
            now(),
            Readings { feels_like, temp_min: 17.5, temp_max: 31.2, humidity: 40.4 },
            2.6,
            vec![ConditionEntry::new(code, code)],
        )
        .unwrap()
    }

    fn here() -> Coordinates {
        Coordinates::new(31.63, -8.0)
    }

    #[test]
    fn starts_on_welcome_without_notice() {
        let state = AppState::default();
        match state.screen(&now()) {
            Screen::Welcome(view) => {
                assert_eq!(view.title, WELCOME_TITLE);
                assert_eq!(view.action, SHARE_LOCATION);
                assert!(view.notice.is_none());
            }
            other => panic!("unexpected screen {other:?}"),
        }
    }

    #[test]
    fn requesting_shows_locating() {
        let mut state = AppState::default();
        assert_eq!(reducer(&mut state, Action::LocationRequested), None);
        assert_eq!(state.screen(&now()), Screen::Locating);
    }

    #[test]
    fn grant_triggers_fetch_for_granted_coordinates() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LocationRequested);

        let effect = reducer(&mut state, Action::LocationResolved(PermissionState::Granted(here())));

        assert_eq!(effect, Some(Effect::FetchWeather(here())));
        assert_eq!(state.weather, WeatherState::Loading(here()));
        assert_eq!(state.screen(&now()), Screen::Loading);
    }

    #[test]
    fn denial_returns_to_welcome_with_notice() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LocationRequested);

        let effect = reducer(
            &mut state,
            Action::LocationResolved(PermissionState::Denied(PermissionError::Denied)),
        );

        assert_eq!(effect, None);
        match state.screen(&now()) {
            Screen::Welcome(view) => {
                assert_eq!(view.notice.as_deref(), Some("Location access was denied"));
            }
            other => panic!("unexpected screen {other:?}"),
        }
    }

    #[test]
    fn loaded_weather_builds_weather_view() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LocationResolved(PermissionState::Granted(here())));
        reducer(&mut state, Action::WeatherDidLoad(snapshot(10.0, "Rain")));

        let Screen::Weather(view) = state.screen(&now()) else {
            panic!("expected weather screen");
        };

        assert_eq!(view.location_name, "Marrakesh");
        assert_eq!(view.date_line, "Today, Mar 25, 14:05");
        assert_eq!(view.presentation.theme, ThemeId::Rain);
        assert_eq!(view.presentation.icon, IconId::Cloud);
        assert_eq!(view.presentation.label, "Rain");

        let values: Vec<(&str, &str)> =
            view.details.iter().map(|row| (row.name, row.value.as_str())).collect();
        assert_eq!(
            values,
            vec![
                ("Min temp", "18°"),
                ("Max temp", "31°"),
                ("Wind speed", "3 m/s"),
                ("Humidity", "40%"),
            ]
        );
    }

    #[test]
    fn unavailable_source_shows_message_and_no_snapshot() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LocationResolved(PermissionState::Granted(here())));
        reducer(&mut state, Action::WeatherDidError("timeout".into()));

        assert_eq!(state.screen(&now()), Screen::Unavailable { message: "timeout".into() });
    }

    #[test]
    fn new_request_clears_previous_weather() {
        let mut state = AppState::default();
        reducer(&mut state, Action::WeatherDidLoad(snapshot(30.0, "Clear")));
        reducer(&mut state, Action::LocationRequested);

        assert_eq!(state.weather, WeatherState::Empty);
        assert_eq!(state.screen(&now()), Screen::Locating);
    }

    #[test]
    fn weather_screen_serializes_with_tag() {
        let view = WeatherView::new(&snapshot(30.0, "Clear"), &now());
        let json = serde_json::to_value(Screen::Weather(view)).unwrap();

        assert_eq!(json["screen"], "weather");
        assert_eq!(json["presentation"]["theme"], "clear");
        assert_eq!(json["presentation"]["icon"], "sun");
        assert_eq!(json["presentation"]["label"], "Sunny");
        assert_eq!(json["presentation"]["accent"], "warm");
    }
}
