//! Event loop for `nowcast show`.
//!
//! Owns the [`AppState`] and the [`LocationGate`]. Every change goes through
//! the core reducer and the next screen is derived from the resulting state.

use anyhow::{Context, anyhow};
use chrono::Local;
use inquire::{Confirm, InquireError};
use std::sync::Arc;
use tokio::sync::mpsc;

use nowcast_core::{
    Action, AppState, Effect, LocationGate, LocationService, Screen, WeatherRequest,
    WeatherSource, reducer,
};

use crate::render;

/// Answers the welcome screen's question; `Ok(false)` ends the session.
type SharePrompt = Box<dyn FnMut(&str) -> anyhow::Result<bool> + Send>;

pub struct Session {
    location: Arc<dyn LocationService>,
    weather: Arc<dyn WeatherSource>,
    auto_share: bool,
    json: bool,
    prompt: SharePrompt,
}

impl Session {
    pub fn new(
        location: Arc<dyn LocationService>,
        weather: Arc<dyn WeatherSource>,
        auto_share: bool,
        json: bool,
    ) -> Self {
        Self { location, weather, auto_share, json, prompt: Box::new(ask_to_share) }
    }

    #[cfg(test)]
    fn with_prompt(mut self, prompt: impl FnMut(&str) -> anyhow::Result<bool> + Send + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Drive the flow until the user declines or a weather result (or error)
    /// is on screen. Returns the last screen shown.
    pub async fn run(mut self) -> anyhow::Result<Screen> {
        let mut state = AppState::default();
        let mut gate = LocationGate::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

        loop {
            let screen = state.screen(&Local::now());
            self.show(&screen)?;

            match screen {
                Screen::Welcome(view) => {
                    // --yes answers the first prompt only, so a denial can't loop forever.
                    let share = std::mem::take(&mut self.auto_share) || (self.prompt)(view.action)?;
                    if !share {
                        return Ok(Screen::Welcome(view));
                    }
                    reducer(&mut state, Action::LocationRequested);
                }

                // "Locating…" is already on stderr, so a consent prompt
                // started by the service can't interleave with it.
                Screen::Locating => {
                    gate.activate(self.location.clone());
                    let permission = gate.settle().await.clone();
                    if let Some(effect) = reducer(&mut state, Action::LocationResolved(permission)) {
                        self.spawn(effect, tx.clone());
                    }
                }

                Screen::Loading => {
                    let action = rx.recv().await.ok_or_else(|| anyhow!("weather fetch was lost"))?;
                    reducer(&mut state, action);
                }

                done @ (Screen::Weather(_) | Screen::Unavailable { .. }) => return Ok(done),
            }
        }
    }

    fn show(&self, screen: &Screen) -> anyhow::Result<()> {
        if let Some(status) = render::progress(screen) {
            eprintln!("{status}");
            return Ok(());
        }

        let terminal = matches!(screen, Screen::Weather(_) | Screen::Unavailable { .. });
        if self.json {
            if terminal {
                let json = serde_json::to_string_pretty(screen).context("Failed to serialize screen")?;
                println!("{json}");
            } else if let Some(text) = render::render(screen) {
                eprint!("{text}");
            }
        } else if let Some(text) = render::render(screen) {
            print!("{text}");
        }
        Ok(())
    }

    fn spawn(&self, effect: Effect, tx: mpsc::UnboundedSender<Action>) {
        match effect {
            Effect::FetchWeather(coordinates) => {
                let source = self.weather.clone();
                tokio::spawn(async move {
                    let action = match source.fetch(&WeatherRequest { coordinates }).await {
                        Ok(snapshot) => Action::WeatherDidLoad(snapshot),
                        Err(e) => {
                            let message = format!("{e:#}");
                            tracing::warn!(error = %message, "weather fetch failed");
                            Action::WeatherDidError(message)
                        }
                    };
                    // The session owns the receiver until it returns.
                    let _ = tx.send(action);
                });
            }
        }
    }
}

fn ask_to_share(action: &str) -> anyhow::Result<bool> {
    match Confirm::new(&format!("{action}?")).with_default(true).prompt() {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(e).context(
            "Failed to ask for the location.\n\
             Hint: pass --yes, or --lat/--lon, when not running in a terminal.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use nowcast_core::{
        ConditionEntry, Coordinates, FixedLocation, IconId, PermissionError, Readings,
        WeatherSnapshot,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RABAT: Coordinates = Coordinates { latitude: 34.02, longitude: -6.84 };

    #[derive(Debug)]
    struct SunnySource;

    #[async_trait]
    impl WeatherSource for SunnySource {
        async fn fetch(&self, request: &WeatherRequest) -> anyhow::Result<WeatherSnapshot> {
            assert_eq!(request.coordinates, RABAT);
            let readings = Readings { feels_like: 30.0, temp_min: 24.0, temp_max: 31.0, humidity: 40.0 };
            Ok(WeatherSnapshot::new(
                "test",
                "Rabat",
                Utc::now(),
                readings,
                3.0,
                vec![ConditionEntry::new("Clear", "Clear sky")],
            )?)
        }
    }

    #[derive(Debug)]
    struct BrokenSource;

    #[async_trait]
    impl WeatherSource for BrokenSource {
        async fn fetch(&self, _request: &WeatherRequest) -> anyhow::Result<WeatherSnapshot> {
            Err(anyhow!("boom"))
        }
    }

    #[derive(Debug)]
    struct DeniedLocation;

    #[async_trait]
    impl LocationService for DeniedLocation {
        async fn request_location(&self) -> Result<Coordinates, PermissionError> {
            Err(PermissionError::Denied)
        }
    }

    fn session(location: Arc<dyn LocationService>, weather: Arc<dyn WeatherSource>) -> Session {
        Session::new(location, weather, true, true)
            .with_prompt(|_| panic!("--yes should answer the first prompt"))
    }

    #[tokio::test]
    async fn shows_weather_when_the_source_answers() {
        let screen = session(Arc::new(FixedLocation(RABAT)), Arc::new(SunnySource))
            .run()
            .await
            .expect("session runs");

        match screen {
            Screen::Weather(view) => {
                assert_eq!(view.location_name, "Rabat");
                assert_eq!(view.presentation.icon, IconId::Sun);
                assert_eq!(view.presentation.label, "Sunny");
            }
            other => panic!("expected weather, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn source_failure_ends_on_unavailable() {
        let screen = session(Arc::new(FixedLocation(RABAT)), Arc::new(BrokenSource))
            .run()
            .await
            .expect("a failed fetch is a screen, not an error");

        match screen {
            Screen::Unavailable { message } => assert!(message.contains("boom")),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn denial_asks_again_and_declining_ends_on_welcome() {
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();

        let screen = Session::new(Arc::new(DeniedLocation), Arc::new(SunnySource), true, true)
            .with_prompt(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            })
            .run()
            .await
            .expect("session runs");

        assert_eq!(asked.load(Ordering::SeqCst), 1);
        match screen {
            Screen::Welcome(view) => assert!(view.notice.is_some()),
            other => panic!("expected welcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn declining_without_yes_never_touches_location() {
        #[derive(Debug)]
        struct Unreachable;

        #[async_trait]
        impl LocationService for Unreachable {
            async fn request_location(&self) -> Result<Coordinates, PermissionError> {
                panic!("location requested without consent")
            }
        }

        let screen = Session::new(Arc::new(Unreachable), Arc::new(BrokenSource), false, true)
            .with_prompt(|action| {
                assert_eq!(action, "Share current location");
                Ok(false)
            })
            .run()
            .await
            .expect("session runs");

        assert!(matches!(screen, Screen::Welcome(view) if view.notice.is_none()));
    }
}
