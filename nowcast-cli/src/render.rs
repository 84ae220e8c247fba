use std::fmt::Write;

use nowcast_core::{
    presentation::Accent,
    screen::{Screen, WeatherView, WelcomeView},
};

pub fn render_welcome(view: &WelcomeView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", view.prompt);
    if let Some(notice) = &view.notice {
        let _ = writeln!(out);
        let _ = writeln!(out, "! {notice}");
    }
    out
}

pub fn render_weather(view: &WeatherView) -> String {
    let p = &view.presentation;
    let gradient = p.theme.gradient();

    let mut out = String::new();
    let _ = writeln!(out, "{}", view.location_name);
    let _ = writeln!(out, "{}", view.date_line);
    let _ = writeln!(
        out,
        "[{} sky: {} → {}]",
        p.theme,
        gradient.top.as_str(),
        gradient.bottom.as_str()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Weather now");
    for pair in view.details.chunks(2) {
        let line: Vec<String> =
            pair.iter().map(|row| format!("{:<11} {:<6}", row.name, row.value)).collect();
        let _ = writeln!(out, "  {}", line.join("  ").trim_end());
    }
    let _ = writeln!(out);

    let hot = match p.accent {
        Accent::Warm => " (hot)",
        Accent::Neutral => "",
    };
    let _ = writeln!(out, "  {} {}   {}{}", p.icon.symbol(), p.label, p.temperature, hot);
    out
}

/// Text for a screen, or `None` for screens that only show progress.
pub fn render(screen: &Screen) -> Option<String> {
    match screen {
        Screen::Welcome(view) => Some(render_welcome(view)),
        Screen::Weather(view) => Some(render_weather(view)),
        Screen::Unavailable { message } => Some(format!("Weather is unavailable: {message}\n")),
        Screen::Locating | Screen::Loading => None,
    }
}

pub fn progress(screen: &Screen) -> Option<&'static str> {
    match screen {
        Screen::Locating => Some("Locating…"),
        Screen::Loading => Some("Fetching weather…"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nowcast_core::{AppState, ConditionEntry, Readings, WeatherSnapshot};

    fn view(feels_like: f64, code: &str) -> WeatherView {
        let now = Utc.with_ymd_and_hms(2025, 3, 25, 9, 30, 0).unwrap();
        let snapshot = WeatherSnapshot::new(
            "test",
            "Fes",
            now,
            Readings { feels_like, temp_min: 12.0, temp_max: 27.5, humidity: 48.0 },
            4.4,
            vec![ConditionEntry::new(code, code)],
        )
        .unwrap();
        WeatherView::new(&snapshot, &now)
    }

    #[test]
    fn weather_screen_lists_details_and_summary() {
        let text = render_weather(&view(28.0, "Clear"));

        assert!(text.starts_with("Fes\nToday, Mar 25, 09:30\n"));
        assert!(text.contains("[clear sky: blue → yellow]"));
        assert!(text.contains("Min temp    12°"));
        assert!(text.contains("Max temp    28°"));
        assert!(text.contains("Wind speed  4 m/s"));
        assert!(text.contains("Humidity    48%"));
        assert!(text.contains("☀ Sunny   28° (hot)"));
    }

    #[test]
    fn mild_weather_uses_condition_label() {
        let text = render_weather(&view(14.0, "Clouds"));
        assert!(text.contains("☁ Clouds   14°\n"));
        assert!(!text.contains("(hot)"));
    }

    #[test]
    fn welcome_shows_notice_after_denial() {
        let view = WelcomeView {
            notice: Some("Location access was denied".into()),
            ..match AppState::default().screen(&Utc::now()) {
                Screen::Welcome(view) => view,
                other => panic!("unexpected screen {other:?}"),
            }
        };

        let text = render_welcome(&view);
        assert!(text.contains("Welcome to the Weather App"));
        assert!(text.ends_with("! Location access was denied\n"));
    }

    #[test]
    fn progress_screens_have_no_body() {
        assert!(render(&Screen::Locating).is_none());
        assert_eq!(progress(&Screen::Loading), Some("Fetching weather…"));
    }
}
