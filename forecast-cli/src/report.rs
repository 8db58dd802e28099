use forecast_core::{CityForecast, ForecastEntry};

const DATE_FORMAT: &str = "%a %d %b %H:%M";

/// Plain-text report, one block per forecast entry.
pub fn render(forecast: &CityForecast) -> String {
    let mut out = format!(
        "Weather in {} ({:.2}, {:.2})\n",
        forecast.city, forecast.coordinates.latitude, forecast.coordinates.longitude
    );

    if forecast.entries.is_empty() {
        out.push_str("\nNo forecast entries returned.\n");
        return out;
    }

    for entry in &forecast.entries {
        out.push('\n');
        out.push_str(&render_entry(entry));
    }
    out
}

fn render_entry(entry: &ForecastEntry) -> String {
    format!(
        "Forecast for {}\n\
         Temperature: {:.2}°C or {:.2}°F\n\
         Humidity: {:.2}%\n\
         Description: {}\n",
        forecast_date(entry),
        entry.temperature_c,
        entry.temperature_f(),
        entry.humidity_pct,
        entry.description
    )
}

fn forecast_date(entry: &ForecastEntry) -> String {
    match (entry.forecast_datetime(), entry.forecast_time.as_deref()) {
        (Some(dt), _) => dt.format(DATE_FORMAT).to_string(),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => "unknown".to_string(),
    }
}
