use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    CityForecast, Config, ForecastRequest, PgSinkFactory, SinkFactory, persist_forecast,
    weather_client_from_config,
};

use crate::report;

pub const DEFAULT_CITY: &str = "Delhi";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "City weather forecast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and optional database URL in the config file.
    Configure,

    /// Show the forecast for a city.
    Show {
        /// City name.
        #[arg(default_value = DEFAULT_CITY)]
        city: String,

        /// Number of forecast steps (3 hours each).
        #[arg(
            short = 'n',
            long,
            default_value_t = 5,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        count: u32,

        /// Don't write the forecast to the database even if one is configured.
        #[arg(long)]
        no_persist: bool,

        /// Print the forecast as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                count,
                no_persist,
                json,
            } => {
                let config = Config::load()?;
                let forecast = show(&config, &city, count, !no_persist, &PgSinkFactory).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&forecast)?);
                } else {
                    print!("{}", report::render(&forecast));
                }
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let database_url = inquire::Text::new("PostgreSQL URL (leave empty to disable storage):")
        .with_default(config.database_url().unwrap_or_default())
        .prompt()
        .context("Failed to read database URL")?;
    config.set_database_url(database_url);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

/// Fetch the forecast, then store it when a database is configured and `persist` is set.
async fn show<F>(
    config: &Config,
    city: &str,
    count: u32,
    persist: bool,
    sinks: &F,
) -> anyhow::Result<CityForecast>
where
    F: SinkFactory,
{
    let client = weather_client_from_config(config)?;
    let request = ForecastRequest::new(city, count.to_string());

    let forecast = client
        .forecast_for_city(&request)
        .await
        .with_context(|| format!("Error getting weather data for {city}"))?;

    match config.database_url() {
        Some(url) if persist => {
            let mut sink = sinks.open(url).await.context("Failed to open database")?;
            persist_forecast(&mut sink, &forecast).await;
            if let Err(err) = sinks.close(sink).await {
                tracing::warn!("Failed to close database connection: {err}");
            }
        }
        Some(_) => tracing::debug!("Persistence disabled by --no-persist"),
        None => tracing::debug!("No database configured; skipping persistence"),
    }

    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forecast_core::{ForecastError, ForecastRecord, ForecastSink};
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DATABASE_URL: &str = "postgres://localhost/forecast_test";

    #[derive(Debug, Default)]
    struct Recorded {
        opened: Vec<String>,
        rows: Vec<(String, f64)>,
        closed: usize,
    }

    #[derive(Default)]
    struct RecordingFactory {
        state: Arc<Mutex<Recorded>>,
        fail_close: bool,
    }

    struct RecordingSink {
        state: Arc<Mutex<Recorded>>,
    }

    #[async_trait]
    impl ForecastSink for RecordingSink {
        async fn insert(&mut self, record: ForecastRecord<'_>) -> Result<(), ForecastError> {
            let mut state = self.state.lock().unwrap();
            state
                .rows
                .push((record.city.to_string(), record.entry.temperature_c));
            Ok(())
        }
    }

    #[async_trait]
    impl SinkFactory for RecordingFactory {
        type Sink = RecordingSink;

        async fn open(&self, database_url: &str) -> Result<RecordingSink, ForecastError> {
            self.state
                .lock()
                .unwrap()
                .opened
                .push(database_url.to_string());
            Ok(RecordingSink {
                state: Arc::clone(&self.state),
            })
        }

        async fn close(&self, _sink: RecordingSink) -> Result<(), ForecastError> {
            self.state.lock().unwrap().closed += 1;
            if self.fail_close {
                return Err(ForecastError::Database(sqlx::Error::PoolClosed));
            }
            Ok(())
        }
    }

    async fn mock_server(forecast_status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": 28.6517, "lon": 77.2219}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(
                ResponseTemplate::new(forecast_status).set_body_json(serde_json::json!({
                    "list": [
                        {"main": {"temp": 30.0, "humidity": 40}, "weather": [{"description": "clear sky"}]},
                        {"main": {"temp": 28.5, "humidity": 45}, "weather": [{"description": "haze"}]},
                        {"main": {"temp": 26.0, "humidity": 50}, "weather": [{"description": "mist"}]}
                    ]
                })),
            )
            .mount(&server)
            .await;
        server
    }

    fn config(server: &MockServer, database_url: Option<&str>) -> Config {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.weather_base_url = format!("{}/data/2.5/forecast", server.uri());
        cfg.geocoder_base_url = format!("{}/geo/1.0/direct", server.uri());
        if let Some(url) = database_url {
            cfg.set_database_url(url.to_string());
        }
        cfg
    }

    #[test]
    fn show_defaults_to_delhi_and_five_steps() {
        let cli = Cli::try_parse_from(["forecast", "show"]).unwrap();
        match cli.command {
            Command::Show {
                city,
                count,
                no_persist,
                json,
            } => {
                assert_eq!(city, DEFAULT_CITY);
                assert_eq!(count, 5);
                assert!(!no_persist);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_accepts_city_and_flags() {
        let cli = Cli::try_parse_from([
            "forecast",
            "show",
            "Berlin",
            "-n",
            "8",
            "--no-persist",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Show {
                city,
                count,
                no_persist,
                json,
            } => {
                assert_eq!(city, "Berlin");
                assert_eq!(count, 8);
                assert!(no_persist);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(Cli::try_parse_from(["forecast", "show", "--count", "0"]).is_err());
    }

    #[tokio::test]
    async fn show_fails_fast_without_api_key() {
        let err = show(&Config::default(), "Delhi", 5, true, &PgSinkFactory)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[tokio::test]
    async fn every_fetched_entry_is_inserted() {
        let server = mock_server(200).await;
        let sinks = RecordingFactory::default();

        let forecast = show(&config(&server, Some(DATABASE_URL)), "Delhi", 3, true, &sinks)
            .await
            .unwrap();

        assert_eq!(forecast.entries.len(), 3);
        let state = sinks.state.lock().unwrap();
        assert_eq!(state.opened, vec![DATABASE_URL.to_string()]);
        assert_eq!(state.rows, vec![
            ("Delhi".to_string(), 30.0),
            ("Delhi".to_string(), 28.5),
            ("Delhi".to_string(), 26.0),
        ]);
        assert_eq!(state.closed, 1);
    }

    #[tokio::test]
    async fn weather_error_opens_no_sink() {
        let server = mock_server(503).await;
        let sinks = RecordingFactory::default();

        let err = show(&config(&server, Some(DATABASE_URL)), "Delhi", 3, true, &sinks)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("503"));
        let state = sinks.state.lock().unwrap();
        assert!(state.opened.is_empty());
        assert!(state.rows.is_empty());
    }

    #[tokio::test]
    async fn no_persist_flag_opens_no_sink() {
        let server = mock_server(200).await;
        let sinks = RecordingFactory::default();

        let forecast = show(&config(&server, Some(DATABASE_URL)), "Delhi", 3, false, &sinks)
            .await
            .unwrap();

        assert_eq!(forecast.entries.len(), 3);
        assert!(sinks.state.lock().unwrap().opened.is_empty());
    }

    #[tokio::test]
    async fn missing_database_url_opens_no_sink() {
        let server = mock_server(200).await;
        let sinks = RecordingFactory::default();

        show(&config(&server, None), "Delhi", 3, true, &sinks)
            .await
            .unwrap();

        assert!(sinks.state.lock().unwrap().opened.is_empty());
    }

    #[tokio::test]
    async fn close_failure_still_returns_forecast() {
        let server = mock_server(200).await;
        let sinks = RecordingFactory {
            fail_close: true,
            ..Default::default()
        };

        let forecast = show(&config(&server, Some(DATABASE_URL)), "Delhi", 3, true, &sinks)
            .await
            .unwrap();

        assert_eq!(forecast.entries.len(), 3);
        let state = sinks.state.lock().unwrap();
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.closed, 1);
    }
}
