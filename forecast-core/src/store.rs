//! PostgreSQL persistence for fetched forecasts.
//!
//! A sink lives for a single run: open, ensure the table, insert one row per
//! forecast entry, close. Individual insert failures are logged and skipped.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};

use crate::{
    error::Result,
    model::{CityForecast, Coordinates, ForecastEntry},
};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS weather_forecast (
    id SERIAL PRIMARY KEY,
    city_name VARCHAR(255) NOT NULL,
    lat FLOAT NOT NULL,
    lon FLOAT NOT NULL,
    temperature FLOAT NOT NULL,
    humidity FLOAT NOT NULL,
    description VARCHAR(255) NOT NULL,
    date_of_forecast VARCHAR(255) NOT NULL,
    recorded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

const INSERT_SQL: &str = r#"
INSERT INTO weather_forecast (city_name, lat, lon, temperature, humidity, description, date_of_forecast)
VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// One row of `weather_forecast`.
#[derive(Debug, Clone, Copy)]
pub struct ForecastRecord<'a> {
    pub city: &'a str,
    pub coordinates: Coordinates,
    pub entry: &'a ForecastEntry,
}

#[async_trait]
pub trait ForecastSink: Send {
    async fn insert(&mut self, record: ForecastRecord<'_>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub failed: usize,
}

/// Insert every entry of `forecast`, one row each.
///
/// Never fails: insert errors are logged and counted in the summary.
pub async fn persist_forecast<S>(sink: &mut S, forecast: &CityForecast) -> PersistSummary
where
    S: ForecastSink + ?Sized,
{
    let mut summary = PersistSummary::default();

    for entry in &forecast.entries {
        let record = ForecastRecord {
            city: &forecast.city,
            coordinates: forecast.coordinates,
            entry,
        };

        match sink.insert(record).await {
            Ok(()) => summary.inserted += 1,
            Err(err) => {
                tracing::warn!(city = %forecast.city, "Failed to insert forecast row: {err}");
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        failed = summary.failed,
        "Persisted forecast"
    );
    summary
}

/// Sink backed by a single PostgreSQL connection.
#[derive(Debug)]
pub struct PgForecastSink {
    conn: PgConnection,
}

impl PgForecastSink {
    /// Connect and verify the connection is alive.
    pub async fn open(database_url: &str) -> Result<Self> {
        let mut conn = PgConnection::connect(database_url).await?;
        conn.ping().await?;

        tracing::info!("Connected to the database");
        Ok(Self { conn })
    }

    pub async fn ensure_schema(&mut self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&mut self.conn).await?;

        tracing::debug!("Table weather_forecast created or already exists");
        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl ForecastSink for PgForecastSink {
    async fn insert(&mut self, record: ForecastRecord<'_>) -> Result<()> {
        sqlx::query(INSERT_SQL)
            .bind(record.city)
            .bind(record.coordinates.latitude)
            .bind(record.coordinates.longitude)
            .bind(record.entry.temperature_c)
            .bind(record.entry.humidity_pct)
            .bind(record.entry.description.as_str())
            .bind(record.entry.forecast_time.as_deref().unwrap_or_default())
            .execute(&mut self.conn)
            .await?;

        Ok(())
    }
}

/// Opens a ready-to-use sink for a run and closes it afterwards.
#[async_trait]
pub trait SinkFactory: Sync {
    type Sink: ForecastSink;

    /// Connect and make sure the forecast table exists.
    async fn open(&self, database_url: &str) -> Result<Self::Sink>;

    async fn close(&self, sink: Self::Sink) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PgSinkFactory;

#[async_trait]
impl SinkFactory for PgSinkFactory {
    type Sink = PgForecastSink;

    async fn open(&self, database_url: &str) -> Result<PgForecastSink> {
        let mut sink = PgForecastSink::open(database_url).await?;
        sink.ensure_schema().await?;
        Ok(sink)
    }

    async fn close(&self, sink: PgForecastSink) -> Result<()> {
        sink.close().await
    }
}
