//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration loading (config file + environment)
//! - Geocoding and forecast clients over a pluggable HTTP transport
//! - PostgreSQL persistence of fetched forecasts
//! - Shared domain models (coordinates, forecast entries)
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod provider;
pub mod store;

pub use config::Config;
pub use error::ForecastError;
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use model::{
    CityForecast, Coordinates, ForecastEntry, ForecastRequest, ForecastSet, celsius_to_fahrenheit,
};
pub use provider::{
    geocoder::GeocodingClient, openweather::WeatherClient, weather_client_from_config,
};
pub use store::{
    ForecastRecord, ForecastSink, PersistSummary, PgForecastSink, PgSinkFactory, SinkFactory,
    persist_forecast,
};
