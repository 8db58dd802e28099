use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::{
    error::{ForecastError, Result},
    http::{HttpTransport, ReqwestTransport, truncate_body},
    model::{CityForecast, Coordinates, ForecastEntry, ForecastRequest, ForecastSet},
};

use super::geocoder::GeocodingClient;

/// Client for the OpenWeather 5 day / 3 hour forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    geocoder: GeocodingClient,
    transport: Arc<dyn HttpTransport>,
}

impl WeatherClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        geocoder: GeocodingClient,
    ) -> Self {
        Self::with_transport(api_key, base_url, geocoder, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        geocoder: GeocodingClient,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            geocoder,
            transport,
        }
    }

    /// Resolve the city, then fetch its forecast.
    pub async fn forecast_for_city(&self, request: &ForecastRequest) -> Result<CityForecast> {
        let coordinates = self.geocoder.resolve(&request.city).await?;
        let entries = self.fetch_forecast(coordinates, &request.count).await?;

        tracing::info!(city = %request.city, entries = entries.len(), "Fetched forecast");

        Ok(CityForecast {
            city: request.city.clone(),
            coordinates,
            entries,
        })
    }

    /// Fetch `count` forecast steps for the given coordinates.
    pub async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
        count: &str,
    ) -> Result<ForecastSet> {
        let cnt = parse_count(count)?;

        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("lat", &format!("{:.2}", coordinates.latitude))
            .append_pair("lon", &format!("{:.2}", coordinates.longitude))
            .append_pair("cnt", &cnt.to_string())
            .append_pair("appid", &self.api_key)
            .append_pair("units", "metric");

        tracing::debug!(
            lat = coordinates.latitude,
            lon = coordinates.longitude,
            cnt,
            "Requesting forecast"
        );
        let res = self.transport.get(url).await?;

        if !res.is_ok() {
            return Err(ForecastError::UnexpectedStatus {
                status: res.status,
                body: truncate_body(&res.body),
            });
        }

        let parsed: OwForecastResponse = serde_json::from_str(&res.body)?;

        parsed.list.into_iter().map(ForecastEntry::try_from).collect()
    }
}

fn parse_count(count: &str) -> Result<u32> {
    match count.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ForecastError::InvalidCount(count.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    dt_txt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl TryFrom<OwForecastEntry> for ForecastEntry {
    type Error = ForecastError;

    fn try_from(entry: OwForecastEntry) -> Result<Self> {
        let description = entry
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or(ForecastError::EmptyResult("weather description"))?;

        Ok(ForecastEntry {
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            description,
            forecast_time: entry.dt_txt,
        })
    }
}
