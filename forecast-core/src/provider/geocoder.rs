use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::{
    error::{ForecastError, Result},
    http::{HttpTransport, ReqwestTransport},
    model::Coordinates,
};

/// Resolves city names to coordinates via a direct-geocoding endpoint.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    api_key: String,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    lat: f64,
    lon: f64,
}

impl GeocodingClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_transport(api_key, base_url, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            transport,
        }
    }

    /// Coordinates of the first match for `city`.
    pub async fn resolve(&self, city: &str) -> Result<Coordinates> {
        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("q", city)
            .append_pair("appid", &self.api_key);

        tracing::debug!(city, "Requesting coordinates");
        let res = self.transport.get(url).await?;

        if !res.is_ok() {
            return Err(ForecastError::LocationNotFound {
                city: city.to_string(),
                status: res.status,
            });
        }

        let results: Vec<GeoResult> = serde_json::from_str(&res.body)?;
        let first = results
            .into_iter()
            .next()
            .ok_or(ForecastError::EmptyResult("geocoding results"))?;

        let coordinates = Coordinates {
            latitude: first.lat,
            longitude: first.lon,
        };
        tracing::debug!(
            city,
            lat = coordinates.latitude,
            lon = coordinates.longitude,
            "Resolved coordinates"
        );

        Ok(coordinates)
    }
}
