use crate::{
    Config,
    error::Result,
    provider::{geocoder::GeocodingClient, openweather::WeatherClient},
};

pub mod geocoder;
pub mod openweather;

/// Construct the weather client (and its geocoder) from config.
///
/// Fails with [`crate::ForecastError::MissingApiKey`] when no key is configured.
pub fn weather_client_from_config(config: &Config) -> Result<WeatherClient> {
    let api_key = config.api_key()?;

    let geocoder = GeocodingClient::new(api_key, config.geocoder_base_url.as_str());
    Ok(WeatherClient::new(api_key, config.weather_base_url.as_str(), geocoder))
}
