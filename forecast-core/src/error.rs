use thiserror::Error;

/// Errors produced while resolving, fetching or storing a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(
        "No API key configured.\n\
         Hint: run `forecast configure` or set the API_KEY environment variable."
    )]
    MissingApiKey,

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid forecast count '{0}': expected a positive integer")]
    InvalidCount(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Location not found for '{city}' (geocoder returned status {status})")]
    LocationNotFound { city: String, status: u16 },

    #[error("Unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Response contained no {0}")]
    EmptyResult(&'static str),

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
