use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use url::Url;

use crate::error::Result;

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The single HTTP operation the API clients need.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: Url) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse> {
        let res = self.http.get(url).send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(HttpResponse { status, body })
    }
}

/// Shortens a response body for inclusion in error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// In-memory transport replaying queued responses and recording requested URLs.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CannedTransport {
    responses: std::sync::Mutex<std::collections::VecDeque<HttpResponse>>,
    requests: std::sync::Mutex<Vec<Url>>,
}

#[cfg(test)]
impl CannedTransport {
    pub(crate) fn new(responses: impl IntoIterator<Item = (u16, &'static str)>) -> Self {
        let responses = responses
            .into_iter()
            .map(|(status, body)| HttpResponse {
                status,
                body: body.to_string(),
            })
            .collect();
        Self {
            responses: std::sync::Mutex::new(responses),
            requests: Default::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for CannedTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(url);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or(HttpResponse {
            status: 404,
            body: String::new(),
        }))
    }
}
