//! HTTP client for the cyber-risk service and the geography provider.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    types::{CountryRecord, FeatureCollection, Insights, Prediction, PredictionRequest},
    Error,
};

const USER_AGENT: &str = concat!("cyberrisk/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the cyber-risk service.
///
/// Each request builds a fresh `reqwest::Client` with a 30-second timeout.
/// The geography file lives on a third-party host, so [`Client::get_geography`]
/// takes an absolute URL instead of a path.
pub struct Client {
    /// Base URL for the service. Defaults to `http://localhost:8000/api`.
    base_api_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at a locally running service.
    pub fn new() -> Self {
        Self {
            base_api_url: "http://localhost:8000/api".to_string(),
        }
    }

    /// Creates a new client with a custom base URL. Used for deployments and wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })
    }

    fn http() -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })
    }

    async fn read_body<T>(resp: reqwest::Response) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::RequestFailed
        })
    }

    async fn get<T>(&self, url: Url) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let resp = Self::http()?
            .get(url)
            .header("accept", "application/json, text/plain, */*")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;
        Self::read_body(resp).await
    }

    /// Fetches the full per-country record set.
    pub async fn get_countries(&self) -> Result<Vec<CountryRecord>, Error> {
        self.get::<Vec<CountryRecord>>(self.get_url("/countries")?)
            .await
    }

    /// Fetches the correlation matrix and feature importances.
    pub async fn get_insights(&self) -> Result<Insights, Error> {
        self.get::<Insights>(self.get_url("/insights")?).await
    }

    /// Fetches a GeoJSON country-polygon file from an absolute URL.
    pub async fn get_geography(&self, url: &str) -> Result<FeatureCollection, Error> {
        let url = Url::parse(url).map_err(|e| {
            tracing::error!("Invalid geography URL '{}': {}", url, e);
            Error::RequestFailed
        })?;
        self.get::<FeatureCollection>(url).await
    }

    /// Posts indicator values to the model and returns its raw answer.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, Error> {
        let resp = Self::http()?
            .post(self.get_url("/predict")?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to post prediction request: {}", e);
                Error::RequestFailed
            })?;
        Self::read_body(resp).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = Client::with_base_url("https://risk.example.com/api/");
        assert_eq!(client.base_url(), "https://risk.example.com/api");
        let url = client.get_url("/countries").unwrap();
        assert_eq!(url.as_str(), "https://risk.example.com/api/countries");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
    }
}
