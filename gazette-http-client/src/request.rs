//! Request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP request builder.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
    error: Option<HttpClientError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            error: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                self.error
                    .get_or_insert(HttpClientError::RequestBuild(format!(
                        "invalid header {}",
                        name
                    )));
            }
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add multiple query parameters.
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.push((k.into(), v.into()));
        }
        self
    }

    /// Add query parameters from a serializable struct.
    ///
    /// `None` fields are skipped by `serde_urlencoded`, so optional filters
    /// simply disappear from the query string.
    pub fn query_params<T: Serialize>(mut self, params: &T) -> Self {
        match serde_urlencoded::to_string(params) {
            Ok(encoded) => {
                let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&encoded)
                    .unwrap_or_default();
                self.query.extend(pairs);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode query parameters");
                self.error
                    .get_or_insert(HttpClientError::RequestBuild(e.to_string()));
            }
        }
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Some(bytes);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON body");
                self.error
                    .get_or_insert(HttpClientError::RequestBuild(e.to_string()));
            }
        }
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Build the URL with query parameters.
    pub(crate) fn build_url(&self) -> Result<url::Url> {
        let mut url = match &self.client.config().base_url {
            Some(base) => {
                let base = url::Url::parse(base)
                    .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
                base.join(&self.url)
                    .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?
            }
            None => url::Url::parse(&self.url)
                .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?,
        };

        if !self.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send the request. Any status code counts as a completed request.
    pub async fn send(self) -> Result<Response> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let url = self.build_url()?;
        let mut request = self.client.inner().request(self.method.clone(), url);

        for (name, value) in &self.client.config().default_headers {
            if !self.headers.contains_key(name.as_str()) {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        if let Some(body) = self.body {
            request = request.body(body);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        self.client.execute(request.build()?).await
    }

    /// Send, require a 2xx status and decode the JSON body.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.error_for_status()?.into_json()
    }

    /// Like [`send_json`](Self::send_json) but maps 404 to `Ok(None)`.
    pub async fn send_optional_json<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let response = self.send().await?;
        if response.is_not_found() {
            return Ok(None);
        }
        response.error_for_status()?.into_json().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientConfig;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filters {
        search_query: Option<String>,
        source_filter: Option<String>,
    }

    fn client() -> HttpClient {
        HttpClient::new(
            HttpClientConfig::builder()
                .base_url("http://portal.local")
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_relative_path_joins_base_url() {
        let client = client();
        let url = client
            .get("/api/articles")
            .query("page", "2")
            .build_url()
            .unwrap();
        assert_eq!(url.as_str(), "http://portal.local/api/articles?page=2");
    }

    #[test]
    fn test_query_params_skip_none() {
        let client = client();
        let url = client
            .get("/api/articles")
            .query_params(&Filters {
                search_query: Some("rust lang".to_string()),
                source_filter: None,
            })
            .build_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://portal.local/api/articles?searchQuery=rust+lang"
        );
    }

    #[tokio::test]
    async fn test_invalid_header_fails_on_send() {
        let client = client();
        let result = client
            .get("/api/articles")
            .header("bad header", "x")
            .send()
            .await;
        assert!(matches!(result, Err(HttpClientError::RequestBuild(_))));
    }
}
