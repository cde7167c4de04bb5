//! Pass-through proxy for `/api/{entity}` calls.

use crate::{ContentKind, Result};
use gazette_http_client::{HttpClient, Method, Response, StatusCode};
use gazette_log::{debug, error};
use serde_json::{Value, json};

/// What the proxy hands back to its caller: a status and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ProxyReply {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Forwards entity requests to the upstream API one-to-one.
///
/// Upstream answers pass through with their status. A non-2xx answer whose
/// body is not a JSON object is wrapped as `{"error": message}`. A request
/// that never got an answer becomes `500 {"error": "Internal server error"}`
/// and the cause is logged.
#[derive(Clone)]
pub struct EntityProxy {
    client: HttpClient,
}

impl EntityProxy {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn forward(
        &self,
        method: Method,
        kind: ContentKind,
        id: Option<&str>,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> ProxyReply {
        match self.send(method.clone(), kind, id, query, body).await {
            Ok(response) => Self::relay(response),
            Err(e) => {
                error!("Proxy {} {} failed: {}", method, kind, e);
                if e.is_validation() {
                    ProxyReply::error(StatusCode::BAD_REQUEST, e.to_string())
                } else {
                    ProxyReply::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        kind: ContentKind,
        id: Option<&str>,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Response> {
        let path = match id {
            Some(id) => kind.item_path(id)?,
            None => kind.collection_path(),
        };
        debug!("Proxy {} {}", method, path);

        let mut request = self
            .client
            .request(method, path)
            .queries(query.iter().cloned());
        if let Some(ref body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    fn relay(response: Response) -> ProxyReply {
        let status = response.status();
        let parsed = response.json::<Value>().ok();

        if status.is_success() {
            let body = match parsed {
                Some(value) => value,
                None if response.bytes().is_empty() => Value::Null,
                None => Value::String(response.text().unwrap_or_default()),
            };
            return ProxyReply::new(status, body);
        }

        match parsed {
            Some(Value::Object(map)) => ProxyReply::new(status, Value::Object(map)),
            _ => {
                let message = match response.text() {
                    Ok(text) if !text.trim().is_empty() => text,
                    _ => status.canonical_reason().unwrap_or("Unknown error").to_string(),
                };
                ProxyReply::error(status, message)
            }
        }
    }
}
