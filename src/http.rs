//! Response handling shared by the REST store and the identity provider client

use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Build a client; `timeout` is whatever the caller configured, if anything
pub(crate) fn client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("luxestays/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(transport)
}

pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    request.send().await.map_err(transport)
}

pub(crate) fn transport(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport(format!("request timed out: {}", err))
    } else {
        Error::Transport(err.to_string())
    }
}

/// Read a successful response body as JSON. An empty body reads as `null`.
pub(crate) async fn json_body(response: Response, what: &str) -> Result<Value> {
    let text = response.text().await.map_err(transport)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| Error::decode(what, e))
}

/// Status and best-effort message of a failed response
pub(crate) async fn failure(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "unexpected response");
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    (status, message)
}

/// Pull the message out of `{"error": "..."}` or `{"error": {"message": "..."}}`
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

pub(crate) fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}
