use crate::error::{Error, Result};
use crate::http;
use crate::store::traits::DocumentStore;
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Document store reached over the realtime-database REST protocol.
///
/// Every path maps to `{base_url}/{path}.json` and the bearer token travels as
/// the `auth` query parameter.
#[derive(Clone)]
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
}

impl RestDocumentStore {
    /// Create a store client with no client-imposed timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a store client; an expired `timeout` surfaces as a transport error
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: http::client(timeout)?,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    async fn request(&self, method: Method, token: &str, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).query(&[("auth", token)]);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = http::send(request).await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let (status, message) = http::failure(response).await;
        if http::is_auth_status(status) {
            Err(Error::Authorization(message))
        } else {
            Err(Error::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    #[tracing::instrument(skip(self, token, doc))]
    async fn create(&self, token: &str, collection: &str, doc: Value) -> Result<String> {
        let response = self.request(Method::POST, token, collection, Some(&doc)).await?;
        let body = http::json_body(response, collection).await?;

        body.get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::decode(collection, "create response carried no generated key"))
    }

    #[tracing::instrument(skip(self, token))]
    async fn get(&self, token: &str, path: &str) -> Result<Option<Value>> {
        let response = self.request(Method::GET, token, path, None).await?;
        match http::json_body(response, path).await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    #[tracing::instrument(skip(self, token, partial))]
    async fn update(&self, token: &str, path: &str, partial: Value) -> Result<()> {
        self.request(Method::PATCH, token, path, Some(&partial)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete(&self, token: &str, path: &str) -> Result<()> {
        self.request(Method::DELETE, token, path, None).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let store = RestDocumentStore::new("https://stays.example.com/").unwrap();
        assert_eq!(store.url("bookings"), "https://stays.example.com/bookings.json");
        assert_eq!(store.url("/bookings/-Nh1"), "https://stays.example.com/bookings/-Nh1.json");
    }
}
