use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Common trait for the shared document store.
///
/// Paths are `/`-separated (`bookings/-Nh1`). Every call carries the caller's
/// bearer token; authorization is decided by the store, never here. Calls are
/// never retried.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append `doc` to `collection`, returning the key the store generated
    async fn create(&self, token: &str, collection: &str, doc: Value) -> Result<String>;

    /// Read the full subtree at `path`; `None` when nothing is stored there
    async fn get(&self, token: &str, path: &str) -> Result<Option<Value>>;

    /// Shallow-merge the fields of `partial` into the object at `path`
    async fn update(&self, token: &str, path: &str, partial: Value) -> Result<()>;

    /// Remove whatever is stored at `path`. Removing nothing is not an error.
    async fn delete(&self, token: &str, path: &str) -> Result<()>;

    /// Name of the backend, for logs
    fn backend_name(&self) -> &'static str;
}
