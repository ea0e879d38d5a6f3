use crate::error::{Error, Result};
use crate::store::traits::DocumentStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local document tree with the same path semantics as the REST store.
///
/// Generated keys sort in creation order. When built with
/// [`InMemoryDocumentStore::with_tokens`] any other token is refused.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    root: Mutex<Value>,
    next_key: AtomicU64,
    tokens: Option<HashSet<String>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: Some(tokens.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Write `value` at `path` directly, bypassing authorization
    pub fn seed(&self, path: &str, value: Value) {
        *lookup_mut(&mut self.lock(), path) = strip_nulls(value);
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        self.root.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn authorize(&self, token: &str) -> Result<()> {
        match &self.tokens {
            Some(tokens) if !tokens.contains(token) => {
                Err(Error::Authorization("token not accepted".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, token: &str, collection: &str, doc: Value) -> Result<String> {
        self.authorize(token)?;
        let key = format!("-M{:018}", self.next_key.fetch_add(1, Ordering::SeqCst));
        let path = format!("{}/{}", collection.trim_matches('/'), key);
        *lookup_mut(&mut self.lock(), &path) = strip_nulls(doc);
        Ok(key)
    }

    async fn get(&self, token: &str, path: &str) -> Result<Option<Value>> {
        self.authorize(token)?;
        let root = self.lock();
        Ok(segments(path)
            .try_fold(&*root, |node, key| node.get(key))
            .filter(|value| !value.is_null())
            .cloned())
    }

    async fn update(&self, token: &str, path: &str, partial: Value) -> Result<()> {
        self.authorize(token)?;
        let Value::Object(fields) = partial else {
            return Err(Error::Rejected {
                status: 400,
                message: "update body must be an object".to_string(),
            });
        };

        let mut root = self.lock();
        let target = ensure_object(lookup_mut(&mut root, path));
        for (key, value) in fields {
            // A null field deletes it
            if value.is_null() {
                target.remove(&key);
            } else {
                target.insert(key, strip_nulls(value));
            }
        }
        Ok(())
    }

    async fn delete(&self, token: &str, path: &str) -> Result<()> {
        self.authorize(token)?;
        let trimmed = path.trim_matches('/');
        let (parent, key) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));

        let mut root = self.lock();
        let parent = segments(parent).try_fold(&mut *root, |node, k| node.get_mut(k));
        if let Some(Value::Object(map)) = parent {
            map.remove(key);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

/// Walk to `path`, creating intermediate objects as needed
fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    segments(path).fold(root, |node, key| {
        ensure_object(node)
            .entry(key.to_string())
            .or_insert(Value::Null)
    })
}

/// The store never keeps explicit nulls
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}
