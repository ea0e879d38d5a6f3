pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::InMemoryDocumentStore;
pub use rest::RestDocumentStore;
pub use traits::DocumentStore;

use crate::error::{Error, Result, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const LISTINGS: &str = "listings";
pub const CATEGORIES: &str = "categories";
pub const BOOKINGS: &str = "bookings";

/// Characters the store does not allow inside a key, plus the ones that would
/// leave the URL path (`?`) or be decoded into another key (`%`)
const RESERVED: &[char] = &['/', '.', '#', '$', '[', ']', '?', '%'];

/// Path of a single document, refusing ids that would address something else
pub fn doc_path(collection: &str, id: &str) -> Result<String> {
    if id.trim().is_empty() || id.contains(RESERVED) {
        return Err(ValidationError::InvalidId(id.to_string()).into());
    }
    Ok(format!("{}/{}", collection, id))
}

/// Decode a collection read into `(id, document)` pairs in key order.
///
/// A missing collection decodes as empty. Entries that fail to decode are an
/// error rather than being skipped.
pub fn decode_collection<T: DeserializeOwned>(
    collection: &str,
    value: Option<Value>,
) -> Result<Vec<(String, T)>> {
    let entries: Vec<(String, Value)> = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map.into_iter().collect(),
        // Integer-like keys come back as a sparse array
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Some(other) => {
            return Err(Error::decode(
                collection,
                format!("expected an object, found {}", other),
            ))
        }
    };

    entries
        .into_iter()
        .map(|(id, doc)| {
            serde_json::from_value(doc)
                .map(|decoded| (id.clone(), decoded))
                .map_err(|e| Error::decode(format!("{}/{}", collection, id), e))
        })
        .collect()
}

/// Decode a single document read
pub fn decode_document<T: DeserializeOwned>(path: &str, value: Option<Value>) -> Result<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(doc) => serde_json::from_value(doc)
            .map(Some)
            .map_err(|e| Error::decode(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use serde_json::json;

    #[test]
    fn test_doc_path_rejects_reserved_ids() {
        assert_eq!(doc_path(BOOKINGS, "-Nh1").unwrap(), "bookings/-Nh1");
        for bad in ["", "  ", "a/b", "a.b", "x#", "$x", "[0]", "abc?x", "a%2Fb", "%"] {
            assert!(
                matches!(doc_path(BOOKINGS, bad), Err(Error::Validation(ValidationError::InvalidId(_)))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_decode_collection_shapes() {
        let empty: Vec<(String, Category)> = decode_collection(CATEGORIES, None).unwrap();
        assert!(empty.is_empty());

        let keyed: Vec<(String, Category)> = decode_collection(
            CATEGORIES,
            Some(json!({ "-b": { "name": "Villa" }, "-a": "Apartment" })),
        )
        .unwrap();
        assert_eq!(keyed[0].0, "-a");
        assert_eq!(keyed[1].1.name, "Villa");

        let sparse: Vec<(String, Category)> =
            decode_collection(CATEGORIES, Some(json!([null, "Villa"]))).unwrap();
        assert_eq!(sparse, vec![("1".to_string(), Category { name: "Villa".into() })]);
    }

    #[test]
    fn test_decode_collection_reports_bad_entry() {
        let result: Result<Vec<(String, Category)>> =
            decode_collection(CATEGORIES, Some(json!({ "-a": 42 })));
        match result {
            Err(Error::Decode { path, .. }) => assert_eq!(path, "categories/-a"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
