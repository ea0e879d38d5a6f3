use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

pub mod booking;

pub use booking::{Booking, BookingStatus, Decision, ListingSnapshot};

/// A rentable unit as stored under `listings/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Store-assigned key, filled in from the path on read
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    /// Nightly price
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "pincode", default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub category: String,
    /// Encoded image URIs in display order
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "available")]
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the owner when creating a listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub name: String,
    pub price: f64,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub category: String,
    pub images: Vec<String>,
    pub description: String,
    pub availability: bool,
}

impl NewListing {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            address: String::new(),
            postal_code: String::new(),
            city: String::new(),
            category: String::new(),
            images: Vec::new(),
            description: String::new(),
            availability: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }

    /// Builds the stored document; the id stays empty until the store assigns one
    pub fn into_listing(self, created_at: DateTime<Utc>) -> Listing {
        Listing {
            id: String::new(),
            name: self.name,
            price: self.price,
            address: self.address,
            postal_code: self.postal_code,
            city: self.city,
            category: self.category,
            images: self.images,
            description: self.description,
            availability: self.availability,
            created_at,
        }
    }
}

/// Partial update for a listing. `images` replaces the whole list when present.
///
/// There is deliberately no way to touch `id` or `createdAt` through a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "pincode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
}

impl ListingPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Category entry under `categories/{id}`; duplicates are allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Older entries were written as bare strings
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Named { name: String },
            Bare(String),
        }

        Ok(match Stored::deserialize(deserializer)? {
            Stored::Named { name } | Stored::Bare(name) => Category { name },
        })
    }
}

fn available() -> bool {
    true
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::InvalidPrice(price));
    }
    Ok(())
}

/// Prices entered through forms are sometimes stored as numeric strings
pub(crate) fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_reads_legacy_document() {
        let listing: Listing = serde_json::from_value(json!({
            "name": "Sea View Villa",
            "price": "2500",
            "pincode": "403001",
            "city": "Goa",
            "category": "Villa",
            "createdAt": "2024-04-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(listing.price, 2500.0);
        assert_eq!(listing.postal_code, "403001");
        assert!(listing.availability);
        assert!(listing.images.is_empty());
        assert!(listing.id.is_empty());
    }

    #[test]
    fn test_listing_id_is_not_written() {
        let mut listing = NewListing::new("Loft", 900.0).into_listing(Utc::now());
        listing.id = "-Mabc".to_string();

        let doc = serde_json::to_value(&listing).unwrap();
        assert!(doc.get("id").is_none());
        assert_eq!(doc["pincode"], "");
        assert!(doc.get("createdAt").is_some());
    }

    #[test]
    fn test_patch_only_serializes_present_fields() {
        let patch = ListingPatch {
            price: Some(1800.0),
            images: Some(vec!["data:image/png;base64,AA".to_string()]),
            ..Default::default()
        };

        let doc = serde_json::to_value(&patch).unwrap();
        assert_eq!(doc, json!({ "price": 1800.0, "images": ["data:image/png;base64,AA"] }));
        assert!(!patch.is_empty());
        assert!(ListingPatch::default().is_empty());
    }

    #[test]
    fn test_listing_validation() {
        assert_eq!(NewListing::new("  ", 100.0).validate(), Err(ValidationError::BlankName));
        assert_eq!(
            NewListing::new("Hut", 0.0).validate(),
            Err(ValidationError::InvalidPrice(0.0))
        );
        assert!(NewListing::new("Hut", f64::NAN).validate().is_err());
        assert!(NewListing::new("Hut", 10.0).validate().is_ok());

        let patch = ListingPatch {
            price: Some(-5.0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_category_accepts_both_shapes() {
        let named: Category = serde_json::from_value(json!({ "name": "Houseboat" })).unwrap();
        let bare: Category = serde_json::from_value(json!("Houseboat")).unwrap();
        assert_eq!(named, bare);
    }
}
