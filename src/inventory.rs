use crate::catalog::ListingFilter;
use crate::error::{Error, Result, ValidationError};
use crate::identity::Session;
use crate::models::{Category, Listing, ListingPatch, NewListing};
use crate::store::{self, DocumentStore, CATEGORIES, LISTINGS};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns listing and category documents
#[derive(Clone)]
pub struct InventoryManager {
    store: Arc<dyn DocumentStore>,
}

impl InventoryManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a new listing, stamping its creation time. The category is not
    /// checked against the category set.
    #[tracing::instrument(skip_all, fields(name = %listing.name))]
    pub async fn create_listing(&self, session: &Session, listing: NewListing) -> Result<String> {
        listing.validate()?;

        let doc = serde_json::to_value(listing.into_listing(Utc::now()))
            .map_err(|e| Error::decode(LISTINGS, e))?;
        let id = self.store.create(session.token(), LISTINGS, doc).await?;

        info!(id = %id, "listing created");
        Ok(id)
    }

    /// Merge `patch` into an existing listing
    #[tracing::instrument(skip(self, session, patch))]
    pub async fn update_listing(&self, session: &Session, id: &str, patch: ListingPatch) -> Result<()> {
        patch.validate()?;
        let path = store::doc_path(LISTINGS, id)?;
        if patch.is_empty() {
            return Ok(());
        }

        // A merge onto a missing key would leave a half-formed listing behind
        if self.store.get(session.token(), &path).await?.is_none() {
            return Err(Error::NotFound { path });
        }

        let doc = serde_json::to_value(&patch).map_err(|e| Error::decode(&path, e))?;
        self.store.update(session.token(), &path, doc).await?;

        info!("listing updated");
        Ok(())
    }

    /// Bookings that reference the listing keep their own snapshot
    #[tracing::instrument(skip(self, session))]
    pub async fn delete_listing(&self, session: &Session, id: &str) -> Result<()> {
        let path = store::doc_path(LISTINGS, id)?;
        self.store.delete(session.token(), &path).await?;
        info!("listing deleted");
        Ok(())
    }

    pub async fn get_listing(&self, session: &Session, id: &str) -> Result<Option<Listing>> {
        let path = store::doc_path(LISTINGS, id)?;
        let value = self.store.get(session.token(), &path).await?;

        Ok(store::decode_document::<Listing>(&path, value)?.map(|mut listing| {
            listing.id = id.to_string();
            listing
        }))
    }

    /// Fetch the whole collection and filter it in memory
    pub async fn list_listings(&self, session: &Session, filter: &ListingFilter) -> Result<Vec<Listing>> {
        let value = self.store.get(session.token(), LISTINGS).await?;
        let listings: Vec<Listing> = store::decode_collection::<Listing>(LISTINGS, value)?
            .into_iter()
            .map(|(id, mut listing)| {
                listing.id = id;
                listing
            })
            .collect();

        debug!("fetched {} listings from {}", listings.len(), self.store.backend_name());
        Ok(filter.apply(listings))
    }

    /// Category names in store order, duplicates included
    pub async fn list_categories(&self, session: &Session) -> Result<Vec<String>> {
        let value = self.store.get(session.token(), CATEGORIES).await?;
        Ok(store::decode_collection::<Category>(CATEGORIES, value)?
            .into_iter()
            .map(|(_, category)| category.name)
            .collect())
    }

    /// Append a category. Not idempotent: a retry after an unknown outcome can
    /// leave a duplicate.
    #[tracing::instrument(skip(self, session))]
    pub async fn add_category(&self, session: &Session, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankCategory.into());
        }

        self.store
            .create(session.token(), CATEGORIES, json!({ "name": name }))
            .await?;
        info!("category added");
        Ok(())
    }
}
