//! Listings, bookings and moderation on top of a shared JSON document store.

pub mod catalog;
pub mod config;
pub mod error;
mod http;
pub mod identity;
pub mod inventory;
pub mod models;
pub mod moderation;
pub mod reservation;
pub mod store;

pub use catalog::ListingFilter;
pub use config::Config;
pub use error::{Error, Result, ValidationError};
pub use identity::{IdentityProvider, Session};
pub use inventory::InventoryManager;
pub use models::{Booking, BookingStatus, Listing, ListingPatch, ListingSnapshot, NewListing};
pub use moderation::{ModerationGateway, StatusPartition};
pub use reservation::{BookingRequest, ReservationEngine};
pub use store::DocumentStore;

use std::sync::Arc;

/// The three store-backed components wired to one store
#[derive(Clone)]
pub struct Services {
    pub inventory: InventoryManager,
    pub reservations: ReservationEngine,
    pub moderation: ModerationGateway,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let reservations = ReservationEngine::new(store.clone());
        Self {
            inventory: InventoryManager::new(store),
            moderation: ModerationGateway::new(reservations.clone()),
            reservations,
        }
    }
}
