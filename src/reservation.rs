//! Booking creation, pricing and queries.
//!
//! A booking is priced once, when it is made: `nights * snapshot.price`. The
//! total is stored and never recomputed, so later listing edits do not reach
//! existing bookings. No overlap check is made against other bookings for the
//! same listing; [`overlapping`] is available to callers that want one.

use crate::error::{Error, Result, ValidationError};
use crate::identity::Session;
use crate::models::{Booking, BookingStatus, ListingSnapshot};
use crate::store::{self, DocumentStore, BOOKINGS};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 10;

/// What a traveler fills in to reserve a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingRequest {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: u32,
    /// Requester's own address
    pub address: String,
}

impl BookingRequest {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate, guests: u32, address: impl Into<String>) -> Self {
        Self {
            check_in: Some(check_in),
            check_out: Some(check_out),
            guests,
            address: address.into(),
        }
    }

    /// Check every field, returning the stay dates when they are usable
    pub fn validate(&self) -> std::result::Result<(NaiveDate, NaiveDate), ValidationError> {
        let check_in = self.check_in.ok_or(ValidationError::MissingCheckIn)?;
        let check_out = self.check_out.ok_or(ValidationError::MissingCheckOut)?;
        if self.address.trim().is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        if !(MIN_GUESTS..=MAX_GUESTS).contains(&self.guests) {
            return Err(ValidationError::GuestsOutOfRange(self.guests));
        }
        if check_out <= check_in {
            return Err(ValidationError::CheckOutNotAfterCheckIn { check_in, check_out });
        }
        Ok((check_in, check_out))
    }
}

/// Whole days between the two dates
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Price of a stay; zero when there is no night to charge for
pub fn total_price(nights: i64, nightly_price: f64) -> f64 {
    if nights <= 0 {
        return 0.0;
    }
    nights as f64 * nightly_price
}

/// Live bookings on `listing_id` whose stay intersects `check_in..check_out`.
///
/// Rejected bookings never block a date range.
pub fn overlapping<'a>(
    bookings: &'a [Booking],
    listing_id: &'a str,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> impl Iterator<Item = &'a Booking> + 'a {
    bookings.iter().filter(move |b| {
        b.status != BookingStatus::Rejected
            && b.listing.listing_id == listing_id
            && b.check_in < check_out
            && check_in < b.check_out
    })
}

/// Owns the booking lifecycle up to moderation
#[derive(Clone)]
pub struct ReservationEngine {
    store: Arc<dyn DocumentStore>,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate, price and persist a new `pending` booking.
    ///
    /// The requester is always the session's identity. Nothing is written when
    /// validation fails. Not idempotent: after a transport error, look the
    /// booking up before trying again.
    #[tracing::instrument(skip_all, fields(listing = %listing.listing_id, requester = %session.email()))]
    pub async fn create_booking(
        &self,
        session: &Session,
        listing: &ListingSnapshot,
        request: &BookingRequest,
    ) -> Result<String> {
        let (check_in, check_out) = request.validate()?;
        if !listing.price.is_finite() || listing.price <= 0.0 {
            return Err(ValidationError::InvalidPrice(listing.price).into());
        }
        if session.email().trim().is_empty() {
            return Err(Error::Authorization("session carries no identity".to_string()));
        }

        let nights = nights_between(check_in, check_out);
        let booking = Booking {
            id: String::new(),
            listing: listing.clone(),
            check_in,
            check_out,
            guests: request.guests,
            requester_address: request.address.trim().to_string(),
            requester: session.email().to_string(),
            total_price: total_price(nights, listing.price),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };

        let doc = serde_json::to_value(&booking).map_err(|e| Error::decode(BOOKINGS, e))?;
        let id = self.store.create(session.token(), BOOKINGS, doc).await?;

        info!(id = %id, nights, total = booking.total_price, "booking created");
        Ok(id)
    }

    pub async fn get_booking(&self, session: &Session, id: &str) -> Result<Option<Booking>> {
        let path = store::doc_path(BOOKINGS, id)?;
        let value = self.store.get(session.token(), &path).await?;

        Ok(store::decode_document::<Booking>(&path, value)?.map(|mut booking| {
            booking.id = id.to_string();
            booking
        }))
    }

    /// Every booking, unfiltered
    pub async fn list_all_bookings(&self, session: &Session) -> Result<Vec<Booking>> {
        let value = self.store.get(session.token(), BOOKINGS).await?;
        let bookings: Vec<Booking> = store::decode_collection::<Booking>(BOOKINGS, value)?
            .into_iter()
            .map(|(id, mut booking)| {
                booking.id = id;
                booking
            })
            .collect();

        debug!("fetched {} bookings from {}", bookings.len(), self.store.backend_name());
        Ok(bookings)
    }

    /// Bookings whose requester is exactly `requester`
    pub async fn list_bookings_for(&self, session: &Session, requester: &str) -> Result<Vec<Booking>> {
        let mut bookings = self.list_all_bookings(session).await?;
        bookings.retain(|b| b.requester == requester);
        Ok(bookings)
    }

    /// The caller's own bookings
    pub async fn my_bookings(&self, session: &Session) -> Result<Vec<Booking>> {
        self.list_bookings_for(session, session.email()).await
    }

    pub async fn list_bookings_for_listing(&self, session: &Session, listing_id: &str) -> Result<Vec<Booking>> {
        let mut bookings = self.list_all_bookings(session).await?;
        bookings.retain(|b| b.listing.listing_id == listing_id);
        Ok(bookings)
    }

    /// Unconditional status write; callers own the transition rules
    pub(crate) async fn write_status(&self, session: &Session, path: &str, status: BookingStatus) -> Result<()> {
        self.store
            .update(session.token(), path, json!({ "status": status }))
            .await
    }
}
