use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{lenient_price, Listing};

/// Lifecycle of a booking. `Completed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Completed,
    Rejected,
}

/// An administrator's verdict on a pending booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Next status after `decision`, or `None` when no transition leaves `self`
    pub fn apply(self, decision: Decision) -> Option<Self> {
        match (self, decision) {
            (Self::Pending, Decision::Approve) => Some(Self::Completed),
            (Self::Pending, Decision::Reject) => Some(Self::Rejected),
            (Self::Completed | Self::Rejected, _) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing display fields frozen into a booking when it is made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    #[serde(rename = "hotelId")]
    pub listing_id: String,
    #[serde(rename = "hotelName")]
    pub name: String,
    #[serde(rename = "hotelAddress", default)]
    pub address: String,
    #[serde(rename = "hotelCity", default)]
    pub city: String,
    #[serde(rename = "hotelPincode", default)]
    pub postal_code: String,
    #[serde(rename = "hotelImage", default)]
    pub image: Option<String>,
    /// Nightly price at booking time
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
}

impl ListingSnapshot {
    pub fn of(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id.clone(),
            name: listing.name.clone(),
            address: listing.address.clone(),
            city: listing.city.clone(),
            postal_code: listing.postal_code.clone(),
            image: listing.images.first().cloned(),
            price: listing.price,
        }
    }
}

/// A reservation request as stored under `bookings/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(flatten)]
    pub listing: ListingSnapshot,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    #[serde(rename = "userAddress")]
    pub requester_address: String,
    /// Email of the authenticated caller that made the booking
    #[serde(rename = "userEmail")]
    pub requester: String,
    #[serde(deserialize_with = "lenient_price")]
    pub total_price: f64,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}
