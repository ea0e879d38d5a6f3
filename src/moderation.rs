//! Administrator decisions on pending bookings.
//!
//! The status check and the write are two separate store calls. Two moderators
//! acting on the same booking at once can both pass the check; the later write
//! wins.

use crate::error::{Error, Result};
use crate::identity::Session;
use crate::models::{Booking, BookingStatus, Decision};
use crate::reservation::ReservationEngine;
use crate::store::{self, BOOKINGS};
use tracing::{info, warn};

/// Bookings grouped by status, for moderation views
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusPartition {
    pub pending: Vec<Booking>,
    pub completed: Vec<Booking>,
    pub rejected: Vec<Booking>,
}

impl StatusPartition {
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group bookings by status, keeping their relative order
pub fn partition_by_status(bookings: impl IntoIterator<Item = Booking>) -> StatusPartition {
    let mut partition = StatusPartition::default();
    for booking in bookings {
        match booking.status {
            BookingStatus::Pending => partition.pending.push(booking),
            BookingStatus::Completed => partition.completed.push(booking),
            BookingStatus::Rejected => partition.rejected.push(booking),
        }
    }
    partition
}

#[derive(Clone)]
pub struct ModerationGateway {
    reservations: ReservationEngine,
}

impl ModerationGateway {
    pub fn new(reservations: ReservationEngine) -> Self {
        Self { reservations }
    }

    /// `pending -> completed`
    pub async fn approve(&self, session: &Session, booking_id: &str) -> Result<BookingStatus> {
        self.decide(session, booking_id, Decision::Approve).await
    }

    /// `pending -> rejected`
    pub async fn reject(&self, session: &Session, booking_id: &str) -> Result<BookingStatus> {
        self.decide(session, booking_id, Decision::Reject).await
    }

    /// All bookings, grouped for the moderation view
    pub async fn moderation_queue(&self, session: &Session) -> Result<StatusPartition> {
        let bookings = self.reservations.list_all_bookings(session).await?;
        Ok(partition_by_status(bookings))
    }

    #[tracing::instrument(skip(self, session))]
    async fn decide(&self, session: &Session, booking_id: &str, decision: Decision) -> Result<BookingStatus> {
        let path = store::doc_path(BOOKINGS, booking_id)?;
        let current = self
            .reservations
            .get_booking(session, booking_id)
            .await?
            .ok_or_else(|| Error::NotFound { path: path.clone() })?
            .status;

        let Some(next) = current.apply(decision) else {
            warn!(status = %current, "refusing transition out of terminal status");
            return Err(Error::StateConflict {
                id: booking_id.to_string(),
                status: current,
            });
        };

        self.reservations.write_status(session, &path, next).await?;
        info!(from = %current, to = %next, "booking moderated");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingSnapshot;
    use crate::reservation::BookingRequest;
    use crate::store::InMemoryDocumentStore;
    use std::sync::Arc;

    async fn pending_booking() -> (ModerationGateway, ReservationEngine, Session, String) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let engine = ReservationEngine::new(store);
        let session = Session::new("admin", "admin@x.com");
        let snapshot = ListingSnapshot {
            listing_id: "-villa".into(),
            name: "Villa".into(),
            address: String::new(),
            city: "Goa".into(),
            postal_code: String::new(),
            image: None,
            price: 2000.0,
        };
        let request = BookingRequest::new(
            "2024-05-01".parse().unwrap(),
            "2024-05-04".parse().unwrap(),
            2,
            "4 Hill St",
        );
        let id = engine.create_booking(&session, &snapshot, &request).await.unwrap();
        (ModerationGateway::new(engine.clone()), engine, session, id)
    }

    #[tokio::test]
    async fn test_approve_then_reject_conflicts() {
        let (gateway, engine, session, id) = pending_booking().await;

        assert_eq!(gateway.approve(&session, &id).await.unwrap(), BookingStatus::Completed);

        let err = gateway.reject(&session, &id).await.unwrap_err();
        assert!(matches!(err, Error::StateConflict { status: BookingStatus::Completed, .. }));
        let booking = engine.get_booking(&session, &id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_completed_is_terminal() {
        let (gateway, engine, session, id) = pending_booking().await;
        gateway.approve(&session, &id).await.unwrap();

        let err = gateway.approve(&session, &id).await.unwrap_err();
        assert!(matches!(err, Error::StateConflict { status: BookingStatus::Completed, .. }));
        let booking = engine.get_booking(&session, &id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_rejected_is_terminal() {
        let (gateway, engine, session, id) = pending_booking().await;

        gateway.reject(&session, &id).await.unwrap();
        for result in [gateway.approve(&session, &id).await, gateway.reject(&session, &id).await] {
            assert!(matches!(result, Err(Error::StateConflict { status: BookingStatus::Rejected, .. })));
        }
        let booking = engine.get_booking(&session, &id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Rejected);
        assert_eq!(booking.total_price, 6000.0);
    }

    #[tokio::test]
    async fn test_unknown_booking() {
        let (gateway, _, session, _) = pending_booking().await;
        assert!(matches!(
            gateway.approve(&session, "-missing").await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_moderation_queue_partitions() {
        let (gateway, engine, session, first) = pending_booking().await;
        let listing = engine.get_booking(&session, &first).await.unwrap().unwrap().listing;
        let request = BookingRequest::new(
            "2024-06-01".parse().unwrap(),
            "2024-06-02".parse().unwrap(),
            1,
            "x",
        );
        let second = engine.create_booking(&session, &listing, &request).await.unwrap();
        let third = engine.create_booking(&session, &listing, &request).await.unwrap();

        gateway.approve(&session, &first).await.unwrap();
        gateway.reject(&session, &third).await.unwrap();

        let queue = gateway.moderation_queue(&session).await.unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pending[0].id, second);
        assert_eq!(queue.completed[0].id, first);
        assert_eq!(queue.rejected[0].id, third);
    }
}
