use chrono::NaiveDate;
use luxestays::store::InMemoryDocumentStore;
use luxestays::{
    BookingRequest, BookingStatus, DocumentStore, Error, ListingFilter, ListingPatch,
    ListingSnapshot, NewListing, Services, Session, ValidationError,
};
use std::sync::Arc;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

struct Fixture {
    services: Services,
    store: Arc<InMemoryDocumentStore>,
    admin: Session,
    alice: Session,
    bob: Session,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryDocumentStore::with_tokens(["admin-token", "alice-token", "bob-token"]));
    Fixture {
        services: Services::new(store.clone()),
        store,
        admin: Session::new("admin-token", "admin@stays.com"),
        alice: Session::new("alice-token", "a@x.com"),
        bob: Session::new("bob-token", "b@y.com"),
    }
}

async fn villa(f: &Fixture) -> ListingSnapshot {
    let id = f
        .services
        .inventory
        .create_listing(
            &f.admin,
            NewListing {
                address: "12 Beach Road".into(),
                postal_code: "403001".into(),
                city: "Goa".into(),
                category: "Villa".into(),
                images: vec!["data:image/jpeg;base64,AAA".into(), "data:image/jpeg;base64,BBB".into()],
                ..NewListing::new("Sea View Villa", 2000.0)
            },
        )
        .await
        .unwrap();

    let listing = f.services.inventory.get_listing(&f.alice, &id).await.unwrap().unwrap();
    ListingSnapshot::of(&listing)
}

#[tokio::test]
async fn booking_is_priced_and_pending() {
    let f = fixture();
    let snapshot = villa(&f).await;
    assert_eq!(snapshot.image.as_deref(), Some("data:image/jpeg;base64,AAA"));

    let request = BookingRequest::new(date("2024-05-01"), date("2024-05-04"), 2, "4 Hill St");
    let id = f.services.reservations.create_booking(&f.alice, &snapshot, &request).await.unwrap();

    let booking = f.services.reservations.get_booking(&f.admin, &id).await.unwrap().unwrap();
    assert_eq!(booking.nights(), 3);
    assert_eq!(booking.total_price, 6000.0);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.requester, "a@x.com");
    assert_eq!(booking.requester_address, "4 Hill St");
}

#[tokio::test]
async fn approve_then_reject_keeps_completed() {
    let f = fixture();
    let snapshot = villa(&f).await;
    let request = BookingRequest::new(date("2024-05-01"), date("2024-05-04"), 2, "4 Hill St");
    let id = f.services.reservations.create_booking(&f.alice, &snapshot, &request).await.unwrap();

    f.services.moderation.approve(&f.admin, &id).await.unwrap();
    let err = f.services.moderation.reject(&f.admin, &id).await.unwrap_err();
    assert!(matches!(err, Error::StateConflict { .. }));

    let booking = f.services.reservations.get_booking(&f.admin, &id).await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
}

#[tokio::test]
async fn bookings_for_requester_only() {
    let f = fixture();
    let snapshot = villa(&f).await;
    let request = BookingRequest::new(date("2024-05-01"), date("2024-05-02"), 1, "somewhere");

    f.services.reservations.create_booking(&f.alice, &snapshot, &request).await.unwrap();
    f.services.reservations.create_booking(&f.bob, &snapshot, &request).await.unwrap();
    f.services.reservations.create_booking(&f.alice, &snapshot, &request).await.unwrap();

    let for_alice = f.services.reservations.list_bookings_for(&f.admin, "a@x.com").await.unwrap();
    assert_eq!(for_alice.len(), 2);
    assert!(for_alice.iter().all(|b| b.requester == "a@x.com"));

    let bobs = f.services.reservations.my_bookings(&f.bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
}

#[tokio::test]
async fn deleting_listing_leaves_booking_snapshot() {
    let f = fixture();
    let snapshot = villa(&f).await;
    let request = BookingRequest::new(date("2024-05-01"), date("2024-05-04"), 2, "4 Hill St");
    let id = f.services.reservations.create_booking(&f.alice, &snapshot, &request).await.unwrap();

    f.services.inventory.delete_listing(&f.admin, &snapshot.listing_id).await.unwrap();
    assert!(f
        .services
        .inventory
        .get_listing(&f.admin, &snapshot.listing_id)
        .await
        .unwrap()
        .is_none());

    let booking = f.services.reservations.get_booking(&f.alice, &id).await.unwrap().unwrap();
    assert_eq!(booking.listing, snapshot);
}

#[tokio::test]
async fn later_price_change_does_not_reprice_booking() {
    let f = fixture();
    let snapshot = villa(&f).await;
    let request = BookingRequest::new(date("2024-05-01"), date("2024-05-04"), 2, "4 Hill St");
    let id = f.services.reservations.create_booking(&f.alice, &snapshot, &request).await.unwrap();

    let patch = ListingPatch {
        price: Some(9000.0),
        ..Default::default()
    };
    f.services.inventory.update_listing(&f.admin, &snapshot.listing_id, patch).await.unwrap();

    let booking = f.services.reservations.get_booking(&f.alice, &id).await.unwrap().unwrap();
    assert_eq!(booking.total_price, 6000.0);
    assert_eq!(booking.listing.price, 2000.0);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_store() {
    let f = fixture();
    let snapshot = villa(&f).await;

    let cases = [
        (
            BookingRequest::new(date("2024-05-04"), date("2024-05-01"), 2, "x"),
            "reversed dates",
        ),
        (
            BookingRequest::new(date("2024-05-01"), date("2024-05-01"), 2, "x"),
            "same day",
        ),
        (BookingRequest::new(date("2024-05-01"), date("2024-05-02"), 0, "x"), "no guests"),
        (BookingRequest::new(date("2024-05-01"), date("2024-05-02"), 11, "x"), "too many"),
        (BookingRequest::new(date("2024-05-01"), date("2024-05-02"), 2, ""), "no address"),
        (
            BookingRequest {
                check_out: None,
                ..BookingRequest::new(date("2024-05-01"), date("2024-05-02"), 2, "x")
            },
            "no check-out",
        ),
    ];

    for (request, label) in cases {
        let err = f
            .services
            .reservations
            .create_booking(&f.alice, &snapshot, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{}: {:?}", label, err);
    }

    assert!(f.store.get("admin-token", "bookings").await.unwrap().is_none());
}

#[tokio::test]
async fn stale_token_is_an_authorization_error() {
    let f = fixture();
    let stale = Session::new("expired", "a@x.com");

    let err = f
        .services
        .inventory
        .list_listings(&stale, &ListingFilter::browse())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authorization(_)));

    let err = f.services.moderation.approve(&stale, "-M000000000000000000").await.unwrap_err();
    assert!(matches!(err, Error::Authorization(_)));
}

#[tokio::test]
async fn unknown_category_is_accepted() {
    let f = fixture();
    f.services.inventory.add_category(&f.admin, "Villa").await.unwrap();

    let id = f
        .services
        .inventory
        .create_listing(
            &f.admin,
            NewListing {
                category: "Treehouse".into(),
                ..NewListing::new("Canopy Nest", 1200.0)
            },
        )
        .await
        .unwrap();

    let filter = ListingFilter {
        category: Some("Treehouse".into()),
        ..ListingFilter::browse()
    };
    let found = f.services.inventory.list_listings(&f.alice, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
}

#[tokio::test]
async fn bad_ids_are_validation_errors() {
    let f = fixture();
    for id in ["../listings", "abc?x", "abc%2Fx"] {
        let err = f.services.moderation.approve(&f.admin, id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidId(_))), "{}: {:?}", id, err);
    }
}
