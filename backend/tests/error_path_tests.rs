//! Error paths through the service layer.

use chrono::NaiveDate;

use estate_rust::db::{ListingRepository, LocalRepository};
use estate_rust::models::{
    BuildingType, DateRange, GeoPoint, ListingId, NewListing, ReservationId, ReviewId, UserId,
};
use estate_rust::services::{listings, reservations, reviews, users, ServiceError};
use estate_rust::validation::{ListingSearch, ReviewInput};

fn june(start: u32, end: u32) -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2030, 6, start).unwrap(),
        NaiveDate::from_ymd_opt(2030, 6, end).unwrap(),
    )
}

async fn seeded_listing(repo: &LocalRepository, owner: UserId) -> ListingId {
    let listing = NewListing {
        coordinates: GeoPoint::new(19.8, 41.3),
        title: "Loft".to_string(),
        address: "Main street 1".to_string(),
        images: Vec::new(),
        nr_of_rooms: 1,
        nr_of_beds: Some(1),
        building_type: BuildingType::House,
        amenities: Vec::new(),
        price: 20.0,
    }
    .into_listing(ListingId::generate(), owner);
    repo.insert_listing(listing).await.unwrap().id
}

#[tokio::test]
async fn test_booking_deleted_listing_is_not_found() {
    let repo = LocalRepository::new();
    let owner = UserId::generate();
    let listing = seeded_listing(&repo, owner).await;
    listings::delete_listing(&repo, owner, listing).await.unwrap();

    let result = reservations::create(&repo, UserId::generate(), listing, june(1, 3)).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_reservation_is_not_found() {
    let repo = LocalRepository::new();
    let caller = UserId::generate();
    let result = reservations::cancel(&repo, caller, ReservationId::generate()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let result = reservations::reschedule(&repo, caller, ReservationId::generate(), june(1, 3)).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_reschedule_cancelled_reservation_is_rejected() {
    let repo = LocalRepository::new();
    let listing = seeded_listing(&repo, UserId::generate()).await;
    let guest = UserId::generate();
    let stay = reservations::create(&repo, guest, listing, june(1, 3)).await.unwrap();
    reservations::cancel(&repo, guest, stay.id).await.unwrap();

    let result = reservations::reschedule(&repo, guest, stay.id, june(5, 7)).await;
    assert!(matches!(result, Err(ServiceError::BadRequest(m)) if m == "Reservation already deleted"));
}

#[tokio::test]
async fn test_reschedule_into_other_stay_is_conflict() {
    let repo = LocalRepository::new();
    let listing = seeded_listing(&repo, UserId::generate()).await;
    let guest = UserId::generate();
    reservations::create(&repo, UserId::generate(), listing, june(10, 12))
        .await
        .unwrap();
    let mine = reservations::create(&repo, guest, listing, june(1, 3)).await.unwrap();

    let result = reservations::reschedule(&repo, guest, mine.id, june(9, 10)).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_stranger_cannot_cancel() {
    let repo = LocalRepository::new();
    let listing = seeded_listing(&repo, UserId::generate()).await;
    let stay = reservations::create(&repo, UserId::generate(), listing, june(1, 3))
        .await
        .unwrap();
    let result = reservations::cancel(&repo, UserId::generate(), stay.id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_listing_owner_can_cancel_guest_stay() {
    let repo = LocalRepository::new();
    let owner = UserId::generate();
    let listing = seeded_listing(&repo, owner).await;
    let stay = reservations::create(&repo, UserId::generate(), listing, june(1, 3))
        .await
        .unwrap();
    reservations::cancel(&repo, owner, stay.id).await.unwrap();
}

#[tokio::test]
async fn test_favourite_of_missing_listing_is_not_found() {
    let repo = LocalRepository::new();
    let result = users::add_favourite(&repo, UserId::generate(), ListingId::generate()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(m)) if m == "Listing not found"));
}

#[tokio::test]
async fn test_deleting_missing_user_is_not_found() {
    let repo = LocalRepository::new();
    let caller = UserId::generate();
    let result = users::delete_user(&repo, caller, caller).await;
    assert!(matches!(result, Err(ServiceError::NotFound(m)) if m == "User not found"));
}

#[tokio::test]
async fn test_updating_missing_review_is_not_found() {
    let repo = LocalRepository::new();
    let result = reviews::update(
        &repo,
        UserId::generate(),
        ReviewId::generate(),
        ReviewInput {
            stars: 3,
            comment: "Twenty characters or more".to_string(),
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(m)) if m == "Review not found"));
}

#[tokio::test]
async fn test_search_without_windows_is_empty() {
    let repo = LocalRepository::new();
    seeded_listing(&repo, UserId::generate()).await;
    let found = listings::search(
        &repo,
        ListingSearch {
            title: None,
            dates: june(1, 5),
        },
    )
    .await
    .unwrap();
    assert!(found.is_empty());
}
