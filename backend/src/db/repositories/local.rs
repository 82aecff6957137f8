//! In-memory repository for development and tests.
//!
//! All state sits behind one `RwLock`, so each write (including the booking
//! check-and-insert) is atomic with respect to every other operation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::algorithms::availability::find_conflict;
use crate::db::repository::{
    AvailabilityRepository, ErrorContext, FullRepository, ListingRepository, RepositoryError,
    RepositoryResult, ReservationRepository, ReviewRepository, UserRepository,
};
use crate::models::{
    Availability, DateRange, Listing, ListingId, Reservation, ReservationId, Review, ReviewId,
    User, UserId,
};

const OVERLAP_MESSAGE: &str = "Reservation dates overlap with an existing reservation";

#[derive(Debug, Default)]
struct LocalData {
    users: Vec<User>,
    listings: Vec<Listing>,
    availability: Vec<Availability>,
    reservations: Vec<Reservation>,
    reviews: Vec<Review>,
}

impl LocalData {
    fn user_mut(&mut self, id: UserId, operation: &str) -> RepositoryResult<&mut User> {
        self.users.iter_mut().find(|u| u.id == id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "User not found",
                ErrorContext::new(operation)
                    .with_entity("user")
                    .with_entity_id(id),
            )
        })
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Thread-safe in-memory store. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record.
    pub fn clear(&self) {
        *self.data.write() = LocalData::default();
    }

    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.data.read().reservations.len()
    }
}

fn overlap_error(listing_id: ListingId) -> RepositoryError {
    RepositoryError::conflict_with_context(
        OVERLAP_MESSAGE,
        ErrorContext::new("book_listing")
            .with_entity("listing")
            .with_entity_id(listing_id),
    )
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn insert_user(&self, user: User) -> RepositoryResult<User> {
        let mut data = self.data.write();
        if data.email_taken(&user.email, None) {
            return Err(RepositoryError::conflict_with_context(
                "Email already in use",
                ErrorContext::new("insert_user").with_entity("user"),
            ));
        }
        data.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.data.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .data
            .read()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.data.read().users.clone())
    }

    async fn update_user(&self, user: &User) -> RepositoryResult<User> {
        let mut data = self.data.write();
        if data.email_taken(&user.email, Some(user.id)) {
            return Err(RepositoryError::conflict_with_context(
                "Email already in use",
                ErrorContext::new("update_user")
                    .with_entity("user")
                    .with_entity_id(user.id),
            ));
        }
        let stored = data.user_mut(user.id, "update_user")?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.role = user.role;
        Ok(stored.clone())
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        Ok(data.users.len() != before)
    }

    async fn add_favourite(
        &self,
        user_id: UserId,
        listing_id: ListingId,
    ) -> RepositoryResult<User> {
        let mut data = self.data.write();
        let user = data.user_mut(user_id, "add_favourite")?;
        user.favourite_listings.insert(listing_id);
        Ok(user.clone())
    }

    async fn remove_favourite(
        &self,
        user_id: UserId,
        listing_id: ListingId,
    ) -> RepositoryResult<User> {
        let mut data = self.data.write();
        let user = data.user_mut(user_id, "remove_favourite")?;
        user.favourite_listings.remove(&listing_id);
        Ok(user.clone())
    }
}

#[async_trait]
impl ListingRepository for LocalRepository {
    async fn insert_listing(&self, listing: Listing) -> RepositoryResult<Listing> {
        self.data.write().listings.push(listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> RepositoryResult<Option<Listing>> {
        Ok(self
            .data
            .read()
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn list_listings(&self, offset: usize, limit: usize) -> RepositoryResult<Vec<Listing>> {
        Ok(self
            .data
            .read()
            .listings
            .iter()
            .filter(|l| !l.is_deleted)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_active_listings(&self) -> RepositoryResult<Vec<Listing>> {
        Ok(self
            .data
            .read()
            .listings
            .iter()
            .filter(|l| !l.is_deleted)
            .cloned()
            .collect())
    }

    async fn listings_by_owner(&self, owner: UserId) -> RepositoryResult<Vec<Listing>> {
        Ok(self
            .data
            .read()
            .listings
            .iter()
            .filter(|l| !l.is_deleted && l.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn listings_by_ids(&self, ids: &[ListingId]) -> RepositoryResult<Vec<Listing>> {
        Ok(self
            .data
            .read()
            .listings
            .iter()
            .filter(|l| !l.is_deleted && ids.contains(&l.id))
            .cloned()
            .collect())
    }

    async fn update_listing(&self, listing: &Listing) -> RepositoryResult<Listing> {
        let mut data = self.data.write();
        let stored = data
            .listings
            .iter_mut()
            .find(|l| l.id == listing.id)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Listing not found",
                    ErrorContext::new("update_listing")
                        .with_entity("listing")
                        .with_entity_id(listing.id),
                )
            })?;
        *stored = listing.clone();
        Ok(stored.clone())
    }

    async fn soft_delete_listing(&self, id: ListingId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        let stored = data.listings.iter_mut().find(|l| l.id == id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Listing not found",
                ErrorContext::new("soft_delete_listing")
                    .with_entity("listing")
                    .with_entity_id(id),
            )
        })?;
        let changed = !stored.is_deleted;
        stored.is_deleted = true;
        Ok(changed)
    }
}

#[async_trait]
impl AvailabilityRepository for LocalRepository {
    async fn insert_availability(
        &self,
        availability: Availability,
    ) -> RepositoryResult<Availability> {
        self.data.write().availability.push(availability.clone());
        Ok(availability)
    }

    async fn availability_for_listing(
        &self,
        listing_id: ListingId,
    ) -> RepositoryResult<Vec<Availability>> {
        Ok(self
            .data
            .read()
            .availability
            .iter()
            .filter(|a| a.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn availability_covering(
        &self,
        dates: &DateRange,
    ) -> RepositoryResult<Vec<Availability>> {
        Ok(self
            .data
            .read()
            .availability
            .iter()
            .filter(|a| a.covers(dates))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn insert_reservation_if_free(
        &self,
        reservation: Reservation,
    ) -> RepositoryResult<Reservation> {
        let mut data = self.data.write();
        let same_listing = data
            .reservations
            .iter()
            .filter(|r| r.listing_id == reservation.listing_id);
        if find_conflict(&reservation.dates, same_listing, None).is_some() {
            return Err(overlap_error(reservation.listing_id));
        }
        data.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn reschedule_reservation_if_free(
        &self,
        id: ReservationId,
        dates: DateRange,
        total_price: f64,
    ) -> RepositoryResult<Reservation> {
        let mut data = self.data.write();
        let listing_id = data
            .reservations
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.listing_id)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Reservation not found",
                    ErrorContext::new("reschedule_reservation")
                        .with_entity("reservation")
                        .with_entity_id(id),
                )
            })?;

        let same_listing = data
            .reservations
            .iter()
            .filter(|r| r.listing_id == listing_id);
        if find_conflict(&dates, same_listing, Some(id)).is_some() {
            return Err(overlap_error(listing_id));
        }

        let stored = data
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::internal("Reservation vanished under write lock"))?;
        stored.dates = dates;
        stored.total_price = total_price;
        Ok(stored.clone())
    }

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>> {
        Ok(self
            .data
            .read()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        Ok(self
            .data
            .read()
            .reservations
            .iter()
            .filter(|r| r.is_active())
            .cloned()
            .collect())
    }

    async fn reservations_for_listing(
        &self,
        listing_id: ListingId,
    ) -> RepositoryResult<Vec<Reservation>> {
        Ok(self
            .data
            .read()
            .reservations
            .iter()
            .filter(|r| r.is_active() && r.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn reservations_by_user(&self, user_id: UserId) -> RepositoryResult<Vec<Reservation>> {
        Ok(self
            .data
            .read()
            .reservations
            .iter()
            .filter(|r| r.is_active() && r.is_made_by(user_id))
            .cloned()
            .collect())
    }

    async fn soft_delete_reservation(&self, id: ReservationId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        let stored = data
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Reservation not found",
                    ErrorContext::new("soft_delete_reservation")
                        .with_entity("reservation")
                        .with_entity_id(id),
                )
            })?;
        let changed = !stored.is_deleted;
        stored.is_deleted = true;
        Ok(changed)
    }
}

#[async_trait]
impl ReviewRepository for LocalRepository {
    async fn insert_review(&self, review: Review) -> RepositoryResult<Review> {
        self.data.write().reviews.push(review.clone());
        Ok(review)
    }

    async fn get_review(&self, id: ReviewId) -> RepositoryResult<Option<Review>> {
        Ok(self.data.read().reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reviews(&self) -> RepositoryResult<Vec<Review>> {
        Ok(self
            .data
            .read()
            .reviews
            .iter()
            .filter(|r| !r.is_deleted)
            .cloned()
            .collect())
    }

    async fn reviews_for_listing(&self, listing_id: ListingId) -> RepositoryResult<Vec<Review>> {
        Ok(self
            .data
            .read()
            .reviews
            .iter()
            .filter(|r| !r.is_deleted && r.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn update_review(&self, review: &Review) -> RepositoryResult<Review> {
        let mut data = self.data.write();
        let stored = data
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Review not found",
                    ErrorContext::new("update_review")
                        .with_entity("review")
                        .with_entity_id(review.id),
                )
            })?;
        *stored = review.clone();
        Ok(stored.clone())
    }

    async fn soft_delete_review(&self, id: ReviewId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        let stored = data.reviews.iter_mut().find(|r| r.id == id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Review not found",
                ErrorContext::new("soft_delete_review")
                    .with_entity("review")
                    .with_entity_id(id),
            )
        })?;
        let changed = !stored.is_deleted;
        stored.is_deleted = true;
        Ok(changed)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildingType, GeoPoint, Role};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn listing() -> Listing {
        Listing {
            id: ListingId::generate(),
            user_id: UserId::generate(),
            coordinates: GeoPoint::new(19.8, 41.3),
            title: "Flat".to_string(),
            address: "Street 1".to_string(),
            images: Vec::new(),
            nr_of_rooms: 2,
            nr_of_beds: None,
            building_type: BuildingType::House,
            amenities: Vec::new(),
            price: 50.0,
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_booking_rejects_overlap_and_keeps_first() {
        let repo = LocalRepository::new();
        let listing_id = ListingId::generate();
        let first = Reservation::new(listing_id, None, DateRange::new(day(10), day(12)), 50.0);
        repo.insert_reservation_if_free(first).await.unwrap();

        let touching = Reservation::new(listing_id, None, DateRange::new(day(12), day(15)), 50.0);
        let err = repo.insert_reservation_if_free(touching).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
        assert_eq!(repo.reservation_count(), 1);

        let other_listing =
            Reservation::new(ListingId::generate(), None, DateRange::new(day(10), day(12)), 50.0);
        assert!(repo.insert_reservation_if_free(other_listing).await.is_ok());
    }

    #[tokio::test]
    async fn test_reschedule_ignores_own_dates() {
        let repo = LocalRepository::new();
        let listing_id = ListingId::generate();
        let stay = repo
            .insert_reservation_if_free(Reservation::new(
                listing_id,
                None,
                DateRange::new(day(10), day(12)),
                50.0,
            ))
            .await
            .unwrap();

        let moved = repo
            .reschedule_reservation_if_free(stay.id, DateRange::new(day(11), day(14)), 150.0)
            .await
            .unwrap();
        assert_eq!(moved.dates.end, day(14));
        assert_eq!(moved.total_price, 150.0);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = LocalRepository::new();
        let make = || {
            User::new(
                UserId::generate(),
                "A".to_string(),
                "B".to_string(),
                "a@b.com".to_string(),
                "hash".to_string(),
                Role::User,
            )
        };
        repo.insert_user(make()).await.unwrap();
        assert!(matches!(
            repo.insert_user(make()).await,
            Err(RepositoryError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_listing_twice() {
        let repo = LocalRepository::new();
        let stored = repo.insert_listing(listing()).await.unwrap();
        assert!(repo.soft_delete_listing(stored.id).await.unwrap());
        assert!(!repo.soft_delete_listing(stored.id).await.unwrap());
        assert!(repo.list_active_listings().await.unwrap().is_empty());
        assert!(repo.get_listing(stored.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pagination_skips_deleted() {
        let repo = LocalRepository::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(repo.insert_listing(listing()).await.unwrap().id);
        }
        repo.soft_delete_listing(ids[0]).await.unwrap();
        let page = repo.list_listings(2, 2).await.unwrap();
        assert_eq!(
            page.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![ids[3], ids[4]]
        );
    }
}
