use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Availability, DateRange, Listing, ListingId, UserId};

/// Listing storage. Listings are soft-deleted; the list queries skip deleted
/// rows while [`ListingRepository::get_listing`] returns them as stored.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert_listing(&self, listing: Listing) -> RepositoryResult<Listing>;

    async fn get_listing(&self, id: ListingId) -> RepositoryResult<Option<Listing>>;

    /// One page of non-deleted listings in insertion order.
    async fn list_listings(&self, offset: usize, limit: usize) -> RepositoryResult<Vec<Listing>>;

    /// Every non-deleted listing.
    async fn list_active_listings(&self) -> RepositoryResult<Vec<Listing>>;

    async fn listings_by_owner(&self, owner: UserId) -> RepositoryResult<Vec<Listing>>;

    /// Non-deleted listings among `ids`, in insertion order.
    async fn listings_by_ids(&self, ids: &[ListingId]) -> RepositoryResult<Vec<Listing>>;

    async fn update_listing(&self, listing: &Listing) -> RepositoryResult<Listing>;

    /// Mark a listing deleted. Returns `false` when it already was.
    async fn soft_delete_listing(&self, id: ListingId) -> RepositoryResult<bool>;
}

/// Open booking windows declared by listing owners.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn insert_availability(&self, availability: Availability)
        -> RepositoryResult<Availability>;

    async fn availability_for_listing(
        &self,
        listing_id: ListingId,
    ) -> RepositoryResult<Vec<Availability>>;

    /// Windows that cover every day of `dates`.
    async fn availability_covering(&self, dates: &DateRange)
        -> RepositoryResult<Vec<Availability>>;
}
