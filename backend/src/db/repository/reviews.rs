use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ListingId, Review, ReviewId};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert_review(&self, review: Review) -> RepositoryResult<Review>;

    async fn get_review(&self, id: ReviewId) -> RepositoryResult<Option<Review>>;

    /// Every non-deleted review.
    async fn list_reviews(&self) -> RepositoryResult<Vec<Review>>;

    async fn reviews_for_listing(&self, listing_id: ListingId) -> RepositoryResult<Vec<Review>>;

    async fn update_review(&self, review: &Review) -> RepositoryResult<Review>;

    /// Mark a review deleted. Returns `false` when it already was.
    async fn soft_delete_review(&self, id: ReviewId) -> RepositoryResult<bool>;
}
