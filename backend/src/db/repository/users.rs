use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ListingId, User, UserId};

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user. Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: User) -> RepositoryResult<User>;

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Exact match on the stored (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn list_users(&self) -> RepositoryResult<Vec<User>>;

    /// Replace the stored profile fields of `user`. Favourites are left alone;
    /// use [`UserRepository::add_favourite`] and
    /// [`UserRepository::remove_favourite`] for those.
    async fn update_user(&self, user: &User) -> RepositoryResult<User>;

    /// Remove a user for good. Returns `false` when there was nothing to delete.
    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool>;

    async fn add_favourite(&self, user_id: UserId, listing_id: ListingId)
        -> RepositoryResult<User>;

    async fn remove_favourite(
        &self,
        user_id: UserId,
        listing_id: ListingId,
    ) -> RepositoryResult<User>;
}
