//! Repository traits for the persistence layer.
//!
//! Each aggregate has its own trait; [`FullRepository`] bundles them so the
//! HTTP layer can hold a single `Arc<dyn FullRepository>`.
//!
//! Lookups return `Ok(None)` for a missing record; writes against a missing
//! record return [`RepositoryError::NotFound`].

use async_trait::async_trait;

pub mod error;
pub mod listings;
pub mod reservations;
pub mod reviews;
pub mod users;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use listings::{AvailabilityRepository, ListingRepository};
pub use reservations::ReservationRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Every repository capability the application needs.
#[async_trait]
pub trait FullRepository:
    UserRepository
    + ListingRepository
    + AvailabilityRepository
    + ReservationRepository
    + ReviewRepository
{
    /// Check that the backing store answers.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
