//! Business operations.
//!
//! Services take the repository handle and already-validated input, enforce
//! ownership and state rules, and run the availability algorithms. They know
//! nothing about HTTP; handlers translate [`ServiceError`] into responses.

pub mod availability;
pub mod listings;
pub mod reservations;
pub mod reviews;
pub mod users;

use crate::auth::AuthError;
use crate::db::{FullRepository, ListingRepository, RepositoryError};
use crate::models::{Listing, ListingId, UserId};
use crate::validation::ValidationErrors;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure taxonomy shared by every service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed field checks; the message joins every field error.
    #[error("{0}")]
    Validation(String),

    /// The request is well-formed but not acceptable in the current state.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate email or overlapping booking.
    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.message())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => Self::NotFound(message),
            RepositoryError::Conflict { message, .. } => Self::Conflict(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Key(_) | AuthError::Hashing(_) => Self::Internal(err.to_string()),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

/// A non-deleted listing, or `NotFound`.
pub(crate) async fn active_listing(
    repo: &dyn FullRepository,
    id: ListingId,
) -> ServiceResult<Listing> {
    match repo.get_listing(id).await? {
        Some(listing) if !listing.is_deleted => Ok(listing),
        _ => Err(ServiceError::NotFound("Listing not found".to_string())),
    }
}

/// Whether `user_id` belongs to an admin account.
pub(crate) async fn is_admin(repo: &dyn FullRepository, user_id: UserId) -> ServiceResult<bool> {
    Ok(repo
        .get_user(user_id)
        .await?
        .map(|u| u.is_admin())
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ErrorContext;

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        let not_found: ServiceError = RepositoryError::not_found("Listing not found").into();
        assert!(matches!(not_found, ServiceError::NotFound(m) if m == "Listing not found"));

        let conflict: ServiceError =
            RepositoryError::conflict_with_context("overlap", ErrorContext::default()).into();
        assert!(matches!(conflict, ServiceError::Conflict(_)));

        let internal: ServiceError = RepositoryError::connection("pool exhausted").into();
        assert!(matches!(internal, ServiceError::Internal(_)));
    }

    #[test]
    fn test_auth_errors_map_to_unauthorized() {
        let err: ServiceError = AuthError::Expired.into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        let err: ServiceError = AuthError::Hashing("boom".into()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
