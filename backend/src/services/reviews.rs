use super::{active_listing, is_admin, ServiceError, ServiceResult};
use crate::db::{FullRepository, ReviewRepository};
use crate::models::{ListingId, Review, ReviewId, UserId};
use crate::validation::ReviewInput;

fn review_not_found() -> ServiceError {
    ServiceError::NotFound("Review not found".to_string())
}

pub async fn create(
    repo: &dyn FullRepository,
    caller: UserId,
    listing_id: ListingId,
    input: ReviewInput,
) -> ServiceResult<Review> {
    active_listing(repo, listing_id).await?;
    let review = repo
        .insert_review(Review::new(caller, listing_id, input.stars, input.comment))
        .await?;
    tracing::info!(review_id = %review.id, listing_id = %listing_id, stars = review.stars, "review added");
    Ok(review)
}

pub async fn list_all(repo: &dyn FullRepository) -> ServiceResult<Vec<Review>> {
    Ok(repo.list_reviews().await?)
}

pub async fn for_listing(
    repo: &dyn FullRepository,
    listing_id: ListingId,
) -> ServiceResult<Vec<Review>> {
    Ok(repo.reviews_for_listing(listing_id).await?)
}

/// Replace stars and comment of the caller's own review.
pub async fn update(
    repo: &dyn FullRepository,
    caller: UserId,
    id: ReviewId,
    input: ReviewInput,
) -> ServiceResult<Review> {
    let mut review = match repo.get_review(id).await? {
        Some(review) if !review.is_deleted => review,
        _ => return Err(review_not_found()),
    };
    if review.user_id != caller {
        return Err(ServiceError::Forbidden(
            "You are not authorized to update this review".to_string(),
        ));
    }

    review.stars = input.stars;
    review.comment = input.comment;
    Ok(repo.update_review(&review).await?)
}

/// Soft-delete a review. Authors and admins only.
pub async fn delete(repo: &dyn FullRepository, caller: UserId, id: ReviewId) -> ServiceResult<()> {
    let review = repo.get_review(id).await?.ok_or_else(review_not_found)?;
    if review.user_id != caller && !is_admin(repo, caller).await? {
        return Err(ServiceError::Forbidden(
            "You are not authorized to delete this review".to_string(),
        ));
    }
    if review.is_deleted || !repo.soft_delete_review(id).await? {
        return Err(ServiceError::BadRequest("Review already deleted".to_string()));
    }
    Ok(())
}
