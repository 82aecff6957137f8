//! `/reviews` endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::http::dto::MessageResponse;
use crate::http::error::AppError;
use crate::http::extract::{parse_id, AuthUser, ValidJson};
use crate::http::state::AppState;
use crate::models::{ListingId, Review, ReviewId};
use crate::services::reviews;
use crate::validation::{NewReviewPayload, UpdateReviewPayload};

/// POST /reviews/{listingId}
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(listing_id): Path<String>,
    ValidJson(input): ValidJson<NewReviewPayload>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    let review = reviews::create(state.repo(), caller.id, listing_id, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /reviews
pub async fn list_all(State(state): State<AppState>) -> HandlerResult<Vec<Review>> {
    Ok(Json(reviews::list_all(state.repo()).await?))
}

/// GET /reviews/{listingId}
pub async fn for_listing(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(listing_id): Path<String>,
) -> HandlerResult<Vec<Review>> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    Ok(Json(reviews::for_listing(state.repo(), listing_id).await?))
}

/// PUT /reviews/{id}
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<UpdateReviewPayload>,
) -> HandlerResult<Review> {
    let id: ReviewId = parse_id(&id, "review")?;
    Ok(Json(reviews::update(state.repo(), caller.id, id, input).await?))
}

/// DELETE /reviews/{id}
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    let id: ReviewId = parse_id(&id, "review")?;
    reviews::delete(state.repo(), caller.id, id).await?;
    Ok(Json(MessageResponse::new("Review deleted successfully")))
}
