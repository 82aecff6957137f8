//! `/listings` endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::http::dto::{ListingWithMessage, MessageResponse};
use crate::http::error::AppError;
use crate::http::extract::{parse_id, AuthUser, ValidJson, ValidQuery};
use crate::http::state::AppState;
use crate::models::{Listing, ListingId};
use crate::services::listings;
use crate::validation::{
    ImagesPayload, ListingPayload, NearbyQuery, PageQuery, SearchQuery, UpdateListingPayload,
};

/// POST /listings
pub async fn create_listing(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(input): ValidJson<ListingPayload>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let listing = listings::create_listing(state.repo(), caller.id, input).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /listings?page&limit
pub async fn list_listings(
    State(state): State<AppState>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> HandlerResult<Vec<Listing>> {
    Ok(Json(listings::list_page(state.repo(), page).await?))
}

/// GET /listings/nearby?lat&long&maxDistance
pub async fn nearby(
    State(state): State<AppState>,
    ValidQuery(search): ValidQuery<NearbyQuery>,
) -> HandlerResult<Vec<Listing>> {
    Ok(Json(listings::nearby(state.repo(), search).await?))
}

/// GET /listings/search?title&startDate&endDate
pub async fn search(
    State(state): State<AppState>,
    ValidQuery(search): ValidQuery<SearchQuery>,
) -> HandlerResult<Vec<Listing>> {
    Ok(Json(listings::search(state.repo(), search).await?))
}

/// GET /listings/yourListings
pub async fn your_listings(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<Listing>> {
    Ok(Json(listings::your_listings(state.repo(), caller.id).await?))
}

/// GET /listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<Listing> {
    let id: ListingId = parse_id(&id, "listing")?;
    Ok(Json(listings::get_own_listing(state.repo(), caller.id, id).await?))
}

/// PUT /listings/{id}
pub async fn update_listing(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<UpdateListingPayload>,
) -> HandlerResult<Listing> {
    let id: ListingId = parse_id(&id, "listing")?;
    Ok(Json(
        listings::update_listing(state.repo(), caller.id, id, patch).await?,
    ))
}

/// DELETE /listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    let id: ListingId = parse_id(&id, "listing")?;
    listings::delete_listing(state.repo(), caller.id, id).await?;
    Ok(Json(MessageResponse::new("Listing deleted successfully")))
}

/// POST /listings/{id}/images
pub async fn add_images(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidJson(images): ValidJson<ImagesPayload>,
) -> HandlerResult<ListingWithMessage> {
    let id: ListingId = parse_id(&id, "listing")?;
    let listing = listings::add_images(state.repo(), caller.id, id, images).await?;
    Ok(Json(ListingWithMessage {
        message: "Images uploaded successfully".to_string(),
        listing,
    }))
}
