//! `/reservations` endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::http::dto::{ListingReservationsResponse, MessageResponse, ReservationsResponse};
use crate::http::error::AppError;
use crate::http::extract::{parse_id, AuthUser, ValidJson};
use crate::http::state::AppState;
use crate::models::{ListingId, Reservation, ReservationId};
use crate::services::reservations::{self, ReservationWithListing};
use crate::validation::DateRangePayload;

/// POST /reservations/{listingId}
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(listing_id): Path<String>,
    ValidJson(dates): ValidJson<DateRangePayload>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    let reservation = reservations::create(state.repo(), caller.id, listing_id, dates).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /reservations
pub async fn list_all(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> HandlerResult<ReservationsResponse> {
    let reservations = reservations::list_all(state.repo()).await?;
    Ok(Json(ReservationsResponse {
        total_reservations: reservations.len(),
        reservations,
    }))
}

/// GET /reservations/allReservationsOfAUser
pub async fn mine(
    State(state): State<AppState>,
    caller: AuthUser,
) -> HandlerResult<Vec<ReservationWithListing>> {
    Ok(Json(
        reservations::user_reservations(state.repo(), caller.id).await?,
    ))
}

/// GET /reservations/one/{listingId}
pub async fn mine_for_listing(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(listing_id): Path<String>,
) -> HandlerResult<Vec<Reservation>> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    Ok(Json(
        reservations::user_reservations_for_listing(state.repo(), caller.id, listing_id).await?,
    ))
}

/// GET /reservations/{listingId}
pub async fn for_listing(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(listing_id): Path<String>,
) -> HandlerResult<ListingReservationsResponse> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    let reservations = reservations::for_listing(state.repo(), listing_id).await?;
    Ok(Json(reservations.into()))
}

/// PUT /reservations/{id}
pub async fn reschedule(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidJson(dates): ValidJson<DateRangePayload>,
) -> HandlerResult<Reservation> {
    let id: ReservationId = parse_id(&id, "reservation")?;
    Ok(Json(
        reservations::reschedule(state.repo(), caller.id, id, dates).await?,
    ))
}

/// DELETE /reservations/{id}
pub async fn cancel(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    let id: ReservationId = parse_id(&id, "reservation")?;
    reservations::cancel(state.repo(), caller.id, id).await?;
    Ok(Json(MessageResponse::new("Reservation deleted successfully")))
}
