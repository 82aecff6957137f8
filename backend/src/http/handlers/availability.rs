//! `/listings/availability` endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::HandlerResult;
use crate::http::dto::AvailabilityCreated;
use crate::http::error::AppError;
use crate::http::extract::{parse_id, AuthUser, ValidJson, ValidQuery};
use crate::http::state::AppState;
use crate::models::{Availability, ListingId};
use crate::services::availability::{self, MonthReport};
use crate::validation::{DateRangePayload, MonthQuery};

/// POST /listings/availability/{id}
pub async fn add_window(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidJson(dates): ValidJson<DateRangePayload>,
) -> Result<(StatusCode, Json<AvailabilityCreated>), AppError> {
    let id: ListingId = parse_id(&id, "listing")?;
    let (listing, window) = availability::add_window(state.repo(), caller.id, id, dates).await?;
    Ok((
        StatusCode::CREATED,
        Json(AvailabilityCreated {
            message: format!(
                "Availability for listing with title {} set successfully.",
                listing.title
            ),
            availability: window,
        }),
    ))
}

/// GET /listings/availability/{id}/all
pub async fn list_windows(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Vec<Availability>> {
    let id: ListingId = parse_id(&id, "listing")?;
    Ok(Json(availability::windows_for_listing(state.repo(), id).await?))
}

/// GET /listings/availability/{id}/free?month=YYYY-MM
pub async fn free_dates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidQuery(month): ValidQuery<MonthQuery>,
) -> HandlerResult<MonthReport> {
    let id: ListingId = parse_id(&id, "listing")?;
    let today = Utc::now().date_naive();
    Ok(Json(
        availability::month_report(state.repo(), id, month, today).await?,
    ))
}
