//! `/users` endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::HandlerResult;
use crate::http::dto::{LoginResponse, MessageResponse, UserSummary};
use crate::http::error::AppError;
use crate::http::extract::{parse_id, AuthUser, ValidJson, TOKEN_COOKIE};
use crate::http::state::AppState;
use crate::models::{Listing, ListingId, User, UserId};
use crate::services::users;
use crate::validation::{LoginPayload, SignupPayload, UpdateUserPayload};

/// POST /users/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<SignupPayload>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    let user = users::signup(state.repo(), input).await?;
    Ok((StatusCode::CREATED, Json(UserSummary::from(&user))))
}

/// POST /users/login
///
/// Returns the token in the body and as an HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = users::login(state.repo(), &state.tokens, credentials, Utc::now()).await?;
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE,
        token,
        state.tokens.ttl().num_seconds()
    );
    tracing::info!(user_id = %user.id, "user logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: UserSummary::from(&user),
            token,
        }),
    ))
}

/// GET /users/me
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> HandlerResult<User> {
    Ok(Json(users::get_user(state.repo(), caller.id).await?))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> HandlerResult<Vec<User>> {
    Ok(Json(users::list_users(state.repo()).await?))
}

/// GET /users/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult<User> {
    let id: UserId = parse_id(&id, "user")?;
    Ok(Json(users::get_user(state.repo(), id).await?))
}

/// PUT /users
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(update): ValidJson<UpdateUserPayload>,
) -> HandlerResult<UserSummary> {
    let user = users::update_profile(state.repo(), caller.id, update).await?;
    Ok(Json(UserSummary::from(&user)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    let id: UserId = parse_id(&id, "user")?;
    users::delete_user(state.repo(), caller.id, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// POST /users/add-to-favorites/{listingId}
pub async fn add_favourite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(listing_id): Path<String>,
) -> HandlerResult<User> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    Ok(Json(users::add_favourite(state.repo(), caller.id, listing_id).await?))
}

/// DELETE /users/remove-from-favourites/{listingId}
pub async fn remove_favourite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(listing_id): Path<String>,
) -> HandlerResult<User> {
    let listing_id: ListingId = parse_id(&listing_id, "listing")?;
    Ok(Json(
        users::remove_favourite(state.repo(), caller.id, listing_id).await?,
    ))
}

/// GET /users/allFavorites
pub async fn favourites(State(state): State<AppState>, caller: AuthUser) -> HandlerResult<Vec<Listing>> {
    Ok(Json(users::favourite_listings(state.repo(), caller.id).await?))
}
