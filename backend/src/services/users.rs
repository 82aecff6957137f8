//! Accounts, sessions and favourites.

use chrono::{DateTime, Utc};

use super::{active_listing, is_admin, ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, TokenService};
use crate::db::{FullRepository, UserRepository};
use crate::models::{Listing, ListingId, Role, User, UserId, UserPatch};
use crate::validation::{Credentials, ProfileUpdate, Signup};

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}

fn email_taken(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(_) => ServiceError::Conflict("Email already in use".to_string()),
        other => other,
    }
}

pub async fn signup(repo: &dyn FullRepository, input: Signup) -> ServiceResult<User> {
    let password_hash = hash_password(&input.password)?;
    let user = User::new(
        UserId::generate(),
        input.first_name,
        input.last_name,
        input.email,
        password_hash,
        Role::User,
    );
    let user = repo
        .insert_user(user)
        .await
        .map_err(|e| email_taken(e.into()))?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Check credentials and sign a session token.
pub async fn login(
    repo: &dyn FullRepository,
    tokens: &TokenService,
    credentials: Credentials,
    now: DateTime<Utc>,
) -> ServiceResult<(User, String)> {
    let user = repo
        .find_user_by_email(&credentials.email)
        .await?
        .ok_or_else(user_not_found)?;

    if !verify_password(&credentials.password, &user.password_hash) {
        return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = tokens.issue(&user, now)?;
    Ok((user, token))
}

pub async fn get_user(repo: &dyn FullRepository, id: UserId) -> ServiceResult<User> {
    repo.get_user(id).await?.ok_or_else(user_not_found)
}

pub async fn list_users(repo: &dyn FullRepository) -> ServiceResult<Vec<User>> {
    Ok(repo.list_users().await?)
}

/// Apply a partial profile change to the caller's own account.
pub async fn update_profile(
    repo: &dyn FullRepository,
    caller: UserId,
    update: ProfileUpdate,
) -> ServiceResult<User> {
    let mut user = get_user(repo, caller).await?;
    let password_hash = match update.password {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };
    UserPatch {
        first_name: update.first_name,
        last_name: update.last_name,
        email: update.email,
        password_hash,
    }
    .apply(&mut user);

    repo.update_user(&user)
        .await
        .map_err(|e| email_taken(e.into()))
}

/// Remove an account. Users may delete themselves; admins may delete anyone.
pub async fn delete_user(
    repo: &dyn FullRepository,
    caller: UserId,
    target: UserId,
) -> ServiceResult<()> {
    if caller != target && !is_admin(repo, caller).await? {
        return Err(ServiceError::Forbidden(
            "You are not authorized to delete this user".to_string(),
        ));
    }
    if !repo.delete_user(target).await? {
        return Err(user_not_found());
    }
    tracing::info!(user_id = %target, deleted_by = %caller, "user deleted");
    Ok(())
}

pub async fn add_favourite(
    repo: &dyn FullRepository,
    caller: UserId,
    listing_id: ListingId,
) -> ServiceResult<User> {
    active_listing(repo, listing_id).await?;
    Ok(repo.add_favourite(caller, listing_id).await?)
}

pub async fn remove_favourite(
    repo: &dyn FullRepository,
    caller: UserId,
    listing_id: ListingId,
) -> ServiceResult<User> {
    Ok(repo.remove_favourite(caller, listing_id).await?)
}

/// The caller's favourite listings that still exist.
pub async fn favourite_listings(
    repo: &dyn FullRepository,
    caller: UserId,
) -> ServiceResult<Vec<Listing>> {
    let user = get_user(repo, caller).await?;
    let ids: Vec<ListingId> = user.favourite_listings.into_iter().collect();
    Ok(repo.listings_by_ids(&ids).await?)
}
