//! Listing management and discovery.

use std::collections::HashSet;

use super::{active_listing, is_admin, ServiceError, ServiceResult};
use crate::algorithms::geo::nearest_within;
use crate::db::{AvailabilityRepository, FullRepository, ListingRepository};
use crate::models::{Listing, ListingId, ListingImage, ListingPatch, NewListing, UserId};
use crate::validation::{check_amenities, Checker, ListingSearch, NearbySearch, Page};

pub async fn create_listing(
    repo: &dyn FullRepository,
    owner: UserId,
    input: NewListing,
) -> ServiceResult<Listing> {
    let listing = repo
        .insert_listing(input.into_listing(ListingId::generate(), owner))
        .await?;
    tracing::info!(listing_id = %listing.id, owner = %owner, "listing created");
    Ok(listing)
}

pub async fn list_page(repo: &dyn FullRepository, page: Page) -> ServiceResult<Vec<Listing>> {
    Ok(repo
        .list_listings(page.offset(), page.limit as usize)
        .await?)
}

/// Active listings within `search.max_distance_m` metres, nearest first.
pub async fn nearby(repo: &dyn FullRepository, search: NearbySearch) -> ServiceResult<Vec<Listing>> {
    let listings = repo.list_active_listings().await?;
    Ok(nearest_within(
        listings,
        search.origin,
        search.max_distance_m,
        |l| l.coordinates,
    ))
}

/// Active listings with an availability window covering the whole requested
/// range, optionally narrowed to titles containing `search.title`.
pub async fn search(repo: &dyn FullRepository, search: ListingSearch) -> ServiceResult<Vec<Listing>> {
    let windows = repo.availability_covering(&search.dates).await?;
    let mut seen = HashSet::new();
    let ids: Vec<ListingId> = windows
        .into_iter()
        .map(|w| w.listing_id)
        .filter(|id| seen.insert(*id))
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let listings = repo.listings_by_ids(&ids).await?;
    Ok(match search.title {
        Some(title) => listings
            .into_iter()
            .filter(|l| l.title.contains(&title))
            .collect(),
        None => listings,
    })
}

pub async fn your_listings(repo: &dyn FullRepository, owner: UserId) -> ServiceResult<Vec<Listing>> {
    Ok(repo.listings_by_owner(owner).await?)
}

/// One of the caller's own active listings. Anything else reads as missing.
pub async fn get_own_listing(
    repo: &dyn FullRepository,
    owner: UserId,
    id: ListingId,
) -> ServiceResult<Listing> {
    let listing = active_listing(repo, id).await?;
    if !listing.is_owned_by(owner) {
        return Err(ServiceError::NotFound("Listing not found".to_string()));
    }
    Ok(listing)
}

/// Partial update of the caller's own listing. Amenities are checked against
/// the building type the listing will have after the update.
pub async fn update_listing(
    repo: &dyn FullRepository,
    owner: UserId,
    id: ListingId,
    patch: ListingPatch,
) -> ServiceResult<Listing> {
    let mut listing = get_own_listing(repo, owner, id).await?;

    let kind = patch.building_type.unwrap_or(listing.building_type);
    let amenities = patch.amenities.as_ref().unwrap_or(&listing.amenities);
    let mut check = Checker::new();
    if !check_amenities(&mut check, kind, amenities) {
        return Err(check.into_errors().into());
    }

    patch.apply(&mut listing);
    Ok(repo.update_listing(&listing).await?)
}

/// Soft-delete a listing. Owners and admins only.
pub async fn delete_listing(
    repo: &dyn FullRepository,
    caller: UserId,
    id: ListingId,
) -> ServiceResult<()> {
    let listing = repo
        .get_listing(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Listing not found".to_string()))?;
    if !listing.is_owned_by(caller) && !is_admin(repo, caller).await? {
        return Err(ServiceError::Forbidden(
            "You are not authorized to delete this listing".to_string(),
        ));
    }
    if listing.is_deleted || !repo.soft_delete_listing(id).await? {
        return Err(ServiceError::BadRequest("Listing already deleted".to_string()));
    }
    tracing::info!(listing_id = %id, deleted_by = %caller, "listing deleted");
    Ok(())
}

/// Append image references to the caller's listing.
pub async fn add_images(
    repo: &dyn FullRepository,
    caller: UserId,
    id: ListingId,
    images: Vec<ListingImage>,
) -> ServiceResult<Listing> {
    let mut listing = active_listing(repo, id).await?;
    if !listing.is_owned_by(caller) {
        return Err(ServiceError::Forbidden(
            "You are not authorized to modify this listing".to_string(),
        ));
    }
    listing.images.extend(images);
    Ok(repo.update_listing(&listing).await?)
}
