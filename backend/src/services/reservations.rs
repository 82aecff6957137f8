//! Booking, rescheduling and cancelling stays.

use serde::Serialize;

use super::{active_listing, is_admin, ServiceError, ServiceResult};
use crate::db::{FullRepository, ListingRepository, ReservationRepository};
use crate::models::reservation::total_price;
use crate::models::{DateRange, Listing, ListingId, Reservation, ReservationId, UserId};

/// A reservation together with the listing it books. `listing` is `None`
/// once the listing has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationWithListing {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub listing: Option<Listing>,
}

fn reservation_not_found() -> ServiceError {
    ServiceError::NotFound("No reservation found!".to_string())
}

fn check_order(dates: &DateRange) -> ServiceResult<()> {
    if dates.is_ordered() {
        Ok(())
    } else {
        Err(ServiceError::BadRequest("Bad Request".to_string()))
    }
}

/// Book `dates` at `listing_id` for `caller`.
///
/// Owners cannot book their own listing. Overlap with any active reservation
/// of the listing, touching days included, is rejected by the repository.
pub async fn create(
    repo: &dyn FullRepository,
    caller: UserId,
    listing_id: ListingId,
    dates: DateRange,
) -> ServiceResult<Reservation> {
    check_order(&dates)?;
    let listing = active_listing(repo, listing_id).await?;
    if listing.is_owned_by(caller) {
        return Err(ServiceError::Forbidden(
            "You are not authorized to make reservations for this listing.".to_string(),
        ));
    }

    let reservation = repo
        .insert_reservation_if_free(Reservation::new(
            listing_id,
            Some(caller),
            dates,
            listing.price,
        ))
        .await?;
    tracing::info!(
        reservation_id = %reservation.id,
        listing_id = %listing_id,
        start = %dates.start,
        end = %dates.end,
        "reservation created"
    );
    Ok(reservation)
}

pub async fn list_all(repo: &dyn FullRepository) -> ServiceResult<Vec<Reservation>> {
    Ok(repo.list_reservations().await?)
}

/// The caller's reservations, each joined with its listing.
pub async fn user_reservations(
    repo: &dyn FullRepository,
    caller: UserId,
) -> ServiceResult<Vec<ReservationWithListing>> {
    let reservations = repo.reservations_by_user(caller).await?;
    let mut ids: Vec<ListingId> = reservations.iter().map(|r| r.listing_id).collect();
    ids.sort();
    ids.dedup();
    let listings = repo.listings_by_ids(&ids).await?;

    Ok(reservations
        .into_iter()
        .map(|reservation| {
            let listing = listings
                .iter()
                .find(|l| l.id == reservation.listing_id)
                .cloned();
            ReservationWithListing {
                reservation,
                listing,
            }
        })
        .collect())
}

/// The caller's reservations at one listing; `NotFound` when there are none.
pub async fn user_reservations_for_listing(
    repo: &dyn FullRepository,
    caller: UserId,
    listing_id: ListingId,
) -> ServiceResult<Vec<Reservation>> {
    let reservations: Vec<Reservation> = repo
        .reservations_for_listing(listing_id)
        .await?
        .into_iter()
        .filter(|r| r.is_made_by(caller))
        .collect();
    if reservations.is_empty() {
        return Err(reservation_not_found());
    }
    Ok(reservations)
}

pub async fn for_listing(
    repo: &dyn FullRepository,
    listing_id: ListingId,
) -> ServiceResult<Vec<Reservation>> {
    Ok(repo.reservations_for_listing(listing_id).await?)
}

/// Move the caller's reservation to new dates and reprice it.
pub async fn reschedule(
    repo: &dyn FullRepository,
    caller: UserId,
    id: ReservationId,
    dates: DateRange,
) -> ServiceResult<Reservation> {
    check_order(&dates)?;
    let existing = repo
        .get_reservation(id)
        .await?
        .ok_or_else(reservation_not_found)?;
    if !existing.is_active() {
        return Err(ServiceError::BadRequest(
            "Reservation already deleted".to_string(),
        ));
    }
    if !existing.is_made_by(caller) {
        return Err(ServiceError::Forbidden(
            "You are not authorized to update this reservation".to_string(),
        ));
    }

    let listing = active_listing(repo, existing.listing_id).await?;
    let updated = repo
        .reschedule_reservation_if_free(id, dates, total_price(dates, listing.price))
        .await?;
    tracing::info!(reservation_id = %id, start = %dates.start, end = %dates.end, "reservation rescheduled");
    Ok(updated)
}

/// Soft-delete a reservation. Allowed for the guest, the listing owner and
/// admins.
pub async fn cancel(
    repo: &dyn FullRepository,
    caller: UserId,
    id: ReservationId,
) -> ServiceResult<()> {
    let reservation = repo
        .get_reservation(id)
        .await?
        .ok_or_else(reservation_not_found)?;

    let owns_listing = repo
        .get_listing(reservation.listing_id)
        .await?
        .map(|l| l.is_owned_by(caller))
        .unwrap_or(false);
    if !reservation.is_made_by(caller) && !owns_listing && !is_admin(repo, caller).await? {
        return Err(ServiceError::Forbidden(
            "You are not authorized to delete this reservation".to_string(),
        ));
    }

    if !reservation.is_active() || !repo.soft_delete_reservation(id).await? {
        return Err(ServiceError::BadRequest(
            "Reservation already deleted".to_string(),
        ));
    }
    tracing::info!(reservation_id = %id, cancelled_by = %caller, "reservation cancelled");
    Ok(())
}
