//! Availability windows and the free-date report.

use chrono::NaiveDate;
use serde::Serialize;

use super::{active_listing, ServiceError, ServiceResult};
use crate::algorithms::availability::{
    booked_dates_in, booked_in_window, free_dates, reporting_window,
};
use crate::db::{AvailabilityRepository, FullRepository, ListingRepository, ReservationRepository};
use crate::models::time::{day_string, first_of_month};
use crate::models::{Availability, DateRange, Listing, ListingId, UserId};

/// Free and booked days of one listing for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthReport {
    /// `YYYY-MM-DD` of the first day of the month.
    pub month: String,
    pub free_dates: Vec<String>,
    pub booked_dates: Vec<String>,
}

/// Open a window in which the listing can be found by date search.
pub async fn add_window(
    repo: &dyn FullRepository,
    caller: UserId,
    listing_id: ListingId,
    dates: DateRange,
) -> ServiceResult<(Listing, Availability)> {
    if !dates.is_ordered() {
        return Err(ServiceError::BadRequest("Bad Request".to_string()));
    }
    let listing = active_listing(repo, listing_id).await?;
    if !listing.is_owned_by(caller) {
        return Err(ServiceError::Forbidden(
            "You are not authorized to set availability for this listing".to_string(),
        ));
    }

    let window = repo
        .insert_availability(Availability::new(listing_id, dates))
        .await?;
    tracing::debug!(listing_id = %listing_id, start = %dates.start, end = %dates.end, "availability added");
    Ok((listing, window))
}

pub async fn windows_for_listing(
    repo: &dyn FullRepository,
    listing_id: ListingId,
) -> ServiceResult<Vec<Availability>> {
    if repo.get_listing(listing_id).await?.is_none() {
        return Err(ServiceError::NotFound("Listing not found".to_string()));
    }
    Ok(repo.availability_for_listing(listing_id).await?)
}

/// Days of `month` (default: the month containing `today`) from `today`
/// onwards, split into free and booked.
pub async fn month_report(
    repo: &dyn FullRepository,
    listing_id: ListingId,
    month: Option<NaiveDate>,
    today: NaiveDate,
) -> ServiceResult<MonthReport> {
    active_listing(repo, listing_id).await?;
    let reservations = repo.reservations_for_listing(listing_id).await?;

    let month = first_of_month(month.unwrap_or(today));
    let window = reporting_window(month, today);
    let booked = booked_dates_in(&window, &reservations);

    Ok(MonthReport {
        month: day_string(month),
        free_dates: free_dates(&window, &booked),
        booked_dates: booked_in_window(&window, &booked),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::models::{BuildingType, GeoPoint, NewListing, Reservation};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded_listing(repo: &LocalRepository, owner: UserId) -> Listing {
        let listing = NewListing {
            coordinates: GeoPoint::new(19.8, 41.3),
            title: "Cabin".to_string(),
            address: "Hill road".to_string(),
            images: Vec::new(),
            nr_of_rooms: 1,
            nr_of_beds: None,
            building_type: BuildingType::House,
            amenities: Vec::new(),
            price: 30.0,
        }
        .into_listing(ListingId::generate(), owner);
        repo.insert_listing(listing).await.unwrap()
    }

    #[tokio::test]
    async fn test_only_owner_adds_windows() {
        let repo = LocalRepository::new();
        let owner = UserId::generate();
        let listing = seeded_listing(&repo, owner).await;
        let dates = DateRange::new(day(2030, 6, 1), day(2030, 6, 30));

        let denied = add_window(&repo, UserId::generate(), listing.id, dates).await;
        assert!(matches!(denied, Err(ServiceError::Forbidden(_))));

        add_window(&repo, owner, listing.id, dates).await.unwrap();
        assert_eq!(windows_for_listing(&repo, listing.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unordered_window_is_bad_request() {
        let repo = LocalRepository::new();
        let owner = UserId::generate();
        let listing = seeded_listing(&repo, owner).await;
        let dates = DateRange::new(day(2030, 6, 10), day(2030, 6, 10));
        let result = add_window(&repo, owner, listing.id, dates).await;
        assert!(matches!(result, Err(ServiceError::BadRequest(m)) if m == "Bad Request"));
    }

    #[tokio::test]
    async fn test_month_report_splits_days() {
        let repo = LocalRepository::new();
        let listing = seeded_listing(&repo, UserId::generate()).await;
        repo.insert_reservation_if_free(Reservation::new(
            listing.id,
            Some(UserId::generate()),
            DateRange::new(day(2030, 6, 10), day(2030, 6, 12)),
            listing.price,
        ))
        .await
        .unwrap();

        let report = month_report(&repo, listing.id, Some(day(2030, 6, 1)), day(2030, 5, 20))
            .await
            .unwrap();
        assert_eq!(report.month, "2030-06-01");
        assert_eq!(report.free_dates.len(), 27);
        assert_eq!(
            report.booked_dates,
            vec!["2030-06-10", "2030-06-11", "2030-06-12"]
        );
    }

    #[tokio::test]
    async fn test_month_report_with_multi_century_stay() {
        let repo = LocalRepository::new();
        let listing = seeded_listing(&repo, UserId::generate()).await;
        repo.insert_reservation_if_free(Reservation::new(
            listing.id,
            Some(UserId::generate()),
            DateRange::new(day(1, 1, 1), day(9999, 12, 31)),
            listing.price,
        ))
        .await
        .unwrap();

        let report = month_report(&repo, listing.id, Some(day(2030, 6, 1)), day(2030, 5, 1))
            .await
            .unwrap();
        assert!(report.free_dates.is_empty());
        assert_eq!(report.booked_dates.len(), 30);
        assert_eq!(report.booked_dates.first().map(String::as_str), Some("2030-06-01"));
        assert_eq!(report.booked_dates.last().map(String::as_str), Some("2030-06-30"));
    }

    #[tokio::test]
    async fn test_past_month_reports_nothing() {
        let repo = LocalRepository::new();
        let listing = seeded_listing(&repo, UserId::generate()).await;
        let report = month_report(&repo, listing.id, Some(day(2020, 1, 1)), day(2030, 5, 20))
            .await
            .unwrap();
        assert!(report.free_dates.is_empty());
        assert!(report.booked_dates.is_empty());
    }
}
