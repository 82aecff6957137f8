use serde::{Deserialize, Serialize};

use super::time::DateRange;
use super::{ListingId, ReservationId, UserId};

/// A confirmed booking of a listing for a range of calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub listing_id: ListingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub dates: DateRange,
    pub total_price: f64,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Reservation {
    /// Build an active reservation priced at `nightly_price` per night.
    pub fn new(
        listing_id: ListingId,
        user_id: Option<UserId>,
        dates: DateRange,
        nightly_price: f64,
    ) -> Self {
        Self {
            id: ReservationId::generate(),
            listing_id,
            user_id,
            dates,
            total_price: total_price(dates, nightly_price),
            is_deleted: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    pub fn is_made_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Nights multiplied by the nightly price.
pub fn total_price(dates: DateRange, nightly_price: f64) -> f64 {
    dates.nights() as f64 * nightly_price
}
