use serde::{Deserialize, Serialize};

use super::time::DateRange;
use super::{AvailabilityId, ListingId};

/// An explicit open window during which a listing can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: AvailabilityId,
    pub listing_id: ListingId,
    #[serde(flatten)]
    pub dates: DateRange,
}

impl Availability {
    pub fn new(listing_id: ListingId, dates: DateRange) -> Self {
        Self {
            id: AvailabilityId::generate(),
            listing_id,
            dates,
        }
    }

    /// True when the window covers every day of `wanted`.
    pub fn covers(&self, wanted: &DateRange) -> bool {
        self.dates.start <= wanted.start && self.dates.end >= wanted.end
    }
}
