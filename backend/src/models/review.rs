use serde::{Deserialize, Serialize};

use super::{ListingId, ReviewId, UserId};

/// A star rating and comment left by a user on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub listing_id: ListingId,
    pub stars: u8,
    pub comment: String,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Review {
    pub fn new(user_id: UserId, listing_id: ListingId, stars: u8, comment: String) -> Self {
        Self {
            id: ReviewId::generate(),
            user_id,
            listing_id,
            stars,
            comment,
            is_deleted: false,
        }
    }
}
