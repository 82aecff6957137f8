//! Data Transfer Objects for the HTTP API.
//!
//! Domain types already serialize in the camelCase wire format; the types
//! here wrap or trim them for specific endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{Availability, Listing, Reservation, User, UserId};

/// Response for the health check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Plain confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public part of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingWithMessage {
    pub message: String,
    pub listing: Listing,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityCreated {
    pub message: String,
    pub availability: Availability,
}

/// Body of `GET /reservations`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub total_reservations: usize,
    pub reservations: Vec<Reservation>,
}

/// Body of `GET /reservations/{listingId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingReservationsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_count: usize,
    pub data: Vec<Reservation>,
}

impl From<Vec<Reservation>> for ListingReservationsResponse {
    fn from(data: Vec<Reservation>) -> Self {
        let message = data
            .is_empty()
            .then(|| "No reservations found for this listing".to_string());
        Self {
            message,
            total_count: data.len(),
            data,
        }
    }
}
