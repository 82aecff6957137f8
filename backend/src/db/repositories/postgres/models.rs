use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::schema::{availability, listings, reservations, reviews, user_favourites, users};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    Availability, DateRange, GeoPoint, Listing, ListingId, ListingImage, Reservation, Review,
    User,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only used for ordering
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl From<&User> for UserChanges {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

impl UserRow {
    pub fn into_user(self, favourites: BTreeSet<ListingId>) -> RepositoryResult<User> {
        let role = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(User {
            id: self.id.into(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            favourite_listings: favourites,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_favourites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FavouriteRow {
    pub user_id: Uuid,
    pub listing_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only used for ordering
pub struct ListingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub longitude: f64,
    pub latitude: f64,
    pub title: String,
    pub address: String,
    pub images: Value,
    pub nr_of_rooms: i32,
    pub nr_of_beds: Option<i32>,
    pub building_type: String,
    pub amenities: Value,
    pub price: f64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = listings)]
#[diesel(treat_none_as_null = true)]
pub struct ListingChanges {
    pub id: Uuid,
    pub user_id: Uuid,
    pub longitude: f64,
    pub latitude: f64,
    pub title: String,
    pub address: String,
    pub images: Value,
    pub nr_of_rooms: i32,
    pub nr_of_beds: Option<i32>,
    pub building_type: String,
    pub amenities: Value,
    pub price: f64,
    pub is_deleted: bool,
}

fn to_json<T: serde::Serialize>(value: &T) -> RepositoryResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::internal(format!("Serialization error: {}", e)))
}

fn from_json<T: serde::de::DeserializeOwned>(value: Value, column: &str) -> RepositoryResult<T> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::internal(format!("Failed to parse {} JSON: {}", column, e)))
}

impl TryFrom<&Listing> for ListingChanges {
    type Error = RepositoryError;

    fn try_from(listing: &Listing) -> RepositoryResult<Self> {
        Ok(Self {
            id: listing.id.0,
            user_id: listing.user_id.0,
            longitude: listing.coordinates.longitude,
            latitude: listing.coordinates.latitude,
            title: listing.title.clone(),
            address: listing.address.clone(),
            images: to_json(&listing.images)?,
            nr_of_rooms: listing.nr_of_rooms as i32,
            nr_of_beds: listing.nr_of_beds.map(|b| b as i32),
            building_type: listing.building_type.as_str().to_string(),
            amenities: to_json(&listing.amenities)?,
            price: listing.price,
            is_deleted: listing.is_deleted,
        })
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> RepositoryResult<Self> {
        let images: Vec<ListingImage> = from_json(row.images, "images")?;
        let amenities: Vec<String> = from_json(row.amenities, "amenities")?;
        let building_type = row
            .building_type
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(Listing {
            id: row.id.into(),
            user_id: row.user_id.into(),
            coordinates: GeoPoint::new(row.longitude, row.latitude),
            title: row.title,
            address: row.address,
            images,
            nr_of_rooms: row.nr_of_rooms.max(0) as u32,
            nr_of_beds: row.nr_of_beds.map(|b| b.max(0) as u32),
            building_type,
            amenities,
            price: row.price,
            is_deleted: row.is_deleted,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = availability)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AvailabilityRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&Availability> for AvailabilityRow {
    fn from(a: &Availability) -> Self {
        Self {
            id: a.id.0,
            listing_id: a.listing_id.0,
            start_date: a.dates.start,
            end_date: a.dates.end,
        }
    }
}

impl From<AvailabilityRow> for Availability {
    fn from(row: AvailabilityRow) -> Self {
        Availability {
            id: row.id.into(),
            listing_id: row.listing_id.into(),
            dates: DateRange::new(row.start_date, row.end_date),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only used for ordering
pub struct ReservationRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: f64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: f64,
    pub is_deleted: bool,
}

impl From<&Reservation> for NewReservationRow {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.0,
            listing_id: r.listing_id.0,
            user_id: r.user_id.map(|u| u.0),
            start_date: r.dates.start,
            end_date: r.dates.end,
            total_price: r.total_price,
            is_deleted: r.is_deleted,
        }
    }
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id.into(),
            listing_id: row.listing_id.into(),
            user_id: row.user_id.map(Into::into),
            dates: DateRange::new(row.start_date, row.end_date),
            total_price: row.total_price,
            is_deleted: row.is_deleted,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only used for ordering
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub stars: i16,
    pub comment: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = reviews)]
pub struct ReviewChanges {
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub stars: i16,
    pub comment: String,
    pub is_deleted: bool,
}

impl From<&Review> for ReviewChanges {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id.0,
            user_id: r.user_id.0,
            listing_id: r.listing_id.0,
            stars: r.stars as i16,
            comment: r.comment.clone(),
            is_deleted: r.is_deleted,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id.into(),
            user_id: row.user_id.into(),
            listing_id: row.listing_id.into(),
            stars: row.stars.clamp(0, u8::MAX as i16) as u8,
            comment: row.comment,
            is_deleted: row.is_deleted,
        }
    }
}
