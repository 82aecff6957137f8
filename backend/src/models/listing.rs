use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ListingId, UserId};

/// Kind of property a listing advertises. Each kind has its own amenity catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    House,
    Hotel,
    Villa,
    Office,
}

const HOUSE_AMENITIES: &[&str] = &[
    "Netflix",
    "Wi Fi",
    "Free Parking",
    "Pool",
    "Air Conditioning",
    "Laundry",
    "Balcony",
];

const HOTEL_AMENITIES: &[&str] = &[
    "Swimming pool",
    "Fitness center",
    "Spa treatments",
    "Restaurant and bar",
    "Room service",
    "Laundry service",
    "Wi Fi",
    "Rooftop pool",
    "Private beach access",
    "In room dining",
];

const VILLA_AMENITIES: &[&str] = &[
    "Private pool",
    "Kitchen",
    "Laundry facilities",
    "Garden",
    "Barbecue grill",
    "Parking",
    "Home theater",
    "Game room",
    "Wine cellar",
    "Personal chef",
    "Guest house",
    "Number of Bathrooms",
    "Number of Rooms",
    "Panoramic View",
];

const OFFICE_AMENITIES: &[&str] = &[
    "Meeting rooms",
    "Conference rooms",
    "Shared workspace",
    "Kitchenette",
    "Wi Fi",
    "Copier/printer/scanner",
    "Reception area",
    "Panoramic views",
    "Café or restaurant",
    "Rooftop terrace",
    "Secure parking",
];

impl BuildingType {
    pub const ALL: [BuildingType; 4] = [Self::House, Self::Hotel, Self::Villa, Self::Office];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Hotel => "Hotel",
            Self::Villa => "Villa",
            Self::Office => "Office",
        }
    }

    /// Amenities a listing of this type may advertise.
    pub fn amenities(&self) -> &'static [&'static str] {
        match self {
            Self::House => HOUSE_AMENITIES,
            Self::Hotel => HOTEL_AMENITIES,
            Self::Villa => VILLA_AMENITIES,
            Self::Office => OFFICE_AMENITIES,
        }
    }

    pub fn allows_amenity(&self, amenity: &str) -> bool {
        self.amenities().contains(&amenity)
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown building type: {}", s))
    }
}

/// Geographic point stored as `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.longitude, point.latitude]
    }
}

/// Reference to an uploaded or hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    pub img: String,
}

/// A rentable property record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub user_id: UserId,
    pub coordinates: GeoPoint,
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    pub nr_of_rooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nr_of_beds: Option<u32>,
    pub building_type: BuildingType,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Price per night.
    pub price: f64,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Listing {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Validated payload for a new listing; the owner comes from the caller's token.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub coordinates: GeoPoint,
    pub title: String,
    pub address: String,
    pub images: Vec<ListingImage>,
    pub nr_of_rooms: u32,
    pub nr_of_beds: Option<u32>,
    pub building_type: BuildingType,
    pub amenities: Vec<String>,
    pub price: f64,
}

impl NewListing {
    pub fn into_listing(self, id: ListingId, owner: UserId) -> Listing {
        Listing {
            id,
            user_id: owner,
            coordinates: self.coordinates,
            title: self.title,
            address: self.address,
            images: self.images,
            nr_of_rooms: self.nr_of_rooms,
            nr_of_beds: self.nr_of_beds,
            building_type: self.building_type,
            amenities: self.amenities,
            price: self.price,
            is_deleted: false,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub address: Option<String>,
    pub nr_of_rooms: Option<u32>,
    pub nr_of_beds: Option<u32>,
    pub building_type: Option<BuildingType>,
    pub amenities: Option<Vec<String>>,
    pub price: Option<f64>,
}

impl ListingPatch {
    pub fn apply(self, listing: &mut Listing) {
        if let Some(title) = self.title {
            listing.title = title;
        }
        if let Some(address) = self.address {
            listing.address = address;
        }
        if let Some(rooms) = self.nr_of_rooms {
            listing.nr_of_rooms = rooms;
        }
        if let Some(beds) = self.nr_of_beds {
            listing.nr_of_beds = Some(beds);
        }
        if let Some(kind) = self.building_type {
            listing.building_type = kind;
        }
        if let Some(amenities) = self.amenities {
            listing.amenities = amenities;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_type_round_trip_str() {
        for kind in BuildingType::ALL {
            assert_eq!(kind.as_str().parse::<BuildingType>().unwrap(), kind);
        }
        assert!("Castle".parse::<BuildingType>().is_err());
    }

    #[test]
    fn test_amenity_catalogues_are_per_type() {
        assert!(BuildingType::House.allows_amenity("Netflix"));
        assert!(!BuildingType::Office.allows_amenity("Netflix"));
        assert!(BuildingType::Office.allows_amenity("Wi Fi"));
    }

    #[test]
    fn test_geo_point_serializes_as_lon_lat_pair() {
        let point = GeoPoint::new(19.82, 41.33);
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json, serde_json::json!([19.82, 41.33]));
        assert!(point.is_valid());
        assert!(!GeoPoint::new(200.0, 0.0).is_valid());
    }
}
