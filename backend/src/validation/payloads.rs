//! Loose request payloads and the checked values they validate into.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{Checker, Validate, ValidationResult};
use crate::models::{BuildingType, DateRange, GeoPoint, ListingImage, ListingPatch, NewListing};

const NAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 255;
const MAX_IMAGES_PER_UPLOAD: usize = 5;
const DEFAULT_PAGE_LIMIT: u32 = 10;
const MAX_PAGE_LIMIT: u32 = 100;
const DEFAULT_NEARBY_DISTANCE_M: f64 = 1000.0;

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration data with the password still in plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Validate for SignupPayload {
    type Output = Signup;

    fn validate(self) -> ValidationResult<Signup> {
        let mut check = Checker::new();
        let first_name = check.required_text("firstName", self.first_name, None, Some(NAME_MAX));
        let last_name = check.required_text("lastName", self.last_name, None, Some(NAME_MAX));
        let email = check.required("email", self.email);
        let email = check.email("email", email);
        let password = check.required_text(
            "password",
            self.password,
            Some(PASSWORD_MIN),
            Some(PASSWORD_MAX),
        );

        check.finish(|| {
            Some(Signup {
                first_name: first_name?,
                last_name: last_name?,
                email: email?,
                password: password?,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginPayload {
    type Output = Credentials;

    fn validate(self) -> ValidationResult<Credentials> {
        let mut check = Checker::new();
        let email = check.required("email", self.email);
        let email = check.email("email", email);
        let password = check.required_text(
            "password",
            self.password,
            Some(PASSWORD_MIN),
            Some(PASSWORD_MAX),
        );

        check.finish(|| {
            Some(Credentials {
                email: email?,
                password: password?,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial profile change; `password` is plain text until the service hashes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for UpdateUserPayload {
    type Output = ProfileUpdate;

    fn validate(self) -> ValidationResult<ProfileUpdate> {
        let mut check = Checker::new();
        let first_name = check.text("firstName", self.first_name, None, Some(NAME_MAX));
        let last_name = check.text("lastName", self.last_name, None, Some(NAME_MAX));
        let email = check.email("email", self.email);
        let password = check.text(
            "password",
            self.password,
            Some(PASSWORD_MIN),
            Some(PASSWORD_MAX),
        );

        check.finish(|| {
            Some(ProfileUpdate {
                first_name,
                last_name,
                email,
                password,
            })
        })
    }
}

// =============================================================================
// Listings
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagePayload {
    pub img: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub coordinates: Option<Vec<f64>>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub images: Option<Vec<ImagePayload>>,
    pub nr_of_rooms: Option<u32>,
    pub nr_of_beds: Option<u32>,
    pub building_type: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub price: Option<f64>,
}

/// Record an error for every amenity the building type does not offer.
pub fn check_amenities(check: &mut Checker, kind: BuildingType, amenities: &[String]) -> bool {
    let mut ok = true;
    for (index, amenity) in amenities.iter().enumerate() {
        if !kind.allows_amenity(amenity) {
            check.fail(
                "amenities",
                format!(
                    "\"amenities[{index}]\" must be one of [{}]",
                    kind.amenities().join(", ")
                ),
            );
            ok = false;
        }
    }
    ok
}

fn check_building_type(check: &mut Checker, value: Option<String>) -> Option<BuildingType> {
    let raw = value?;
    match raw.parse::<BuildingType>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            check.fail(
                "buildingType",
                "\"buildingType\" must be one of [House, Hotel, Villa, Office]",
            );
            None
        }
    }
}

fn check_coordinates(check: &mut Checker, value: Option<Vec<f64>>) -> Option<GeoPoint> {
    let pair = check.required("coordinates", value)?;
    let [longitude, latitude] = match pair.as_slice() {
        [lon, lat] => [*lon, *lat],
        _ => {
            check.fail("coordinates", "\"coordinates\" must contain 2 items");
            return None;
        }
    };
    let point = GeoPoint::new(longitude, latitude);
    if point.is_valid() {
        Some(point)
    } else {
        check.fail(
            "coordinates",
            "\"coordinates\" must be [longitude, latitude] within valid bounds",
        );
        None
    }
}

fn check_images(check: &mut Checker, images: Vec<ImagePayload>) -> Option<Vec<ListingImage>> {
    let mut accepted = Vec::with_capacity(images.len());
    let mut ok = true;
    for (index, image) in images.into_iter().enumerate() {
        let field = format!("images[{index}].img");
        match image.img {
            Some(img) => match check.uri(&field, img) {
                Some(img) => accepted.push(ListingImage { img }),
                None => ok = false,
            },
            None => {}
        }
    }
    ok.then_some(accepted)
}

impl Validate for ListingPayload {
    type Output = NewListing;

    fn validate(self) -> ValidationResult<NewListing> {
        let mut check = Checker::new();
        let coordinates = check_coordinates(&mut check, self.coordinates);
        let title = check.required_text("title", self.title, None, None);
        let address = check.required_text("address", self.address, None, None);
        let images = match self.images {
            Some(images) => check_images(&mut check, images),
            None => Some(Vec::new()),
        };
        let nr_of_rooms = check.required("nrOfRooms", self.nr_of_rooms);
        let building_type = check.required("buildingType", self.building_type);
        let building_type = check_building_type(&mut check, building_type);
        let amenities = check.required("amenities", self.amenities);
        let amenities_ok = match (building_type, amenities.as_deref()) {
            (Some(kind), Some(list)) => check_amenities(&mut check, kind, list),
            _ => false,
        };
        let price = check.required("price", self.price);
        let price = check.amount("price", price);

        check.finish(|| {
            if !amenities_ok {
                return None;
            }
            Some(NewListing {
                coordinates: coordinates?,
                title: title?,
                address: address?,
                images: images?,
                nr_of_rooms: nr_of_rooms?,
                nr_of_beds: self.nr_of_beds,
                building_type: building_type?,
                amenities: amenities?,
                price: price?,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingPayload {
    pub title: Option<String>,
    pub address: Option<String>,
    pub nr_of_rooms: Option<u32>,
    pub nr_of_beds: Option<u32>,
    pub building_type: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub price: Option<f64>,
}

impl Validate for UpdateListingPayload {
    type Output = ListingPatch;

    /// Amenities are checked here only when the building type changes too;
    /// otherwise the service checks them against the stored type.
    fn validate(self) -> ValidationResult<ListingPatch> {
        let mut check = Checker::new();
        let title = check.text("title", self.title, None, None);
        let address = check.text("address", self.address, None, None);
        let building_type = check_building_type(&mut check, self.building_type);
        if let (Some(kind), Some(list)) = (building_type, self.amenities.as_deref()) {
            check_amenities(&mut check, kind, list);
        }
        let price = check.amount("price", self.price);

        check.finish(|| {
            Some(ListingPatch {
                title,
                address,
                nr_of_rooms: self.nr_of_rooms,
                nr_of_beds: self.nr_of_beds,
                building_type,
                amenities: self.amenities,
                price,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesPayload {
    pub images: Option<Vec<String>>,
}

impl Validate for ImagesPayload {
    type Output = Vec<ListingImage>;

    fn validate(self) -> ValidationResult<Vec<ListingImage>> {
        let mut check = Checker::new();
        let images = check.required("images", self.images);
        let accepted = images.and_then(|images| {
            if images.is_empty() || images.len() > MAX_IMAGES_PER_UPLOAD {
                check.fail(
                    "images",
                    format!("\"images\" must contain between 1 and {MAX_IMAGES_PER_UPLOAD} items"),
                );
                return None;
            }
            let payload = images
                .into_iter()
                .map(|img| ImagePayload { img: Some(img) })
                .collect();
            check_images(&mut check, payload)
        });

        check.finish(|| accepted)
    }
}

/// Query for `GET /listings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Validate for PageQuery {
    type Output = Page;

    fn validate(self) -> ValidationResult<Page> {
        let mut check = Checker::new();
        let page = check.range("page", Some(self.page.unwrap_or(1)), 1, u32::MAX);
        let limit = check.range(
            "limit",
            Some(self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)),
            1,
            MAX_PAGE_LIMIT,
        );

        check.finish(|| {
            Some(Page {
                page: page?,
                limit: limit?,
            })
        })
    }
}

/// Query for `GET /listings/nearby`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub max_distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearch {
    pub origin: GeoPoint,
    pub max_distance_m: f64,
}

impl Validate for NearbyQuery {
    type Output = NearbySearch;

    fn validate(self) -> ValidationResult<NearbySearch> {
        let mut check = Checker::new();
        let origin = match (self.lat, self.long) {
            (Some(lat), Some(long)) => Some(GeoPoint::new(long, lat)).filter(GeoPoint::is_valid),
            _ => None,
        };
        if origin.is_none() {
            check.fail("lat", "Latitude and longitude are required");
        }
        let max_distance = check.amount(
            "maxDistance",
            Some(self.max_distance.unwrap_or(DEFAULT_NEARBY_DISTANCE_M)),
        );

        check.finish(|| {
            Some(NearbySearch {
                origin: origin?,
                max_distance_m: max_distance?,
            })
        })
    }
}

/// Query for `GET /listings/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSearch {
    pub title: Option<String>,
    pub dates: DateRange,
}

impl Validate for SearchQuery {
    type Output = ListingSearch;

    fn validate(self) -> ValidationResult<ListingSearch> {
        let mut check = Checker::new();
        let start = check.calendar_day("startDate", self.start_date);
        let end = check.calendar_day("endDate", self.end_date);
        let title = self.title.filter(|t| !t.trim().is_empty());

        check.finish(|| {
            Some(ListingSearch {
                title,
                dates: DateRange::new(start?, end?),
            })
        })
    }
}

// =============================================================================
// Reservations and availability windows
// =============================================================================

/// Body for reservation and availability requests.
///
/// `listingId` is accepted for compatibility with older clients; the path
/// parameter is authoritative.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangePayload {
    #[serde(default)]
    pub listing_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Validate for DateRangePayload {
    type Output = DateRange;

    fn validate(self) -> ValidationResult<DateRange> {
        let mut check = Checker::new();
        let start = check.calendar_day("startDate", self.start_date);
        let end = check.calendar_day("endDate", self.end_date);

        check.finish(|| Some(DateRange::new(start?, end?)))
    }
}

/// Query for the free-dates endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl Validate for MonthQuery {
    /// First day of the requested month, `None` for the current one.
    type Output = Option<NaiveDate>;

    fn validate(self) -> ValidationResult<Option<NaiveDate>> {
        let mut check = Checker::new();
        let month = match self.month {
            Some(raw) => match crate::models::time::parse_month(&raw) {
                Some(first) => Some(first),
                None => {
                    check.fail("month", "\"month\" must be formatted as YYYY-MM");
                    None
                }
            },
            None => None,
        };

        check.finish(|| Some(month))
    }
}

// =============================================================================
// Reviews
// =============================================================================

const STARS_MIN: i64 = 1;
const STARS_MAX: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub stars: u8,
    pub comment: String,
}

fn check_review(
    stars: Option<i64>,
    comment: Option<String>,
    comment_min: usize,
) -> ValidationResult<ReviewInput> {
    let mut check = Checker::new();
    let stars = check.required("stars", stars);
    let stars = check.range("stars", stars, STARS_MIN, STARS_MAX);
    let comment = check.required_text("comment", comment, Some(comment_min), Some(100));

    check.finish(|| {
        Some(ReviewInput {
            stars: u8::try_from(stars?).ok()?,
            comment: comment?,
        })
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReviewPayload {
    pub stars: Option<i64>,
    pub comment: Option<String>,
}

impl Validate for NewReviewPayload {
    type Output = ReviewInput;

    fn validate(self) -> ValidationResult<ReviewInput> {
        check_review(self.stars, self.comment, 10)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewPayload {
    pub stars: Option<i64>,
    pub comment: Option<String>,
}

impl Validate for UpdateReviewPayload {
    type Output = ReviewInput;

    fn validate(self) -> ValidationResult<ReviewInput> {
        check_review(self.stars, self.comment, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house_listing() -> ListingPayload {
        ListingPayload {
            coordinates: Some(vec![19.8187, 41.3275]),
            title: Some("Flat near the lake".to_string()),
            address: Some("Rruga e Elbasanit 12".to_string()),
            images: None,
            nr_of_rooms: Some(3),
            nr_of_beds: Some(2),
            building_type: Some("House".to_string()),
            amenities: Some(vec!["Wi Fi".to_string(), "Balcony".to_string()]),
            price: Some(55.0),
        }
    }

    #[test]
    fn test_signup_collects_every_error() {
        let errors = SignupPayload {
            first_name: None,
            last_name: Some("x".repeat(51)),
            email: Some("nope".to_string()),
            password: Some("123".to_string()),
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 4);
        let message = errors.message();
        assert!(message.contains("\"firstName\" is required"));
        assert!(message.contains("\"lastName\" length must be less than or equal to 50"));
        assert!(message.contains("\"email\" must be a valid email"));
        assert!(message.contains("\"password\" length must be at least 6"));
    }

    #[test]
    fn test_valid_listing() {
        let listing = house_listing().validate().unwrap();
        assert_eq!(listing.building_type, BuildingType::House);
        assert_eq!(listing.coordinates, GeoPoint::new(19.8187, 41.3275));
        assert!(listing.images.is_empty());
    }

    #[test]
    fn test_listing_amenity_must_match_building_type() {
        let mut payload = house_listing();
        payload.amenities = Some(vec!["Meeting rooms".to_string()]);
        let errors = payload.validate().unwrap_err();
        assert!(errors.message().contains("\"amenities[0]\" must be one of"));
    }

    #[test]
    fn test_listing_coordinates_need_two_items() {
        let mut payload = house_listing();
        payload.coordinates = Some(vec![1.0]);
        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.message(), "\"coordinates\" must contain 2 items");
    }

    #[test]
    fn test_listing_rejects_bad_image_uri() {
        let mut payload = house_listing();
        payload.images = Some(vec![ImagePayload {
            img: Some("not a uri".to_string()),
        }]);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_update_listing_checks_amenities_only_with_type() {
        let patch = UpdateListingPayload {
            amenities: Some(vec!["Garden".to_string()]),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.amenities, Some(vec!["Garden".to_string()]));

        let errors = UpdateListingPayload {
            building_type: Some("Office".to_string()),
            amenities: Some(vec!["Garden".to_string()]),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_date_range_payload_accepts_both_formats() {
        let range = DateRangePayload {
            listing_id: None,
            start_date: Some("2024-06-10".to_string()),
            end_date: Some("2024-06-12T15:00:00Z".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(range.start.to_string(), "2024-06-10");
        assert_eq!(range.end.to_string(), "2024-06-12");
    }

    #[test]
    fn test_date_range_payload_requires_both_dates() {
        let errors = DateRangePayload::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_review_comment_bounds_differ_for_update() {
        let comment = Some("Lovely stay!".to_string());
        assert!(NewReviewPayload {
            stars: Some(5),
            comment: comment.clone(),
        }
        .validate()
        .is_ok());
        assert!(UpdateReviewPayload {
            stars: Some(5),
            comment,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_review_stars_range() {
        let errors = NewReviewPayload {
            stars: Some(6),
            comment: Some("Good enough place".to_string()),
        }
        .validate()
        .unwrap_err();
        assert!(errors.message().contains("less than or equal to 5"));
    }

    #[test]
    fn test_nearby_requires_coordinates() {
        let errors = NearbyQuery {
            lat: Some(41.0),
            long: None,
            max_distance: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.message(), "Latitude and longitude are required");

        let search = NearbyQuery {
            lat: Some(41.0),
            long: Some(19.0),
            max_distance: None,
        }
        .validate()
        .unwrap();
        assert_eq!(search.max_distance_m, 1000.0);
    }

    #[test]
    fn test_page_defaults_and_offset() {
        let page = PageQuery::default().validate().unwrap();
        assert_eq!(page, Page::default());
        let page = PageQuery {
            page: Some(3),
            limit: Some(20),
        }
        .validate()
        .unwrap();
        assert_eq!(page.offset(), 40);
        assert!(PageQuery {
            page: Some(0),
            limit: None
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_month_query() {
        assert_eq!(MonthQuery::default().validate().unwrap(), None);
        assert!(MonthQuery {
            month: Some("2024-6x".to_string())
        }
        .validate()
        .is_err());
    }
}
