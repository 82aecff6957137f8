//! Domain types shared by the repository, service and HTTP layers.

pub mod availability;
pub mod listing;
pub mod macros;
pub mod reservation;
pub mod review;
pub mod time;
pub mod user;

pub use availability::Availability;
pub use listing::{BuildingType, GeoPoint, Listing, ListingImage, ListingPatch, NewListing};
pub use reservation::Reservation;
pub use review::Review;
pub use time::DateRange;
pub use user::{Role, User, UserPatch};

crate::define_id_type!(UserId);
crate::define_id_type!(ListingId);
crate::define_id_type!(ReservationId);
crate::define_id_type!(AvailabilityId);
crate::define_id_type!(ReviewId);
