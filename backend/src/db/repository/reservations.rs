use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{DateRange, ListingId, Reservation, ReservationId, UserId};

/// Reservation storage.
///
/// The two booking writes check for overlapping active reservations of the
/// same listing and write in one atomic step; a clash is reported as
/// `RepositoryError::Conflict`.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert_reservation_if_free(
        &self,
        reservation: Reservation,
    ) -> RepositoryResult<Reservation>;

    /// Move a reservation to `dates`, ignoring its own previous dates when
    /// looking for overlaps.
    async fn reschedule_reservation_if_free(
        &self,
        id: ReservationId,
        dates: DateRange,
        total_price: f64,
    ) -> RepositoryResult<Reservation>;

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>>;

    /// Every active reservation.
    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>>;

    /// Active reservations of one listing.
    async fn reservations_for_listing(
        &self,
        listing_id: ListingId,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Active reservations made by one user.
    async fn reservations_by_user(&self, user_id: UserId) -> RepositoryResult<Vec<Reservation>>;

    /// Mark a reservation deleted. Returns `false` when it already was.
    async fn soft_delete_reservation(&self, id: ReservationId) -> RepositoryResult<bool>;
}
