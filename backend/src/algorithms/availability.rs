//! Availability resolution for listings.
//!
//! Three small pieces make up the resolver:
//!
//! - [`overlaps`]: inclusive date-range conflict test used when booking.
//! - [`booked_dates`]: expands reservations into a set of `YYYY-MM-DD` days.
//! - [`free_dates`]: walks a reporting window and keeps the days not booked.
//!
//! All functions are pure; callers supply reservations and "today".

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::time::{day_string, first_of_month, last_of_month};
use crate::models::{DateRange, Reservation, ReservationId};

/// Two ranges conflict when they share at least one calendar day.
///
/// Boundaries are inclusive: a stay starting on the day another ends is a
/// conflict.
pub fn overlaps(a: &DateRange, b: &DateRange) -> bool {
    a.start <= b.end && a.end >= b.start
}

/// First active reservation in `existing` that conflicts with `wanted`.
///
/// `ignore` excludes one reservation, so that rescheduling a stay is not
/// blocked by its own previous dates.
pub fn find_conflict<'a, I>(
    wanted: &DateRange,
    existing: I,
    ignore: Option<ReservationId>,
) -> Option<&'a Reservation>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    existing.into_iter().find(|reservation| {
        reservation.is_active()
            && Some(reservation.id) != ignore
            && overlaps(wanted, &reservation.dates)
    })
}

/// Expand reservations into the set of booked day strings.
///
/// Each reservation covers its start day through its end day inclusive.
/// Soft-deleted reservations are skipped.
pub fn booked_dates<'a, I>(reservations: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    booked_ranges(
        reservations
            .into_iter()
            .filter(|reservation| reservation.is_active())
            .map(|reservation| &reservation.dates),
    )
}

/// Booked day strings of active reservations, limited to `window`.
///
/// Each stay is clipped to the window before it is expanded, so the work is
/// bounded by the window length however long the stays are.
pub fn booked_dates_in<'a, I>(window: &DateRange, reservations: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let clipped: Vec<DateRange> = reservations
        .into_iter()
        .filter(|reservation| reservation.is_active())
        .filter_map(|reservation| clip(&reservation.dates, window))
        .collect();
    booked_ranges(&clipped)
}

fn clip(range: &DateRange, window: &DateRange) -> Option<DateRange> {
    let start = range.start.max(window.start);
    let end = range.end.min(window.end);
    (start <= end).then(|| DateRange::new(start, end))
}

/// Expand raw ranges into booked day strings.
pub fn booked_ranges<'a, I>(ranges: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a DateRange>,
{
    let mut booked = BTreeSet::new();
    for range in ranges {
        booked.extend(range.days().map(day_string));
    }
    booked
}

/// Reporting window for `month`: from the later of `today` and the first of
/// the month, through the last day of the month.
///
/// When the whole month lies before `today` the returned range has
/// `start > end` and enumerates no days.
pub fn reporting_window(month: NaiveDate, today: NaiveDate) -> DateRange {
    let first = first_of_month(month);
    let last = last_of_month(month);
    DateRange::new(first.max(today), last)
}

/// Days of `window` that are not in `booked`, ascending.
pub fn free_dates(window: &DateRange, booked: &BTreeSet<String>) -> Vec<String> {
    window
        .days()
        .map(day_string)
        .filter(|day| !booked.contains(day))
        .collect()
}

/// Booked days falling inside `window`, ascending.
pub fn booked_in_window(window: &DateRange, booked: &BTreeSet<String>) -> Vec<String> {
    window
        .days()
        .map(day_string)
        .filter(|day| booked.contains(day))
        .collect()
}
