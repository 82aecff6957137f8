//! Pure computations over domain values: booking availability and geographic distance.

pub mod availability;
pub mod geo;

pub use availability::{booked_dates, find_conflict, free_dates, overlaps, reporting_window};
