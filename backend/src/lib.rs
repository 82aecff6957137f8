//! # Estate Rust Backend
//!
//! REST backend for a real-estate listing and booking service: accounts,
//! listings, availability windows, reservations and reviews.
//!
//! ## Architecture
//!
//! - [`models`]: domain types and typed ids
//! - [`algorithms`]: pure availability and distance computations
//! - [`validation`]: request payload checks producing domain values
//! - [`auth`]: password hashing and signed session tokens
//! - [`db`]: repository traits with in-memory and PostgreSQL implementations
//! - [`services`]: business operations over the repository
//! - [`config`]: server and auth configuration
//! - [`http`]: axum router, extractors and handlers
//!
//! Reservations never overlap: booking checks and inserts in one atomic step
//! per listing, and a stay that starts on the day another ends is rejected.

// RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod validation;

#[cfg(feature = "http-server")]
pub mod http;
