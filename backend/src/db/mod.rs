//! Persistence for users, listings, availability windows, reservations and
//! reviews.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers / services                     │
//! └───────────────────┬──────────────────────────┘
//!                     │ Arc<dyn FullRepository>
//! ┌───────────────────▼──────────────────────────┐
//! │  Repository traits (repository/)              │
//! └───────────────────┬──────────────────────────┘
//!          ┌──────────┴───────────┐
//!   LocalRepository        PostgresRepository
//!     (in-memory)       (Diesel, `postgres-repo`)
//! ```
//!
//! The handle is built once at startup by [`RepositoryFactory`] and passed
//! down through the application state.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AvailabilityRepository, ErrorContext, FullRepository, ListingRepository, RepositoryError,
    RepositoryResult, ReservationRepository, ReviewRepository, UserRepository,
};
