//! Postgres repository implementation using Diesel.
//!
//! Listings, reservations, availability windows and reviews each get their
//! own table (see `migrations/`). Favourites live in a join table.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Booking writes serialized per listing with `SELECT ... FOR UPDATE`
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task;
use uuid::Uuid;

use crate::algorithms::availability::find_conflict;
use crate::db::repository::{
    AvailabilityRepository, ErrorContext, FullRepository, ListingRepository, RepositoryError,
    RepositoryResult, ReservationRepository, ReviewRepository, UserRepository,
};
use crate::models::{
    Availability, DateRange, Listing, ListingId, Reservation, ReservationId, Review, ReviewId,
    User, UserId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const OVERLAP_MESSAGE: &str = "Reservation dates overlap with an existing reservation";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// This repository implementation provides:
/// - Connection pooling with configurable limits
/// - Automatic retry for transient failures
/// - Health monitoring and statistics
/// - Automatic schema migrations
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn not_found(entity: &str, operation: &str, id: impl ToString) -> RepositoryError {
    let mut message = entity.to_string();
    if let Some(first) = message.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    RepositoryError::not_found_with_context(
        format!("{} not found", message),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

fn load_favourites(
    conn: &mut PgConnection,
    user_ids: &[Uuid],
) -> RepositoryResult<BTreeMap<Uuid, BTreeSet<ListingId>>> {
    let rows: Vec<FavouriteRow> = user_favourites::table
        .filter(user_favourites::user_id.eq_any(user_ids))
        .select(FavouriteRow::as_select())
        .load(conn)
        .map_err(map_diesel_error)?;

    let mut by_user: BTreeMap<Uuid, BTreeSet<ListingId>> = BTreeMap::new();
    for row in rows {
        by_user
            .entry(row.user_id)
            .or_default()
            .insert(row.listing_id.into());
    }
    Ok(by_user)
}

fn rows_to_users(conn: &mut PgConnection, rows: Vec<UserRow>) -> RepositoryResult<Vec<User>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut favourites = load_favourites(conn, &ids)?;
    rows.into_iter()
        .map(|row| {
            let favs = favourites.remove(&row.id).unwrap_or_default();
            row.into_user(favs)
        })
        .collect()
}

fn load_user(conn: &mut PgConnection, id: Uuid) -> RepositoryResult<Option<User>> {
    let row = users::table
        .filter(users::id.eq(id))
        .select(UserRow::as_select())
        .first::<UserRow>(conn)
        .optional()
        .map_err(map_diesel_error)?;
    match row {
        Some(row) => Ok(rows_to_users(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn rows_to_listings(rows: Vec<ListingRow>) -> RepositoryResult<Vec<Listing>> {
    rows.into_iter().map(Listing::try_from).collect()
}

/// Lock the listing row, then look for an overlapping active reservation.
fn check_free(
    tx: &mut PgConnection,
    listing_id: Uuid,
    dates: &DateRange,
    ignore: Option<ReservationId>,
) -> RepositoryResult<()> {
    listings::table
        .filter(listings::id.eq(listing_id))
        .select(listings::id)
        .for_update()
        .first::<Uuid>(tx)
        .optional()
        .map_err(map_diesel_error)?;

    let existing: Vec<Reservation> = reservations::table
        .filter(reservations::listing_id.eq(listing_id))
        .filter(reservations::is_deleted.eq(false))
        .select(ReservationRow::as_select())
        .load::<ReservationRow>(tx)
        .map_err(map_diesel_error)?
        .into_iter()
        .map(Reservation::from)
        .collect();

    if find_conflict(dates, &existing, ignore).is_some() {
        return Err(RepositoryError::conflict_with_context(
            OVERLAP_MESSAGE,
            ErrorContext::new("book_listing")
                .with_entity("listing")
                .with_entity_id(listing_id),
        ));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn insert_user(&self, user: User) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(UserChanges::from(&user))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(user)
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        self.with_conn(move |conn| load_user(conn, id.0)).await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let row = users::table
                .filter(users::email.eq(&email))
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            match row {
                Some(row) => Ok(rows_to_users(conn, vec![row])?.pop()),
                None => Ok(None),
            }
        })
        .await
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.with_conn(|conn| {
            let rows = users::table
                .order(users::created_at.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_users(conn, rows)
        })
        .await
    }

    async fn update_user(&self, user: &User) -> RepositoryResult<User> {
        let changes = UserChanges::from(user);
        self.with_conn(move |conn| {
            let updated = diesel::update(users::table.filter(users::id.eq(changes.id)))
                .set(&changes)
                .execute(conn)
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Err(not_found("user", "update_user", changes.id));
            }
            load_user(conn, changes.id)?.ok_or_else(|| not_found("user", "update_user", changes.id))
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(users::table.filter(users::id.eq(id.0)))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn add_favourite(
        &self,
        user_id: UserId,
        listing_id: ListingId,
    ) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            diesel::insert_into(user_favourites::table)
                .values(FavouriteRow {
                    user_id: user_id.0,
                    listing_id: listing_id.0,
                })
                .on_conflict_do_nothing()
                .execute(conn)
                .map_err(map_diesel_error)?;
            load_user(conn, user_id.0)?.ok_or_else(|| not_found("user", "add_favourite", user_id))
        })
        .await
    }

    async fn remove_favourite(
        &self,
        user_id: UserId,
        listing_id: ListingId,
    ) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            diesel::delete(
                user_favourites::table
                    .filter(user_favourites::user_id.eq(user_id.0))
                    .filter(user_favourites::listing_id.eq(listing_id.0)),
            )
            .execute(conn)
            .map_err(map_diesel_error)?;
            load_user(conn, user_id.0)?
                .ok_or_else(|| not_found("user", "remove_favourite", user_id))
        })
        .await
    }
}

#[async_trait]
impl ListingRepository for PostgresRepository {
    async fn insert_listing(&self, listing: Listing) -> RepositoryResult<Listing> {
        let row = ListingChanges::try_from(&listing)?;
        self.with_conn(move |conn| {
            diesel::insert_into(listings::table)
                .values(&row)
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(listing)
        })
        .await
    }

    async fn get_listing(&self, id: ListingId) -> RepositoryResult<Option<Listing>> {
        self.with_conn(move |conn| {
            listings::table
                .filter(listings::id.eq(id.0))
                .select(ListingRow::as_select())
                .first::<ListingRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Listing::try_from)
                .transpose()
        })
        .await
    }

    async fn list_listings(&self, offset: usize, limit: usize) -> RepositoryResult<Vec<Listing>> {
        self.with_conn(move |conn| {
            let rows = listings::table
                .filter(listings::is_deleted.eq(false))
                .order(listings::created_at.asc())
                .offset(offset as i64)
                .limit(limit as i64)
                .select(ListingRow::as_select())
                .load::<ListingRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_listings(rows)
        })
        .await
    }

    async fn list_active_listings(&self) -> RepositoryResult<Vec<Listing>> {
        self.with_conn(|conn| {
            let rows = listings::table
                .filter(listings::is_deleted.eq(false))
                .order(listings::created_at.asc())
                .select(ListingRow::as_select())
                .load::<ListingRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_listings(rows)
        })
        .await
    }

    async fn listings_by_owner(&self, owner: UserId) -> RepositoryResult<Vec<Listing>> {
        self.with_conn(move |conn| {
            let rows = listings::table
                .filter(listings::user_id.eq(owner.0))
                .filter(listings::is_deleted.eq(false))
                .order(listings::created_at.asc())
                .select(ListingRow::as_select())
                .load::<ListingRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_listings(rows)
        })
        .await
    }

    async fn listings_by_ids(&self, ids: &[ListingId]) -> RepositoryResult<Vec<Listing>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        self.with_conn(move |conn| {
            let rows = listings::table
                .filter(listings::id.eq_any(&ids))
                .filter(listings::is_deleted.eq(false))
                .order(listings::created_at.asc())
                .select(ListingRow::as_select())
                .load::<ListingRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_listings(rows)
        })
        .await
    }

    async fn update_listing(&self, listing: &Listing) -> RepositoryResult<Listing> {
        let row = ListingChanges::try_from(listing)?;
        let listing = listing.clone();
        self.with_conn(move |conn| {
            let updated = diesel::update(listings::table.filter(listings::id.eq(row.id)))
                .set(&row)
                .execute(conn)
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Err(not_found("listing", "update_listing", row.id));
            }
            Ok(listing)
        })
        .await
    }

    async fn soft_delete_listing(&self, id: ListingId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let deleted = listings::table
                    .filter(listings::id.eq(id.0))
                    .select(listings::is_deleted)
                    .for_update()
                    .first::<bool>(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(|| not_found("listing", "soft_delete_listing", id))?;
                if deleted {
                    return Ok(false);
                }
                diesel::update(listings::table.filter(listings::id.eq(id.0)))
                    .set(listings::is_deleted.eq(true))
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                Ok(true)
            })
        })
        .await
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresRepository {
    async fn insert_availability(
        &self,
        availability: Availability,
    ) -> RepositoryResult<Availability> {
        self.with_conn(move |conn| {
            diesel::insert_into(availability::table)
                .values(AvailabilityRow::from(&availability))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(availability)
        })
        .await
    }

    async fn availability_for_listing(
        &self,
        listing_id: ListingId,
    ) -> RepositoryResult<Vec<Availability>> {
        self.with_conn(move |conn| {
            availability::table
                .filter(availability::listing_id.eq(listing_id.0))
                .order(availability::start_date.asc())
                .select(AvailabilityRow::as_select())
                .load::<AvailabilityRow>(conn)
                .map(|rows| rows.into_iter().map(Availability::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn availability_covering(
        &self,
        dates: &DateRange,
    ) -> RepositoryResult<Vec<Availability>> {
        let dates = *dates;
        self.with_conn(move |conn| {
            availability::table
                .filter(availability::start_date.le(dates.start))
                .filter(availability::end_date.ge(dates.end))
                .select(AvailabilityRow::as_select())
                .load::<AvailabilityRow>(conn)
                .map(|rows| rows.into_iter().map(Availability::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn insert_reservation_if_free(
        &self,
        reservation: Reservation,
    ) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                check_free(tx, reservation.listing_id.0, &reservation.dates, None)?;
                diesel::insert_into(reservations::table)
                    .values(NewReservationRow::from(&reservation))
                    .execute(tx)
                    .map_err(map_diesel_error)?;
                Ok(reservation.clone())
            })
        })
        .await
    }

    async fn reschedule_reservation_if_free(
        &self,
        id: ReservationId,
        dates: DateRange,
        total_price: f64,
    ) -> RepositoryResult<Reservation> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let listing_id = reservations::table
                    .filter(reservations::id.eq(id.0))
                    .select(reservations::listing_id)
                    .first::<Uuid>(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(|| not_found("reservation", "reschedule_reservation", id))?;

                check_free(tx, listing_id, &dates, Some(id))?;

                diesel::update(reservations::table.filter(reservations::id.eq(id.0)))
                    .set((
                        reservations::start_date.eq(dates.start),
                        reservations::end_date.eq(dates.end),
                        reservations::total_price.eq(total_price),
                    ))
                    .returning(ReservationRow::as_returning())
                    .get_result::<ReservationRow>(tx)
                    .map(Reservation::from)
                    .map_err(map_diesel_error)
            })
        })
        .await
    }

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>> {
        self.with_conn(move |conn| {
            reservations::table
                .filter(reservations::id.eq(id.0))
                .select(ReservationRow::as_select())
                .first::<ReservationRow>(conn)
                .optional()
                .map(|row| row.map(Reservation::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(|conn| {
            reservations::table
                .filter(reservations::is_deleted.eq(false))
                .order(reservations::created_at.asc())
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(conn)
                .map(|rows| rows.into_iter().map(Reservation::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn reservations_for_listing(
        &self,
        listing_id: ListingId,
    ) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(move |conn| {
            reservations::table
                .filter(reservations::listing_id.eq(listing_id.0))
                .filter(reservations::is_deleted.eq(false))
                .order(reservations::start_date.asc())
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(conn)
                .map(|rows| rows.into_iter().map(Reservation::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn reservations_by_user(&self, user_id: UserId) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn(move |conn| {
            reservations::table
                .filter(reservations::user_id.eq(user_id.0))
                .filter(reservations::is_deleted.eq(false))
                .order(reservations::start_date.asc())
                .select(ReservationRow::as_select())
                .load::<ReservationRow>(conn)
                .map(|rows| rows.into_iter().map(Reservation::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn soft_delete_reservation(&self, id: ReservationId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let current = reservations::table
                .filter(reservations::id.eq(id.0))
                .select(reservations::is_deleted)
                .first::<bool>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| not_found("reservation", "soft_delete_reservation", id))?;
            if current {
                return Ok(false);
            }
            diesel::update(
                reservations::table
                    .filter(reservations::id.eq(id.0))
                    .filter(reservations::is_deleted.eq(false)),
            )
            .set(reservations::is_deleted.eq(true))
            .execute(conn)
            .map(|n| n > 0)
            .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl ReviewRepository for PostgresRepository {
    async fn insert_review(&self, review: Review) -> RepositoryResult<Review> {
        self.with_conn(move |conn| {
            diesel::insert_into(reviews::table)
                .values(ReviewChanges::from(&review))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(review)
        })
        .await
    }

    async fn get_review(&self, id: ReviewId) -> RepositoryResult<Option<Review>> {
        self.with_conn(move |conn| {
            reviews::table
                .filter(reviews::id.eq(id.0))
                .select(ReviewRow::as_select())
                .first::<ReviewRow>(conn)
                .optional()
                .map(|row| row.map(Review::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_reviews(&self) -> RepositoryResult<Vec<Review>> {
        self.with_conn(|conn| {
            reviews::table
                .filter(reviews::is_deleted.eq(false))
                .order(reviews::created_at.asc())
                .select(ReviewRow::as_select())
                .load::<ReviewRow>(conn)
                .map(|rows| rows.into_iter().map(Review::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn reviews_for_listing(&self, listing_id: ListingId) -> RepositoryResult<Vec<Review>> {
        self.with_conn(move |conn| {
            reviews::table
                .filter(reviews::listing_id.eq(listing_id.0))
                .filter(reviews::is_deleted.eq(false))
                .order(reviews::created_at.asc())
                .select(ReviewRow::as_select())
                .load::<ReviewRow>(conn)
                .map(|rows| rows.into_iter().map(Review::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_review(&self, review: &Review) -> RepositoryResult<Review> {
        let changes = ReviewChanges::from(review);
        let review = review.clone();
        self.with_conn(move |conn| {
            let updated = diesel::update(reviews::table.filter(reviews::id.eq(changes.id)))
                .set(&changes)
                .execute(conn)
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Err(not_found("review", "update_review", changes.id));
            }
            Ok(review)
        })
        .await
    }

    async fn soft_delete_review(&self, id: ReviewId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let current = reviews::table
                .filter(reviews::id.eq(id.0))
                .select(reviews::is_deleted)
                .first::<bool>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| not_found("review", "soft_delete_review", id))?;
            if current {
                return Ok(false);
            }
            diesel::update(reviews::table.filter(reviews::id.eq(id.0)))
                .set(reviews::is_deleted.eq(true))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let healthy = self
            .with_conn(|conn| {
                sql_query("SELECT 1")
                    .execute(conn)
                    .map(|_| true)
                    .map_err(map_diesel_error)
            })
            .await?;
        tracing::debug!(stats = ?self.get_pool_stats(), "postgres health check");
        Ok(healthy)
    }
}
