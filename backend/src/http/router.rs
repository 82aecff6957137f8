//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing) and
//! returns the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, availability, listings, reservations, reviews, users};
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/", get(users::list_users).put(users::update_profile))
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/me", get(users::me))
        .route("/allFavorites", get(users::favourites))
        .route("/add-to-favorites/{listing_id}", post(users::add_favourite))
        .route(
            "/remove-from-favourites/{listing_id}",
            delete(users::remove_favourite),
        )
        .route("/{id}", get(users::get_user).delete(users::delete_user));

    let listing_routes = Router::new()
        .route("/", get(listings::list_listings).post(listings::create_listing))
        .route("/nearby", get(listings::nearby))
        .route("/search", get(listings::search))
        .route("/yourListings", get(listings::your_listings))
        .route(
            "/{id}",
            get(listings::get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/{id}/images", post(listings::add_images))
        .route("/availability/{id}", post(availability::add_window))
        .route("/availability/{id}/all", get(availability::list_windows))
        .route("/availability/{id}/free", get(availability::free_dates));

    // `{id}` is a listing id for GET/POST and a reservation id for PUT/DELETE.
    let reservation_routes = Router::new()
        .route("/", get(reservations::list_all))
        .route("/allReservationsOfAUser", get(reservations::mine))
        .route("/one/{id}", get(reservations::mine_for_listing))
        .route(
            "/{id}",
            get(reservations::for_listing)
                .post(reservations::create)
                .put(reservations::reschedule)
                .delete(reservations::cancel),
        );

    // Same split as reservations: listing id for GET/POST, review id otherwise.
    let review_routes = Router::new()
        .route("/", get(reviews::list_all))
        .route(
            "/{id}",
            get(reviews::for_listing)
                .post(reviews::create)
                .put(reviews::update)
                .delete(reviews::delete),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/users", user_routes)
        .nest("/listings", listing_routes)
        .nest("/reservations", reservation_routes)
        .nest("/reviews", review_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
