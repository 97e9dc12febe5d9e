use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, bookings, catalog, community, guest, notifications, provider};
use crate::middleware::auth::{auth_middleware, require_guest, require_provider};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Role-specific governor layers (keyed by user id)
    let guest_governor = create_role_governor(RateLimitedRole::Guest);
    let provider_governor = create_role_governor(RateLimitedRole::Provider);
    // IP-based governor for unauthenticated routes
    let public_governor = create_public_governor();

    // Account routes (IP rate limited)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(public_governor.clone());

    // Public catalog + anonymous guest session routes
    let public_routes = Router::new()
        .route("/activities", get(catalog::list_activities))
        .route("/activities/{id}", get(catalog::get_activity))
        .route("/activities/{id}/places", get(catalog::activity_places))
        .route("/places/{id}", get(catalog::get_place))
        .route("/guest/session", post(guest::resolve_session))
        .route("/guest/info", put(guest::update_guest_info))
        .route("/guest/info", get(guest::guest_info))
        .layer(public_governor);

    // Guest booking routes (requires auth + guest role)
    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/", get(bookings::my_bookings))
        .layer(guest_governor)
        .layer(middleware::from_fn(require_guest))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Provider routes (requires auth + provider role)
    let provider_routes = Router::new()
        .route("/places", get(provider::my_places))
        .route("/places", post(provider::create_place))
        .route("/places/{id}", put(provider::update_place))
        .route("/places/{id}/availability", put(provider::set_place_availability))
        .route("/bookings", get(provider::list_bookings))
        .route("/bookings/pending", get(provider::pending_bookings))
        .route("/bookings/{id}/status", put(provider::set_booking_status))
        .layer(provider_governor)
        .layer(middleware::from_fn(require_provider))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Community content: reviews, tips and the photo gallery. Any signed-in
    // role may browse and post.
    let community_routes = Router::new()
        .route("/reviews", get(community::list_reviews))
        .route("/reviews", post(community::create_review))
        .route("/tips", get(community::list_tips))
        .route("/tips", post(community::create_tip))
        .route("/gallery", get(community::list_photos))
        .route("/gallery", post(community::create_photo))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Notification routes (any authenticated role; guests and providers both poll)
    let notification_routes = Router::new()
        .route("/unread", get(notifications::list_unread))
        .route("/{id}/read", put(notifications::mark_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/provider", provider_routes)
        .nest("/api/community", community_routes)
        .nest("/api/notifications", notification_routes)
        .with_state(state)
}
