use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ilashizy_backend::{
    config::Config,
    db,
    entities::{activity, badge},
    middleware::rate_limit::log_request,
    routes, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ilashizy_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.bind_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    // Seed static catalogs
    seed_activities(&db).await;
    seed_badges(&db).await;

    // Create app state
    let state = AppState {
        db: Arc::new(db),
        config: config.clone(),
    };

    // Configure rate limiting: 100 requests per 60 seconds per IP
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(60)
            .burst_size(100)
            .finish()
            .unwrap(),
    );

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(GovernorLayer::new(governor_config));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.bind_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Seed the activity catalog if empty
async fn seed_activities(db: &sea_orm::DatabaseConnection) {
    let catalog = [
        ("beach-lounging", "Beach Lounging", "Relax on pristine white sands", "🏖️"),
        ("boat-tours", "Boat Tours", "Explore coastal waters", "🚤"),
        ("photography-tours", "Photography Tours", "Capture the best of the shoreline", "📸"),
        ("fishing-experience", "Fishing Experience", "Fish with local guides", "🎣"),
        ("group-activities", "Group Activities", "Games and events on the beach", "🏐"),
        ("accommodation", "Accommodation", "Beach houses and overnight stays", "🏠"),
    ];

    for (id, title, description, icon) in catalog {
        let existing = activity::Entity::find_by_id(id)
            .one(db)
            .await
            .expect("Failed to check activity catalog");

        if existing.is_none() {
            let row = activity::ActiveModel {
                id: Set(id.to_string()),
                title: Set(title.to_string()),
                description: Set(description.to_string()),
                icon: Set(icon.to_string()),
            };
            row.insert(db).await.expect("Failed to seed activity");
            tracing::info!("Activity seeded: {}", id);
        }
    }
}

/// Seed the badge catalog if empty. Names must match the threshold rules in
/// the badge evaluator.
async fn seed_badges(db: &sea_orm::DatabaseConnection) {
    let catalog = [
        ("First Wave", "Completed your first booking", "🌊"),
        ("Island Explorer", "Completed three bookings", "🏝️"),
    ];

    for (name, description, icon) in catalog {
        let existing = badge::Entity::find()
            .filter(badge::Column::Name.eq(name))
            .one(db)
            .await
            .expect("Failed to check badge catalog");

        if existing.is_none() {
            let row = badge::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                description: Set(description.to_string()),
                icon: Set(icon.to_string()),
            };
            row.insert(db).await.expect("Failed to seed badge");
            tracing::info!("Badge seeded: {}", name);
        }
    }
}
