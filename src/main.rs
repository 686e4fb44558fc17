use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mess_api::{
    config::Config, db::Bridge, middleware::auth::JwtSecret, routes, services, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let bridge = Arc::new(Bridge::from_config(&config.storage)?);
    bridge.init().await;
    info!(
        "Storage ready (remote: {}, snapshot: {})",
        if bridge.remote_ready() { "connected" } else { "unavailable" },
        config.storage.snapshot_path
    );

    services::metrics::start(bridge.clone());

    let state = AppState {
        bridge,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Meal catalogue
        .route("/api/meals", get(routes::meals::list_meals).post(routes::meals::create_meal))
        .route("/api/meals/{id}", put(routes::meals::update_meal).delete(routes::meals::delete_meal))
        // Daily menus
        .route("/api/menu", get(routes::menu::list_menus).post(routes::menu::upsert_menu))
        // Weekly planner
        .route("/api/schedule", get(routes::schedule::get_week))
        .route("/api/schedule/publish", post(routes::schedule::publish_week))
        // Students
        .route("/api/attendance", post(routes::attendance::mark_eaten))
        .route("/api/feedback", get(routes::feedback::list_feedback).post(routes::feedback::submit_feedback))
        .route("/api/complaints", get(routes::complaints::list_complaints).post(routes::complaints::submit_complaint))
        .route("/api/complaints/{id}/resolve", put(routes::complaints::resolve_complaint))
        .route("/api/events", get(routes::events::list_events).post(routes::events::create_event))
        .route("/api/events/{id}/vote", post(routes::events::vote_event))
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications).post(routes::notifications::post_notification),
        )
        // Kitchen
        .route("/api/waste", get(routes::waste::list_waste).post(routes::waste::log_waste))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Mess API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
