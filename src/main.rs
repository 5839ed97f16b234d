mod leaderboard;
mod lines;
mod prediction;
mod rating;
mod reputation;
mod resolution;
mod shared;
mod statsfeed;
mod timeline;

use axum::{
    routing::{get, post},
    Router,
};
use shared::AppStateBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clutchcall=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ClutchCall scoring service");

    // In-memory stores by default; swap the prediction store for
    // PostgreSQL in production:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let builder = AppStateBuilder::new()
    //     .with_prediction_repository(Arc::new(PostgresPredictionRepository::new(pool)));
    let app_state = AppStateBuilder::new().build();

    let app = Router::new()
        .route("/", get(|| async { "ClutchCall scoring service" }))
        .route("/predictions", post(prediction::handlers::submit_prediction))
        .route(
            "/predictions/:id",
            axum::routing::patch(prediction::handlers::update_prediction)
                .delete(prediction::handlers::delete_prediction)
                .get(prediction::handlers::get_prediction),
        )
        .route(
            "/predictions/:id/resolve",
            post(resolution::handlers::resolve_prediction),
        )
        .route(
            "/events/:event_id/resolve",
            post(resolution::handlers::resolve_event),
        )
        .route(
            "/events/:event_id/consensus",
            get(leaderboard::handlers::get_consensus),
        )
        .route(
            "/users/:user_id/predictions",
            get(prediction::handlers::list_user_predictions),
        )
        .route(
            "/users/:user_id/reputation",
            get(reputation::handlers::get_reputation),
        )
        .route("/users/:user_id/rating", get(rating::handlers::get_rating))
        .route(
            "/ratings/recompute",
            post(rating::handlers::recompute_ratings),
        )
        .route(
            "/leaderboards/accuracy",
            get(leaderboard::handlers::accuracy_board),
        )
        .route(
            "/leaderboards/rating",
            get(leaderboard::handlers::rating_board),
        )
        .route("/lines/generate", post(lines::handlers::generate_lines))
        .route("/lines/resolve", post(lines::handlers::resolve_lines))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
