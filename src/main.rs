mod api;
mod app;
mod auth;
mod config;
mod dashboard;
mod error;
mod forms;
mod profile;
mod schedules;
mod sensors;
mod state;
mod status;
mod views;
mod watering;
mod zones;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "gardenflow=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    sqlx::migrate!("./migrations").run(&state.db).await?;
    tracing::info!(water_rate_lpm = state.config.water_rate_lpm, "migrations applied");

    app::serve(app::build_app(state)).await
}
