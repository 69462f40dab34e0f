mod app;
mod config;
mod history;
mod nutrition;
mod portions;
mod state;
mod storage;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "snapmeal=debug,axum=info,tower_http=info".to_string());
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

    let app_state = AppState::init().await?;
    tracing::info!(
        primary = app_state.config.nutritionix.is_some(),
        secondary = app_state.config.calorieninjas.is_some(),
        timeout_secs = app_state.config.provider_timeout.as_secs(),
        "nutrition providers"
    );

    let addr = app_state.config.listen_addr;
    app::serve(app::build_app(app_state), addr).await
}
