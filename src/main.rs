use shiftboard::{seeders, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "shiftboard=debug,sqlx=warn".to_string());
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

    sqlx::migrate!("./migrations").run(&app_state.db).await?;
    tracing::info!("migrations applied");

    if let Some(seed) = &app_state.config.admin {
        match seeders::seed_admin(&app_state.accounts, seed).await? {
            Some(admin) => tracing::info!(user_id = %admin.id, "bootstrap admin ready"),
            None => tracing::warn!("bootstrap admin not seeded"),
        }
    }

    tracing::info!("database ready");
    Ok(())
}
