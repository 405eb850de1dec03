use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pollboard=info,tower_http=debug")),
        )
        .init();

    let args = cli::Args::parse();
    let config = config::Config::load(&args.config)?;

    ensure_db_dir(&config);

    let db = pollboard_db::create_pool(&config.database.url, config.database.max_connections).await?;
    pollboard_db::run_migrations(&db).await?;

    let state = pollboard_web::AppState::new(db)?;
    let app = pollboard_web::build_router()
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    print_startup_banner(&config.server.bind_address, &config.database.url);

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        println!();
        tracing::info!("Shutting down...");
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

/// Create the SQLite file's parent directory before the pool opens it.
fn ensure_db_dir(config: &config::Config) {
    if let Some(db_path) = config
        .database
        .url
        .strip_prefix("sqlite://")
        .and_then(|s| s.split('?').next())
    {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
    }
}

fn print_startup_banner(bind_address: &str, db_url: &str) {
    println!();
    println!("  Pollboard");
    println!();
    println!("  Listening:   http://{}", bind_address);
    println!("  Admin:       http://{}/admin/questions", bind_address);
    println!("  Database:    {}", db_url);
    println!();
}
