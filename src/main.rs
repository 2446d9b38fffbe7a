use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use velavida::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::Settings,
    db, Error, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,velavida=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Search { query } => {
            search_recipes(settings, query).await?;
        }
        Commands::Import { file } => {
            import(settings, file).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Velavida search server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    let state = AppState::new(pool, settings.clone());
    let app = routes::create_router(state, &settings);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Velavida Recipe Search");
    println!("========================================");
    println!("Address: http://{addr}");
    println!("\nAPI Endpoints:");
    println!("  GET  /api/recipes/search?s=");
    println!("  GET  /api/recipes/random");
    println!("  GET  /api/recipes/:id");
    println!("  GET  /api/stats");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed successfully");
    Ok(())
}

async fn search_recipes(settings: Settings, query: String) -> Result<()> {
    let server_url = settings
        .server
        .external_url
        .unwrap_or_else(|| format!("http://{}:{}", settings.server.host, settings.server.port));

    velavida::cli::commands::search(&server_url, &query).await
}

async fn import(settings: Settings, file: String) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let (foods, recipes) = velavida::cli::commands::import(&pool, Path::new(&file)).await?;
    println!("✓ Imported {foods} foods and {recipes} recipes");
    Ok(())
}
