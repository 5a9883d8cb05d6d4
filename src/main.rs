use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mygigguide::infrastructure::AppState;
use mygigguide::infrastructure::storage::MediaStorage;
use mygigguide::services::admin_service;
use mygigguide::{config, db, seed, server};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mygigguide=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Bootstrap the first owner account
    match (&config.owner_username, &config.owner_password) {
        (Some(username), Some(password)) => {
            match admin_service::ensure_owner(&db, username, password).await {
                Ok(true) => tracing::info!("Created owner account '{}'", username),
                Ok(false) => tracing::debug!("Owner account already present"),
                Err(e) => tracing::error!("Failed to create owner account: {}", e),
            }
        }
        _ => tracing::debug!("OWNER_USERNAME/OWNER_PASSWORD not set, skipping owner bootstrap"),
    }

    // Check for seed flag
    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        tracing::error!(
            "Failed to create upload directory {:?}: {}",
            config.upload_dir,
            e
        );
        return ExitCode::FAILURE;
    }

    let storage = MediaStorage::new(
        config.upload_dir.clone(),
        config.max_upload_bytes,
        config.max_gallery_images,
    );
    let state = AppState::new(db, storage);
    let app = server::build_router(state, &config.cors_allowed_origins);

    // Find available port
    let Some(port) = server::find_available_port(config.port) else {
        tracing::error!("No free port found from {}", config.port);
        return ExitCode::FAILURE;
    };
    if port != config.port {
        tracing::warn!(
            "Preferred port {} was not available, using port {} instead",
            config.port,
            port
        );
    }

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("MyGigGuide server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
