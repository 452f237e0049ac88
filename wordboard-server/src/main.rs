use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::info;

use wordboard_core::{Dictionary, GameEngine, LeaderboardService};
use wordboard_persistence::{
    connection::connect_and_migrate,
    repositories::{GameBoardRepository, LeaderboardRepository, UserRepository},
};
use wordboard_server::{auth::AuthService, config::Config, create_routes};
use wordboard_types::UserStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting wordboard server...");

    let config = Config::new();

    // The word lists are a hard startup requirement; the server cannot
    // evaluate guesses without them.
    info!(
        "Loading word lists from {} and {}",
        config.guesses_path, config.solutions_path
    );
    let dictionary = match Dictionary::from_files(
        Path::new(&config.guesses_path),
        Path::new(&config.solutions_path),
    ) {
        Ok(dictionary) => {
            info!(
                "Loaded dictionary with {} scheduled solutions",
                dictionary.solution_count()
            );
            Arc::new(dictionary)
        }
        Err(err) => {
            tracing::error!("Failed to load word lists: {err:#}");
            tracing::error!(
                "Set GUESSES_PATH and SOLUTIONS_PATH to newline-separated five-letter word lists."
            );
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("Failed to connect to database and run migrations: {err}");
            std::process::exit(1);
        }
    };

    let boards = Arc::new(GameBoardRepository::new(db.clone()));
    let engine = Arc::new(GameEngine::new(dictionary, boards));
    let leaderboards = Arc::new(LeaderboardService::new(
        Arc::new(LeaderboardRepository::new(db.clone())),
        engine.clone(),
    ));
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db));

    // Check for dev mode
    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - token validation disabled");
        Arc::new(AuthService::new_dev_mode())
    } else {
        Arc::new(AuthService::new(
            config.oidc_issuer.clone(),
            config.oidc_audience.clone(),
            config.oidc_jwks_url.clone(),
        ))
    };

    let routes = create_routes(
        engine,
        leaderboards,
        users,
        auth_service,
        Duration::from_secs(config.request_timeout_seconds),
    );

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
