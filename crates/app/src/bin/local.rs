// Palaver API - Local Development Server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use palaver_app::{create_app, init_tracing, with_http_layers};
use palaver_common::{Config, StoreProvider};
use palaver_conversations::{ConversationStore, InMemoryConversationStore, PgConversationStore};
use palaver_llm::{LlmConfig, LlmServiceFactory};
use sqlx::PgPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(config.log_format);

    info!("Starting Palaver API local development server");
    info!(config = ?config, "Configuration loaded successfully");

    let store: Arc<dyn ConversationStore> = match config.store_provider {
        StoreProvider::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;

            let pool = PgPool::connect(database_url).await.map_err(|e| {
                error!("Failed to connect to database: {}", e);
                anyhow::anyhow!("Database connection failed: {}", e)
            })?;

            info!("Database connection established");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            info!("Database migrations applied");
            Arc::new(PgConversationStore::new(pool))
        }
        StoreProvider::Memory => {
            info!("Using in-memory conversation store; data is lost on shutdown");
            Arc::new(InMemoryConversationStore::new())
        }
    };

    let llm_config = LlmConfig::from_env()?;
    let llm = LlmServiceFactory::create(llm_config).map_err(|e| {
        error!("Failed to create LLM service: {}", e);
        e
    })?;

    let app = with_http_layers(
        create_app(&config, store, Arc::from(llm)),
        &config.cors_allowed_origins,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Server starting on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
