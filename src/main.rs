use std::sync::Arc;

use cinecloud_api::{
    api::{create_router, AppState, MediaMount},
    auth::LocalAuthProvider,
    config::Config,
    db::{self, Cache, MemoryStore, PgStore, Stores},
    services::providers::{OmdbProvider, YoutubeProvider},
    storage::LocalObjectStorage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinecloud_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Document store: Postgres when configured, otherwise in-process
    let (stores, pg_listener) = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            let (store, listener) = PgStore::connect(pool).await?;
            tracing::info!("Using Postgres document store");
            (Stores::from_backend(Arc::new(store)), Some(listener))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            (Stores::from_backend(Arc::new(MemoryStore::new())), None)
        }
    };

    // Search cache
    let (cache, cache_writer) = match &config.redis_url {
        Some(url) => {
            let (cache, writer) = Cache::new(db::create_redis_client(url)?);
            (Some(cache), Some(writer))
        }
        None => {
            tracing::warn!("REDIS_URL not set, provider responses will not be cached");
            (None, None)
        }
    };

    let metadata = OmdbProvider::new(
        cache.clone(),
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    );
    let videos = YoutubeProvider::new(
        cache,
        config.youtube_api_key.clone(),
        config.youtube_api_url.clone(),
    );
    let media = LocalObjectStorage::new(&config.media_root, &config.media_url_prefix);

    // Accounts and sessions live in the same backend as the profiles
    let auth = LocalAuthProvider::new(stores.accounts.clone());

    let state = AppState::new(
        stores,
        Arc::new(auth),
        Arc::new(metadata),
        Arc::new(videos),
        Arc::new(media),
    )
    .with_admin_emails(config.admin_emails.clone())
    .with_media_mount(MediaMount {
        url_prefix: config.media_url_prefix.clone(),
        root: config.media_root.clone().into(),
    });

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }
    if let Some(listener) = pg_listener {
        listener.shutdown();
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
