use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::{Config, SessionBackend};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::jobs::seed::demo_jobs;
use crate::marketplace::Marketplace;
use crate::remote::MarketplaceClient;
use crate::session::{
    Authenticator, FileStorage, LocalAuthenticator, MemoryStorage, RedisStorage, SessionStorage,
};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The stores are single-writer; every request takes this lock for the
    /// whole operation.
    pub marketplace: Arc<Mutex<Marketplace>>,
    pub config: Config,
}

impl AppState {
    pub fn new(marketplace: Marketplace, config: Config) -> Self {
        Self {
            marketplace: Arc::new(Mutex::new(marketplace)),
            config,
        }
    }
}

/// Builds the marketplace described by `config`: storage backend,
/// authenticator, optional demo catalog.
pub async fn build_marketplace(config: &Config) -> Result<Marketplace> {
    let ids: Arc<dyn IdGenerator> = Arc::new(UuidGenerator);

    let storage: Arc<dyn SessionStorage> = match &config.session_backend {
        SessionBackend::File(path) => {
            info!("Session record stored at {}", path.display());
            Arc::new(FileStorage::new(path.clone()))
        }
        SessionBackend::Redis { url, key } => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            info!("Session record stored in Redis key '{key}'");
            Arc::new(RedisStorage::new(client, key.clone()))
        }
        SessionBackend::Memory => {
            info!("Session record kept in memory only");
            Arc::new(MemoryStorage::new())
        }
    };

    let authenticator: Arc<dyn Authenticator> = match &config.marketplace_api_url {
        Some(url) => {
            info!("Authenticating against {url}");
            Arc::new(MarketplaceClient::new(url).context("Invalid MARKETPLACE_API_URL")?)
        }
        None => Arc::new(LocalAuthenticator::new(ids.clone())),
    };

    let seed = if config.seed_demo_jobs {
        demo_jobs()
    } else {
        Vec::new()
    };
    info!("Job catalog starting with {} postings", seed.len());

    Ok(Marketplace::open(
        storage,
        authenticator,
        ids,
        seed,
        config.duplicate_policy,
    )
    .await)
}
