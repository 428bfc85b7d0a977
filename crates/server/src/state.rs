//! Shared state handed to every HTTP handler and MCP tool.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cairn_client::{InstanceClient, InstanceClientConfig};
use cairn_core::access::AccessTokens;
use cairn_core::cache::{MemoryCache, PersistentCache};
use cairn_core::config::AppConfig;
use cairn_core::interaction::Debouncer;
use cairn_core::{CacheStores, Database, InstanceDirectory};

use crate::http::page::Pages;

/// Quiet period before expired persistent entries are swept.
const SWEEP_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub caches: CacheStores,
    pub directory: Arc<InstanceDirectory>,
    pub peers: InstanceClient,
    pub tokens: Arc<AccessTokens>,
    pub pages: Arc<Pages>,
    /// Identity of the stdio operator.
    pub operator_id: Arc<str>,
    peer_token: Option<Arc<str>>,
    sweeper: Arc<Debouncer<()>>,
}

impl AppState {
    /// Assemble state around an open database.
    pub fn new(db: Database, config: &AppConfig) -> Result<Self> {
        let caches = CacheStores::new(
            PersistentCache::new(db.clone()),
            MemoryCache::new(config.memory_cache_capacity),
        );
        let peers = InstanceClient::new(InstanceClientConfig {
            timeout: config.instance_timeout(),
            ..Default::default()
        })?;

        let sweep_db = db.clone();
        let sweeper = Debouncer::new(SWEEP_DELAY, move |()| {
            let db = sweep_db.clone();
            tokio::spawn(async move {
                match db.cache_purge_expired().await {
                    Ok(purged) => tracing::debug!(purged, "swept expired cache entries"),
                    Err(e) => tracing::warn!(error = %e, "cache sweep failed"),
                }
            });
        });

        Ok(Self {
            db,
            caches,
            directory: Arc::new(config.instance_directory()?),
            peers,
            tokens: Arc::new(config.access_tokens()),
            pages: Arc::new(Pages::new()?),
            operator_id: config.operator_id.as_str().into(),
            peer_token: config.peer_token.as_deref().map(|t| format!("Bearer {t}").into()),
            sweeper: Arc::new(sweeper),
        })
    }

    /// Open the configured database and assemble state.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let db = Database::open(&config.db_path).await?;
        Self::new(db, config)
    }

    /// Authorization value to present to a peer: the caller's own, else the configured peer token.
    pub fn forward_authorization<'a>(&'a self, caller: Option<&'a str>) -> Option<&'a str> {
        caller.or(self.peer_token.as_deref())
    }

    /// Note that the persistent cache was written; sweeps once writes go quiet.
    pub fn persistent_written(&self) {
        self.sweeper.schedule(());
    }
}
