use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use backend_application::commands::event_commands;
use backend_application::{AppState, Metrics};
use backend_domain::{EventRepository, RateLimitStore};
use backend_infrastructure::{
    read_seed_events, AppConfig, FileRateLimitStore, InMemoryEventRepository,
    InMemoryRateLimitStore, MySqlEventRepository, RateLimitBackend, StorageBackend,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig, seed: bool) -> Result<Self> {
        let runtime_config = config.to_runtime_config();

        let event_repo: Arc<dyn EventRepository> = match config.storage_backend {
            StorageBackend::Mysql => {
                let db_config = config.to_db_config();
                let repo = MySqlEventRepository::connect_lazy(&db_config);
                // The service still starts without a database; readiness reports it.
                if let Err(err) = repo.ensure_schema().await {
                    warn!(
                        host = %db_config.host,
                        port = db_config.port,
                        "events schema check failed: {:#}",
                        err
                    );
                }
                info!(host = %db_config.host, database = %db_config.database, "using mysql storage");
                Arc::new(repo)
            }
            StorageBackend::Memory => {
                let repo = match &config.seed_events_path {
                    Some(path) => InMemoryEventRepository::from_seed_file(path).await?,
                    None => InMemoryEventRepository::default(),
                };
                info!(events = repo.len().await, "using in-memory storage");
                Arc::new(repo)
            }
        };

        let policy = runtime_config.rate_limit;
        let rate_limit_store: Arc<dyn RateLimitStore> = match config.rate_limit_backend {
            RateLimitBackend::Memory => Arc::new(InMemoryRateLimitStore::new(&policy)),
            RateLimitBackend::File => {
                info!(path = %config.rate_limit_file, "rate limit state kept on disk");
                Arc::new(FileRateLimitStore::new(&config.rate_limit_file, &policy))
            }
        };

        let state = AppState {
            config: runtime_config,
            event_repo,
            rate_limit_store,
            metrics: Arc::new(Metrics::default()),
        };

        if seed {
            seed_events(config, &state).await?;
        }

        Ok(Self { state })
    }
}

async fn seed_events(config: &AppConfig, state: &AppState) -> Result<()> {
    if config.storage_backend == StorageBackend::Memory {
        info!("memory storage already loads the seed file, skipping import");
        return Ok(());
    }
    let Some(path) = &config.seed_events_path else {
        warn!("--seed given but seed_events_path is not configured");
        return Ok(());
    };
    let events = read_seed_events(path).await?;
    let ids = event_commands::import_events(state, &events).await?;
    info!(path = %path, imported = ids.len(), "seed events imported");
    Ok(())
}
