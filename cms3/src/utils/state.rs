use crate::config::Config;
use crate::presenter::ResourceLocator;
use crate::render::{HtmlRenderer, Render};
use crate::storage::Storage;
use crate::storage::driver::{filesystem::FilesystemStorage, memory::MemoryStorage, s3::S3Storage};
use crate::utils::cli::StorageKind;
use std::sync::Arc;

/// Shared by every request; holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub renderer: Arc<dyn Render>,
    pub locator: ResourceLocator,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage_backend: Arc<dyn Storage> = match config.storage_typ {
            StorageKind::S3 => Arc::new(
                S3Storage::connect(&config.region, config.endpoint_url.as_deref()).await,
            ),
            StorageKind::Filesystem => Arc::new(FilesystemStorage::new(&config.root_dir)),
            StorageKind::Memory => Arc::new(MemoryStorage::new([config.default_bucket.clone()])),
        };
        tracing::info!("Using {:?} storage backend", config.storage_typ);

        Ok(Self::with_storage(config, storage_backend)?)
    }

    /// Builds the state around an already constructed storage driver.
    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Result<Self, minijinja::Error> {
        Ok(AppState {
            storage,
            renderer: Arc::new(HtmlRenderer::new()?),
            locator: config.resource_locator(),
            config: Arc::new(config),
        })
    }
}
