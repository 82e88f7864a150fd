use std::sync::Arc;
use tracing::info;

use crate::{
    client::NexusClient,
    config::Config,
    infrastructure::{Backend, InMemoryBackend, MetricsBackend},
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub client: NexusClient,
    pub metrics: Arc<MetricsBackend>,
    pub config: Config,
}

impl AppState {
    /// Client over the in-process backend, with call accounting in front.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        info!("Using in-memory backend");
        Self::with_backend(Arc::new(InMemoryBackend::new()), config).await
    }

    pub async fn with_backend(backend: Arc<dyn Backend>, config: Config) -> anyhow::Result<Self> {
        let metrics = Arc::new(MetricsBackend::new(backend));
        let client = NexusClient::new(metrics.clone(), config.clone());
        let landed = client.init().await;
        info!("Client ready on page {}", landed);

        Ok(Self {
            client,
            metrics,
            config,
        })
    }
}
