#![allow(dead_code)]

use std::sync::Arc;

use nexus_client::config::Config;
use nexus_client::core::ProfileId;
use nexus_client::entities::{NewPost, Post, Profile};
use nexus_client::infrastructure::{Backend, FaultInjectionBackend, InMemoryBackend, MetricsBackend};
use nexus_client::NexusClient;

pub const PASSWORD: &str = "secret1";

/// Client over in-memory backend -> fault injection -> metrics.
pub struct Harness {
    pub backend: InMemoryBackend,
    pub faults: Arc<FaultInjectionBackend>,
    pub metrics: Arc<MetricsBackend>,
    pub client: NexusClient,
}

pub fn harness() -> Harness {
    harness_with(Config::default())
}

pub fn harness_with(config: Config) -> Harness {
    let backend = InMemoryBackend::new();
    let faults = Arc::new(FaultInjectionBackend::new(Arc::new(backend.clone())));
    let metrics = Arc::new(MetricsBackend::new(faults.clone()));
    let client = NexusClient::new(metrics.clone(), config);
    Harness {
        backend,
        faults,
        metrics,
        client,
    }
}

impl Harness {
    pub async fn seed(&self, email: &str, first: &str, last: &str) -> Profile {
        self.backend
            .seed_user(email, PASSWORD, first, last, None)
            .await
            .unwrap()
    }

    /// Seeds a user and signs the client in as them.
    pub async fn sign_in_as(&self, email: &str, first: &str, last: &str) -> Profile {
        let profile = self.seed(email, first, last).await;
        self.client.sign_in(email, PASSWORD).await.unwrap();
        profile
    }

    pub async fn post_as(&self, author: ProfileId, content: &str) -> Post {
        self.backend
            .create_post(NewPost {
                author_id: author,
                content: content.to_string(),
                media_url: None,
            })
            .await
            .unwrap()
    }
}
