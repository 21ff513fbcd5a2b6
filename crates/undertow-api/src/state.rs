//! Shared application state.

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Semaphore;
use undertow_extraction::{default_registry, ExtractorRegistry};
use undertow_fetch::HttpFetcher;
use undertow_intelligence::{LlmProvider, OpenAiProvider};
use undertow_persistence::{DocumentStore, PgDocumentStore};
use undertow_search::{build_provider, SearchBackend, SearchProvider};

use crate::config::AppConfig;

struct Inner {
    config: AppConfig,
    fetcher: HttpFetcher,
    registry: Arc<ExtractorRegistry>,
    search_provider: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmProvider>,
    store: Option<Arc<dyn DocumentStore>>,
    semaphore: Arc<Semaphore>,
}

/// Process-wide state handed to every request handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

impl AppState {
    /// Assemble state with explicit collaborators. Tests use this to
    /// inject stub providers and stores.
    pub fn new(
        config: AppConfig,
        fetcher: HttpFetcher,
        search_provider: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.semaphore_limit));
        Self(Arc::new(Inner {
            config,
            fetcher,
            registry: Arc::new(default_registry()),
            search_provider,
            llm,
            store,
            semaphore,
        }))
    }

    /// Assemble production state from configuration.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::with_defaults().context("failed to build HTTP client")?;

        let backend = SearchBackend::parse(&config.search_engine)
            .context("invalid SEARCH_ENGINE")?;
        let search_provider = build_provider(backend, fetcher.clone(), &config.provider_keys)
            .context("failed to build search provider")?;

        let llm: Arc<dyn LlmProvider> = Arc::new(
            OpenAiProvider::new(
                config.openai_api_key.clone().unwrap_or_default(),
                config.openai_base_url.clone(),
            )
            .context("failed to build LLM provider")?,
        );

        let store: Option<Arc<dyn DocumentStore>> = match &config.database_url {
            Some(url) => Some(Arc::new(
                PgDocumentStore::connect(url)
                    .await
                    .context("failed to connect document store")?,
            )),
            None => None,
        };

        Ok(Self::new(config, fetcher, search_provider, llm, store))
    }

    pub fn config(&self) -> &AppConfig {
        &self.0.config
    }

    pub fn fetcher(&self) -> &HttpFetcher {
        &self.0.fetcher
    }

    pub fn registry(&self) -> Arc<ExtractorRegistry> {
        self.0.registry.clone()
    }

    pub fn search_provider(&self) -> Arc<dyn SearchProvider> {
        self.0.search_provider.clone()
    }

    pub fn llm(&self) -> Arc<dyn LlmProvider> {
        self.0.llm.clone()
    }

    pub fn store(&self) -> Option<Arc<dyn DocumentStore>> {
        self.0.store.clone()
    }

    pub fn semaphore(&self) -> Arc<Semaphore> {
        self.0.semaphore.clone()
    }
}
