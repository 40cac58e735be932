//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use docqa::{
    db::vectorstore::InMemoryVectorStore, utils::toml_config::DocqaConfig, AppState,
    ConfigManager, RagPipeline,
};
use mocks::{MockEmbedder, MockLLMClient};
use std::path::Path;
use std::sync::Arc;

/// Default config with uploads going to `upload_dir`.
pub fn test_config(upload_dir: &Path) -> DocqaConfig {
    let mut config = DocqaConfig::default();
    config.uploads.dir = upload_dir.to_string_lossy().into_owned();
    config.gemini.timeout_secs = 5;
    config
}

/// Pipeline backed by mocks and a fresh in-memory store.
pub fn mock_pipeline(
    config: DocqaConfig,
    embedder: MockEmbedder,
    llm: MockLLMClient,
) -> (Arc<ConfigManager>, Arc<InMemoryVectorStore>, RagPipeline) {
    let config_manager = Arc::new(ConfigManager::from_config(config));
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = RagPipeline::new(
        Arc::clone(&config_manager),
        Arc::new(embedder),
        Arc::new(llm),
        store.clone(),
    )
    .expect("pipeline should build");

    (config_manager, store, pipeline)
}

/// Application state wired to mocks.
pub fn mock_state(
    config: DocqaConfig,
    embedder: MockEmbedder,
    llm: MockLLMClient,
) -> (AppState, Arc<InMemoryVectorStore>) {
    let (config_manager, store, pipeline) = mock_pipeline(config, embedder, llm);
    (AppState::new(config_manager, Arc::new(pipeline)), store)
}
