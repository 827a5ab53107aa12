//! Construction of the assistant from application configuration.

use crate::agent::ClinicAgent;
use crate::answer::AnswerProvider;
use crate::fixed::FixedAnswerProvider;
use crate::manager::DecisionManager;
use crate::policy::DecisionPolicy;
use clinic_core::{AppConfig, AppError, AppResult};
use clinic_knowledge::{
    create_provider, ClinicRetriever, ClinicTools, DocumentStore, EmbeddingProvider, SqliteStore,
    SupabaseStore,
};
use clinic_llm::create_client;
use clinic_prompt::{build_prompt, resolve_prompt, SYNTHESIS_PROMPT_ID, SYSTEM_PROMPT_ID};
use clinic_search::WebSearcher;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Supabase when its credentials are set, otherwise the local SQLite store.
pub fn open_store(config: &AppConfig) -> AppResult<Arc<dyn DocumentStore>> {
    if let Some((url, key)) = config.store.resolve_remote() {
        debug!("Using Supabase store at {}", url);
        return Ok(Arc::new(SupabaseStore::new(
            url,
            key,
            &config.store.table,
            &config.store.match_function,
        )));
    }

    warn!(
        "{} / {} not set, using the local store",
        config.store.url_env, config.store.key_env
    );
    Ok(Arc::new(open_local_store(config)?))
}

/// Open (creating if needed) the local SQLite store.
pub fn open_local_store(config: &AppConfig) -> AppResult<SqliteStore> {
    config.ensure_clinic_dir()?;
    SqliteStore::open(&config.local_store_path())
}

/// Embedding provider named in the config.
pub fn open_embedder(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let provider = config.embedding.provider.to_lowercase();
    let api_key = config.resolve_api_key(&provider);
    let endpoint = config.provider_endpoint(&provider);
    create_provider(&config.embedding, api_key.as_deref(), endpoint.as_deref())
}

pub fn build_retriever(config: &AppConfig) -> AppResult<ClinicRetriever> {
    Ok(ClinicRetriever::new(
        open_store(config)?,
        open_embedder(config)?,
        config.clinic.clone(),
    ))
}

fn build_agent(config: &AppConfig) -> AppResult<ClinicAgent> {
    config.validate()?;

    let api_key = config.resolve_api_key(&config.provider);
    let endpoint = config.provider_endpoint(&config.provider);
    let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
        .map_err(AppError::Config)?;

    let definition = resolve_prompt(&config.workspace, SYSTEM_PROMPT_ID)?;
    let system_prompt = build_prompt(&definition, &config.clinic, HashMap::new())?;

    let tools = ClinicTools::new(build_retriever(config)?);
    Ok(ClinicAgent::new(
        client,
        &config.model,
        system_prompt.content,
        tools,
    ))
}

/// Build the decision manager.
///
/// `offline` answers with [`FixedAnswerProvider`] and needs no model or
/// store credentials.
pub fn build_manager(config: &AppConfig, offline: bool) -> AppResult<DecisionManager> {
    let agent: Arc<dyn AnswerProvider> = if offline {
        info!("Offline mode, using fixed answers");
        Arc::new(FixedAnswerProvider::new(config.clinic.clone()))
    } else {
        Arc::new(build_agent(config)?)
    };

    let searcher = WebSearcher::new(
        &config.search,
        config.search.resolve_api_key(),
        config.clinic.clone(),
    )?;
    if !searcher.has_primary() {
        debug!(
            "{} not set, web search uses the fallback provider",
            config.search.api_key_env
        );
    }

    let synthesis_prompt = resolve_prompt(&config.workspace, SYNTHESIS_PROMPT_ID)?;

    Ok(DecisionManager::new(
        agent,
        Arc::new(searcher),
        DecisionPolicy::new(&config.clinic.region),
        synthesis_prompt,
        config.clinic.clone(),
    )
    .with_web_results(config.search.max_results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::AnswerSource;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig {
            workspace: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        config.store.local_path = Some(dir.path().join("pages.db"));
        config.embedding.provider = "mock".to_string();
        config.embedding.dimensions = 32;
        config
    }

    #[test]
    fn test_local_store_is_created() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let store = open_local_store(&config).unwrap();

        assert_eq!(store.count_chunks().unwrap(), 0);
        assert!(dir.path().join(".clinic").is_dir());
    }

    #[test]
    fn test_mock_embedder() {
        let dir = TempDir::new().unwrap();
        let embedder = open_embedder(&config_in(&dir)).unwrap();
        assert_eq!(embedder.dimensions(), 32);
    }

    #[tokio::test]
    async fn test_offline_manager_answers_without_credentials() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let manager = build_manager(&config, true).unwrap();
        let reply = manager.process("Tell me about Dr. Pfahl", &[]).await;

        assert_eq!(reply.source, AnswerSource::Knowledge);
        assert_eq!(manager.clinic().domain, "haut-labor.de");
    }

    #[tokio::test]
    async fn test_manager_honors_configured_result_cap() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.search.max_results = 2;

        let manager = build_manager(&config, true).unwrap();

        assert_eq!(manager.web_results(), 2);
        assert_eq!(build_manager(&config_in(&dir), true).unwrap().web_results(), 3);
    }
}
