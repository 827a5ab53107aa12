//! Configuration management for the clinic assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.clinic/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Credentials are never stored in the config file itself; the file names the
//! environment variables they are read from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::clinic::ClinicProfile;
use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Providers the assistant can talk to for completions.
const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the workspace root (contains .clinic/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("openai" or "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Explicit API key for the completion provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log line format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding settings
    pub embedding: EmbeddingSettings,

    /// Document store settings
    pub store: StoreSettings,

    /// Web search settings
    pub search: SearchSettings,

    /// Clinic identity
    pub clinic: ClinicProfile,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Get the completion model for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Get the endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name: "openai", "ollama" or "mock"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Vector dimensionality
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Environment variable holding the Supabase project URL
    #[serde(rename = "urlEnv")]
    pub url_env: String,

    /// Environment variable holding the Supabase service key
    #[serde(rename = "keyEnv")]
    pub key_env: String,

    /// Documents table
    pub table: String,

    /// Similarity search RPC
    #[serde(rename = "matchFunction")]
    pub match_function: String,

    /// Local SQLite store used when Supabase is not configured
    #[serde(rename = "localPath", skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url_env: "SUPABASE_URL".to_string(),
            key_env: "SUPABASE_SERVICE_KEY".to_string(),
            table: "site_pages".to_string(),
            match_function: "match_site_pages".to_string(),
            local_path: None,
        }
    }
}

impl StoreSettings {
    /// Resolve the Supabase URL and key from the environment.
    ///
    /// Returns `None` unless both are present and non-empty.
    pub fn resolve_remote(&self) -> Option<(String, String)> {
        let url = non_empty_env(&self.url_env)?;
        let key = non_empty_env(&self.key_env)?;
        Some((url, key))
    }
}

/// Web search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Environment variable holding the Tavily API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Primary search API base URL
    pub endpoint: String,

    /// Instant-answer fallback base URL
    #[serde(rename = "fallbackEndpoint")]
    pub fallback_endpoint: String,

    /// Domains the primary provider is restricted to
    #[serde(rename = "includeDomains")]
    pub include_domains: Vec<String>,

    /// Result cap for supplementary searches
    #[serde(rename = "maxResults")]
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            endpoint: "https://api.tavily.com".to_string(),
            fallback_endpoint: "https://api.duckduckgo.com".to_string(),
            include_domains: [
                "pubmed.ncbi.nlm.nih.gov",
                "ncbi.nlm.nih.gov",
                "nih.gov",
                "who.int",
                "mayoclinic.org",
                "aad.org",
                "jamanetwork.com",
                "sciencedirect.com",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            max_results: 3,
        }
    }
}

impl SearchSettings {
    /// Resolve the search API key from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        non_empty_env(&self.api_key_env)
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embedding: Option<EmbeddingSettings>,
    store: Option<StoreSettings>,
    search: Option<SearchSettings>,
    clinic: Option<ClinicProfile>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            log_level: None,
            log_format: LogFormat::Pretty,
            verbose: false,
            no_color: false,
            llm: None,
            embedding: EmbeddingSettings::default(),
            store: StoreSettings::default(),
            search: SearchSettings::default(),
            clinic: ClinicProfile::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `CLINIC_WORKSPACE`: Override workspace path
    /// - `CLINIC_CONFIG`: Path to config file
    /// - `CLINIC_PROVIDER`: Completion provider
    /// - `CLINIC_MODEL` / `LLM_MODEL`: Model identifier
    /// - `CLINIC_API_KEY`: API key for the completion provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use clinic_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CLINIC_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("CLINIC_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        config.load_file()?;
        config.apply_env();

        Ok(config)
    }

    /// Merge the YAML config file selected by `workspace`/`config_file`.
    ///
    /// A missing default file is fine; a missing explicit file is an error.
    pub fn load_file(&mut self) -> AppResult<()> {
        if !self.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                self.workspace
            )));
        }

        let config_path = match self.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        cf
                    )));
                }
                cf.clone()
            }
            None => self.clinic_dir().join("config.yaml"),
        };

        if config_path.exists() {
            *self = self.merge_yaml(&config_path)?;
        }

        Ok(())
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("CLINIC_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = non_empty_env("CLINIC_MODEL").or_else(|| non_empty_env("LLM_MODEL")) {
            self.model = model;
        }

        if let Some(key) = non_empty_env("CLINIC_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = LogFormat::parse(&format).ok_or_else(|| {
                    AppError::Config(format!("Unknown log format in {:?}: {}", path, format))
                })?;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(store) = config_file.store {
            result.store = store;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(clinic) = config_file.clinic {
            result.clinic = clinic;
        }

        tracing::debug!("Merged config file {:?}", path);

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        log_format: Option<LogFormat>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .clinic directory.
    pub fn clinic_dir(&self) -> PathBuf {
        self.workspace.join(".clinic")
    }

    /// Ensure the .clinic directory exists.
    pub fn ensure_clinic_dir(&self) -> AppResult<()> {
        let clinic_dir = self.clinic_dir();
        if !clinic_dir.exists() {
            std::fs::create_dir_all(&clinic_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .clinic directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the local SQLite document store.
    pub fn local_store_path(&self) -> PathBuf {
        self.store
            .local_path
            .clone()
            .unwrap_or_else(|| self.clinic_dir().join("site_pages.db"))
    }

    /// Get a provider's configuration block, if the config file declared one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint override for a provider.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(|s| s.to_string())
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: explicit `CLINIC_API_KEY`, the provider's `apiKeyEnv`, then the
    /// conventional `OPENAI_API_KEY` for OpenAI.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Some(key) = non_empty_env(api_key_env) {
                return Some(key);
            }
        }

        if provider.eq_ignore_ascii_case("openai") {
            return non_empty_env("OPENAI_API_KEY");
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key(&provider).is_none() {
            return Err(AppError::Config(
                "OpenAI API key not found. Set OPENAI_API_KEY or CLINIC_API_KEY".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Read an environment variable, treating empty values as unset.
fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
