//! Configuration management for C-RAG.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.crag/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with the vector index and prompt
//! overrides stored under `.crag/`. Every client the workflow needs is built
//! from one `AppConfig` at process start and passed down explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default model for the binary graders.
pub const DEFAULT_GRADER_MODEL: &str = "gpt-4o-mini";

/// Providers with a working client implementation.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .crag/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("openai" or "ollama")
    pub provider: String,

    /// Model used by the answer generator
    pub model: String,

    /// Model used by the relevance, hallucination and answer graders
    pub grader_model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Document store settings
    pub retrieval: RetrievalConfig,

    /// Web search fallback settings
    pub web_search: WebSearchConfig,

    /// Workflow controller settings
    pub workflow: WorkflowConfig,
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
        #[serde(rename = "graderModel")]
        grader_model: Option<String>,
        endpoint: Option<String>,
        #[serde(rename = "organizationEnv")]
        organization_env: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "graderModel")]
        grader_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Generation model for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Grader model, if configured separately.
    pub fn grader_model(&self) -> Option<&str> {
        match self {
            Self::OpenAI { grader_model, .. } | Self::Ollama { grader_model, .. } => {
                grader_model.as_deref()
            }
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Request timeout in seconds, if configured.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::OpenAI { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Document store settings (`retrieval:` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Name of the indexed collection under `.crag/index/`
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Number of nearest documents returned per query
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,
}

fn default_collection() -> String {
    "rag".to_string()
}

fn default_top_k() -> usize {
    4
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            top_k: default_top_k(),
        }
    }
}

/// Web search fallback settings (`webSearch:` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchConfig {
    /// Search provider ("tavily")
    #[serde(default = "default_search_provider")]
    pub provider: String,

    /// Environment variable holding the search API key
    #[serde(rename = "apiKeyEnv", default = "default_search_key_env")]
    pub api_key_env: String,

    /// Custom endpoint (defaults to the provider's public API)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Number of results joined into the synthetic document
    #[serde(rename = "maxResults", default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn default_search_provider() -> String {
    "tavily".to_string()
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_max_results() -> usize {
    3
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_key_env: default_search_key_env(),
            endpoint: None,
            max_results: default_max_results(),
            timeout: None,
        }
    }
}

/// Workflow controller settings (`workflow:` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    /// Maximum node executions per run before aborting; 0 disables the bound
    #[serde(rename = "recursionLimit", default = "default_recursion_limit")]
    pub recursion_limit: usize,

    /// Grade retrieved documents concurrently
    #[serde(rename = "concurrentGrading", default = "default_true")]
    pub concurrent_grading: bool,
}

fn default_recursion_limit() -> usize {
    25
}

fn default_true() -> bool {
    true
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            recursion_limit: default_recursion_limit(),
            concurrent_grading: true,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    retrieval: Option<RetrievalConfig>,
    #[serde(rename = "webSearch")]
    web_search: Option<WebSearchConfig>,
    workflow: Option<WorkflowConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            grader_model: DEFAULT_GRADER_MODEL.to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            retrieval: RetrievalConfig::default(),
            web_search: WebSearchConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `CRAG_WORKSPACE`: Override workspace path
    /// - `CRAG_CONFIG`: Path to config file
    /// - `CRAG_PROVIDER`: LLM provider
    /// - `CRAG_MODEL`: Generation model
    /// - `CRAG_GRADER_MODEL`: Grader model
    /// - `CRAG_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use crag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `CRAG_WORKSPACE` and `CRAG_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("CRAG_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("CRAG_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.workspace.join(".crag/config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("CRAG_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CRAG_MODEL") {
            config.model = model;
        }

        if let Ok(grader_model) = std::env::var("CRAG_GRADER_MODEL") {
            config.grader_model = grader_model;
        }

        config.api_key = std::env::var("CRAG_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
                result.grader_model = provider_config
                    .grader_model()
                    .unwrap_or_else(|| provider_config.model())
                    .to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(web_search) = config_file.web_search {
            result.web_search = web_search;
        }

        if let Some(workflow) = config_file.workflow {
            result.workflow = workflow;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        grader_model: Option<String>,
        log_level: Option<String>,
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

        if let Some(grader_model) = grader_model {
            self.grader_model = grader_model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
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

    /// Get the path to the .crag directory.
    pub fn crag_dir(&self) -> PathBuf {
        self.workspace.join(".crag")
    }

    /// Ensure the .crag directory exists.
    pub fn ensure_crag_dir(&self) -> AppResult<()> {
        let crag_dir = self.crag_dir();
        if !crag_dir.exists() {
            std::fs::create_dir_all(&crag_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .crag directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the configuration for a provider, if the config file declared one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint override for a provider.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Request timeout for a provider, in seconds.
    pub fn provider_timeout(&self, provider: &str) -> Option<u64> {
        self.get_provider_config(provider).and_then(|pc| pc.timeout())
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: explicit `CRAG_API_KEY`, the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => Some(api_key_env.as_str()),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider.eq_ignore_ascii_case("openai") => Some("OPENAI_API_KEY"),
            None => None,
        };

        env_var.and_then(|var| std::env::var(var).ok())
    }

    /// Resolve the OpenAI organization from the provider's `organizationEnv`.
    pub fn resolve_organization(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI {
                organization_env: Some(var),
                ..
            }) => std::env::var(var).ok().filter(|v| !v.is_empty()),
            _ => None,
        }
    }

    /// Resolve the web search API key from `webSearch.apiKeyEnv`.
    pub fn resolve_web_search_key(&self) -> Option<String> {
        std::env::var(&self.web_search.api_key_env).ok()
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
            let env_var = match self.get_provider_config(&provider) {
                Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env.clone(),
                _ => "OPENAI_API_KEY".to_string(),
            };
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                env_var
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if self.web_search.max_results == 0 {
            return Err(AppError::Config(
                "webSearch.maxResults must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
