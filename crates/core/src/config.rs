//! Configuration management for Smart Search.
//!
//! Configuration is assembled from several layers, lowest precedence first:
//! - Built-in defaults
//! - Config file (`.smartsearch/config.yaml` or `SMARTSEARCH_CONFIG`)
//! - Environment variables (service endpoints and keys)
//! - Command-line flags
//!
//! The result is an explicit `AppConfig` that is handed to the search and
//! completion clients when they are constructed. Nothing is written back into
//! the process environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the search service endpoint.
pub const ENV_SEARCH_ENDPOINT: &str = "AZURE_SEARCH_ENDPOINT";
/// Environment variable holding the search service admin/query key.
pub const ENV_SEARCH_KEY: &str = "AZURE_SEARCH_KEY";
/// Environment variable holding the completion service endpoint.
pub const ENV_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
/// Environment variable holding the completion service key.
pub const ENV_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// Default relevance threshold on the 0-4 reranker scale.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 1.0;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .smartsearch/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Retrieval service settings
    pub search: SearchSettings,

    /// Completion service settings
    pub openai: CompletionSettings,
}

/// Settings for the hosted search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Service endpoint, e.g. `https://myservice.search.windows.net`
    pub endpoint: String,

    /// API key sent in the `api-key` header
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// REST API version
    pub api_version: String,

    /// Index names queried in order
    pub indexes: Vec<String>,

    /// Name of the semantic ranking configuration on the index
    pub semantic_configuration: String,

    /// Number of results requested per index
    pub top: u32,

    /// Query language passed to the semantic ranker
    pub query_language: String,

    /// Results must score strictly above this to be kept
    pub relevance_threshold: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: "2021-04-30-Preview".to_string(),
            indexes: vec!["cogsrch-snowflake-index-files".to_string()],
            semantic_configuration: "my-semantic-config".to_string(),
            top: 5,
            query_language: "en-us".to_string(),
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }
}

/// Settings for the hosted chat-completion deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Resource endpoint, e.g. `https://myresource.openai.azure.com`
    pub endpoint: String,

    /// API key sent in the `api-key` header
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// REST API version
    pub api_version: String,

    /// Deployment name of the chat model
    pub deployment: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: "2023-03-15-preview".to_string(),
            deployment: "gpt-35-turbo".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    search: Option<SearchSection>,
    openai: Option<OpenAiSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSection {
    endpoint: Option<String>,
    api_version: Option<String>,
    indexes: Option<Vec<String>>,
    semantic_configuration: Option<String>,
    top: Option<u32>,
    query_language: Option<String>,
    relevance_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenAiSection {
    endpoint: Option<String>,
    api_version: Option<String>,
    deployment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            search: SearchSettings::default(),
            openai: CompletionSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and an optional config file.
    ///
    /// Environment variables:
    /// - `SMARTSEARCH_WORKSPACE`: Override workspace path
    /// - `SMARTSEARCH_CONFIG`: Path to config file
    /// - `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_KEY`
    /// - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// Missing service settings are not an error here; see [`AppConfig::validate`].
    ///
    /// # Example
    /// ```no_run
    /// use smartsearch_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Indexes: {:?}", config.search.indexes);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::load`], reading variables through `lookup`.
    pub fn load_with<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = lookup("SMARTSEARCH_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = lookup("SMARTSEARCH_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.app_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override the config file
        config.apply_env(&lookup);

        Ok(config)
    }

    /// Overlay service settings and flags taken from the environment.
    fn apply_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_SEARCH_ENDPOINT) {
            self.search.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_SEARCH_KEY) {
            self.search.api_key = key;
        }
        if let Some(endpoint) = lookup(ENV_OPENAI_ENDPOINT) {
            self.openai.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_OPENAI_API_KEY) {
            self.openai.api_key = key;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(search) = config_file.search {
            let target = &mut result.search;
            if let Some(endpoint) = search.endpoint {
                target.endpoint = endpoint;
            }
            if let Some(api_version) = search.api_version {
                target.api_version = api_version;
            }
            if let Some(indexes) = search.indexes {
                target.indexes = indexes;
            }
            if let Some(semantic) = search.semantic_configuration {
                target.semantic_configuration = semantic;
            }
            if let Some(top) = search.top {
                target.top = top;
            }
            if let Some(language) = search.query_language {
                target.query_language = language;
            }
            if let Some(threshold) = search.relevance_threshold {
                target.relevance_threshold = threshold;
            }
        }

        if let Some(openai) = config_file.openai {
            let target = &mut result.openai;
            if let Some(endpoint) = openai.endpoint {
                target.endpoint = endpoint;
            }
            if let Some(api_version) = openai.api_version {
                target.api_version = api_version;
            }
            if let Some(deployment) = openai.deployment {
                target.deployment = deployment;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the environment and the config file.
    /// Workspace and config file location are resolved during loading, so
    /// they are passed to [`AppConfig::load_with`] instead.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
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

    /// Replace the list of indexes queried per question.
    pub fn with_indexes(mut self, indexes: Vec<String>) -> Self {
        if !indexes.is_empty() {
            self.search.indexes = indexes;
        }
        self
    }

    /// Get the path to the .smartsearch directory.
    pub fn app_dir(&self) -> PathBuf {
        self.workspace.join(".smartsearch")
    }

    /// Check that every setting required to reach the services is present.
    ///
    /// Settings are checked in a fixed order and the first missing or blank
    /// one is reported, naming the environment variable to set.
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            (ENV_SEARCH_ENDPOINT, &self.search.endpoint),
            (ENV_SEARCH_KEY, &self.search.api_key),
            (ENV_OPENAI_ENDPOINT, &self.openai.endpoint),
            (ENV_OPENAI_API_KEY, &self.openai.api_key),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Please set {} in the environment",
                    name
                )));
            }
        }

        if self.search.indexes.is_empty() {
            return Err(AppError::Config(
                "At least one search index must be configured".to_string(),
            ));
        }

        if !(0.0..=4.0).contains(&self.search.relevance_threshold) {
            return Err(AppError::Config(format!(
                "relevanceThreshold must be within 0-4, got {}",
                self.search.relevance_threshold
            )));
        }

        Ok(())
    }
}
