//! Configuration loading for Lectern.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.lectern/config.toml`)
//! 3. User config (`~/.lectern/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The service runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::Catalog;
use crate::error::{LecternError, Result};

/// Main configuration struct for Lectern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Document store configuration.
    pub store: StoreConfig,
    /// Text generation service configuration.
    pub generation: GenerationConfig,
    /// Taxonomy classifier configuration.
    pub classifier: ClassifierConfig,
    /// Content validation configuration.
    pub content: ContentConfig,
    /// Tool catalogs, vocabulary bands and taxonomy verbs.
    pub catalog: Catalog,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Upper bound on the blocking work of one request.
    pub request_timeout_secs: u64,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 60,
            log_filter: "info,lectern=debug".to_string(),
        }
    }
}

/// Document store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memory" => Some(StoreBackend::Memory),
            "file" => Some(StoreBackend::File),
            _ => None,
        }
    }
}

/// Valid store backend names.
pub const VALID_STORE_BACKENDS: &[&str] = &["memory", "file"];

/// Document store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Root directory of the file store. Defaults to `<lectern_home>/store`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Text generation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// When false, every generation call fails as unavailable.
    pub enabled: bool,
    /// Base URL of the Ollama-compatible endpoint.
    pub base_url: String,
    pub model: String,
    /// Timeout for one generation call.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Taxonomy classification strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Keyword heuristic only.
    Heuristic,
    /// Text generation service; failures surface as errors.
    #[default]
    Delegated,
    /// Text generation service, falling back to the heuristic on failure.
    DelegatedWithFallback,
}

/// Valid classifier strategy names.
pub const VALID_CLASSIFIER_STRATEGIES: &[&str] =
    &["heuristic", "delegated", "delegated_with_fallback"];

impl ClassifierStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "heuristic" => Some(ClassifierStrategy::Heuristic),
            "delegated" => Some(ClassifierStrategy::Delegated),
            "delegated_with_fallback" => Some(ClassifierStrategy::DelegatedWithFallback),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierStrategy::Heuristic => "heuristic",
            ClassifierStrategy::Delegated => "delegated",
            ClassifierStrategy::DelegatedWithFallback => "delegated_with_fallback",
        }
    }
}

impl std::fmt::Display for ClassifierStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy classifier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
}

/// Content validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Reject authored lessons missing their grade's required verbs.
    pub enforce_vocabulary: bool,
    /// Lesson duration assumed when metadata gives none.
    pub default_duration_minutes: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            enforce_vocabulary: true,
            default_duration_minutes: 30.0,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.lectern/config.toml` in cwd)
    /// 3. User config (`~/.lectern/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.lectern/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = lectern_home()?;
        Self::load_layer(&home.join("config.toml"))
    }

    /// Load project config from `.lectern/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_layer(&cwd.join(".lectern").join("config.toml"))
    }

    /// Load one layer, warning about files that exist but do not parse.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!(
                    "Warning: Ignoring config file {}: {}",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| LecternError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| LecternError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // LECTERN_BIND
        if let Ok(val) = env::var("LECTERN_BIND") {
            if val.trim().is_empty() {
                eprintln!(
                    "Warning: Empty LECTERN_BIND value. Using default '{}'.",
                    self.server.bind
                );
            } else {
                self.server.bind = val;
            }
        }

        // LECTERN_PORT
        if let Ok(val) = env::var("LECTERN_PORT") {
            match val.parse::<u16>() {
                Ok(n) => self.server.port = n,
                Err(_) => eprintln!(
                    "Warning: Invalid LECTERN_PORT value '{}'. \
                    Expected a port number. Using default '{}'.",
                    val, self.server.port
                ),
            }
        }

        // LECTERN_REQUEST_TIMEOUT_SECS
        if let Ok(val) = env::var("LECTERN_REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => self.server.request_timeout_secs = n,
                _ => eprintln!(
                    "Warning: Invalid LECTERN_REQUEST_TIMEOUT_SECS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.server.request_timeout_secs
                ),
            }
        }

        // LECTERN_STORE_BACKEND
        if let Ok(val) = env::var("LECTERN_STORE_BACKEND") {
            match StoreBackend::parse(&val) {
                Some(backend) => self.store.backend = backend,
                None => eprintln!(
                    "Warning: Invalid LECTERN_STORE_BACKEND value '{}'. \
                    Valid values: {:?}. Using default '{:?}'.",
                    val, VALID_STORE_BACKENDS, self.store.backend
                ),
            }
        }

        // LECTERN_STORE_DIR
        if let Ok(val) = env::var("LECTERN_STORE_DIR") {
            if !val.is_empty() {
                self.store.dir = Some(PathBuf::from(val));
            }
        }

        // LECTERN_GENERATION_URL
        if let Ok(val) = env::var("LECTERN_GENERATION_URL") {
            if val.starts_with("http://") || val.starts_with("https://") {
                self.generation.base_url = val.trim_end_matches('/').to_string();
            } else {
                eprintln!(
                    "Warning: Invalid LECTERN_GENERATION_URL value '{}'. \
                    Expected an http(s) URL. Using default '{}'.",
                    val, self.generation.base_url
                );
            }
        }

        // LECTERN_GENERATION_MODEL
        if let Ok(val) = env::var("LECTERN_GENERATION_MODEL") {
            if !val.trim().is_empty() {
                self.generation.model = val;
            }
        }

        // LECTERN_GENERATION_TIMEOUT_SECS
        if let Ok(val) = env::var("LECTERN_GENERATION_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => self.generation.timeout_secs = n,
                _ => eprintln!(
                    "Warning: Invalid LECTERN_GENERATION_TIMEOUT_SECS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.generation.timeout_secs
                ),
            }
        }

        // LECTERN_GENERATION_ENABLED
        if let Ok(val) = env::var("LECTERN_GENERATION_ENABLED") {
            self.generation.enabled = val == "true" || val == "1";
        }

        // LECTERN_CLASSIFIER_STRATEGY
        if let Ok(val) = env::var("LECTERN_CLASSIFIER_STRATEGY") {
            match ClassifierStrategy::parse(&val) {
                Some(strategy) => self.classifier.strategy = strategy,
                None => eprintln!(
                    "Warning: Invalid LECTERN_CLASSIFIER_STRATEGY value '{}'. \
                    Valid values: {:?}. Using default '{}'.",
                    val, VALID_CLASSIFIER_STRATEGIES, self.classifier.strategy
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence. Non-default fields from `other`
    /// are applied field by field, so explicit defaults in one layer do not
    /// block overrides from another. Catalog maps merge key by key.
    ///
    /// A layer cannot set a value back to its default to undo a lower layer.
    fn merge(mut self, other: Config) -> Self {
        let default_server = ServerConfig::default();
        if other.server.bind != default_server.bind {
            self.server.bind = other.server.bind;
        }
        if other.server.port != default_server.port {
            self.server.port = other.server.port;
        }
        if other.server.request_timeout_secs != default_server.request_timeout_secs {
            self.server.request_timeout_secs = other.server.request_timeout_secs;
        }
        if other.server.log_filter != default_server.log_filter {
            self.server.log_filter = other.server.log_filter;
        }

        if other.store.backend != StoreBackend::default() {
            self.store.backend = other.store.backend;
        }
        if other.store.dir.is_some() {
            self.store.dir = other.store.dir;
        }

        let default_generation = GenerationConfig::default();
        if other.generation.enabled != default_generation.enabled {
            self.generation.enabled = other.generation.enabled;
        }
        if other.generation.base_url != default_generation.base_url {
            self.generation.base_url = other.generation.base_url;
        }
        if other.generation.model != default_generation.model {
            self.generation.model = other.generation.model;
        }
        if other.generation.timeout_secs != default_generation.timeout_secs {
            self.generation.timeout_secs = other.generation.timeout_secs;
        }

        if other.classifier.strategy != ClassifierStrategy::default() {
            self.classifier.strategy = other.classifier.strategy;
        }

        let default_content = ContentConfig::default();
        if other.content.enforce_vocabulary != default_content.enforce_vocabulary {
            self.content.enforce_vocabulary = other.content.enforce_vocabulary;
        }
        if other.content.default_duration_minutes != default_content.default_duration_minutes {
            self.content.default_duration_minutes = other.content.default_duration_minutes;
        }

        // Catalog: maps merge additively, lists replace when customized
        let default_catalog = Catalog::default();
        for (subject, tools) in other.catalog.subject_tools {
            self.catalog.subject_tools.insert(subject, tools);
        }
        for (grade, verbs) in other.catalog.vocabulary {
            self.catalog.vocabulary.insert(grade, verbs);
        }
        if other.catalog.generic_tools != default_catalog.generic_tools {
            self.catalog.generic_tools = other.catalog.generic_tools;
        }
        if other.catalog.taxonomy_verbs != default_catalog.taxonomy_verbs {
            self.catalog.taxonomy_verbs = other.catalog.taxonomy_verbs;
        }

        self
    }

    /// Socket address string the server binds.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Get the Lectern home directory.
///
/// Checks `LECTERN_HOME` environment variable first, then falls back to
/// `~/.lectern`. An empty `LECTERN_HOME` is ignored.
pub fn lectern_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("LECTERN_HOME") {
        if home.is_empty() {
            tracing::warn!("LECTERN_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("LECTERN_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".lectern"));
    }

    // Containerized environments without HOME
    let fallback_path = env::temp_dir().join("lectern");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get the default file store directory.
///
/// Returns `<lectern_home>/store/`.
pub fn store_dir() -> Option<PathBuf> {
    lectern_home().map(|h| h.join("store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "LECTERN_BIND",
        "LECTERN_PORT",
        "LECTERN_REQUEST_TIMEOUT_SECS",
        "LECTERN_STORE_BACKEND",
        "LECTERN_STORE_DIR",
        "LECTERN_GENERATION_URL",
        "LECTERN_GENERATION_MODEL",
        "LECTERN_GENERATION_TIMEOUT_SECS",
        "LECTERN_GENERATION_ENABLED",
        "LECTERN_CLASSIFIER_STRATEGY",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    /// Point LECTERN_HOME at an empty directory so no user config leaks in.
    fn isolated_home() -> TempDir {
        let home = TempDir::new().unwrap();
        env::set_var("LECTERN_HOME", home.path());
        home
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert!(config.store.dir.is_none());
        assert!(config.generation.enabled);
        assert_eq!(config.generation.base_url, "http://localhost:11434");
        assert_eq!(config.generation.timeout_secs, 30);
        assert_eq!(config.classifier.strategy, ClassifierStrategy::Delegated);
        assert!(config.content.enforce_vocabulary);
        assert_eq!(config.content.default_duration_minutes, 30.0);
        assert_eq!(config.catalog.generic_tools.len(), 8);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[server]
port = 9090

[classifier]
strategy = "delegated_with_fallback"

[catalog.subject_tools]
Drama = ["improv stage", "script reader"]
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.classifier.strategy,
            ClassifierStrategy::DelegatedWithFallback
        );
        assert_eq!(config.catalog.tools_for("Drama").len(), 2);
        // Other fields should be defaults
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.generation.model, "llama3.2");
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(LecternError::Config { .. })));
    }

    #[test]
    fn test_invalid_strategy_in_file_is_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[classifier]\nstrategy = \"psychic\"\n").unwrap();

        assert!(Config::load_from_file(&config_path).is_err());
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        clear_env();
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join(".lectern");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(
            project_dir.join("config.toml"),
            "[generation]\nmodel = \"mistral\"\n",
        )
        .unwrap();

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.generation.model, "mistral");
        assert_eq!(config.generation.timeout_secs, 30);
        env::remove_var("LECTERN_HOME");
    }

    #[test]
    #[serial]
    fn test_user_then_project_layering() {
        clear_env();
        let home = isolated_home();
        fs::write(
            home.path().join("config.toml"),
            "[server]\nport = 7000\nbind = \"0.0.0.0\"\n",
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join(".lectern");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "[server]\nport = 7100\n").unwrap();

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.server.port, 7100);
        assert_eq!(config.server.bind, "0.0.0.0");
        env::remove_var("LECTERN_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let _home = isolated_home();
        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join(".lectern");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "[server]\nport = 7100\n").unwrap();

        env::set_var("LECTERN_PORT", "7200");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.server.port, 7200);

        clear_env();
        env::remove_var("LECTERN_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        let _home = isolated_home();
        env::set_var("LECTERN_BIND", "0.0.0.0");
        env::set_var("LECTERN_PORT", "3000");
        env::set_var("LECTERN_REQUEST_TIMEOUT_SECS", "15");
        env::set_var("LECTERN_STORE_BACKEND", "memory");
        env::set_var("LECTERN_STORE_DIR", "/srv/lectern");
        env::set_var("LECTERN_GENERATION_URL", "http://gen.internal:11434/");
        env::set_var("LECTERN_GENERATION_MODEL", "qwen2");
        env::set_var("LECTERN_GENERATION_TIMEOUT_SECS", "10");
        env::set_var("LECTERN_GENERATION_ENABLED", "false");
        env::set_var("LECTERN_CLASSIFIER_STRATEGY", "heuristic");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 15);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.dir, Some(PathBuf::from("/srv/lectern")));
        assert_eq!(config.generation.base_url, "http://gen.internal:11434");
        assert_eq!(config.generation.model, "qwen2");
        assert_eq!(config.generation.timeout_secs, 10);
        assert!(!config.generation.enabled);
        assert_eq!(config.classifier.strategy, ClassifierStrategy::Heuristic);

        clear_env();
        env::remove_var("LECTERN_HOME");
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_ignored() {
        clear_env();
        let _home = isolated_home();
        env::set_var("LECTERN_PORT", "not-a-port");
        env::set_var("LECTERN_REQUEST_TIMEOUT_SECS", "0");
        env::set_var("LECTERN_STORE_BACKEND", "postgres");
        env::set_var("LECTERN_GENERATION_URL", "ftp://nope");
        env::set_var("LECTERN_CLASSIFIER_STRATEGY", "psychic");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.generation.base_url, "http://localhost:11434");
        assert_eq!(config.classifier.strategy, ClassifierStrategy::Delegated);

        clear_env();
        env::remove_var("LECTERN_HOME");
    }

    #[test]
    fn test_merge_field_by_field() {
        let mut user = Config::default();
        user.server.port = 7000;
        user.generation.model = "mistral".to_string();

        let mut project = Config::default();
        project.server.bind = "0.0.0.0".to_string();

        let merged = Config::default().merge(user).merge(project);
        assert_eq!(merged.server.port, 7000);
        assert_eq!(merged.server.bind, "0.0.0.0");
        assert_eq!(merged.generation.model, "mistral");
    }

    #[test]
    fn test_merge_catalog_additively() {
        let mut layer = Config::default();
        layer.catalog.subject_tools.clear();
        layer
            .catalog
            .subject_tools
            .insert("Drama".to_string(), vec!["improv stage".to_string()]);

        let merged = Config::default().merge(layer);
        assert!(merged.catalog.has_subject("Drama"));
        assert!(merged.catalog.has_subject("Mathematics"));
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let mut config = Config::default();
        config.server.port = 9000;
        config.store.backend = StoreBackend::Memory;
        config.store.dir = Some(PathBuf::from("/tmp/lectern-store"));
        config.classifier.strategy = ClassifierStrategy::DelegatedWithFallback;
        config.content.enforce_vocabulary = false;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    #[serial]
    fn test_lectern_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("LECTERN_HOME", dir.path());

        assert_eq!(lectern_home().unwrap(), dir.path());
        assert_eq!(store_dir().unwrap(), dir.path().join("store"));

        env::remove_var("LECTERN_HOME");
    }

    #[test]
    #[serial]
    fn test_lectern_home_empty_env() {
        env::set_var("LECTERN_HOME", "");

        let home = lectern_home();
        assert!(home.is_some());
        assert!(home.unwrap().ends_with(".lectern") || env::var("HOME").is_err());

        env::remove_var("LECTERN_HOME");
    }

    #[test]
    #[serial]
    fn test_load_defaults_without_files() {
        clear_env();
        let _home = isolated_home();
        let config = Config::load();
        assert_eq!(config.server.port, 8080);
        env::remove_var("LECTERN_HOME");
    }
}
