//! Main settings module

use std::collections::HashMap;

use config::{Config, Environment, File};
use lingo_core::Language;
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, llm, persistence, session};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Session lifecycle limits
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    /// ScyllaDB persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Default practice languages and per-user overrides
    #[serde(default)]
    pub languages: LanguageSettings,

    /// Topic catalog; empty means the built-in topics
    #[serde(default)]
    pub topics: Vec<TopicEntry>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Timeout for one AI feedback call
    #[serde(default = "default_ai_timeout")]
    pub ai_timeout_ms: u64,

    /// Prior turns included in the AI context
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    #[serde(default = "default_max_utterance_chars")]
    pub max_utterance_chars: usize,
}

fn default_max_sessions() -> usize {
    session::MAX_SESSIONS
}
fn default_session_timeout() -> u64 {
    session::SESSION_TIMEOUT_SECS
}
fn default_cleanup_interval() -> u64 {
    session::CLEANUP_INTERVAL_SECS
}
fn default_ai_timeout() -> u64 {
    session::AI_TIMEOUT_MS
}
fn default_history_window() -> usize {
    session::HISTORY_WINDOW
}
fn default_max_utterance_chars() -> usize {
    session::MAX_UTTERANCE_CHARS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            session_timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
            ai_timeout_ms: default_ai_timeout(),
            history_window: default_history_window(),
            max_utterance_chars: default_max_utterance_chars(),
        }
    }
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions API
    OpenAi,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Defaults to the provider's standard endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Falls back to `OPENAI_API_KEY` for the OpenAI provider
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> usize {
    llm::DEFAULT_MAX_TOKENS
}
fn default_temperature() -> f32 {
    llm::DEFAULT_TEMPERATURE
}
fn default_llm_timeout() -> u64 {
    llm::DEFAULT_TIMEOUT_SECS
}
fn default_max_retries() -> u32 {
    llm::DEFAULT_MAX_RETRIES
}

impl LlmSettings {
    /// Configured endpoint or the provider default
    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint,
            (None, LlmProvider::Ollama) => endpoints::OLLAMA_DEFAULT,
            (None, LlmProvider::OpenAi) => endpoints::OPENAI_DEFAULT,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_llm_model(),
            endpoint: None,
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Persistence configuration for ScyllaDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable ScyllaDB persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec![endpoints::SCYLLA_DEFAULT.to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| persistence::DEFAULT_KEYSPACE.to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    /// Serve Prometheus metrics at `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Practice language defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LanguageSettings {
    #[serde(default)]
    pub default_target: Language,

    #[serde(default)]
    pub default_native: Language,

    /// Keyed by user id
    #[serde(default)]
    pub user_overrides: HashMap<String, UserLanguageOverride>,
}

/// A user's own language choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLanguageOverride {
    pub target: Language,
    #[serde(default)]
    pub native: Option<Language>,
}

/// A configured practice topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Opening question for the learner
    #[serde(default)]
    pub starter: Option<String>,
    /// Topic-specific target language
    #[serde(default)]
    pub target_language: Option<Language>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_session()?;
        self.validate_llm()?;
        self.validate_topics()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }
        if self.server.timeout_seconds == 0 {
            return Err(invalid("server.timeout_seconds", "Timeout must be positive"));
        }
        if self.environment.is_production() && self.server.cors_enabled && self.server.cors_origins.is_empty() {
            return Err(invalid(
                "server.cors_origins",
                "Production requires explicit CORS origins",
            ));
        }
        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        let s = &self.session;
        if s.max_sessions == 0 {
            return Err(invalid("session.max_sessions", "Must be at least 1"));
        }
        if s.session_timeout_secs == 0 {
            return Err(invalid("session.session_timeout_secs", "Must be positive"));
        }
        if s.cleanup_interval_secs == 0 {
            return Err(invalid("session.cleanup_interval_secs", "Must be positive"));
        }
        if !(100..=120_000).contains(&s.ai_timeout_ms) {
            return Err(invalid(
                "session.ai_timeout_ms",
                &format!("Must be between 100 and 120000, got {}", s.ai_timeout_ms),
            ));
        }
        if !(1..=50).contains(&s.history_window) {
            return Err(invalid(
                "session.history_window",
                &format!("Must be between 1 and 50, got {}", s.history_window),
            ));
        }
        if s.max_utterance_chars == 0 {
            return Err(invalid("session.max_utterance_chars", "Must be positive"));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                &format!("Must be between 0.0 and 2.0, got {}", self.llm.temperature),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "Must be positive"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(invalid("llm.timeout_secs", "Must be positive"));
        }
        Ok(())
    }

    fn validate_topics(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for topic in &self.topics {
            if topic.id.trim().is_empty() {
                return Err(ConfigError::MissingField("topics[].id".to_string()));
            }
            if !seen.insert(topic.id.as_str()) {
                return Err(invalid("topics", &format!("Duplicate topic id '{}'", topic.id)));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (`LINGO_TUTOR__SECTION__KEY`)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("LINGO_TUTOR")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.session.history_window, 10);
        assert_eq!(settings.languages.default_target, Language::English);
        assert!(settings.topics.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_session_validation() {
        let mut settings = Settings::default();

        settings.session.history_window = 0;
        assert!(settings.validate_session().is_err());
        settings.session.history_window = 10;

        settings.session.ai_timeout_ms = 10;
        assert!(settings.validate_session().is_err());
        settings.session.ai_timeout_ms = 5000;

        settings.session.max_sessions = 0;
        assert!(settings.validate_session().is_err());
        settings.session.max_sessions = 10;

        assert!(settings.validate_session().is_ok());
    }

    #[test]
    fn test_llm_validation() {
        let mut settings = Settings::default();
        settings.llm.temperature = 2.5;
        assert!(settings.validate_llm().is_err());
        settings.llm.temperature = 0.2;

        settings.llm.model = " ".to_string();
        assert!(matches!(settings.validate_llm(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate_server().is_err());
        settings.server.port = 8080;

        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate_server().is_err());
        settings.server.cors_origins = vec!["https://tutor.example.com".to_string()];
        assert!(settings.validate_server().is_ok());
    }

    #[test]
    fn test_duplicate_topics_rejected() {
        let entry = TopicEntry {
            id: "travel".to_string(),
            name: "Travel".to_string(),
            description: String::new(),
            category: String::new(),
            starter: None,
            target_language: None,
        };
        let mut settings = Settings::default();
        settings.topics = vec![entry.clone(), entry];
        assert!(settings.validate_topics().is_err());
    }

    #[test]
    fn test_llm_endpoint_defaults_by_provider() {
        let mut llm = LlmSettings::default();
        assert_eq!(llm.endpoint(), endpoints::OLLAMA_DEFAULT);
        llm.provider = LlmProvider::OpenAi;
        assert_eq!(llm.endpoint(), endpoints::OPENAI_DEFAULT);
        llm.endpoint = Some("http://localhost:8000/v1".to_string());
        assert_eq!(llm.endpoint(), "http://localhost:8000/v1");
    }

    #[test]
    fn test_deserialize_language_section() {
        let json = r#"{
            "languages": {
                "default_target": "spanish",
                "user_overrides": {"u42": {"target": "french", "native": "german"}}
            }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.languages.default_target, Language::Spanish);
        assert_eq!(settings.languages.default_native, Language::English);
        let user = &settings.languages.user_overrides["u42"];
        assert_eq!(user.target, Language::French);
        assert_eq!(user.native, Some(Language::German));
    }
}
