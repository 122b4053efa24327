//! Process configuration.
//!
//! Loading order (highest priority first): CLI args > environment
//! variables (`APP_*`, hydrated from a `.env` file if present) >
//! `config.toml` > built-in defaults, the same precedence chain the
//! teacher's `Config::load` uses.

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub corpus: CorpusConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated list of allowed CORS origins; `*` allows any.
    pub cors_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: String,
    pub corpus_ttl_days: i64,
    pub llm_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Default number of transliteration variants to emit per word.
    pub max_variants: usize,
    /// Bounded concurrency for term validation / source fetch fan-out.
    pub search_concurrency: usize,
    /// TTL (minutes) for suspended clarification state.
    pub clarification_ttl_minutes: i64,
}

/// Command line argument overrides.
#[derive(Parser, Debug, Clone)]
#[command(name = "sugya-finder")]
#[command(version, about = "Sugya source-finder retrieval service")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    #[arg(long, value_name = "HOST")]
    pub server_host: Option<String>,

    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    #[arg(long, value_name = "URL")]
    pub corpus_base_url: Option<String>,

    #[arg(long, value_name = "KEY")]
    pub llm_api_key: Option<String>,

    #[arg(long, value_name = "MODEL")]
    pub llm_model: Option<String>,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub cache_enabled: Option<bool>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support.
    pub fn load() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let cli_args = CommandLineArgs::parse();

        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(&cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Same precedence as `load`, minus CLI-argument overrides - for
    /// collaborators (like the console binary) that parse their own argv
    /// and only want an explicit config path plus environment overrides.
    pub fn load_with_path(explicit_path: Option<&str>) -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config_path = explicit_path.map(str::to_string).or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Environment variables, all prefixed `APP_`:
    /// `APP_SERVER_HOST`, `APP_SERVER_PORT`, `APP_CORS_ORIGINS`,
    /// `APP_CORPUS_BASE_URL`, `APP_CORPUS_TIMEOUT_SECS`, `APP_CORPUS_MAX_RETRIES`,
    /// `APP_LLM_API_BASE`, `APP_LLM_API_KEY`, `APP_LLM_MODEL`,
    /// `APP_CACHE_DIR`, `APP_CACHE_ENABLED`, `APP_CORPUS_CACHE_TTL_DAYS`, `APP_LLM_CACHE_TTL_HOURS`,
    /// `APP_DATA_DIR`, `APP_LOG_LEVEL`, `APP_LOG_FILE`,
    /// `APP_TRANSLITERATION_MAX_VARIANTS`, `APP_SEARCH_CONCURRENCY`, `APP_CLARIFICATION_TTL_MINUTES`.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("APP_SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = std::env::var("APP_SERVER_PORT")
            && let Ok(v) = v.parse()
        {
            self.server.port = v;
        }
        if let Ok(v) = std::env::var("APP_CORS_ORIGINS") {
            self.server.cors_origins = v;
        }
        if let Ok(v) = std::env::var("APP_CORPUS_BASE_URL") {
            self.corpus.base_url = v;
        }
        if let Ok(v) = std::env::var("APP_CORPUS_TIMEOUT_SECS")
            && let Ok(v) = v.parse()
        {
            self.corpus.timeout_secs = v;
        }
        if let Ok(v) = std::env::var("APP_CORPUS_MAX_RETRIES")
            && let Ok(v) = v.parse()
        {
            self.corpus.max_retries = v;
        }
        if let Ok(v) = std::env::var("APP_LLM_API_BASE") {
            self.llm.api_base = v;
        }
        if let Ok(v) = std::env::var("APP_LLM_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("APP_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("APP_CACHE_DIR") {
            self.cache.dir = v;
        }
        if let Ok(v) = std::env::var("APP_CACHE_ENABLED")
            && let Ok(v) = v.parse()
        {
            self.cache.enabled = v;
        }
        if let Ok(v) = std::env::var("APP_CORPUS_CACHE_TTL_DAYS")
            && let Ok(v) = v.parse()
        {
            self.cache.corpus_ttl_days = v;
        }
        if let Ok(v) = std::env::var("APP_LLM_CACHE_TTL_HOURS")
            && let Ok(v) = v.parse()
        {
            self.cache.llm_ttl_hours = v;
        }
        if let Ok(v) = std::env::var("APP_DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Ok(v) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("APP_LOG_FILE") {
            self.logging.file = Some(v);
        }
        if let Ok(v) = std::env::var("APP_TRANSLITERATION_MAX_VARIANTS")
            && let Ok(v) = v.parse()
        {
            self.pipeline.max_variants = v;
        }
        if let Ok(v) = std::env::var("APP_SEARCH_CONCURRENCY")
            && let Ok(v) = v.parse()
        {
            self.pipeline.search_concurrency = v;
        }
        if let Ok(v) = std::env::var("APP_CLARIFICATION_TTL_MINUTES")
            && let Ok(v) = v.parse()
        {
            self.pipeline.clarification_ttl_minutes = v;
        }
    }

    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(v) = &args.server_host {
            self.server.host = v.clone();
        }
        if let Some(v) = args.server_port {
            self.server.port = v;
        }
        if let Some(v) = &args.corpus_base_url {
            self.corpus.base_url = v.clone();
        }
        if let Some(v) = &args.llm_api_key {
            self.llm.api_key = Some(v.clone());
        }
        if let Some(v) = &args.llm_model {
            self.llm.model = v.clone();
        }
        if let Some(v) = &args.log_level {
            self.logging.level = v.clone();
        }
        if let Some(v) = args.cache_enabled {
            self.cache.enabled = v;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("server.port cannot be 0");
        }
        if self.corpus.base_url.is_empty() {
            anyhow::bail!("corpus.base_url cannot be empty");
        }
        if self.pipeline.max_variants == 0 {
            anyhow::bail!("pipeline.max_variants must be > 0");
        }
        if self.llm.api_key.is_none() {
            tracing::warn!(
                "no LLM API key configured (APP_LLM_API_KEY); UNDERSTAND/SEARCH will fall back \
                 to deterministic strategies and skip LLM-backed validation"
            );
        }
        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let candidates = ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];
        candidates.iter().find(|p| Path::new(p).exists()).map(|p| p.to_string())
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Exit code 2 ("missing required configuration") iff no LLM key is present.
    pub fn missing_required(&self) -> bool {
        self.llm.api_key.is_none()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080, cors_origins: "*".to_string() }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sefaria.org/api".to_string(),
            timeout_secs: 20,
            max_retries: 3,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.anthropic.com/v1".to_string(),
            api_key: None,
            model: "claude-sonnet".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, dir: "data/cache".to_string(), corpus_ttl_days: 30, llm_ttl_hours: 24 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: "data".to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,sugya_finder=debug".to_string(), file: Some("logs/sugya-finder.log".to_string()) }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_variants: 15, search_concurrency: 8, clarification_ttl_minutes: 30 }
    }
}
