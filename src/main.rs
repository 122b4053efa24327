use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sugya_finder::cache::{corpus_cache_dir, llm_cache_dir, FileCache};
use sugya_finder::clarification::ClarificationStore;
use sugya_finder::config::Config;
use sugya_finder::corpus::SefariaCorpusClient;
use sugya_finder::dictionary::WordDictionary;
use sugya_finder::handlers;
use sugya_finder::models;
use sugya_finder::services::llm::LLMClient;
use sugya_finder::validator::TermValidator;
use sugya_finder::{AppState, LLMServiceImpl};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::decipher::decipher_query,
        handlers::decipher::confirm_word,
        handlers::decipher::reject_word,
        handlers::search::search_query,
        handlers::search::search_clarify,
        handlers::health::health,
    ),
    components(schemas(
        models::DecipherResult,
        models::DecipherMethod,
        models::WordValidation,
        models::ValidationType,
        models::Variant,
        models::Pattern,
        models::Confidence,
        models::SearchResult,
        models::Source,
        models::SourceLevel,
        handlers::decipher::DecipherRequest,
        handlers::decipher::ConfirmWordRequest,
        handlers::decipher::RejectWordRequest,
        handlers::decipher::OkResponse,
        handlers::search::SearchRequest,
        handlers::search::SearchClarifyRequest,
        handlers::health::HealthResponse,
        handlers::health::Versions,
        handlers::health::CacheStatsReport,
        models::CacheStats,
    )),
    tags(
        (name = "Decipher", description = "Transliteration and ambiguity resolution"),
        (name = "Search", description = "Sugya source retrieval"),
        (name = "System", description = "Service health"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);
    let registry = tracing_subscriber::registry().with(log_filter);

    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path.parent().and_then(|p| p.to_str()).unwrap_or("logs");
        let file_name = log_path.file_name().and_then(|n| n.to_str()).unwrap_or("sugya-finder.log");
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer())
            .init();
        std::mem::forget(_guard);
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("sugya-finder starting up");

    if config.missing_required() {
        tracing::error!("missing required configuration (no LLM API key); refusing to start");
        std::process::exit(2);
    }

    let dictionary = Arc::new(WordDictionary::load(&config.storage.data_dir)?);
    tracing::info!("word dictionary loaded");

    let validator_corpus_cache: Arc<dyn sugya_finder::cache::Cache<serde_json::Value>> = if config.cache.enabled {
        Arc::new(FileCache::new(
            corpus_cache_dir(std::path::Path::new(&config.cache.dir)),
            chrono::Duration::days(config.cache.corpus_ttl_days),
            "corpus",
            true,
        ))
    } else {
        Arc::new(sugya_finder::cache::NullCache)
    };

    let llm_cache: Arc<dyn sugya_finder::cache::Cache<serde_json::Value>> = if config.cache.enabled {
        Arc::new(FileCache::new(
            llm_cache_dir(std::path::Path::new(&config.cache.dir)),
            chrono::Duration::hours(config.cache.llm_ttl_hours),
            "llm",
            true,
        ))
    } else {
        Arc::new(sugya_finder::cache::NullCache)
    };

    let corpus: Arc<dyn sugya_finder::corpus::CorpusClient> = Arc::new(SefariaCorpusClient::new(
        config.corpus.base_url.clone(),
        config.corpus.timeout_secs,
        config.corpus.max_retries,
        validator_corpus_cache.clone(),
    ));

    let validator = Arc::new(TermValidator::new(corpus.clone(), config.pipeline.search_concurrency));

    let llm_client = LLMClient::new(
        config.llm.api_base.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
        config.llm.timeout_secs,
    );
    let llm: Arc<dyn sugya_finder::LLMService> = Arc::new(LLMServiceImpl::new(llm_client, llm_cache.clone()));

    let clarifications = Arc::new(ClarificationStore::new(config.pipeline.clarification_ttl_minutes));

    let state = Arc::new(AppState {
        config: Arc::new(config.clone()),
        dictionary,
        validator,
        corpus,
        llm,
        clarifications,
        corpus_cache: validator_corpus_cache,
        llm_cache,
    });

    let app = Router::new()
        .route("/decipher", post(handlers::decipher::decipher_query))
        .route("/decipher/confirm", post(handlers::decipher::confirm_word))
        .route("/decipher/reject", post(handlers::decipher::reject_word))
        .route("/search", post(handlers::search::search_query))
        .route("/search/clarify", post(handlers::search::search_clarify))
        .route("/health", get(handlers::health::health))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server listening on http://{addr}");
    tracing::info!("api documentation available at http://{addr}/api-docs");

    axum::serve(listener, app).await?;

    Ok(())
}
