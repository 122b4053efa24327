//! Interactive console for the DECIPHER -> UNDERSTAND -> SEARCH pipeline.
//!
//! A thin CLI collaborator: it builds the same core dependencies the HTTP
//! server does and drives them directly, with no network surface of its
//! own. Exit codes follow the documented convention: 0 success, 1 general
//! failure, 2 missing required configuration, 130 user interrupt.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sugya_finder::cache::{corpus_cache_dir, llm_cache_dir, Cache, FileCache, NullCache};
use sugya_finder::clarification::ClarificationStore;
use sugya_finder::config::Config;
use sugya_finder::corpus::{CorpusClient, SefariaCorpusClient};
use sugya_finder::decipher::{self, DecipherDeps};
use sugya_finder::dictionary::WordDictionary;
use sugya_finder::search::{self, SearchDeps};
use sugya_finder::services::llm::LLMClient;
use sugya_finder::understand;
use sugya_finder::validator::TermValidator;
use sugya_finder::LLMServiceImpl;

#[derive(Parser)]
#[command(name = "console")]
#[command(about = "Interactive console for the sugya source-finder pipeline")]
#[command(version)]
struct Cli {
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run DECIPHER on a query and print the result as JSON.
    Decipher { query: String },
    /// Run the full DECIPHER -> UNDERSTAND -> SEARCH pipeline and print the result as JSON.
    Search { query: String },
    /// Read-eval-print loop: each line is run through the full pipeline.
    Repl,
}

struct Deps {
    dictionary: Arc<WordDictionary>,
    validator: Arc<TermValidator>,
    corpus: Arc<dyn CorpusClient>,
    llm: Arc<dyn sugya_finder::LLMService>,
    clarifications: Arc<ClarificationStore>,
    max_variants: usize,
    search_concurrency: usize,
}

impl Deps {
    fn build(config: &Config) -> anyhow::Result<Self> {
        let dictionary = Arc::new(WordDictionary::load(&config.storage.data_dir)?);

        let corpus_cache: Arc<dyn Cache<serde_json::Value>> = if config.cache.enabled {
            Arc::new(FileCache::new(
                corpus_cache_dir(std::path::Path::new(&config.cache.dir)),
                chrono::Duration::days(config.cache.corpus_ttl_days),
                "corpus",
                true,
            ))
        } else {
            Arc::new(NullCache)
        };
        let llm_cache: Arc<dyn Cache<serde_json::Value>> = if config.cache.enabled {
            Arc::new(FileCache::new(
                llm_cache_dir(std::path::Path::new(&config.cache.dir)),
                chrono::Duration::hours(config.cache.llm_ttl_hours),
                "llm",
                true,
            ))
        } else {
            Arc::new(NullCache)
        };

        let corpus: Arc<dyn CorpusClient> = Arc::new(SefariaCorpusClient::new(
            config.corpus.base_url.clone(),
            config.corpus.timeout_secs,
            config.corpus.max_retries,
            corpus_cache,
        ));
        let validator = Arc::new(TermValidator::new(corpus.clone(), config.pipeline.search_concurrency));

        let llm_client = LLMClient::new(
            config.llm.api_base.clone(),
            config.llm.api_key.clone(),
            config.llm.model.clone(),
            config.llm.timeout_secs,
        );
        let llm: Arc<dyn sugya_finder::LLMService> = Arc::new(LLMServiceImpl::new(llm_client, llm_cache));

        Ok(Self {
            dictionary,
            validator,
            corpus,
            llm,
            clarifications: Arc::new(ClarificationStore::new(config.pipeline.clarification_ttl_minutes)),
            max_variants: config.pipeline.max_variants,
            search_concurrency: config.pipeline.search_concurrency,
        })
    }

    fn decipher_deps(&self) -> DecipherDeps<'_> {
        DecipherDeps { dictionary: &self.dictionary, validator: &self.validator, max_variants: self.max_variants }
    }

    fn search_deps(&self) -> SearchDeps<'_> {
        SearchDeps {
            llm: self.llm.as_ref(),
            corpus: self.corpus.as_ref(),
            clarifications: &self.clarifications,
            fetch_concurrency: self.search_concurrency,
        }
    }

    async fn run_pipeline(&self, query: &str) -> anyhow::Result<serde_json::Value> {
        let deciphered = decipher::decipher(&self.decipher_deps(), query).await;
        if !deciphered.success || deciphered.is_pure_english || deciphered.needs_validation {
            return Ok(serde_json::to_value(&deciphered)?);
        }
        let strategy =
            understand::build_strategy(self.llm.as_ref(), self.corpus.as_ref(), query, &deciphered.hebrew_terms).await?;
        let result = search::run_search(&self.search_deps(), query, deciphered.hebrew_terms.clone(), strategy).await?;
        Ok(serde_json::to_value(&result)?)
    }
}

async fn real_main() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    let config = Config::load_with_path(cli.config.as_deref())?;

    if config.missing_required() {
        eprintln!("missing required configuration (no LLM API key)");
        return Ok(2);
    }

    let deps = Deps::build(&config)?;

    match cli.command {
        Command::Decipher { query } => {
            let result = decipher::decipher(&deps.decipher_deps(), &query).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Search { query } => {
            let value = deps.run_pipeline(&query).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Repl => {
            run_repl(&deps).await?;
        }
    }

    Ok(0)
}

async fn run_repl(deps: &Deps) -> anyhow::Result<()> {
    use std::io::Write;

    println!("sugya source-finder console. type a query, or \"quit\" to exit.");
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let read = tokio::select! {
            n = tokio::task::spawn_blocking(|| {
                let mut buf = String::new();
                let n = std::io::stdin().read_line(&mut buf).unwrap_or(0);
                (n, buf)
            }) => n?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                std::process::exit(130);
            }
        };

        let (n, buf) = read;
        if n == 0 {
            break;
        }
        let query = buf.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            break;
        }

        match deps.run_pipeline(query).await {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let code = tokio::select! {
        result = real_main() => match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
        _ = tokio::signal::ctrl_c() => 130,
    };
    std::process::exit(code);
}
