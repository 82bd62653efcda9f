//! Full-text sync admin CLI.
//!
//! Manages full-text indices and runs text searches against the configured
//! search nodes. Settings come from the environment (or a `.env` file);
//! `--endpoints` overrides the node list.

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fulltext_rewriter::{rewrite_text_search_filter, text_search, Expression};
use fulltext_shared::TextSearchKind;
use fulltext_sync::{Dependencies, Settings, SyncError};

#[derive(Parser)]
#[command(name = "fulltext-sync")]
#[command(about = "Full-text index administration for the graph search engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Search nodes, comma separated (overrides FT_SEARCH_ENDPOINTS)
    #[arg(long, value_delimiter = ',', global = true)]
    endpoints: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an index with the full-text document mapping
    CreateIndex { index: String },
    /// Drop an index
    DropIndex { index: String },
    /// Delete every document of an index
    ClearIndex { index: String },
    /// Check whether an index exists
    IndexExists { index: String },
    /// Run a pattern query and print the matches as JSON lines
    Search {
        #[arg(long, value_enum, default_value = "prefix")]
        kind: KindArg,
        index: String,
        pattern: String,
    },
    /// Rewrite a text search predicate into equality filters
    Rewrite {
        #[arg(long, value_enum, default_value = "prefix")]
        kind: KindArg,
        /// Treat `from` as an edge type instead of a tag
        #[arg(long)]
        edge: bool,
        index: String,
        /// Tag or edge name
        from: String,
        prop: String,
        pattern: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Prefix,
    Fuzzy,
    Regexp,
    Wildcard,
}

impl From<KindArg> for TextSearchKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Prefix => TextSearchKind::Prefix,
            KindArg::Fuzzy => TextSearchKind::Fuzzy,
            KindArg::Regexp => TextSearchKind::Regexp,
            KindArg::Wildcard => TextSearchKind::Wildcard,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SyncError> {
    let mut settings = Settings::from_env()?;
    if !cli.endpoints.is_empty() {
        settings = settings.with_endpoints(&cli.endpoints)?;
    }
    let deps = Dependencies::new(settings)?;
    let adapter = deps.adapter.as_ref();

    match cli.command {
        Commands::CreateIndex { index } => adapter.create_index(&index).await?,
        Commands::DropIndex { index } => adapter.drop_index(&index).await?,
        Commands::ClearIndex { index } => adapter.clear_index(&index).await?,
        Commands::IndexExists { index } => {
            let exists = adapter.index_exists(&index).await?;
            info!(index = %index, exists = exists, "Checked index");
            println!("{}", exists);
        }
        Commands::Search {
            kind,
            index,
            pattern,
        } => {
            let expr = Expression::text_search(kind.into(), "", "", pattern);
            let result = text_search(&expr, &index, adapter, &deps.rewriter).await?;
            for item in &result.items {
                println!("{}", serde_json::to_string(item)?);
            }
            info!(index = %index, matches = result.len(), "Search completed");
        }
        Commands::Rewrite {
            kind,
            edge,
            index,
            from,
            prop,
            pattern,
        } => {
            let expr = Expression::text_search(kind.into(), from, prop, pattern);
            match rewrite_text_search_filter(&expr, edge, &index, adapter, &deps.rewriter).await? {
                Some(rewritten) => println!("{}", rewritten),
                None => println!("false"),
            }
        }
    }

    Ok(())
}
