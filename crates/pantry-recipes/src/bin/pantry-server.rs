//! HTTP server for the recipe assistant

use anyhow::Context;
use clap::Parser;
use pantry_llm::providers::{OpenAIConfig, OpenAIProvider};
use pantry_recipes::server::{self, AppState};
use pantry_recipes::{DatasetSource, RecipeBook, RecipeConfig, build_orchestrator};
use pantry_utils::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pantry-server")]
#[command(about = "Answer natural-language questions about a recipe dataset", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Dataset location: local path, http(s) URL or gs://bucket/object
    #[arg(long)]
    dataset: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long)]
    api_base: Option<String>,

    /// Directory holding the browser client
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Maximum rounds of tool execution per question
    #[arg(long)]
    max_tool_rounds: Option<usize>,

    /// Recipes included in a single tool result
    #[arg(long)]
    max_results: Option<usize>,

    /// Log line format (text or json)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Load the dataset, print a summary and exit
    #[arg(long)]
    check: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<RecipeConfig> {
        let mut builder = RecipeConfig::builder();
        if let Some(bind) = self.bind {
            builder = builder.bind(bind);
        }
        if let Some(dataset) = self.dataset {
            builder = builder.dataset(dataset);
        }
        if let Some(model) = self.model {
            builder = builder.model(model);
        }
        if let Some(api_base) = self.api_base {
            builder = builder.api_base(api_base);
        }
        if let Some(dir) = self.static_dir {
            builder = builder.static_dir(dir);
        }
        if let Some(rounds) = self.max_tool_rounds {
            builder = builder.max_tool_rounds(rounds);
        }
        if let Some(max_results) = self.max_results {
            builder = builder.max_results(max_results);
        }
        Ok(builder.with_env()?.build()?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = pantry_utils::Config::from_env()?;
    if let Some(format) = args.log_format {
        settings.log_format = format;
    }
    pantry_utils::init_tracing(settings.log_format);

    let check = args.check;
    let config = args.into_config()?;
    info!(
        environment = %settings.environment,
        dataset = %config.dataset,
        model = %config.model,
        "Starting pantry-server"
    );

    let client = reqwest::Client::new();
    let source: DatasetSource = config.dataset.parse()?;
    let book = Arc::new(
        RecipeBook::load(&source, &client)
            .await
            .with_context(|| format!("failed to load dataset from {source}"))?,
    );

    if check {
        println!("Dataset: {source}");
        println!("Recipes: {}", book.len());
        println!("Categories: {}", book.categories().len());
        return Ok(());
    }

    let api_key = config
        .api_key
        .clone()
        .context("no API key configured (set PANTRY_API_KEY or GEMINI_API_KEY)")?;
    let provider = OpenAIProvider::with_config(
        OpenAIConfig::new(api_key)
            .with_api_base(&config.api_base)
            .with_timeout(config.model_timeout.as_secs().max(1)),
    )?;

    let orchestrator = build_orchestrator(Arc::clone(&book), Arc::new(provider), &config)?;
    let tools = orchestrator
        .tool_definitions()
        .iter()
        .map(|t| t.name.clone())
        .collect();
    let state = AppState::new(Arc::new(orchestrator), book.len(), tools);
    let app = server::router(state, Some(&config.static_dir));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    server::serve(listener, app).await?;

    info!("pantry-server stopped");
    Ok(())
}
