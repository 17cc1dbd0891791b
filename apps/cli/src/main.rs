use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, DEFAULT_SETTINGS_FILE},
    fallback, HttpTarotApi, SessionController, SessionOptions, TarotApi,
};
use shared::domain::SpreadId;
use tracing_subscriber::EnvFilter;
use views::{history, CardCategory, CardLibrary, HistoryFilter, HistoryView, SpreadGuide};

mod render;
mod wizard;

#[derive(Parser, Debug)]
#[command(name = "tarot", about = "Tarot reading client")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:8011/api. Overrides settings.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the reading wizard. Missing answers are prompted for on stdin.
    Read {
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        spread: Option<String>,
        /// Do not ask the backend to store the reading.
        #[arg(long)]
        no_save: bool,
        /// Seed for the placeholder draw.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List spreads with their position guides.
    Spreads,
    /// Show one spread in detail.
    Spread { id: String },
    Cards {
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    History {
        /// `all`, `recent`, or a category such as `love`.
        #[arg(long, default_value = "all")]
        filter: String,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Stats,
    Recommend { question: String },
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config, |key| std::env::var(key).ok());
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let http = HttpTarotApi::from_settings(&settings).context("invalid api settings")?;
    tracing::info!(base_url = http.base_url(), "tarot: using backend");
    let api: Arc<dyn TarotApi> = Arc::new(http);

    match cli.command {
        Command::Read {
            question,
            spread,
            no_save,
            seed,
        } => {
            let mut options = SessionOptions::from_settings(&settings);
            options.save_readings = options.save_readings && !no_save;
            options.seed = seed;
            let controller = SessionController::new_with_options(api, options);
            wizard::run(&controller, question, spread.map(SpreadId::from)).await?;
        }
        Command::Spreads => {
            let guide = SpreadGuide::load(api.as_ref()).await;
            for entry in guide.entries() {
                render::print_guide_entry(entry);
            }
        }
        Command::Spread { id } => {
            let id = SpreadId::from(id);
            let guide = SpreadGuide::load(api.as_ref()).await;
            let entry = guide
                .detail(api.as_ref(), &id)
                .await
                .with_context(|| format!("unknown spread {id}"))?;
            render::print_guide_entry(&entry);
        }
        Command::Cards { category, search } => {
            let category = category.parse::<CardCategory>()?;
            let library = CardLibrary::load(api.as_ref()).await;
            render::print_library(&library.filter(category, &search));
        }
        Command::History {
            filter,
            search,
            page,
        } => {
            let filter = filter.parse::<HistoryFilter>()?;
            let now = Utc::now();
            let history = HistoryView::load(api.as_ref()).await;
            let records = history.filtered(&filter, &search, now);
            render::print_history(&history.stats(now), &HistoryView::page(&records, page));
        }
        Command::Stats => {
            let (statistics, source) = history::load_statistics(api.as_ref()).await;
            render::print_statistics(&statistics, source);
        }
        Command::Recommend { question } => {
            let recommendation = match api.recommend_spread(&question).await {
                Ok(recommendation) => recommendation,
                Err(err) => {
                    tracing::warn!(error = %err, "tarot: recommendation failed; using local heuristic");
                    fallback::recommend_locally(&question)
                }
            };
            println!("{} ({})", recommendation.spread_id, recommendation.reason);
        }
        Command::Health => {
            let health = api.check_health().await.context("backend unreachable")?;
            println!(
                "healthy={} {}",
                health.healthy,
                health.message.unwrap_or_default()
            );
        }
    }

    Ok(())
}
