use anyhow::{Context, Result};
use autoroi::bot::{self, api::TelegramApi, dispatch::Dispatcher, render};
use autoroi::config::Config;
use autoroi::feed::http::HttpListingSource;
use autoroi::feed::ListingSource;
use autoroi::pipeline::RankingPipeline;
use autoroi::session::SessionStore;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "autoroi=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let once = args.iter().any(|arg| arg == "--once");
    let json = args.iter().any(|arg| arg == "--json");
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)?;
    let source = HttpListingSource::new(&config.search)?;
    let pipeline = RankingPipeline::new(source, &config)?;

    if once {
        return run_once(&pipeline, &config, json).await;
    }

    // Load saved credentials from .env (real env vars take precedence)
    Config::load_env_file();
    let token = Config::telegram_token()?;
    let allowed_chat = Config::telegram_chat_id()?;

    let api = TelegramApi::new(&config.telegram.api_base, &token, config.telegram.poll_timeout_s)?;
    let me = api.get_me().await.context("Telegram token check failed")?;
    tracing::info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        restricted_to_chat = ?allowed_chat,
        "connected to Telegram, polling for updates"
    );

    let sessions = SessionStore::new(config.defaults.clone());
    let mut dispatcher = Dispatcher::new(sessions, pipeline, allowed_chat);
    bot::run(&api, &mut dispatcher).await
}

/// Rank once with the configured default criteria and print to stdout.
async fn run_once<S: ListingSource>(pipeline: &RankingPipeline<S>, config: &Config, json: bool) -> Result<()> {
    let result = pipeline.rank(&config.defaults).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.listings)?);
        return Ok(());
    }

    if let Some(reason) = &result.unavailable {
        println!("No listings found: {}", reason);
        return Ok(());
    }
    if result.is_empty() {
        println!("No listings found.");
        return Ok(());
    }

    println!(
        "Top {} for {} {} (markup {} €, fees {} € + {} €)",
        result.listings.len(),
        config.defaults.make,
        config.defaults.model,
        render::group_thousands(pipeline.resale_markup()),
        render::group_thousands(config.defaults.import_fee),
        render::group_thousands(config.defaults.sale_fee),
    );
    for (i, ranked) in result.listings.iter().enumerate() {
        println!(
            "{:>2}. {:>6.1}%  {:>10} €  {}  {}",
            i + 1,
            ranked.roi_percent,
            render::group_thousands(ranked.listing.price),
            ranked.listing.title,
            ranked.listing.link,
        );
    }
    Ok(())
}
