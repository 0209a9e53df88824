mod bot;
mod config;
mod error;
mod models;
mod service;
mod session;
mod sources;
mod utils;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::bot::Controller;
use crate::config::{AppConfig, Secrets};
use crate::models::{LEAGUES, find_league};
use crate::service::FixtureService;
use crate::session::SessionStore;
use crate::sources::{BrowserScraper, FootballDataApi, StaticPageScraper};

#[derive(Parser)]
#[command(name = "fixture-bot", about = "Football fixtures Telegram bot", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the Telegram bot (requires TELEGRAM_TOKEN and FOOTBALL_API_KEY)
    Run,

    /// Look up fixtures once and print them
    Fetch {
        /// League code, slug or exact display name (e.g. PD)
        #[arg(short, long)]
        league: String,

        /// Day to look up, YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List supported leagues and their sources
    Leagues,
}

fn build_service(config: &AppConfig, api_key: SecretString) -> Result<FixtureService> {
    let api = FootballDataApi::new(&config.api, api_key).context("Failed to build API source")?;
    let static_page = StaticPageScraper::new(&config.scraper).context("Failed to build page scraper")?;
    let browser = BrowserScraper::new(&config.browser);
    Ok(FixtureService::new(Arc::new(api), Arc::new(static_page), Arc::new(browser)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "fixture_bot=info,warn",
        1 => "fixture_bot=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Run => {
            let secrets = Secrets::from_env().context("Refusing to start")?;
            let service = Arc::new(build_service(&config, secrets.api_key)?);
            let store = Arc::new(SessionStore::new());
            let controller = Arc::new(Controller::new(store, service, LEAGUES));

            info!("Serving {} leagues", LEAGUES.len());
            bot::telegram::serve(&secrets.telegram_token, controller).await;
        }

        Command::Fetch { league, date } => {
            let Some(league) = find_league(&league) else {
                bail!("unknown league {:?}; see `fixture-bot leagues`", league);
            };
            let api_key = Secrets::api_key_from_env()?;
            let service = build_service(&config, api_key)?;
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            println!("{}", service.get_fixtures(league, date).await);
        }

        Command::Leagues => {
            println!("─────────────────────────────────────────────────────────────");
            for l in LEAGUES {
                println!("  {:<36} {:<15} {}", l.display_name, l.source_kind.to_string(), l.source_ref);
            }
            println!("─────────────────────────────────────────────────────────────");
        }
    }

    Ok(())
}
