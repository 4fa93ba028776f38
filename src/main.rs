//! reelfeed - page through a reels feed from the terminal
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use reelfeed::auth::{CredentialStore, EncryptedFileStore};
use reelfeed::{Config, FeedLoader, FeedSnapshot, HttpFeedClient, Outcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match parse_args()? {
        Command::Feed { pages } => feed_cli(pages).await,
        Command::Watch { interval } => watch_cli(interval).await,
        Command::Login { token } => login(&token),
        Command::Logout => logout(),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("reelfeed {}", reelfeed::VERSION);
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Feed { pages: usize },
    Watch { interval: Option<u64> },
    Login { token: String },
    Logout,
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    let flag = |names: &[&str]| {
        args.iter()
            .position(|a| names.contains(&a.as_str()))
            .and_then(|i| args.get(i + 1))
    };

    match args.get(1).map(String::as_str) {
        None => Ok(Command::Feed { pages: 1 }),
        Some("-h" | "--help" | "help") => Ok(Command::Help),
        Some("-v" | "--version" | "version") => Ok(Command::Version),

        Some("feed") => {
            let pages = match flag(&["--pages", "-p"]) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("Invalid page count: {raw}"))?,
                None => 1,
            };
            Ok(Command::Feed { pages })
        }

        Some("watch") => {
            let interval = match flag(&["--interval", "-i"]) {
                Some(raw) => Some(
                    raw.parse()
                        .with_context(|| format!("Invalid interval: {raw}"))?,
                ),
                None => None,
            };
            Ok(Command::Watch { interval })
        }

        Some("login") => {
            let token = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing token"))?
                .clone();
            Ok(Command::Login { token })
        }

        Some("logout") => Ok(Command::Logout),

        Some(other) => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'reelfeed --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"reelfeed {} - page through a reels feed

USAGE:
    reelfeed                           Show the first page
    reelfeed [COMMAND]

COMMANDS:
    feed [--pages N]                   Load the feed and follow N pages
    watch [--interval SECS]            Refresh the feed until Ctrl-C
    login <token>                      Store the bearer token
    logout                             Forget the bearer token
    help                               Show this help
    version                            Show version

CONFIG:
    {}

Set RUST_LOG=debug for request logging."#,
        reelfeed::VERSION,
        config_path
    );
}

fn build_loader(config: &Config) -> Result<FeedLoader<HttpFeedClient, EncryptedFileStore>> {
    Ok(FeedLoader::new(
        HttpFeedClient::from_config(config)?,
        EncryptedFileStore::open()?,
        config.feed_url()?,
        config.token_key.clone(),
    ))
}

async fn feed_cli(pages: usize) -> Result<()> {
    let config = Config::load()?;
    let loader = build_loader(&config)?;

    if loader.load().await == Outcome::Failed {
        return report_error(&loader.snapshot());
    }

    for _ in 1..pages {
        match loader.fetch_more().await {
            Outcome::Loaded { .. } => {}
            Outcome::Failed => return report_error(&loader.snapshot()),
            Outcome::Skipped | Outcome::Discarded => break,
        }
    }

    print_feed(&loader.snapshot());
    Ok(())
}

async fn watch_cli(interval: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let loader = build_loader(&config)?;

    let secs = interval.unwrap_or(config.refresh_interval_secs);
    if secs == 0 {
        loader.refresh().await;
        print_feed(&loader.snapshot());
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Ctrl-C is honoured while waiting for the tick and while a refresh is in flight
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }

        tokio::select! {
            _ = loader.refresh() => {
                let snapshot = loader.snapshot();
                match snapshot.error_reason() {
                    Some(reason) => eprintln!("Refresh failed: {reason}"),
                    None => print_feed(&snapshot),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    loader.close();
    Ok(())
}

fn report_error(snapshot: &FeedSnapshot) -> Result<()> {
    let reason = snapshot
        .error_reason()
        .unwrap_or_else(|| "unknown error".to_string());
    anyhow::bail!("{reason}")
}

fn print_feed(snapshot: &FeedSnapshot) {
    for item in &snapshot.items {
        let likes = snapshot.likes.get(&item.id).copied().unwrap_or(0);
        let follow = if snapshot.following.get(&item.id).copied().unwrap_or(false) {
            " ✓"
        } else {
            ""
        };
        println!(
            "#{:<8} ♥ {:<6} {:>4}{}  {}",
            item.id.to_string(),
            likes,
            item.relative_time(),
            follow,
            item.preview(60)
        );
    }

    let more = if snapshot.has_more { ", more available" } else { "" };
    println!("{} items{}", snapshot.items.len(), more);
}

fn login(token: &str) -> Result<()> {
    let config = Config::load()?;
    let store = EncryptedFileStore::open()?;
    store.set(&config.token_key, token)?;
    println!("Token saved to {}", store.path().display());
    Ok(())
}

fn logout() -> Result<()> {
    let config = Config::load()?;
    EncryptedFileStore::open()?.delete(&config.token_key)?;
    println!("Token removed");
    Ok(())
}
