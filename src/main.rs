use anyhow::{Context, Result};
use clap::Parser;
use guestbook::config::Config;
use guestbook::feed::{FeedController, ScrollProximity};
use guestbook::near::{Guestbook, RpcClient, SignerClient};
use guestbook::util::sanitize_line;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

mod app;
mod ui;

use app::{App, AppEvent};

/// Get the config directory path (~/.config/guestbook/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("guestbook"))
}

#[derive(Parser, Debug)]
#[command(name = "guestbook", about = "Terminal guest book for a NEAR contract")]
struct Args {
    /// Config file (default: ~/.config/guestbook/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// NEAR JSON-RPC endpoint
    #[arg(long, value_name = "URL")]
    rpc_url: Option<String>,

    /// Guest book contract account id
    #[arg(long, value_name = "ACCOUNT")]
    contract: Option<String>,

    /// Messages fetched per page
    #[arg(long, value_name = "N")]
    page_size: Option<u64>,

    /// Print the latest page to stdout and exit
    #[arg(long)]
    print: bool,
}

/// Log to stderr in print mode; in TUI mode the terminal belongs to the UI,
/// so logs go to a file in the config directory.
fn init_tracing(print_mode: bool, config_dir: &std::path::Path) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if print_mode {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    let log_path = config_dir.join("guestbook.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}

fn build_source(config: &Config) -> Result<Guestbook> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("guestbook/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let rpc = RpcClient::new(
        client.clone(),
        &config.rpc_url,
        config.contract_id.clone(),
        config.request_timeout(),
    )
    .with_context(|| format!("Invalid rpc_url '{}'", config.rpc_url))?;

    let signer = match (&config.account_id, &config.signer_url) {
        (Some(account_id), Some(signer_url)) => Some(
            SignerClient::new(
                client,
                signer_url,
                account_id.clone(),
                config.resolve_signer_token(),
                config.request_timeout(),
            )
            .with_context(|| format!("Invalid signer_url '{}'", signer_url))?,
        ),
        (Some(account_id), None) => {
            tracing::warn!(account = %account_id, "account_id set without signer_url, posting disabled");
            None
        }
        _ => None,
    };

    Ok(Guestbook::new(rpc, signer))
}

async fn print_latest(controller: &FeedController<Guestbook>) -> Result<()> {
    controller
        .load_latest()
        .await
        .context("Failed to load messages")?;
    for message in controller.messages().iter() {
        let badge = if message.premium { " *" } else { "" };
        println!(
            "#{} {}{}: {}",
            message.index,
            sanitize_line(&message.sender),
            badge,
            sanitize_line(&message.text)
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_dir = get_config_dir()?;
    init_tracing(args.print, &config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = rpc_url;
    }
    if let Some(contract) = args.contract {
        config.contract_id = contract;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size.max(1);
    }
    tracing::debug!(?config, "Effective configuration");

    let source = build_source(&config)?;
    let controller = Arc::new(FeedController::new(source, config.page_size));

    if args.print {
        return print_latest(&controller).await;
    }

    let mut app = App::new(
        Arc::clone(&controller),
        ScrollProximity::new(config.scroll_threshold),
    );
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;
    Ok(())
}
