use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use url::Url;

use heatmap_client::{
    ActivitySummary, AppConfig, AppError, AppResult, Clipboard, Dialog, HeatmapClient,
    MemoryUrlBar, ProfileOutcome, ProfileView, QueryParamStore, QueryParams, ShareOutcome,
    StatusIcon, StatusLine, StatusView, TileCoord, Toast, ToastId, ToastKind, Toaster,
};

#[derive(Parser)]
#[command(name = "heatmap-client", version, about = "Terminal front end for the personal heatmap")]
struct Cli {
    /// Session token; falls back to HEATMAP_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch processing status until the map is rebuilt.
    Status,
    /// Print the Strava authorize URL.
    LoginUrl,
    /// Print the overlay image URL for one tile.
    TileUrl {
        #[arg(long)]
        x: i64,
        #[arg(long)]
        y: i64,
        #[arg(long)]
        zoom: u8,
    },
    /// Show unsynced activities, optionally syncing them.
    Profile {
        #[arg(long)]
        sync: bool,
    },
    /// Create a share link for the map.
    Share,
}

struct Terminal;

impl StatusView for Terminal {
    fn show_status(&self, line: &StatusLine) {
        let icon = match line.icon {
            StatusIcon::Working => "...",
            StatusIcon::Complete => "ok ",
            StatusIcon::Warning => "!! ",
        };
        println!("[{icon}] {}", line.text);
    }
}

impl ProfileView for Terminal {
    fn set_message(&self, message: &str) {
        println!("{message}");
    }

    fn show_summary(&self, summary: Option<&ActivitySummary>) {
        if let Some(summary) = summary {
            println!("Total Strava Activities\tNewly Found Activities\tUnsynced Activities");
            println!("{}\t{}\t{}", summary.total, summary.new, summary.unsynced);
        }
    }

    fn set_sync_enabled(&self, _enabled: bool) {}
}

impl Dialog for Terminal {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

impl Toaster for Terminal {
    fn show(&self, _id: ToastId, toast: &Toast) {
        for line in &toast.lines {
            match toast.kind {
                ToastKind::Info => println!("{line}"),
                ToastKind::Error => eprintln!("{line}"),
            }
        }
    }

    fn dismiss(&self, _id: ToastId) {}
}

#[async_trait]
impl Clipboard for Terminal {
    async fn write_text(&self, _text: &str) -> AppResult<()> {
        Err(AppError::Clipboard("no clipboard in terminal sessions".into()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let token = cli.token.clone().or_else(|| {
        config
            .session_token
            .as_ref()
            .map(|secret| secret.expose_secret().to_string())
    });
    let origin = Url::parse(&config.base_url)
        .context("HEATMAP_BASE_URL is not a valid URL")?
        .origin()
        .ascii_serialization();
    let mut query = QueryParams::default();
    if let Some(token) = token {
        query.set("token", token);
    }
    let search = format!("?{}", query.to_query_string());

    let client = HeatmapClient::initialize(config)?;
    let url_bar = Arc::new(MemoryUrlBar::new(origin, search));
    let params = Arc::new(QueryParamStore::new(url_bar.clone()));
    let terminal = Arc::new(Terminal);

    match cli.command {
        Command::Status => {
            let poller = client.status_poller(&params, terminal)?;
            poller.run().await;
        }
        Command::LoginUrl => {
            client.login_widget(url_bar.clone(), url_bar.clone())?.login()?;
            if let Some(url) = url_bar.navigations().last() {
                println!("{url}");
            }
        }
        Command::TileUrl { x, y, zoom } => {
            println!("{}", client.tile_overlay().tile_url(TileCoord::new(x, y, zoom)));
        }
        Command::Profile { sync } => {
            let page = client.profile_page(
                params,
                terminal.clone(),
                terminal.clone(),
                url_bar.clone(),
            );
            let outcome = if sync { page.sync().await } else { page.load().await };
            match outcome {
                ProfileOutcome::Loaded(_) => {}
                ProfileOutcome::MissingToken => bail!("no session token; run login-url first"),
                ProfileOutcome::Unavailable => bail!("profile unavailable"),
            }
        }
        Command::Share => {
            let share = client.share_widget(url_bar.clone(), terminal.clone(), terminal);
            if share.share().await == ShareOutcome::Failed {
                bail!("could not create a share link");
            }
        }
    }

    Ok(())
}
