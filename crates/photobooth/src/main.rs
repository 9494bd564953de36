//! photobooth - drive a remote photo capture service from the terminal
//!
//! Subcommands:
//! - `photobooth session` - run a live capture session until Ctrl-C
//! - `photobooth gallery` - list (or download) captured images
//! - `photobooth status` - fetch one status snapshot
//! - `photobooth start` / `stop` - single session requests
//! - `photobooth config` - show the effective configuration

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use boothconf::{BoothConfig, ConfigSources};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use photobooth::types::{decode_frame, frame_data_url};
use photobooth::{
    telemetry, BoothState, CallSite, CaptureBackend, CapturedImage, HttpBackend, LiveView,
    PhotoBooth,
};

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Drive a remote photo booth capture service")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./photobooth.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Capture service base URL (overrides config)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session, show live status, and stop on Ctrl-C
    Session {
        /// Stop after this many new photos
        #[arg(short, long)]
        max_captures: Option<usize>,
    },

    /// Show the captured images
    Gallery {
        /// Print the gallery as JSON
        #[arg(long)]
        json: bool,

        /// Download every image into the configured download directory
        #[arg(long)]
        download: bool,
    },

    /// Fetch a single status snapshot
    Status {
        /// Write the decoded preview frame to this file
        #[arg(long)]
        save_frame: Option<PathBuf>,
    },

    /// Ask the service to start a capture session
    Start,

    /// Ask the service to stop the capture session
    Stop,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = BoothConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(url) = cli.url {
        config.backend.url = url.trim_end_matches('/').to_string();
    }

    telemetry::init(&config.telemetry.log_level);

    match cli.command {
        Commands::Session { max_captures } => run_session(&config, max_captures).await?,
        Commands::Gallery { json, download } => show_gallery(&config, json, download).await?,
        Commands::Status { save_frame } => show_status(&config, save_frame.as_deref()).await?,
        Commands::Start => {
            let backend = HttpBackend::new(&config.backend.url);
            backend
                .start_capture()
                .await
                .context(CallSite::Start.user_message())?;
            println!("{} capture session started", "✓".green());
        }
        Commands::Stop => {
            let backend = HttpBackend::new(&config.backend.url);
            backend
                .stop_capture()
                .await
                .context(CallSite::Stop.user_message())?;
            println!("{} capture session stopped", "✓".green());
        }
        Commands::Config => show_config(&config, &sources),
    }

    Ok(())
}

/// How a live session ended.
enum SessionEnd {
    Interrupted,
    CaptureLimit,
    Lost,
}

async fn run_session(config: &BoothConfig, max_captures: Option<usize>) -> Result<()> {
    let booth = PhotoBooth::connect(config);

    // The initial listing is the baseline for counting new photos, so a
    // session cannot start without it.
    if !booth.init().await {
        return Err(state_error(&booth.snapshot()));
    }
    let mut tracker = CaptureTracker::new(&booth.snapshot().images);

    let mut updates = booth.subscribe();
    if !booth.start().await {
        return Err(state_error(&booth.snapshot()));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Waiting for the camera...");

    let mut captures = 0usize;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let end = loop {
        tokio::select! {
            _ = &mut ctrl_c => break SessionEnd::Interrupted,
            changed = updates.changed() => {
                if changed.is_err() {
                    break SessionEnd::Lost;
                }
                let state = updates.borrow_and_update().clone();

                for image in tracker.observe(&state.images) {
                    captures += 1;
                    spinner.println(format!(
                        "{} {} {}",
                        "📸".bold(),
                        image.timestamp.bright_green(),
                        image.url.dimmed()
                    ));
                }

                match state.live_view() {
                    Some(live) => spinner.set_message(render_live(&live)),
                    None => break SessionEnd::Lost,
                }

                if max_captures.is_some_and(|max| captures >= max) {
                    break SessionEnd::CaptureLimit;
                }
            }
        }
    };

    match end {
        SessionEnd::Lost => {
            spinner.finish_and_clear();
            booth.shutdown().await;
            Err(state_error(&booth.snapshot()))
        }
        SessionEnd::Interrupted | SessionEnd::CaptureLimit => {
            spinner.set_message("Stopping...");
            let stopped = booth.stop().await;
            spinner.finish_and_clear();

            let state = booth.snapshot();
            if !stopped {
                return Err(state_error(&state));
            }
            println!(
                "{} {} ({} new photo{})",
                "✓".green(),
                state.status,
                captures,
                if captures == 1 { "" } else { "s" }
            );
            Ok(())
        }
    }
}

/// Ids already in the gallery, so each listing reports only new photos.
struct CaptureTracker {
    seen: HashSet<String>,
}

impl CaptureTracker {
    fn new(baseline: &[CapturedImage]) -> Self {
        Self {
            seen: baseline.iter().map(|image| image.id.clone()).collect(),
        }
    }

    /// Images in `images` not reported before, in listing order.
    fn observe<'a>(&mut self, images: &'a [CapturedImage]) -> Vec<&'a CapturedImage> {
        images
            .iter()
            .filter(|image| self.seen.insert(image.id.clone()))
            .collect()
    }
}

fn render_live(live: &LiveView<'_>) -> String {
    match live.countdown {
        Some(n) => format!("{} {}", live.status, format!("[{}]", n).bright_yellow().bold()),
        None => live.status.to_string(),
    }
}

async fn show_gallery(config: &BoothConfig, json: bool, download: bool) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend.url));
    let booth = PhotoBooth::new(backend.clone());

    if !booth.init().await {
        return Err(state_error(&booth.snapshot()));
    }
    let images = booth.snapshot().images;

    if json {
        println!("{}", serde_json::to_string_pretty(&images)?);
    } else if images.is_empty() {
        println!("{}", "No photos yet".dimmed());
    } else {
        for image in &images {
            println!(
                "{}  {}  {}",
                image.id.bright_cyan(),
                image.timestamp,
                backend.resolve_url(&image.url).dimmed()
            );
        }
    }

    if download {
        let dir = &config.gallery.download_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        for image in &images {
            let bytes = backend
                .download_image(image)
                .await
                .with_context(|| format!("Failed to download {}", image.id))?;
            let path = dir.join(download_file_name(image));
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "↓".green(), path.display());
        }
    }

    Ok(())
}

/// File name for a downloaded image: the last URL segment, else the id.
fn download_file_name(image: &CapturedImage) -> String {
    let path = image.url.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{}.jpg", image.id),
    }
}

async fn show_status(config: &BoothConfig, save_frame: Option<&Path>) -> Result<()> {
    let backend = HttpBackend::new(&config.backend.url);
    let status = backend
        .capture_status()
        .await
        .context(CallSite::Poll.user_message())?;

    println!("active:    {}", status.active);
    println!("status:    {}", status.status.bright_cyan());
    match status.countdown {
        Some(n) => println!("countdown: {}", n),
        None => println!("countdown: {}", "-".dimmed()),
    }
    match &status.frame {
        Some(frame) => println!("frame:     {}", frame_summary(frame, &config.backend.frame_mime)),
        None => println!("frame:     {}", "-".dimmed()),
    }

    if let Some(path) = save_frame {
        let frame = status
            .frame
            .as_deref()
            .context("Snapshot carries no preview frame")?;
        let bytes = decode_frame(frame)?;
        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} frame written to {}", "✓".green(), path.display());
    }

    Ok(())
}

/// Data-URL prefix and payload size of a preview frame.
fn frame_summary(frame: &str, mime: &str) -> String {
    let url = frame_data_url(frame, mime);
    let prefix_len = url.len() - frame.len();
    format!("{}... ({} base64 chars)", &url[..prefix_len], frame.len())
}

fn show_config(config: &BoothConfig, sources: &ConfigSources) {
    if sources.files.is_empty() {
        println!("# No config files found, using defaults");
    }
    for file in &sources.files {
        println!("# Loaded: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# Env override: {}", var);
    }
    println!();
    print!("{}", config.to_toml());
}

fn state_error(state: &BoothState) -> anyhow::Error {
    anyhow!(state
        .error
        .clone()
        .unwrap_or_else(|| "The capture session ended unexpectedly".to_string()))
}
