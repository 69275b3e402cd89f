use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::{BasicAuth, BrowserEngine, Config, OutputFormat, Viewport};

#[derive(Parser, Debug)]
#[command(name = "webpic")]
#[command(about = "A CLI tool to take automated screenshots of webpages")]
#[command(version)]
pub struct Cli {
    /// Base address the URLs are captured against, e.g. https://example.com
    pub hostname: String,

    /// Directory screenshots are written to, created if missing
    pub savepath: PathBuf,

    /// URLs to capture, relative to the hostname
    pub urls: Vec<String>,

    /// File containing URLs separated by newlines; overrides positional URLs
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Browser engine to use
    #[arg(short, long, value_enum, default_value_t = BrowserEngine::Chromium)]
    pub browser: BrowserEngine,

    /// Viewport size as WIDTH HEIGHT
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [1280, 720])]
    pub viewport: Vec<u32>,

    /// Time to wait before taking a screenshot, in seconds
    #[arg(short, long, default_value_t = 0)]
    pub delay: u64,

    /// Screenshot format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Basic HTTP authentication as USERNAME PASSWORD
    #[arg(short, long, num_args = 2, value_names = ["USERNAME", "PASSWORD"])]
    pub auth: Option<Vec<String>>,

    /// Run the browser in headless mode (default)
    #[arg(long, overrides_with = "headful")]
    pub headless: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headful: bool,

    /// Custom User-Agent string
    #[arg(short = 'u', long)]
    pub user_agent: Option<String>,

    /// Number of attempts if a screenshot fails
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Number of concurrent screenshots to capture
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrent: u32,

    /// Increase verbosity of output (repeatable)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn to_config(&self) -> Config {
        Config {
            hostname: self.hostname.clone(),
            output_dir: self.savepath.clone(),
            engine: self.browser,
            viewport: Viewport {
                width: self.viewport[0],
                height: self.viewport[1],
            },
            settle_delay: Duration::from_secs(self.delay),
            format: self.format,
            basic_auth: self.auth.as_ref().map(|pair| BasicAuth {
                username: pair[0].clone(),
                password: pair[1].clone(),
            }),
            headless: !self.headful,
            user_agent: self.user_agent.clone(),
            max_retries: self.retries,
            concurrency: self.concurrent as usize,
        }
    }

    /// The URL list for this run: the `--file` contents when given,
    /// otherwise the positional arguments. An empty list is an error.
    pub async fn resolve_urls(&self) -> anyhow::Result<Vec<String>> {
        let urls = if let Some(path) = &self.file {
            read_urls_from_file(path)
                .await
                .with_context(|| format!("could not read URL list {}", path.display()))?
        } else {
            self.urls.clone()
        };

        if urls.is_empty() {
            bail!("no URLs to capture; pass them as arguments or via --file");
        }

        Ok(urls)
    }
}

/// Read a newline-delimited URL list, skipping blanks and `#` comments.
pub async fn read_urls_from_file(path: &Path) -> std::io::Result<Vec<String>> {
    let content = fs::read_to_string(path).await?;
    let urls = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();

    Ok(urls)
}

/// Install the global subscriber; the repeatable `-v` count lowers the
/// threshold from WARN toward TRACE.
pub fn setup_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
