//! Configuration for a capture run
//!
//! All knobs for one invocation live in [`Config`]: the target hostname, the
//! output directory, viewport and format settings, credentials, and the
//! retry and concurrency limits. The struct is built once from the CLI and
//! shared read-only across every concurrent capture.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::CaptureError;

/// Immutable settings shared by every capture in a batch
///
/// # Examples
///
/// ```rust
/// use webpic::Config;
///
/// let config = Config {
///     hostname: "https://example.com".to_string(),
///     concurrency: 4,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base address every URL is captured against, e.g. `https://example.com`
    pub hostname: String,

    /// Directory screenshot files are written to; created if absent
    pub output_dir: PathBuf,

    /// Browser engine to launch (only Chromium is driven by the CDP backend)
    pub engine: BrowserEngine,

    /// Page viewport applied to every capture
    pub viewport: Viewport,

    /// Fixed wait between navigation and capture, for client-side rendering
    pub settle_delay: Duration,

    /// Encoding of the written screenshot files
    pub format: OutputFormat,

    /// Optional HTTP basic-auth credentials attached to every page request
    pub basic_auth: Option<BasicAuth>,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Optional User-Agent override for all page requests
    pub user_agent: Option<String>,

    /// Attempts per URL before it is recorded as failed (minimum 1)
    pub max_retries: u32,

    /// Captures allowed in flight at once (minimum 1)
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            output_dir: PathBuf::from("screenshots"),
            engine: BrowserEngine::Chromium,
            viewport: Viewport::default(),
            settle_delay: Duration::ZERO,
            format: OutputFormat::Png,
            basic_auth: None,
            headless: true,
            user_agent: None,
            max_retries: 3,
            concurrency: 1,
        }
    }
}

impl Config {
    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// These checks are fatal before any browser is launched; the per-URL
    /// retry machinery never sees them.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.max_retries == 0 {
            return Err(CaptureError::ConfigurationError(
                "Retry count must be greater than 0".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(CaptureError::ConfigurationError(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(CaptureError::ConfigurationError(
                "Viewport dimensions must be greater than 0".to_string(),
            ));
        }

        let parsed = url::Url::parse(&self.hostname).map_err(|e| {
            CaptureError::ConfigurationError(format!(
                "Hostname {:?} is not a valid URL: {e}",
                self.hostname
            ))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(CaptureError::ConfigurationError(format!(
                "Hostname scheme must be http or https, got {other:?}"
            ))),
        }
    }
}

/// Page viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Image encoding for written screenshot files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

/// Browser engine requested on the command line
///
/// The CDP backend only drives Chromium; the other engines are accepted by
/// the parser but rejected when the session launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserEngine {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "chromium",
            BrowserEngine::Firefox => "firefox",
            BrowserEngine::Webkit => "webkit",
        }
    }
}

/// HTTP basic-auth credentials
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// Render the `Authorization` header value: standard base64 of
    /// `username:password`, prefixed with `Basic `.
    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

/// Generate Chrome command-line arguments for a capture session
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
    ];

    if config.headless {
        args.push("--headless".to_string());
    }

    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args
}

pub fn create_browser_config(
    config: &Config,
) -> Result<chromiumoxide::browser::BrowserConfig, CaptureError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_chrome_args(config));

    if !config.headless {
        builder = builder.with_head();
    }

    builder.build().map_err(CaptureError::BrowserLaunchFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.viewport, Viewport::default());
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.format, OutputFormat::Png);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.concurrency, 1);
        assert!(config.headless);
        assert!(config.basic_auth.is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = Config {
            hostname: "https://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let no_retries = Config {
            max_retries: 0,
            ..config.clone()
        };
        assert!(no_retries.validate().is_err());

        let no_workers = Config {
            concurrency: 0,
            ..config.clone()
        };
        assert!(no_workers.validate().is_err());

        let flat_viewport = Config {
            viewport: Viewport {
                width: 0,
                height: 720,
            },
            ..config.clone()
        };
        assert!(flat_viewport.validate().is_err());

        let bad_scheme = Config {
            hostname: "ftp://example.com".to_string(),
            ..config.clone()
        };
        assert!(bad_scheme.validate().is_err());

        let not_a_url = Config {
            hostname: "example.com".to_string(),
            ..config
        };
        assert!(not_a_url.validate().is_err());
    }

    #[test]
    fn test_basic_auth_header_value() {
        let auth = BasicAuth {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(auth.header_value(), "Basic dXNlcjpwYXNz");

        let empty = BasicAuth {
            username: String::new(),
            password: String::new(),
        };
        assert_eq!(empty.header_value(), "Basic Og==");
    }

    #[test]
    fn test_chrome_args_generation() {
        let config = Config {
            hostname: "https://example.com".to_string(),
            user_agent: Some("webpic/0.1".to_string()),
            ..Default::default()
        };
        let args = get_chrome_args(&config);

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--window-size=1280,720".to_string()));
        assert!(args.contains(&"--user-agent=webpic/0.1".to_string()));

        let headful = Config {
            headless: false,
            ..config
        };
        assert!(!get_chrome_args(&headful).contains(&"--headless".to_string()));
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpeg");
    }
}
