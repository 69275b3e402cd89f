//! The concurrent retry-driven capture loop
//!
//! Fans a URL list out over a bounded pool of tokio tasks, each of which
//! owns one browser page for its whole retry loop. Failures stay local to
//! their URL; the batch always runs to completion and reports one
//! [`CaptureOutcome`] per submitted URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{output_path, target_url, BrowserSession, CaptureError, Config, PageHandle};

/// What happened to one URL, retries included
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub url: String,
    pub success: bool,
    pub saved_path: Option<PathBuf>,
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl CaptureOutcome {
    fn failed(url: &str, attempts: u32, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            saved_path: None,
            attempts,
            last_error: Some(error),
        }
    }
}

/// Drives a batch of captures against one shared browser session
pub struct CaptureOrchestrator {
    session: Arc<dyn BrowserSession>,
    config: Arc<Config>,
}

impl CaptureOrchestrator {
    pub fn new(session: Arc<dyn BrowserSession>, config: Config) -> Self {
        Self {
            session,
            config: Arc::new(config),
        }
    }

    /// Capture every URL in the list, at most `concurrency` in flight at
    /// once.
    ///
    /// Every spawned task is awaited, so a worker that dies surfaces as a
    /// failed outcome for its URL instead of disappearing. Outcomes may
    /// complete in any order relative to submission.
    pub async fn run_batch(&self, urls: Vec<String>) -> Vec<CaptureOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        let handles: Vec<_> = urls
            .into_iter()
            .map(|url| {
                let session = self.session.clone();
                let config = self.config.clone();
                let semaphore = semaphore.clone();

                let handle = tokio::spawn({
                    let url = url.clone();
                    async move {
                        let _permit = match semaphore.acquire().await {
                            Ok(permit) => permit,
                            Err(e) => {
                                return CaptureOutcome::failed(&url, 0, e.to_string());
                            }
                        };
                        capture_one(session.as_ref(), &config, &url).await
                    }
                });

                (url, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (url, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Capture task for {url} died: {e}");
                    outcomes.push(CaptureOutcome::failed(
                        &url,
                        0,
                        format!("capture task died: {e}"),
                    ));
                }
            }
        }

        outcomes
    }
}

/// Capture one URL: open a page, retry the navigate/settle/shoot sequence
/// up to the configured limit, and close the page exactly once on the way
/// out no matter how the loop ended.
pub async fn capture_one(
    session: &dyn BrowserSession,
    config: &Config,
    url: &str,
) -> CaptureOutcome {
    let savepath = output_path(&config.output_dir, url, config.format);
    let target = target_url(&config.hostname, url);

    // The same page serves every retry attempt for this URL.
    let page = match session.open_page().await {
        Ok(page) => page,
        Err(e) => {
            error!("Failed to open a page for {url}: {e}");
            return CaptureOutcome::failed(url, 0, e.to_string());
        }
    };

    let mut attempts = 0;
    let mut last_error: Option<String> = None;
    let mut success = false;

    while attempts < config.max_retries {
        attempts += 1;

        match attempt_capture(page.as_ref(), config, &target, &savepath).await {
            Ok(()) => {
                info!("Saved screenshot for {url} at {}", savepath.display());
                success = true;
                break;
            }
            Err(e) => {
                if attempts < config.max_retries {
                    warn!(
                        "Failed to capture {url}, retrying... ({attempts}/{})",
                        config.max_retries
                    );
                } else {
                    error!("Failed to capture {url} after {attempts} attempts: {e}");
                }
                last_error = Some(e.to_string());
            }
        }
    }

    page.close().await;

    CaptureOutcome {
        url: url.to_string(),
        success,
        saved_path: success.then_some(savepath),
        attempts,
        last_error: if success { None } else { last_error },
    }
}

/// One attempt: navigate, settle, shoot, persist. Any error counts as a
/// failed attempt; the retry loop does not distinguish between them.
async fn attempt_capture(
    page: &dyn PageHandle,
    config: &Config,
    target: &str,
    savepath: &Path,
) -> Result<(), CaptureError> {
    page.navigate(target).await?;

    if !config.settle_delay.is_zero() {
        debug!("Waiting {:?} for {target} to settle", config.settle_delay);
        sleep(config.settle_delay).await;
    }

    let data = page.capture(config.format).await?;
    tokio::fs::write(savepath, &data).await?;
    debug!("Wrote {} bytes to {}", data.len(), savepath.display());

    Ok(())
}
