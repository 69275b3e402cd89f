//! Browser session management
//!
//! One Chromium process is launched per run and shared by every capture;
//! each capture gets its own page. The session sits behind the
//! [`BrowserSession`] / [`PageHandle`] traits so the orchestrator can be
//! driven by an instrumented fake in tests.

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{create_browser_config, BrowserEngine, CaptureError, Config, OutputFormat};

/// A running browser able to spawn isolated pages.
///
/// The session is shared read-only across workers; it is only used to open
/// new pages, never mutated by a capture.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a fresh page configured for capturing (viewport, user agent,
    /// and auth headers applied before any navigation).
    async fn open_page(&self) -> Result<Box<dyn PageHandle>, CaptureError>;
}

/// An isolated browsing context owned by exactly one capture.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigate to the target and wait for the load to finish.
    async fn navigate(&self, url: &str) -> Result<(), CaptureError>;

    /// Take a full-page screenshot encoded in the requested format.
    async fn capture(&self, format: OutputFormat) -> Result<Vec<u8>, CaptureError>;

    /// Tear the page down. Consumes the handle, so a page cannot be closed
    /// twice or used afterward.
    async fn close(self: Box<Self>);
}

/// The CDP-backed session over a single Chromium process
pub struct ChromiumSession {
    browser: Arc<Mutex<Browser>>,
    handler: tokio::task::JoinHandle<Result<(), chromiumoxide::error::CdpError>>,
    config: Config,
}

impl ChromiumSession {
    /// Launch the browser process and start driving its CDP event stream.
    ///
    /// Launch failures are fatal to the whole run; they are never retried.
    pub async fn launch(config: &Config) -> Result<Self, CaptureError> {
        if config.engine != BrowserEngine::Chromium {
            return Err(CaptureError::UnsupportedEngine(format!(
                "{} is not driven by the CDP backend; use chromium",
                config.engine.name()
            )));
        }

        let browser_config = create_browser_config(config)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CaptureError::BrowserLaunchFailed(e.to_string()))?;

        // The handler implements Stream and must be polled for the browser
        // to make progress.
        let handler_task = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("CDP handler error: {e}");
                        return Err(e);
                    }
                    None => {
                        debug!("CDP handler stream ended");
                        break;
                    }
                }
            }
            Ok(())
        });

        info!("Browser session launched");

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler: handler_task,
            config: config.clone(),
        })
    }

    pub async fn shutdown(&self) {
        if let Err(e) = self.browser.lock().await.close().await {
            warn!("Failed to close browser: {e}");
        }
        self.handler.abort();
        info!("Browser session shut down");
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn open_page(&self) -> Result<Box<dyn PageHandle>, CaptureError> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| CaptureError::PageError(e.to_string()))?
        };

        configure_page(&page, &self.config).await?;

        Ok(Box::new(ChromiumPage { page }))
    }
}

/// Apply viewport, user-agent, and auth-header overrides to a fresh page.
async fn configure_page(page: &Page, config: &Config) -> Result<(), CaptureError> {
    let metrics = SetDeviceMetricsOverrideParams::builder()
        .width(config.viewport.width as i64)
        .height(config.viewport.height as i64)
        .device_scale_factor(1.0)
        .mobile(false)
        .build()
        .map_err(CaptureError::PageError)?;

    page.execute(metrics)
        .await
        .map_err(|e| CaptureError::PageError(e.to_string()))?;

    if let Some(user_agent) = &config.user_agent {
        let override_params = SetUserAgentOverrideParams::builder()
            .user_agent(user_agent.clone())
            .build()
            .map_err(CaptureError::PageError)?;

        page.execute(override_params)
            .await
            .map_err(|e| CaptureError::PageError(e.to_string()))?;
    }

    if let Some(auth) = &config.basic_auth {
        let headers = Headers::new(serde_json::json!({
            "Authorization": auth.header_value(),
        }));
        let header_params = SetExtraHttpHeadersParams::builder()
            .headers(headers)
            .build()
            .map_err(CaptureError::PageError)?;

        page.execute(header_params)
            .await
            .map_err(|e| CaptureError::PageError(e.to_string()))?;
    }

    Ok(())
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<(), CaptureError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| CaptureError::NavigationFailed(e.to_string()))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| CaptureError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    async fn capture(&self, format: OutputFormat) -> Result<Vec<u8>, CaptureError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let png_data = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        encode_screenshot(png_data, format)
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.page.close().await {
            warn!("Failed to close page: {e}");
        }
    }
}

/// CDP always hands back PNG; JPEG output is re-encoded from it.
fn encode_screenshot(png_data: Vec<u8>, format: OutputFormat) -> Result<Vec<u8>, CaptureError> {
    match format {
        OutputFormat::Png => Ok(png_data),
        OutputFormat::Jpeg => {
            let img = image::load_from_memory(&png_data)?;
            let mut jpeg_data = Vec::new();
            image::DynamicImage::ImageRgb8(img.to_rgb8())
                .write_to(
                    &mut std::io::Cursor::new(&mut jpeg_data),
                    image::ImageFormat::Jpeg,
                )?;
            Ok(jpeg_data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_screenshot_png_passthrough() {
        let data = vec![1u8, 2, 3, 4];
        let encoded = encode_screenshot(data.clone(), OutputFormat::Png).unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_encode_screenshot_jpeg_rejects_garbage() {
        assert!(encode_screenshot(vec![0u8; 16], OutputFormat::Jpeg).is_err());
    }

    #[test]
    fn test_encode_screenshot_jpeg_reencodes_png() {
        let mut png_data = Vec::new();
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
        img.write_to(
            &mut std::io::Cursor::new(&mut png_data),
            image::ImageFormat::Png,
        )
        .unwrap();

        let jpeg = encode_screenshot(png_data, OutputFormat::Jpeg).unwrap();
        assert_eq!(
            image::guess_format(&jpeg).unwrap(),
            image::ImageFormat::Jpeg
        );
    }
}
