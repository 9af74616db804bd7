//! Headless Chromium session
//!
//! Listing pages of the municipal sites append articles as the reader
//! scrolls, so the production session drives a real browser through the
//! DevTools protocol.

use crate::config::BrowserConfig;
use crate::crawler::session::{PageSession, SessionFactory};
use crate::{CrawlError, NavigationError};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const SCROLL_HEIGHT_JS: &str = "document.body ? document.body.scrollHeight : 0";
const SCROLL_TO_BOTTOM_JS: &str =
    "window.scrollTo(0, document.body ? document.body.scrollHeight : 0)";

/// Launches one Chromium instance per site
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Extra command-line switches passed to Chromium
    fn launch_args(&self) -> Vec<String> {
        vec![format!("--user-agent={}", self.config.user_agent)]
    }

    fn chrome_config(&self) -> Result<ChromeConfig, CrawlError> {
        let mut builder = ChromeConfig::builder()
            .request_timeout(Duration::from_secs(60))
            .window_size(1920, 1080)
            .args(self.launch_args());

        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.config.executable {
            builder = builder.chrome_executable(executable);
        }

        builder
            .build()
            .map_err(|e| CrawlError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

impl SessionFactory for ChromeLauncher {
    type Session = ChromeSession;

    async fn open(&self) -> Result<ChromeSession, CrawlError> {
        let (browser, mut handler) = Browser::launch(self.chrome_config()?)
            .await
            .map_err(|e| CrawlError::Browser(format!("Failed to launch browser: {}", e)))?;

        // The CDP handler must be polled for the browser to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(CrawlError::Browser(format!("Failed to open tab: {}", e)));
            }
        };

        tracing::debug!("Browser session opened");
        Ok(ChromeSession {
            browser,
            page,
            handler_task,
            current_url: None,
        })
    }
}

/// A single Chromium tab reused for every navigation of a site
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    current_url: Option<String>,
}

impl ChromeSession {
    fn script_error(&self, message: String) -> NavigationError {
        NavigationError::Script {
            url: self.current_url.clone().unwrap_or_default(),
            message,
        }
    }
}

/// The URL the tab ended up on, or the requested one when the tab reports none
fn landed_url(requested: &str, reported: Option<String>) -> String {
    reported
        .filter(|url| !url.is_empty() && url != "about:blank")
        .unwrap_or_else(|| requested.to_string())
}

impl PageSession for ChromeSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError> {
        self.current_url = Some(url.to_string());

        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Err(_) => Err(NavigationError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(e)) => Err(NavigationError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Ok(Ok(_)) => {
                let reported = self.page.url().await.ok().flatten();
                self.current_url = Some(landed_url(url, reported));
                Ok(())
            }
        }
    }

    fn can_scroll(&self) -> bool {
        true
    }

    async fn scroll_height(&mut self) -> Result<u64, NavigationError> {
        let result = self
            .page
            .evaluate(SCROLL_HEIGHT_JS)
            .await
            .map_err(|e| self.script_error(e.to_string()))?;
        let height: f64 = result
            .into_value()
            .map_err(|e| self.script_error(e.to_string()))?;
        Ok(height.max(0.0) as u64)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), NavigationError> {
        self.page
            .evaluate(SCROLL_TO_BOTTOM_JS)
            .await
            .map_err(|e| self.script_error(e.to_string()))?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, NavigationError> {
        self.page
            .content()
            .await
            .map_err(|e| self.script_error(e.to_string()))
    }

    fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    async fn close(mut self) -> Result<(), CrawlError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| CrawlError::Browser(format!("Failed to close browser: {}", e)));

        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler_task.abort();

        tracing::debug!("Browser session closed");
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_carry_user_agent() {
        let config = BrowserConfig {
            user_agent: "Ajuntament-Arxiu/2.0".to_string(),
            ..BrowserConfig::default()
        };
        let launcher = ChromeLauncher::new(config);

        assert_eq!(launcher.launch_args(), vec!["--user-agent=Ajuntament-Arxiu/2.0"]);
    }

    #[test]
    fn test_default_user_agent_is_passed_to_chrome() {
        let launcher = ChromeLauncher::new(BrowserConfig::default());
        let args = launcher.launch_args();

        assert_eq!(args.len(), 1);
        assert!(args[0].starts_with("--user-agent=muni-news-crawler/"));
    }

    #[test]
    fn test_landed_url_follows_redirect() {
        let landed = landed_url(
            "https://www.xirivella.es/va/noticias?page=0",
            Some("https://www.xirivella.es/va/actualitat?page=0".to_string()),
        );
        assert_eq!(landed, "https://www.xirivella.es/va/actualitat?page=0");
    }

    #[test]
    fn test_landed_url_falls_back_to_requested() {
        let requested = "https://www.xirivella.es/va/noticias?page=0";

        assert_eq!(landed_url(requested, None), requested);
        assert_eq!(landed_url(requested, Some(String::new())), requested);
        assert_eq!(
            landed_url(requested, Some("about:blank".to_string())),
            requested
        );
    }
}
