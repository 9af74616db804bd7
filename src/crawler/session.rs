//! Page sessions
//!
//! A [`PageSession`] is the single navigation context reused for a whole
//! site: it loads one URL at a time, exposes the rendered markup and, when
//! the engine has a viewport, lets the caller scroll to trigger lazy
//! loading. Sessions are opened through a [`SessionFactory`] once per site.

use crate::config::BrowserConfig;
use crate::crawler::fetcher::build_http_client;
use crate::{CrawlError, NavigationError};
use reqwest::Client;
use std::time::Duration;

/// One browser tab (or HTTP client) reused across a site's crawl
#[allow(async_fn_in_trait)]
pub trait PageSession {
    /// Loads `url`, failing if it does not complete within `timeout`
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError>;

    /// Whether the session has a scrollable viewport
    fn can_scroll(&self) -> bool;

    /// Current scrollable height of the document body
    async fn scroll_height(&mut self) -> Result<u64, NavigationError>;

    /// Scrolls the viewport to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> Result<(), NavigationError>;

    /// Full markup of the current document
    async fn content(&mut self) -> Result<String, NavigationError>;

    /// URL of the current document, after redirects when known
    fn current_url(&self) -> Option<&str>;

    /// Releases the session and everything it holds
    async fn close(self) -> Result<(), CrawlError>
    where
        Self: Sized;
}

/// Opens a fresh session for each site
#[allow(async_fn_in_trait)]
pub trait SessionFactory {
    type Session: PageSession;

    async fn open(&self) -> Result<Self::Session, CrawlError>;
}

/// Session performing plain HTTP GETs
///
/// No scripts run, so there is nothing to scroll: listing pages are read as
/// served.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    current_url: Option<String>,
    body: Option<String>,
}

impl HttpSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current_url: None,
            body: None,
        }
    }

    fn no_document(&self) -> NavigationError {
        NavigationError::Transport {
            url: self.current_url.clone().unwrap_or_default(),
            message: "no document loaded".to_string(),
        }
    }
}

impl PageSession for HttpSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError> {
        self.body = None;
        self.current_url = Some(url.to_string());

        let request = async {
            let response = self.client.get(url).send().await?;
            let final_url = response.url().to_string();
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((final_url, status, body))
        };

        let (final_url, status, body) = match tokio::time::timeout(timeout, request).await {
            Err(_) => {
                return Err(NavigationError::Timeout {
                    url: url.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Ok(Err(e)) if e.is_timeout() => {
                return Err(NavigationError::Timeout {
                    url: url.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Ok(Err(e)) => {
                return Err(NavigationError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(loaded)) => loaded,
        };

        if !status.is_success() {
            return Err(NavigationError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        self.current_url = Some(final_url);
        self.body = Some(body);
        Ok(())
    }

    fn can_scroll(&self) -> bool {
        false
    }

    async fn scroll_height(&mut self) -> Result<u64, NavigationError> {
        self.body
            .as_ref()
            .map(|body| body.len() as u64)
            .ok_or_else(|| self.no_document())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), NavigationError> {
        Ok(())
    }

    async fn content(&mut self) -> Result<String, NavigationError> {
        self.body.clone().ok_or_else(|| self.no_document())
    }

    fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    async fn close(self) -> Result<(), CrawlError> {
        Ok(())
    }
}

/// Opens [`HttpSession`]s sharing one configured client
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    client: Client,
}

impl HttpSessionFactory {
    pub fn new(config: &BrowserConfig, timeout: Duration) -> Result<Self, CrawlError> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }
}

impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, CrawlError> {
        Ok(HttpSession::new(self.client.clone()))
    }
}
