//! Fixtures from client-rendered pages, read through headless Chromium.
//!
//! Every fetch acquires its own browser session and releases it before
//! returning, whether rendering succeeded, timed out or failed. Teardown is
//! bounded too: a browser that will not close within `close_wait` is killed.

use crate::config::BrowserConfig;
use crate::error::FetchError;
use crate::models::FixtureRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::FixtureSource;
use super::parsers::{MATCH_SELECTOR, parse_rendered_page};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

// ── Session traits ────────────────────────────────────────────────────────────

/// One live browser, owned by a single fetch.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<(), FetchError>;
    /// Whether at least one element matches `selector` right now.
    async fn has_any(&mut self, selector: &str) -> Result<bool, FetchError>;
    async fn content(&mut self) -> Result<String, FetchError>;
    /// Tear the browser down. Consumes the session so it cannot be reused.
    async fn close(self: Box<Self>);
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}

// ── Adapter ───────────────────────────────────────────────────────────────────

pub struct BrowserScraper {
    launcher: Arc<dyn BrowserLauncher>,
    base_url: String,
    render_wait: Duration,
    close_wait: Duration,
}

impl BrowserScraper {
    pub fn new(config: &BrowserConfig) -> Self {
        Self::with_launcher(
            Arc::new(ChromeLauncher::new(config)),
            &config.base_url,
            Duration::from_secs(config.render_wait_secs),
            Duration::from_secs(config.close_wait_secs),
        )
    }

    pub fn with_launcher(
        launcher: Arc<dyn BrowserLauncher>,
        base_url: &str,
        render_wait: Duration,
        close_wait: Duration,
    ) -> Self {
        Self {
            launcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            render_wait,
            close_wait,
        }
    }

    /// League fixtures page. e.g. belgium/jupiler-pro-league → /football/belgium/jupiler-pro-league/fixtures/
    fn fixtures_url(&self, slug: &str) -> String {
        format!("{}/football/{}/fixtures/", self.base_url, slug.trim_matches('/'))
    }

    async fn render(&self, session: &mut dyn BrowserSession, url: &str) -> Result<String, FetchError> {
        session.goto(url).await?;
        while !session.has_any(MATCH_SELECTOR).await? {
            sleep(POLL_INTERVAL).await;
        }
        session.content().await
    }
}

#[async_trait]
impl FixtureSource for BrowserScraper {
    async fn fetch(&self, league_ref: &str, date: NaiveDate) -> Result<Vec<FixtureRecord>, FetchError> {
        let url = self.fixtures_url(league_ref);
        info!(%url, %date, "rendering fixtures page");

        let mut session = self.launcher.launch().await?;
        let rendered = timeout(self.render_wait, self.render(session.as_mut(), &url)).await;
        // Sessions bound their own teardown; this guards against one that does not.
        if timeout(self.close_wait * 3, session.close()).await.is_err() {
            warn!(%url, "browser teardown abandoned after {:?}", self.close_wait * 3);
        }

        let html = match rendered {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::unavailable(format!(
                    "no match elements on {} within {:?}",
                    url, self.render_wait
                )));
            }
        };

        parse_rendered_page(&html, date)
    }
}

// ── Chromium ──────────────────────────────────────────────────────────────────

/// Launches a fresh headless Chromium per session over the DevTools protocol.
pub struct ChromeLauncher {
    executable: Option<String>,
    close_wait: Duration,
}

impl ChromeLauncher {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            close_wait: Duration::from_secs(config.close_wait_secs),
        }
    }

    fn chrome_config(&self) -> Result<ChromeConfig, FetchError> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--log-level=3");
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| FetchError::unavailable(format!("browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        let (browser, mut handler) = Browser::launch(self.chrome_config()?)
            .await
            .map_err(|e| FetchError::unavailable(format!("failed to launch browser: {}", e)))?;

        let events = tokio::spawn(async move {
            // Keep draining: CDP replies, including the one `close` waits on, arrive here.
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser event error: {}", e);
                }
            }
        });

        debug!("browser launched");
        Ok(Box::new(ChromeSession {
            browser,
            events,
            page: None,
            close_wait: self.close_wait,
        }))
    }
}

struct ChromeSession {
    browser: Browser,
    events: JoinHandle<()>,
    page: Option<Page>,
    close_wait: Duration,
}

impl ChromeSession {
    fn page(&self) -> Result<&Page, FetchError> {
        self.page
            .as_ref()
            .ok_or_else(|| FetchError::unavailable("browser page not opened"))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<(), FetchError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| FetchError::unavailable(format!("navigation to {} failed: {}", url, e)))?;
        self.page = Some(page);
        Ok(())
    }

    async fn has_any(&mut self, selector: &str) -> Result<bool, FetchError> {
        match self.page()?.find_elements(selector).await {
            Ok(found) => Ok(!found.is_empty()),
            Err(e) => {
                debug!("query {} not ready: {}", selector, e);
                Ok(false)
            }
        }
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        self.page()?
            .content()
            .await
            .map_err(|e| FetchError::unavailable(format!("reading rendered page: {}", e)))
    }

    async fn close(self: Box<Self>) {
        let ChromeSession { mut browser, events, page, close_wait } = *self;
        drop(page);

        let closed = match timeout(close_wait, browser.close()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!("browser close failed: {}", e);
                false
            }
            Err(_) => {
                warn!("browser close timed out after {:?}", close_wait);
                false
            }
        };
        let exited = closed && matches!(timeout(close_wait, browser.wait()).await, Ok(Ok(_)));

        if !exited {
            if let Some(Err(e)) = browser.kill().await {
                warn!("killing browser failed: {}", e);
            }
            if timeout(close_wait, browser.wait()).await.is_err() {
                warn!("browser process still running after kill");
            }
        }
        events.abort();
        debug!("browser closed");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
