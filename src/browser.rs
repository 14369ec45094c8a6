//! Headless browser sessions for rendering listing pages.
//!
//! This module is only available when the `headless` Cargo feature is enabled.
//! Every extraction gets its own browser process: launch, open one tab, set
//! the user agent, navigate, hand the page to the extractor, then tear the
//! browser down whatever the outcome. Sessions are never reused across
//! sites, so no cookies or cached DOM leak from one source to the next.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::future::BoxFuture;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use url::Url;

use crate::browser_setup::resolve_chrome;
use crate::extractors::{SiteExtractor, DEFAULT_SELECTOR_TIMEOUT};
use crate::page::{RenderedPage, SessionProvider};
use crate::{RawListing, Result, ScoutError};

/// Fixed desktop user agent presented to listing sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Deadline for a page to finish loading.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launch and timeout settings for browser sessions.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Whether to run the browser without a window.
    pub headless: bool,
    /// Path to the Chrome/Chromium executable. If `None`, auto-detected.
    pub chrome_path: Option<PathBuf>,
    /// User agent set on every page.
    pub user_agent: String,
    /// Additional launch arguments for Chrome.
    pub launch_args: Vec<String>,
    /// Deadline for browser launch and page navigation.
    pub navigation_timeout: Duration,
    /// Deadline for a site's card selector to appear.
    pub selector_timeout: Duration,
    /// Pause after the load event so late network requests can finish.
    pub settle_delay: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            launch_args: Vec::new(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            selector_timeout: DEFAULT_SELECTOR_TIMEOUT,
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Opens one isolated browser per extraction.
#[derive(Debug, Clone, Default)]
pub struct BrowserSessions {
    config: BrowserConfig,
}

impl BrowserSessions {
    /// Creates a session manager with the given configuration.
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Runs `f` against a freshly launched browser navigated to `url`.
    ///
    /// The browser is closed on every exit path: success, extraction error,
    /// or navigation timeout.
    pub async fn with_session<T, F>(&self, url: &Url, f: F) -> Result<T>
    where
        T: Send,
        F: for<'p> FnOnce(&'p dyn RenderedPage) -> BoxFuture<'p, Result<T>> + Send,
    {
        let (mut browser, handler) = self.launch().await?;

        let outcome = self.drive(&browser, url, f).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Failed to reap browser process: {}", e);
        }
        handler.abort();

        outcome
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>)> {
        let chrome = resolve_chrome(self.config.chrome_path.as_deref())?;
        debug!("Launching browser: {}", chrome.display());

        // CDP commands share the navigation deadline instead of chromiumoxide's 30 s default.
        let mut builder = ChromeConfig::builder()
            .chrome_executable(chrome)
            .request_timeout(self.config.navigation_timeout);
        if !self.config.headless {
            builder = builder.with_head();
        }

        // Chrome's headless mode advertises itself in the UA unless overridden at launch.
        builder = builder
            .arg(format!("--user-agent={}", self.config.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .arg("--no-first-run");

        for arg in &self.config.launch_args {
            builder = builder.arg(arg);
        }

        let chrome_config = builder
            .build()
            .map_err(|e| ScoutError::Browser(format!("Failed to build browser config: {}", e)))?;

        let launch = Browser::launch(chrome_config);
        let (browser, mut handler) = timeout(self.config.navigation_timeout, launch)
            .await
            .map_err(|_| ScoutError::Browser("Timed out launching browser".to_string()))?
            .map_err(|e| ScoutError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser CDP handler error: {}", e);
                }
            }
            debug!("Browser CDP handler exited");
        });

        Ok((browser, handler))
    }

    async fn drive<T, F>(&self, browser: &Browser, url: &Url, f: F) -> Result<T>
    where
        F: for<'p> FnOnce(&'p dyn RenderedPage) -> BoxFuture<'p, Result<T>>,
    {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScoutError::Browser(format!("Failed to open tab: {}", e)))?;

        page.set_user_agent(SetUserAgentOverrideParams::new(self.config.user_agent.clone()))
            .await
            .map_err(|e| ScoutError::Browser(format!("Failed to set user agent: {}", e)))?;

        debug!(url = %url, "Navigating");
        let limit = self.config.navigation_timeout;
        match timeout(limit, navigate(&page, url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(navigation_error(url, limit, e)),
            Err(_) => return Err(timed_out(url, limit)),
        }
        sleep(self.config.settle_delay).await;

        // Relative links resolve against wherever redirects left us.
        let landed = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        let rendered = BrowserPage { page, url: landed };
        f(&rendered).await
    }
}

/// Sends `Page.navigate` and waits for the document to finish loading.
///
/// `Page::goto` carries its own fixed request deadline, so navigation is
/// driven by hand and bounded only by the caller's timeout.
async fn navigate(page: &Page, url: &Url) -> std::result::Result<(), NavigationFailure> {
    let response = page.execute(NavigateParams::new(url.as_str())).await?;
    if let Some(reason) = response.result.error_text.clone() {
        return Err(NavigationFailure::Rejected(reason));
    }
    loop {
        let state = page.evaluate("document.readyState").await?;
        if state.into_value::<String>().ok().as_deref() == Some("complete") {
            return Ok(());
        }
        sleep(LOAD_POLL_INTERVAL).await;
    }
}

#[derive(Debug)]
enum NavigationFailure {
    Cdp(CdpError),
    Rejected(String),
}

impl From<CdpError> for NavigationFailure {
    fn from(err: CdpError) -> Self {
        Self::Cdp(err)
    }
}

fn navigation_error(url: &Url, limit: Duration, failure: NavigationFailure) -> ScoutError {
    match failure {
        NavigationFailure::Cdp(CdpError::Timeout) => timed_out(url, limit),
        NavigationFailure::Cdp(e) => ScoutError::Browser(format!("Navigation failed: {}", e)),
        NavigationFailure::Rejected(reason) => {
            ScoutError::Browser(format!("Navigation to {} failed: {}", url, reason))
        }
    }
}

fn timed_out(url: &Url, limit: Duration) -> ScoutError {
    ScoutError::NavigationTimeout {
        url: url.to_string(),
        secs: limit.as_secs(),
    }
}

fn selector_script(css: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    let quoted = serde_json::Value::String(css.to_string()).to_string();
    format!("document.querySelector({}) !== null", quoted)
}

/// Reads one selector poll. `Ok(false)` means the element is not there yet.
fn selector_presence(outcome: std::result::Result<bool, CdpError>, css: &str) -> Result<bool> {
    outcome.map_err(|e| ScoutError::Browser(format!("Waiting for '{}' failed: {}", css, e)))
}

#[async_trait]
impl SessionProvider for BrowserSessions {
    async fn extract(
        &self,
        url: &Url,
        extractor: &'static dyn SiteExtractor,
    ) -> Result<Vec<RawListing>> {
        let selector_timeout = self.config.selector_timeout;
        self.with_session(url, move |page| extractor.extract(page, selector_timeout))
            .await
    }
}

/// A live browser tab exposed to extractors.
struct BrowserPage {
    page: Page,
    url: Url,
}

#[async_trait]
impl RenderedPage for BrowserPage {
    fn url(&self) -> &Url {
        &self.url
    }

    async fn wait_for_selector(&self, css: &str, limit: Duration) -> Result<()> {
        let script = selector_script(css);
        let poll = async {
            loop {
                let outcome = match self.page.evaluate(script.as_str()).await {
                    Ok(result) => result.into_value::<bool>().map_err(CdpError::from),
                    Err(e) => Err(e),
                };
                if selector_presence(outcome, css)? {
                    return Ok::<(), ScoutError>(());
                }
                sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };
        timeout(limit, poll)
            .await
            .map_err(|_| ScoutError::SelectorNotFound {
                selector: css.to_string(),
                secs: limit.as_secs(),
            })?
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ScoutError::Browser(format!("Failed to get page content: {}", e)))
    }
}
