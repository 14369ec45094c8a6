//! Rendered page and session abstractions handed to site extractors.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::extractors::SiteExtractor;
use crate::{RawListing, Result, ScoutError};

/// A page that has already been navigated to and rendered.
///
/// Site extractors only need three things from a page: to wait for their
/// card selector, to read the rendered HTML, and to know the page URL so
/// relative links can be resolved.
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// The URL the page ended up on after navigation.
    fn url(&self) -> &Url;

    /// Waits until `css` matches at least one element, or fails with
    /// [`ScoutError::SelectorNotFound`] once `timeout` elapses.
    async fn wait_for_selector(&self, css: &str, timeout: Duration) -> Result<()>;

    /// Returns the current rendered HTML of the page.
    async fn content(&self) -> Result<String>;
}

/// Opens a rendering session on a URL and runs an extractor against it.
///
/// Implementations own the session lifecycle: whatever happens during
/// extraction, the session is torn down before `extract` returns.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn extract(
        &self,
        url: &Url,
        extractor: &'static dyn SiteExtractor,
    ) -> Result<Vec<RawListing>>;
}

/// A page backed by a static HTML document.
///
/// Used for offline extraction of saved result pages and in tests.
#[derive(Debug, Clone)]
pub struct StaticPage {
    url: Url,
    html: String,
}

impl StaticPage {
    /// Creates a page with the given URL and HTML.
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }
}

#[async_trait]
impl RenderedPage for StaticPage {
    fn url(&self) -> &Url {
        &self.url
    }

    async fn wait_for_selector(&self, css: &str, timeout: Duration) -> Result<()> {
        // Static markup never changes, so one look is as good as waiting.
        if has_match(&self.html, css)? {
            Ok(())
        } else {
            Err(ScoutError::SelectorNotFound {
                selector: css.to_string(),
                secs: timeout.as_secs(),
            })
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.html.clone())
    }
}

fn has_match(html: &str, css: &str) -> Result<bool> {
    let selector = Selector::parse(css)
        .map_err(|e| ScoutError::Parse(format!("Failed to parse selector: {:?}", e)))?;
    Ok(Html::parse_document(html).select(&selector).next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> StaticPage {
        StaticPage::new(Url::parse("https://example.com/search").unwrap(), html)
    }

    #[tokio::test]
    async fn test_static_page_selector_found() {
        let page = page(r#"<div class="card">x</div>"#);
        page.wait_for_selector(".card", Duration::from_secs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_static_page_selector_missing() {
        let page = page("<p>nothing here</p>");
        let err = page
            .wait_for_selector(".card", Duration::from_secs(15))
            .await
            .unwrap_err();
        match err {
            ScoutError::SelectorNotFound { selector, secs } => {
                assert_eq!(selector, ".card");
                assert_eq!(secs, 15);
            }
            other => panic!("Expected SelectorNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_static_page_invalid_selector() {
        let page = page("<p></p>");
        let err = page
            .wait_for_selector("[[", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::Parse(_)));
    }

    #[tokio::test]
    async fn test_static_page_content_and_url() {
        let page = page("<html><body>hi</body></html>");
        assert_eq!(page.content().await.unwrap(), "<html><body>hi</body></html>");
        assert_eq!(page.url().as_str(), "https://example.com/search");
    }
}
