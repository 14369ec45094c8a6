//! Site extractor adapters.
//!
//! One adapter per supported site. Each knows its site's card selector and
//! how to turn one card element into a [`RawListing`]. Adapters are chosen by
//! [`Site`] through [`extractor_for`], never by inspecting the URL.

mod olx;
mod webmotors;

pub use olx::OlxExtractor;
pub use webmotors::WebMotorsExtractor;

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Selector};
use tracing::{debug, info};
use url::Url;

use crate::page::RenderedPage;
use crate::{RawListing, Result, ScoutError, Site};

/// Deadline for a site's card selector to appear on the rendered page.
pub const DEFAULT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(15);

/// Extraction rules for one classifieds site.
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    /// The site this adapter handles.
    fn site(&self) -> Site;

    /// CSS selector matching one listing card.
    fn card_selector(&self) -> &'static str;

    /// Extracts every valid record from a rendered results page.
    ///
    /// Cards that fail to parse, or lack a title or link, are skipped.
    fn extract_cards(&self, html: &str, base: &Url) -> Result<Vec<RawListing>>;

    /// Waits for the card selector on a live page, then extracts its cards.
    async fn extract(
        &self,
        page: &dyn RenderedPage,
        selector_timeout: Duration,
    ) -> Result<Vec<RawListing>> {
        page.wait_for_selector(self.card_selector(), selector_timeout)
            .await?;
        let html = page.content().await?;
        let records = self.extract_cards(&html, page.url())?;
        info!(site = %self.site(), count = records.len(), "Extracted listings");
        Ok(records)
    }
}

/// Returns the adapter for a site.
pub fn extractor_for(site: Site) -> &'static dyn SiteExtractor {
    match site {
        Site::Olx => &OlxExtractor,
        Site::WebMotors => &WebMotorsExtractor,
    }
}

/// Runs `parse` over every card, keeping records with a title and link.
fn collect_cards<'a, I, F>(site: Site, cards: I, mut parse: F) -> Vec<RawListing>
where
    I: Iterator<Item = ElementRef<'a>>,
    F: FnMut(ElementRef<'a>) -> Result<RawListing>,
{
    let mut records = Vec::new();
    for (idx, card) in cards.enumerate() {
        match parse(card) {
            Ok(record) if record.has_identity() => records.push(record),
            Ok(_) => debug!(site = %site, card = idx, "Skipping card without title or link"),
            Err(e) => debug!(site = %site, card = idx, "Skipping card: {}", e),
        }
    }
    records
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScoutError::Parse(format!("Failed to parse selector: {:?}", e)))
}

/// Visible text of an element with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match inside `card`, if any and not blank.
fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// The first anchor's href inside `card`, resolved against the page URL.
fn first_link(card: ElementRef<'_>, anchor: &Selector, base: &Url) -> Result<Option<String>> {
    let href = match card
        .select(anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
    {
        Some(href) if !href.is_empty() => href,
        _ => return Ok(None),
    };

    base.join(href)
        .map(|url| Some(url.to_string()))
        .map_err(|e| ScoutError::CardExtraction(format!("Unresolvable link '{}': {}", href, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::StaticPage;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://www.webmotors.com.br/carros/estoque?tipoveiculo=carros").unwrap()
    }

    #[test]
    fn test_extractor_for_dispatches_by_site() {
        assert_eq!(extractor_for(Site::Olx).site(), Site::Olx);
        assert_eq!(extractor_for(Site::WebMotors).site(), Site::WebMotors);
        assert_eq!(
            extractor_for(Site::Olx).card_selector(),
            r#"[data-testid="ad-card"]"#
        );
        assert_eq!(extractor_for(Site::WebMotors).card_selector(), ".CardVehicle");
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<h2>  Fiat\n   <b>Uno</b>  Mille </h2>");
        let h2 = html.select(&compile("h2").unwrap()).next().unwrap();
        assert_eq!(element_text(h2), "Fiat Uno Mille");
    }

    #[test]
    fn test_first_link_resolves_relative_href() {
        let html = Html::parse_fragment(r#"<div><a href="/comprar/fiat/uno/123">x</a></div>"#);
        let div = html.select(&compile("div").unwrap()).next().unwrap();
        let link = first_link(div, &compile("a").unwrap(), &base()).unwrap();
        assert_eq!(
            link.as_deref(),
            Some("https://www.webmotors.com.br/comprar/fiat/uno/123")
        );
    }

    #[test]
    fn test_first_link_missing_href() {
        let html = Html::parse_fragment(r#"<div><a>no href</a></div>"#);
        let div = html.select(&compile("div").unwrap()).next().unwrap();
        assert_eq!(first_link(div, &compile("a").unwrap(), &base()).unwrap(), None);
    }

    #[test]
    fn test_first_link_unresolvable_href_is_card_error() {
        let html = Html::parse_fragment(r#"<div><a href="http://[broken">x</a></div>"#);
        let div = html.select(&compile("div").unwrap()).next().unwrap();
        let err = first_link(div, &compile("a").unwrap(), &base()).unwrap_err();
        assert!(matches!(err, ScoutError::CardExtraction(_)));
    }

    #[tokio::test]
    async fn test_extract_fails_when_cards_never_render() {
        let page = StaticPage::new(base(), "<html><body><p>Nenhum resultado</p></body></html>");
        let err = extractor_for(Site::WebMotors)
            .extract(&page, DEFAULT_SELECTOR_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::SelectorNotFound { secs: 15, .. }));
    }
}
