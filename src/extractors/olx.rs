//! OLX Brasil result page extraction.
//!
//! OLX renders each ad as a `data-testid="ad-card"` element. Year and
//! mileage are not labelled; they appear as loose feature chips, so the
//! year is the first chip that is exactly four digits and the mileage is
//! the first chip mentioning "km".

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{collect_cards, compile, element_text, first_link, first_text, SiteExtractor};
use crate::parse::{digits_only, mentions_km, parse_price, year_token};
use crate::{RawListing, Result, Site};

const CARD: &str = r#"[data-testid="ad-card"]"#;

/// Extractor for OLX search result pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct OlxExtractor;

struct CardSelectors {
    title: Selector,
    price: Selector,
    features: Selector,
    location: Selector,
    anchor: Selector,
}

impl CardSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            title: compile("h2")?,
            price: compile(r#"[data-testid="ad-price"]"#)?,
            features: compile(r#"[data-testid="ad-features"] span"#)?,
            location: compile(r#"[data-testid="ad-location"]"#)?,
            anchor: compile("a")?,
        })
    }
}

impl OlxExtractor {
    fn parse_card(
        &self,
        card: ElementRef<'_>,
        s: &CardSelectors,
        base: &Url,
    ) -> Result<RawListing> {
        let features: Vec<String> = card.select(&s.features).map(element_text).collect();

        let mut record = RawListing::new(Site::Olx);
        record.title = first_text(card, &s.title);
        record.price = first_text(card, &s.price).and_then(|text| parse_price(&text));
        record.year = features.iter().find_map(|chip| year_token(chip));
        record.mileage_km = features
            .iter()
            .find(|chip| mentions_km(chip))
            .and_then(|chip| digits_only(chip));
        record.location = first_text(card, &s.location);
        record.url = first_link(card, &s.anchor, base)?;
        Ok(record)
    }
}

impl SiteExtractor for OlxExtractor {
    fn site(&self) -> Site {
        Site::Olx
    }

    fn card_selector(&self) -> &'static str {
        CARD
    }

    fn extract_cards(&self, html: &str, base: &Url) -> Result<Vec<RawListing>> {
        let selectors = CardSelectors::compile()?;
        let cards = compile(CARD)?;
        let document = Html::parse_document(html);
        Ok(collect_cards(Site::Olx, document.select(&cards), |card| {
            self.parse_card(card, &selectors, base)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn base() -> Url {
        Url::parse("https://sp.olx.com.br/autos-e-pecas/carros-vans-e-utilitarios?q=Fiat+Uno")
            .unwrap()
    }

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <section>
            <div data-testid="ad-card">
                <a href="https://sp.olx.com.br/sao-paulo-e-regiao/autos-e-pecas/carros-vans-e-utilitarios/fiat-uno-1">
                    <h2>Fiat Uno Mille Way 1.0</h2>
                </a>
                <h3 data-testid="ad-price">R$ 24.900</h3>
                <div data-testid="ad-features">
                    <span>98.000 km</span>
                    <span>2012</span>
                    <span>Flex</span>
                    <span>Manual</span>
                </div>
                <p data-testid="ad-location">  São Paulo, Vila Mariana  </p>
            </div>
            <div data-testid="ad-card">
                <a href="/sao-paulo-e-regiao/autos-e-pecas/carros-vans-e-utilitarios/fiat-uno-2">
                    <h2>Fiat Uno Vivace</h2>
                </a>
                <h3 data-testid="ad-price">R$ 31.500,50</h3>
                <div data-testid="ad-features">
                    <span>2015</span>
                </div>
            </div>
            <div data-testid="ad-card">
                <h2>Anúncio sem link</h2>
                <h3 data-testid="ad-price">R$ 10.000</h3>
            </div>
            <div data-testid="ad-card">
                <a href="https://sp.olx.com.br/anuncio-sem-titulo"></a>
            </div>
        </section>
        </body></html>
    "#;

    #[test]
    fn test_olx_site_and_selector() {
        assert_eq!(OlxExtractor.site(), Site::Olx);
        assert_eq!(OlxExtractor.card_selector(), r#"[data-testid="ad-card"]"#);
    }

    #[test]
    fn test_extract_cards_full_card() {
        let records = OlxExtractor.extract_cards(RESULTS_PAGE, &base()).unwrap();
        assert_eq!(records.len(), 2);

        let uno = &records[0];
        assert_eq!(uno.site, Site::Olx);
        assert_eq!(uno.title.as_deref(), Some("Fiat Uno Mille Way 1.0"));
        assert_eq!(uno.price, Some(Decimal::from(24900)));
        assert_eq!(uno.year, Some(2012));
        assert_eq!(uno.mileage_km, Some(98000));
        assert_eq!(uno.location.as_deref(), Some("São Paulo, Vila Mariana"));
        assert_eq!(
            uno.url.as_deref(),
            Some("https://sp.olx.com.br/sao-paulo-e-regiao/autos-e-pecas/carros-vans-e-utilitarios/fiat-uno-1")
        );
    }

    #[test]
    fn test_extract_cards_partial_card() {
        let records = OlxExtractor.extract_cards(RESULTS_PAGE, &base()).unwrap();
        let vivace = &records[1];
        assert_eq!(vivace.title.as_deref(), Some("Fiat Uno Vivace"));
        assert_eq!(vivace.price, Some(Decimal::new(3150050, 2)));
        assert_eq!(vivace.year, Some(2015));
        assert_eq!(vivace.mileage_km, None);
        assert_eq!(vivace.location, None);
        assert_eq!(
            vivace.url.as_deref(),
            Some("https://sp.olx.com.br/sao-paulo-e-regiao/autos-e-pecas/carros-vans-e-utilitarios/fiat-uno-2")
        );
    }

    #[test]
    fn test_extract_cards_drops_cards_without_title_or_link() {
        let records = OlxExtractor.extract_cards(RESULTS_PAGE, &base()).unwrap();
        assert!(records.iter().all(|r| r.has_identity()));
        assert!(!records
            .iter()
            .any(|r| r.title.as_deref() == Some("Anúncio sem link")));
    }

    #[test]
    fn test_extract_cards_bad_link_skips_only_that_card() {
        let html = r#"
            <div data-testid="ad-card"><a href="http://[::1"><h2>Quebrado</h2></a></div>
            <div data-testid="ad-card"><a href="/ok"><h2>Fiat Palio</h2></a></div>
        "#;
        let records = OlxExtractor.extract_cards(html, &base()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Fiat Palio"));
        assert_eq!(records[0].url.as_deref(), Some("https://sp.olx.com.br/ok"));
    }

    #[test]
    fn test_extract_cards_price_without_digits() {
        let html = r#"
            <div data-testid="ad-card">
                <a href="/1"><h2>Fiat Uno</h2></a>
                <span data-testid="ad-price">A combinar</span>
            </div>
        "#;
        let records = OlxExtractor.extract_cards(html, &base()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, None);
    }

    #[test]
    fn test_extract_cards_empty_page() {
        let records = OlxExtractor.extract_cards("<html></html>", &base()).unwrap();
        assert!(records.is_empty());
    }
}
