//! WebMotors result page extraction.
//!
//! Each vehicle is a `.CardVehicle`. Year and mileage share one compound
//! label, e.g. "2020/2021 • 35.000 km".

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{collect_cards, compile, first_link, first_text, SiteExtractor};
use crate::parse::{parse_price, year_and_mileage};
use crate::{RawListing, Result, Site};

const CARD: &str = ".CardVehicle";

/// Extractor for WebMotors stock search pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMotorsExtractor;

struct CardSelectors {
    title: Selector,
    price: Selector,
    year_km: Selector,
    location: Selector,
    anchor: Selector,
}

impl CardSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            title: compile("h2")?,
            price: compile(".CardVehicle__price")?,
            year_km: compile(".CardVehicle__year-km")?,
            location: compile(".CardVehicle__location")?,
            anchor: compile("a")?,
        })
    }
}

impl WebMotorsExtractor {
    fn parse_card(
        &self,
        card: ElementRef<'_>,
        s: &CardSelectors,
        base: &Url,
    ) -> Result<RawListing> {
        let (year, mileage_km) = match first_text(card, &s.year_km) {
            Some(label) => year_and_mileage(&label)?,
            None => (None, None),
        };

        let mut record = RawListing::new(Site::WebMotors);
        record.title = first_text(card, &s.title);
        record.price = first_text(card, &s.price).and_then(|text| parse_price(&text));
        record.year = year;
        record.mileage_km = mileage_km;
        record.location = first_text(card, &s.location);
        record.url = first_link(card, &s.anchor, base)?;
        Ok(record)
    }
}

impl SiteExtractor for WebMotorsExtractor {
    fn site(&self) -> Site {
        Site::WebMotors
    }

    fn card_selector(&self) -> &'static str {
        CARD
    }

    fn extract_cards(&self, html: &str, base: &Url) -> Result<Vec<RawListing>> {
        let selectors = CardSelectors::compile()?;
        let cards = compile(CARD)?;
        let document = Html::parse_document(html);
        Ok(collect_cards(Site::WebMotors, document.select(&cards), |card| {
            self.parse_card(card, &selectors, base)
        }))
    }
}
