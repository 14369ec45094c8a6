//! Listing types: source sites, built queries, raw and canonical records.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A supported classifieds site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// OLX Brasil (São Paulo region).
    Olx,
    /// WebMotors.
    WebMotors,
}

impl Site {
    /// Every supported site, in query order.
    pub const ALL: [Site; 2] = [Site::Olx, Site::WebMotors];

    /// Short lowercase identifier, as used on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            Site::Olx => "olx",
            Site::WebMotors => "webmotors",
        }
    }

    /// Human-readable site name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Site::Olx => "OLX",
            Site::WebMotors => "WebMotors",
        }
    }

    /// Looks a site up by its identifier (case-insensitive).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|site| site.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A search URL built for one site. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    site: Site,
    url: url::Url,
}

impl SourceQuery {
    pub(crate) fn new(site: Site, url: url::Url) -> Self {
        Self { site, url }
    }

    /// The site this query targets.
    pub fn site(&self) -> Site {
        self.site
    }

    /// The fully-qualified search URL.
    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

/// Site-native extraction output for one listing card, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub site: Site,
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub year: Option<i32>,
    pub mileage_km: Option<u32>,
    pub location: Option<String>,
    pub url: Option<String>,
}

impl RawListing {
    /// Creates an empty record for the given site.
    pub fn new(site: Site) -> Self {
        Self {
            site,
            title: None,
            price: None,
            year: None,
            mileage_km: None,
            location: None,
            url: None,
        }
    }

    /// Returns true when both title and URL are present and non-blank.
    pub fn has_identity(&self) -> bool {
        let present =
            |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.title) && present(&self.url)
    }
}

/// A validated vehicle listing, the unit returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleListing {
    /// Listing headline.
    #[serde(rename = "titulo_anuncio")]
    pub title: String,
    /// Asking price in BRL.
    #[serde(
        rename = "valor_anunciado",
        with = "rust_decimal::serde::float_option",
        default
    )]
    pub price: Option<Decimal>,
    /// Model year.
    #[serde(rename = "ano")]
    pub year: Option<i32>,
    /// Odometer reading in kilometres.
    #[serde(rename = "quilometragem")]
    pub mileage_km: Option<u32>,
    /// Seller location as shown on the card.
    #[serde(rename = "localidade")]
    pub location: Option<String>,
    /// Absolute link to the listing page.
    #[serde(rename = "link_anuncio")]
    pub listing_url: String,
    /// Site the listing was extracted from.
    #[serde(rename = "site_origem")]
    pub source_site: Site,
}
