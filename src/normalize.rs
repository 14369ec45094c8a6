//! Normalization and filtering of extracted listings.
//!
//! Raw records become [`VehicleListing`]s only if they carry a title and an
//! absolute link. The [`SearchSpec`] bounds are then applied as a post-hoc
//! filter, since not every site honours every search parameter (OLX has no
//! mileage filter, for one). Listings are not deduplicated across sites.

use url::Url;

use crate::{RawListing, SearchSpec, VehicleListing};

/// Validates raw records and keeps those matching `spec`.
pub fn normalize_and_filter(raw: Vec<RawListing>, spec: &SearchSpec) -> Vec<VehicleListing> {
    raw.into_iter()
        .filter_map(normalize)
        .filter(|listing| matches_spec(listing, spec))
        .collect()
}

/// Converts one raw record into a canonical listing, or `None` if it is
/// missing a title or an absolute URL.
pub fn normalize(raw: RawListing) -> Option<VehicleListing> {
    let title = raw.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let link = raw.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    let listing_url = Url::parse(link).ok()?;

    Some(VehicleListing {
        title: title.to_string(),
        price: raw.price,
        year: raw.year,
        mileage_km: raw.mileage_km,
        location: raw
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        listing_url: listing_url.to_string(),
        source_site: raw.site,
    })
}

/// Applies the search bounds to one listing.
///
/// Each bound only applies when both the search field and the
/// listing field are present; unknown values never exclude a listing.
pub fn matches_spec(listing: &VehicleListing, spec: &SearchSpec) -> bool {
    if let (Some(max), Some(price)) = (spec.max_price, listing.price) {
        if price > max {
            return false;
        }
    }

    if let (Some(min), Some(year)) = (spec.min_year, listing.year) {
        if year < min {
            return false;
        }
    }

    if let (Some(max), Some(year)) = (spec.max_year, listing.year) {
        if year > max {
            return false;
        }
    }

    if let (Some(max), Some(km)) = (spec.max_mileage, listing.mileage_km) {
        if km > max {
            return false;
        }
    }

    if let (Some(wanted), Some(location)) = (spec.location(), listing.location.as_deref()) {
        if !location.to_lowercase().contains(&wanted.to_lowercase()) {
            return false;
        }
    }

    true
}
