//! Per-site search URL construction.
//!
//! | Search field | OLX    | WebMotors             |
//! |--------------|--------|-----------------------|
//! | brand+model  | `q`    | `marca` + `modelo`    |
//! | max price    | `pe`   | `precoate`            |
//! | min year     | `rs`   | `anoinicial`          |
//! | max year     | `re`   | `anofinal`            |
//! | max mileage  | -      | `kmmax`               |

use rust_decimal::Decimal;
use tracing::{debug, warn};
use url::Url;

use crate::{Result, ScoutError, SearchSpec, Site, SourceQuery};

const OLX_BASE: &str = "https://sp.olx.com.br/autos-e-pecas/carros-vans-e-utilitarios";
const WEBMOTORS_BASE: &str = "https://www.webmotors.com.br/carros/estoque";

/// Builds the search URL for one site, or `None` if it cannot be built.
///
/// Never fails: a build error is logged and the site is skipped.
pub fn build(site: Site, spec: &SearchSpec) -> Option<SourceQuery> {
    build_from(site, base_url(site), spec)
}

/// Builds the search URLs for every supported site, skipping failures.
pub fn build_all(spec: &SearchSpec) -> Vec<SourceQuery> {
    build_all_from(spec, base_url)
}

fn base_url(site: Site) -> &'static str {
    match site {
        Site::Olx => OLX_BASE,
        Site::WebMotors => WEBMOTORS_BASE,
    }
}

fn build_from(site: Site, base: &str, spec: &SearchSpec) -> Option<SourceQuery> {
    let built = match site {
        Site::Olx => olx_url(base, spec),
        Site::WebMotors => webmotors_url(base, spec),
    }
    .map_err(|e| ScoutError::QueryBuild {
        site,
        reason: e.to_string(),
    });

    match built {
        Ok(url) => {
            debug!(site = %site, url = %url, "Built search URL");
            Some(SourceQuery::new(site, url))
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

fn build_all_from(spec: &SearchSpec, base: impl Fn(Site) -> &'static str) -> Vec<SourceQuery> {
    Site::ALL
        .into_iter()
        .filter_map(|site| build_from(site, base(site), spec))
        .collect()
}

fn olx_url(base: &str, spec: &SearchSpec) -> Result<Url> {
    let mut params: Vec<(&str, String)> = Vec::new();

    // OLX only gets a free-text query when both make and model are known.
    if let (Some(brand), Some(model)) = (spec.brand(), spec.model()) {
        params.push(("q", format!("{} {}", brand, model)));
    }
    if let Some(price) = spec.max_price {
        params.push(("pe", price_param(price)));
    }
    if let Some(year) = spec.min_year {
        params.push(("rs", year.to_string()));
    }
    if let Some(year) = spec.max_year {
        params.push(("re", year.to_string()));
    }

    with_params(base, &params)
}

fn webmotors_url(base: &str, spec: &SearchSpec) -> Result<Url> {
    let mut params: Vec<(&str, String)> = vec![("tipoveiculo", "carros".to_string())];

    if let Some(brand) = spec.brand() {
        params.push(("marca", brand.to_lowercase()));
    }
    if let Some(model) = spec.model() {
        params.push(("modelo", model.to_lowercase()));
    }
    if let Some(price) = spec.max_price {
        params.push(("precoate", price_param(price)));
    }
    if let Some(year) = spec.min_year {
        params.push(("anoinicial", year.to_string()));
    }
    if let Some(year) = spec.max_year {
        params.push(("anofinal", year.to_string()));
    }
    if let Some(km) = spec.max_mileage {
        params.push(("kmmax", km.to_string()));
    }

    with_params(base, &params)
}

fn with_params(base: &str, params: &[(&str, String)]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
}

/// Formats a price without trailing fractional zeros ("40000.00" -> "40000").
fn price_param(price: Decimal) -> String {
    price.normalize().to_string()
}
