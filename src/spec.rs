//! Search specification: the caller's vehicle search intent.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A vehicle search. Every field is optional; absent fields impose no
/// constraint on the query or the result filter.
///
/// The serialized field names match the JSON request contract
/// (`marca`, `modelo`, `valor_maximo`, ...). Numeric fields accept either
/// JSON numbers or numeric strings, and an empty string counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Vehicle make, e.g. "Fiat".
    #[serde(rename = "marca", default)]
    pub brand: Option<String>,
    /// Vehicle model, e.g. "Uno".
    #[serde(rename = "modelo", default)]
    pub model: Option<String>,
    /// Price ceiling in BRL.
    #[serde(rename = "valor_maximo", default, deserialize_with = "lenient_number")]
    pub max_price: Option<Decimal>,
    /// Oldest acceptable model year.
    #[serde(rename = "ano_min", default, deserialize_with = "lenient_number")]
    pub min_year: Option<i32>,
    /// Newest acceptable model year.
    #[serde(rename = "ano_max", default, deserialize_with = "lenient_number")]
    pub max_year: Option<i32>,
    /// Odometer ceiling in kilometres.
    #[serde(rename = "km_maxima", default, deserialize_with = "lenient_number")]
    pub max_mileage: Option<u32>,
    /// Case-insensitive substring the listing location must contain.
    #[serde(rename = "localidade", default)]
    pub location: Option<String>,
}

impl SearchSpec {
    /// Creates an unconstrained search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vehicle make.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Sets the vehicle model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the price ceiling.
    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Sets the oldest acceptable model year.
    pub fn with_min_year(mut self, year: i32) -> Self {
        self.min_year = Some(year);
        self
    }

    /// Sets the newest acceptable model year.
    pub fn with_max_year(mut self, year: i32) -> Self {
        self.max_year = Some(year);
        self
    }

    /// Sets the mileage ceiling.
    pub fn with_max_mileage(mut self, km: u32) -> Self {
        self.max_mileage = Some(km);
        self
    }

    /// Sets the location substring.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The make, if present and not blank.
    pub fn brand(&self) -> Option<&str> {
        non_blank(&self.brand)
    }

    /// The model, if present and not blank.
    pub fn model(&self) -> Option<&str> {
        non_blank(&self.model)
    }

    /// The location substring, if present and not blank.
    pub fn location(&self) -> Option<&str> {
        non_blank(&self.location)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid number '{}': {}", text, e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_spec_default_is_unconstrained() {
        let spec = SearchSpec::new();
        assert!(spec.brand().is_none());
        assert!(spec.model().is_none());
        assert!(spec.max_price.is_none());
        assert!(spec.min_year.is_none());
        assert!(spec.max_year.is_none());
        assert!(spec.max_mileage.is_none());
        assert!(spec.location().is_none());
    }

    #[test]
    fn test_search_spec_builder_chain() {
        let spec = SearchSpec::new()
            .with_brand("Fiat")
            .with_model("Uno")
            .with_max_price(Decimal::from(40000))
            .with_min_year(2010)
            .with_max_year(2015)
            .with_max_mileage(120000)
            .with_location("Campinas");
        assert_eq!(spec.brand(), Some("Fiat"));
        assert_eq!(spec.model(), Some("Uno"));
        assert_eq!(spec.max_price, Some(Decimal::from(40000)));
        assert_eq!(spec.min_year, Some(2010));
        assert_eq!(spec.max_year, Some(2015));
        assert_eq!(spec.max_mileage, Some(120000));
        assert_eq!(spec.location(), Some("Campinas"));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let spec = SearchSpec::new().with_brand("  ").with_location("");
        assert!(spec.brand().is_none());
        assert!(spec.location().is_none());
    }

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{
            "marca": "Fiat",
            "modelo": "Uno",
            "valor_maximo": 40000,
            "ano_min": 2010,
            "ano_max": 2014,
            "km_maxima": 90000,
            "localidade": "São Paulo"
        }"#;
        let spec: SearchSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.brand(), Some("Fiat"));
        assert_eq!(spec.model(), Some("Uno"));
        assert_eq!(spec.max_price, Some(Decimal::from(40000)));
        assert_eq!(spec.min_year, Some(2010));
        assert_eq!(spec.max_year, Some(2014));
        assert_eq!(spec.max_mileage, Some(90000));
        assert_eq!(spec.location(), Some("São Paulo"));
    }

    #[test]
    fn test_deserialize_numeric_strings() {
        let json = r#"{"valor_maximo": "35000.50", "ano_min": "2018", "km_maxima": ""}"#;
        let spec: SearchSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.max_price, Some(Decimal::new(3500050, 2)));
        assert_eq!(spec.min_year, Some(2018));
        assert!(spec.max_mileage.is_none());
    }

    #[test]
    fn test_deserialize_missing_and_null_fields() {
        let spec: SearchSpec = serde_json::from_str(r#"{"ano_max": null}"#).unwrap();
        assert_eq!(spec, SearchSpec::default());
    }

    #[test]
    fn test_deserialize_rejects_garbage_number() {
        let result: Result<SearchSpec, _> = serde_json::from_str(r#"{"ano_min": "recent"}"#);
        assert!(result.is_err());
    }
}
