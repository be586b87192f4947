//! Year / brand / model from the page heading, or from the resource identifier.

use carspec_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// "<year> <brand> <model...> (<footnote>)", e.g. "2019 BMW 320i (aut. 8)".
static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})\s+([A-Za-z0-9][A-Za-z0-9\-]*)\s+([^(]*[^(\s])\s*(?:\(.*)?$").unwrap()
});

/// Where the identity fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Heading,
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub year: u16,
    pub brand: String,
    pub model: String,
    /// Numeric id segment of the identifier, when it has one.
    pub car_id: Option<String>,
    pub source: IdentitySource,
}

/// Parts recovered from `.../<year>/<numeric-id>/<brand>_<model...>.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierParts {
    pub year: u16,
    pub car_id: String,
    pub brand: String,
    pub model: String,
}

/// Parse a heading of the form "<4-digit year> <brand> <model...>".
///
/// Brand is a single (possibly hyphenated) token. The model runs up to an
/// optional trailing parenthesis.
pub fn parse_heading(heading: &str) -> Option<(u16, String, String)> {
    let caps = HEADING_RE.captures(heading.trim())?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let brand = caps.get(2)?.as_str().to_string();
    let model = caps.get(3)?.as_str().trim().to_string();
    if model.is_empty() {
        return None;
    }
    Some((year, brand, model))
}

fn is_year(segment: &str) -> bool {
    segment.len() == 4 && segment.bytes().all(|b| b.is_ascii_digit())
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn strip_html(segment: &str) -> Option<&str> {
    let lower = segment.to_ascii_lowercase();
    let cut = if lower.ends_with(".html") {
        5
    } else if lower.ends_with(".htm") {
        4
    } else {
        return None;
    };
    Some(&segment[..segment.len() - cut])
}

/// Parse a resource identifier such as
/// `https://www.automobile-catalog.com/car/2019/2877140/bmw_320i.html`.
pub fn parse_identifier(identifier: &str) -> Option<IdentifierParts> {
    let path = identifier
        .split(['?', '#'])
        .next()
        .unwrap_or(identifier);
    let segments: Vec<&str> = path.split('/').collect();

    segments.windows(3).find_map(|w| {
        let (year, id, file) = (w[0], w[1], w[2]);
        if !is_year(year) || !is_numeric(id) {
            return None;
        }
        let stem = strip_html(file)?;
        let mut tokens = stem.split('_');
        let brand = tokens.next().unwrap_or("").to_uppercase();
        let model = tokens.collect::<Vec<_>>().join("_");
        if brand.is_empty() || model.is_empty() {
            return None;
        }
        Some(IdentifierParts {
            year: year.parse().ok()?,
            car_id: id.to_string(),
            brand,
            model,
        })
    })
}

/// Resolve identity from the heading first, then the identifier.
///
/// Fails with [`Error::Unparsable`] when neither yields a 4-digit year.
pub fn resolve(heading: &str, identifier: &str) -> Result<Identity> {
    let parts = parse_identifier(identifier);
    let car_id = parts.as_ref().map(|p| p.car_id.clone());

    if let Some((year, brand, model)) = parse_heading(heading) {
        return Ok(Identity {
            year,
            brand,
            model,
            car_id,
            source: IdentitySource::Heading,
        });
    }

    match parts {
        Some(p) => Ok(Identity {
            year: p.year,
            brand: p.brand,
            model: p.model,
            car_id,
            source: IdentitySource::Identifier,
        }),
        None => Err(Error::Unparsable(format!(
            "heading {heading:?} and identifier {identifier:?} carry no year/brand/model"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_with_footnote() {
        let (year, brand, model) = parse_heading("2019 BMW 320i (aut. 8)").unwrap();
        assert_eq!(year, 2019);
        assert_eq!(brand, "BMW");
        assert_eq!(model, "320i");
    }

    #[test]
    fn test_heading_hyphenated_brand_multiword_model() {
        let (_, brand, model) = parse_heading("2020 Mercedes-Benz C 300 4MATIC (aut. 9)").unwrap();
        assert_eq!(brand, "Mercedes-Benz");
        assert_eq!(model, "C 300 4MATIC");

        let (_, _, model) = parse_heading("  2018 Porsche 911 GT3 RS  ").unwrap();
        assert_eq!(model, "911 GT3 RS");
    }

    #[test]
    fn test_heading_rejects() {
        assert!(parse_heading("BMW 320i").is_none());
        assert!(parse_heading("2019 BMW").is_none());
        assert!(parse_heading("2019 BMW (aut. 8)").is_none());
        assert!(parse_heading("").is_none());
    }

    #[test]
    fn test_identifier() {
        let p = parse_identifier("https://www.automobile-catalog.com/car/2019/2877140/bmw_320i.html")
            .unwrap();
        assert_eq!(p.year, 2019);
        assert_eq!(p.car_id, "2877140");
        assert_eq!(p.brand, "BMW");
        assert_eq!(p.model, "320i");

        let p = parse_identifier("/car/2020/2911120/mercedes-benz_c_300_4matic.html?ref=x").unwrap();
        assert_eq!(p.brand, "MERCEDES-BENZ");
        assert_eq!(p.model, "c_300_4matic");
    }

    #[test]
    fn test_identifier_rejects() {
        assert!(parse_identifier("https://www.automobile-catalog.com/").is_none());
        assert!(parse_identifier("/car/19/2877140/bmw_320i.html").is_none());
        assert!(parse_identifier("/car/2019/2877140/bmw.html").is_none());
        assert!(parse_identifier("/car/2019/abc/bmw_320i.html").is_none());
    }

    #[test]
    fn test_resolve_prefers_heading_keeps_car_id() {
        let id = resolve(
            "2019 BMW 320i (aut. 8)",
            "https://www.automobile-catalog.com/car/2019/2877140/bmw_320i.html",
        )
        .unwrap();
        assert_eq!(id.source, IdentitySource::Heading);
        assert_eq!(id.brand, "BMW");
        assert_eq!(id.car_id.as_deref(), Some("2877140"));
    }

    #[test]
    fn test_resolve_falls_back_to_identifier() {
        let id = resolve("", ".../car/2019/2877140/bmw_320i.html").unwrap();
        assert_eq!(id.source, IdentitySource::Identifier);
        assert_eq!((id.year, id.brand.as_str(), id.model.as_str()), (2019, "BMW", "320i"));
    }

    #[test]
    fn test_resolve_unparsable() {
        let err = resolve("Specifications", "https://example.com/specs").unwrap_err();
        assert!(matches!(err, Error::Unparsable(_)));
    }
}
