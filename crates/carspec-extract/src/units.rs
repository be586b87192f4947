//! Number + unit extraction from free-text specification values.
//!
//! Extraction is best-effort: a miss returns `None` and the caller keeps the
//! original text. Numbers accept a decimal point; thousands separators are not
//! recognized.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Group of interchangeable units a value can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    Power,
    Torque,
    Displacement,
    Speed,
    Consumption,
    Time,
    GearCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Kilowatt,
    Horsepower,
    MetricHorsepower,
    NewtonMetre,
    PoundFoot,
    Litre,
    KilometresPerHour,
    MilesPerHour,
    LitresPer100Km,
    MilesPerGallon,
    Second,
    Speeds,
}

impl Unit {
    /// Normalized suffix used when a measurement is written back as text.
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Kilowatt => "kW",
            Unit::Horsepower => "hp",
            Unit::MetricHorsepower => "PS",
            Unit::NewtonMetre => "Nm",
            Unit::PoundFoot => "lb-ft",
            Unit::Litre => "l",
            Unit::KilometresPerHour => "km/h",
            Unit::MilesPerHour => "mph",
            Unit::LitresPer100Km => "l/100 km",
            Unit::MilesPerGallon => "mpg",
            Unit::Second => "sec",
            Unit::Speeds => "speed",
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Kilowatt | Unit::Horsepower | Unit::MetricHorsepower => UnitFamily::Power,
            Unit::NewtonMetre | Unit::PoundFoot => UnitFamily::Torque,
            Unit::Litre => UnitFamily::Displacement,
            Unit::KilometresPerHour | Unit::MilesPerHour => UnitFamily::Speed,
            Unit::LitresPer100Km | Unit::MilesPerGallon => UnitFamily::Consumption,
            Unit::Second => UnitFamily::Time,
            Unit::Speeds => UnitFamily::GearCount,
        }
    }
}

/// A numeric token and the unit it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// The number exactly as it appeared, e.g. "3.7".
    pub number: String,
    pub unit: Unit,
}

impl Measurement {
    pub fn value(&self) -> Option<f64> {
        self.number.parse().ok()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.unit.suffix())
    }
}

const NUMBER: &str = r"(\d+(?:\.\d+)?)";

// Units in family order. A family's first unit wins ties on position.
static MEASUREMENT_PATTERNS: Lazy<Vec<(Unit, Regex)>> = Lazy::new(|| {
    [
        (Unit::Kilowatt, r"\s*(?:kw|kilowatts?)(?:$|[^a-z])"),
        (Unit::Horsepower, r"\s*(?:bhp|hp|horsepower)(?:$|[^a-z])"),
        (Unit::MetricHorsepower, r"\s*ps(?:$|[^a-z])"),
        (Unit::NewtonMetre, r"\s*(?:nm|newton)"),
        (Unit::PoundFoot, r"\s*(?:lb[\s.-]*ft|ft[\s.-]*lbs?|lbs?)(?:$|[^a-z])"),
        (Unit::Litre, r"\s*(?:l|litres?|liters?)(?:$|[^a-z/])"),
        (Unit::KilometresPerHour, r"\s*(?:km/hr?|kmh|kph)"),
        (Unit::MilesPerHour, r"\s*mph"),
        (
            Unit::LitresPer100Km,
            r"\s*(?:l|litres?|liters?)\s*/\s*100(?:\s*km)?",
        ),
        (Unit::MilesPerGallon, r"\s*mpg"),
        (Unit::Second, r"\s*(?:seconds?|secs?|s)(?:$|[^a-z])"),
        (Unit::Speeds, r"\s*-?\s*speed"),
    ]
    .into_iter()
    .map(|(unit, tail)| {
        let number = if unit == Unit::Speeds { r"(\d+)" } else { NUMBER };
        let re = Regex::new(&format!("(?i){number}{tail}")).unwrap();
        (unit, re)
    })
    .collect()
});

// Unit keywords without a number, bounded by non-letters. Only units that pick
// a slot variant are listed.
static KEYWORD_PATTERNS: Lazy<Vec<(Unit, Regex)>> = Lazy::new(|| {
    [
        (Unit::Kilowatt, r"kw|kilowatts?"),
        (Unit::Horsepower, r"bhp|hp|horsepower"),
        (Unit::MetricHorsepower, r"ps"),
        (Unit::NewtonMetre, r"nm|newton(?:[\s-]?met(?:re|er)s?)?"),
        (Unit::PoundFoot, r"lb[\s.-]*ft|ft[\s.-]*lbs?|lbs?|pound[\s-]*f(?:ee|oo)t"),
        (Unit::KilometresPerHour, r"km/hr?|kmh|kph"),
        (Unit::MilesPerHour, r"mph"),
        (Unit::LitresPer100Km, r"l\s*/\s*100(?:\s*km)?|litres?|liters?"),
        (Unit::MilesPerGallon, r"mpg"),
    ]
    .into_iter()
    .map(|(unit, kw)| {
        let re = Regex::new(&format!("(?i)(?:^|[^a-z])(?:{kw})(?:$|[^a-z])")).unwrap();
        (unit, re)
    })
    .collect()
});

/// Free-text markers scanned in auxiliary text blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    ZeroTo60Mph,
    ZeroTo100Kmh,
    ZeroTo200Kmh,
    QuarterMile,
    TopSpeed,
}

impl Marker {
    pub const ALL: [Marker; 5] = [
        Marker::ZeroTo60Mph,
        Marker::ZeroTo100Kmh,
        Marker::ZeroTo200Kmh,
        Marker::QuarterMile,
        Marker::TopSpeed,
    ];
}

const SECONDS_TAIL: &str = r"\s*(?:seconds?|secs?|s)(?:$|[^a-z])";

static MARKER_PATTERNS: Lazy<Vec<(Marker, Unit, Regex)>> = Lazy::new(|| {
    [
        (
            Marker::ZeroTo60Mph,
            Unit::Second,
            format!(r"(?:^|[^\d.])0\s*[-–]?\s*60\s*mph[:\s]*(?:in\s+)?{NUMBER}{SECONDS_TAIL}"),
        ),
        (
            Marker::ZeroTo100Kmh,
            Unit::Second,
            format!(r"(?:^|[^\d.])0\s*[-–]?\s*100\s*km/h[:\s]*(?:in\s+)?{NUMBER}{SECONDS_TAIL}"),
        ),
        (
            Marker::ZeroTo200Kmh,
            Unit::Second,
            format!(r"(?:^|[^\d.])0\s*[-–]?\s*200\s*km/h[:\s]*(?:in\s+)?{NUMBER}{SECONDS_TAIL}"),
        ),
        (
            Marker::QuarterMile,
            Unit::Second,
            format!(r"(?:quarter[\s-]*mile|1/4\s*mile)[:\s]*(?:in\s+)?{NUMBER}{SECONDS_TAIL}"),
        ),
        (
            Marker::TopSpeed,
            Unit::KilometresPerHour,
            format!(r"top\s+speed[:\s]*(?:of\s+)?{NUMBER}\s*km/h"),
        ),
    ]
    .into_iter()
    .map(|(marker, unit, pattern)| (marker, unit, Regex::new(&format!("(?i){pattern}")).unwrap()))
    .collect()
});

fn find_unit(text: &str, unit: Unit) -> Option<(usize, Measurement)> {
    let (_, re) = MEASUREMENT_PATTERNS.iter().find(|(u, _)| *u == unit)?;
    let caps = re.captures(text)?;
    let m = caps.get(1)?;
    Some((
        m.start(),
        Measurement {
            number: m.as_str().to_string(),
            unit,
        },
    ))
}

/// Extract one specific unit from `text`.
pub fn extract_unit(text: &str, unit: Unit) -> Option<Measurement> {
    find_unit(text, unit).map(|(_, m)| m)
}

/// Extract the leading measurement of the requested family.
pub fn extract(text: &str, family: UnitFamily) -> Option<Measurement> {
    MEASUREMENT_PATTERNS
        .iter()
        .filter(|(unit, _)| unit.family() == family)
        .filter_map(|(unit, _)| find_unit(text, *unit))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, m)| m)
}

/// First measurement of every unit of `family` present in `text`, in family order.
pub fn extract_all(text: &str, family: UnitFamily) -> Vec<Measurement> {
    MEASUREMENT_PATTERNS
        .iter()
        .filter(|(unit, _)| unit.family() == family)
        .filter_map(|(unit, _)| extract_unit(text, *unit))
        .collect()
}

/// Whether `text` names `unit` as a standalone keyword, with or without a number.
pub fn mentions(text: &str, unit: Unit) -> bool {
    KEYWORD_PATTERNS
        .iter()
        .any(|(u, re)| *u == unit && re.is_match(text))
}

/// Find a figure introduced by `marker` in free text, e.g. "0-100 km/h: 3.7 sec".
pub fn scan_marker(text: &str, marker: Marker) -> Option<Measurement> {
    let (_, unit, re) = MARKER_PATTERNS.iter().find(|(m, _, _)| *m == marker)?;
    let number = re.captures(text)?.get(1)?.as_str().to_string();
    Some(Measurement {
        number,
        unit: *unit,
    })
}

/// Gear count from an "<N>-speed" phrase.
pub fn gear_count(text: &str) -> Option<u8> {
    extract_unit(text, Unit::Speeds)?.number.parse().ok()
}
