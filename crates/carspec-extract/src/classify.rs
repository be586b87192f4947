//! Ordered label → slot classification.
//!
//! Rules are evaluated top to bottom and the first match wins. Several labels
//! are substrings of others ("power" vs "power (kw)", "urban" vs
//! "extra-urban"), so the order of [`RULES`] is part of the contract: new rules
//! go next to their group, never ahead of an existing, more specific one.

use carspec_core::Slot;
use once_cell::sync::Lazy;

use crate::normalize::{clean_value, normalize_label};
use crate::units::{self, Unit, UnitFamily};

/// Label predicate of a rule, evaluated on the normalized label.
#[derive(Debug)]
enum Pattern {
    /// Label contains the keyword.
    Has(&'static str),
    /// Label is exactly the keyword.
    Is(&'static str),
    StartsWith(&'static str),
    Any(Vec<Pattern>),
    All(Vec<Pattern>),
    Not(Box<Pattern>),
}

impl Pattern {
    fn matches(&self, label: &str) -> bool {
        match self {
            Pattern::Has(kw) => label.contains(kw),
            Pattern::Is(kw) => label == *kw,
            Pattern::StartsWith(kw) => label.starts_with(kw),
            Pattern::Any(ps) => ps.iter().any(|p| p.matches(label)),
            Pattern::All(ps) => ps.iter().all(|p| p.matches(label)),
            Pattern::Not(p) => !p.matches(label),
        }
    }
}

fn has(keywords: &[&'static str]) -> Pattern {
    Pattern::Any(keywords.iter().copied().map(Pattern::Has).collect())
}

fn is(keyword: &'static str) -> Pattern {
    Pattern::Is(keyword)
}

fn starts(keyword: &'static str) -> Pattern {
    Pattern::StartsWith(keyword)
}

fn any(patterns: Vec<Pattern>) -> Pattern {
    Pattern::Any(patterns)
}

fn all(patterns: Vec<Pattern>) -> Pattern {
    Pattern::All(patterns)
}

fn not(pattern: Pattern) -> Pattern {
    Pattern::Not(Box::new(pattern))
}

/// Driving regime of a consumption figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Urban,
    ExtraUrban,
    Combined,
}

/// What a rule points at: a fixed slot, or a slot family whose member is
/// picked by unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Slot(Slot),
    Power,
    Torque,
    TopSpeed,
    Consumption(Regime),
}

impl Target {
    /// Unit family used to pick between slot variants.
    pub fn family(&self) -> Option<UnitFamily> {
        match self {
            Target::Slot(_) => None,
            Target::Power => Some(UnitFamily::Power),
            Target::Torque => Some(UnitFamily::Torque),
            Target::TopSpeed => Some(UnitFamily::Speed),
            Target::Consumption(_) => Some(UnitFamily::Consumption),
        }
    }

    /// Slot variant holding figures in `unit`.
    pub fn slot_for(&self, unit: Unit) -> Option<Slot> {
        let slot = match (self, unit) {
            (Target::Power, Unit::Kilowatt) => Slot::PowerKw,
            (Target::Power, Unit::Horsepower) => Slot::PowerHp,
            (Target::Power, Unit::MetricHorsepower) => Slot::PowerPs,
            (Target::Torque, Unit::NewtonMetre) => Slot::TorqueNm,
            (Target::Torque, Unit::PoundFoot) => Slot::TorqueLbft,
            (Target::TopSpeed, Unit::KilometresPerHour) => Slot::TopSpeedKmh,
            (Target::TopSpeed, Unit::MilesPerHour) => Slot::TopSpeedMph,
            (Target::Consumption(r), Unit::LitresPer100Km) => match r {
                Regime::Urban => Slot::ConsumptionUrbanL,
                Regime::ExtraUrban => Slot::ConsumptionExtraUrbanL,
                Regime::Combined => Slot::ConsumptionCombinedL,
            },
            (Target::Consumption(r), Unit::MilesPerGallon) => match r {
                Regime::Urban => Slot::ConsumptionUrbanMpg,
                Regime::ExtraUrban => Slot::ConsumptionExtraUrbanMpg,
                Regime::Combined => Slot::ConsumptionCombinedMpg,
            },
            _ => return None,
        };
        Some(slot)
    }

    /// Units checked, in priority order, when picking a variant.
    fn units(&self) -> &'static [Unit] {
        match self {
            Target::Slot(_) => &[],
            Target::Power => &[Unit::Kilowatt, Unit::Horsepower, Unit::MetricHorsepower],
            Target::Torque => &[Unit::NewtonMetre, Unit::PoundFoot],
            Target::TopSpeed => &[Unit::KilometresPerHour, Unit::MilesPerHour],
            Target::Consumption(_) => &[Unit::LitresPer100Km, Unit::MilesPerGallon],
        }
    }

    /// Variant used when neither label nor value names a unit.
    fn default_unit(&self) -> Option<Unit> {
        match self {
            Target::Slot(_) => None,
            Target::Power => Some(Unit::Horsepower),
            Target::Torque => Some(Unit::NewtonMetre),
            Target::TopSpeed => Some(Unit::KilometresPerHour),
            Target::Consumption(_) => Some(Unit::LitresPer100Km),
        }
    }

    /// Whether the label itself may name the unit. Top speed and consumption
    /// labels rarely do, and "km" in a label would not disambiguate anyway.
    fn label_names_unit(&self) -> bool {
        matches!(self, Target::Power | Target::Torque)
    }
}

/// How the slot variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Fixed-slot rule, or unit keyword in the label.
    Label,
    /// Unit keyword in the value.
    Value,
    /// No unit anywhere; fell back to the family's default slot.
    Default,
}

/// Result of classifying one raw entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub slot: Slot,
    pub target: Target,
    pub basis: Basis,
    /// Name of the rule that fired.
    pub rule: &'static str,
}

struct Rule {
    name: &'static str,
    when: Pattern,
    target: Target,
}

fn rule(name: &'static str, when: Pattern, target: Target) -> Rule {
    Rule { name, when, target }
}

fn slot(slot: Slot) -> Target {
    Target::Slot(slot)
}

fn consumption_label() -> Pattern {
    has(&["consumption", "fuel", "economy"])
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // Engine identity
        rule("engine type", has(&["engine type", "engine layout"]), slot(Slot::EngineType)),
        rule("engine code", has(&["engine code"]), slot(Slot::EngineCode)),
        rule("cylinders", has(&["cylinders"]), slot(Slot::Cylinders)),
        rule(
            "configuration",
            all(vec![
                has(&["configuration"]),
                not(has(&["seat", "body", "cabin", "interior", "door"])),
            ]),
            slot(Slot::Configuration),
        ),
        rule("aspiration", has(&["aspiration", "forced induction"]), slot(Slot::Aspiration)),
        rule("fuel system", has(&["fuel system"]), slot(Slot::FuelSystem)),
        // Displacement
        rule(
            "displacement",
            has(&["displacement", "engine size", "cubic capacity"]),
            slot(Slot::Displacement),
        ),
        // Power and torque
        rule(
            "power",
            all(vec![
                has(&["power", "horsepower"]),
                not(has(&["ratio", "to weight", "to-weight", "steering"])),
            ]),
            Target::Power,
        ),
        rule("torque", has(&["torque"]), Target::Torque),
        // Drivetrain
        rule("transmission", has(&["transmission", "gearbox"]), slot(Slot::Transmission)),
        rule(
            "drive",
            all(vec![has(&["drive"]), not(has(&["driver", "driving"]))]),
            slot(Slot::DriveType),
        ),
        // Acceleration
        rule("0-60 mph", has(&["0-60", "0 - 60", "0 to 60"]), slot(Slot::Acceleration0To60Mph)),
        rule(
            "0-100 km/h",
            has(&["0-100", "0 - 100", "0 to 100"]),
            slot(Slot::Acceleration0To100Kmh),
        ),
        rule(
            "0-200 km/h",
            has(&["0-200", "0 - 200", "0 to 200"]),
            slot(Slot::Acceleration0To200Kmh),
        ),
        rule(
            "top speed",
            has(&["top speed", "maximum speed", "max speed", "max. speed"]),
            Target::TopSpeed,
        ),
        rule(
            "quarter mile",
            has(&["quarter mile", "quarter-mile", "1/4 mile"]),
            slot(Slot::QuarterMileTime),
        ),
        // Fuel
        rule("fuel type", has(&["fuel type"]), slot(Slot::FuelType)),
        rule("fuel tank", has(&["fuel tank", "tank capacity"]), slot(Slot::FuelTankCapacity)),
        rule(
            "co2",
            any(vec![
                has(&["co2"]),
                all(vec![has(&["emission"]), not(has(&["standard", "class", "norm", "euro"]))]),
            ]),
            slot(Slot::Co2Emissions),
        ),
        // Consumption: regime, then unit in the value
        rule(
            "urban consumption",
            all(vec![
                has(&["urban", "city"]),
                not(has(&["extra-urban", "extra urban"])),
                consumption_label(),
            ]),
            Target::Consumption(Regime::Urban),
        ),
        rule(
            "extra-urban consumption",
            all(vec![
                has(&["extra-urban", "extra urban", "highway"]),
                consumption_label(),
            ]),
            Target::Consumption(Regime::ExtraUrban),
        ),
        rule(
            "combined consumption",
            all(vec![has(&["combined"]), consumption_label()]),
            Target::Consumption(Regime::Combined),
        ),
        // Dimensions and mass
        rule("length", any(vec![starts("length"), has(&["overall length"])]), slot(Slot::Length)),
        rule("width", any(vec![starts("width"), has(&["overall width"])]), slot(Slot::Width)),
        rule("height", any(vec![starts("height"), has(&["overall height"])]), slot(Slot::Height)),
        rule("wheelbase", has(&["wheelbase"]), slot(Slot::Wheelbase)),
        rule("front track", has(&["front track"]), slot(Slot::FrontTrack)),
        rule("rear track", has(&["rear track"]), slot(Slot::RearTrack)),
        rule(
            "curb weight",
            any(vec![has(&["curb weight", "kerb weight"]), is("weight")]),
            slot(Slot::CurbWeight),
        ),
        rule(
            "gross weight",
            has(&["gross weight", "gross vehicle weight", "gvwr"]),
            slot(Slot::GrossWeight),
        ),
        rule("max load", has(&["max load", "payload"]), slot(Slot::MaxLoad)),
        rule(
            "cargo volume",
            has(&["trunk", "boot", "cargo", "luggage"]),
            slot(Slot::TrunkSpace),
        ),
        // Body
        rule(
            "body type",
            has(&["body type", "body style", "bodywork"]),
            slot(Slot::BodyType),
        ),
        rule("doors", any(vec![is("doors"), has(&["number of doors"])]), slot(Slot::Doors)),
        rule(
            "seats",
            any(vec![is("seats"), has(&["seating capacity", "number of seats"])]),
            slot(Slot::Seats),
        ),
        // Chassis
        rule("front suspension", has(&["front suspension"]), slot(Slot::FrontSuspension)),
        rule("rear suspension", has(&["rear suspension"]), slot(Slot::RearSuspension)),
        rule("front brakes", has(&["front brake"]), slot(Slot::FrontBrakes)),
        rule("rear brakes", has(&["rear brake"]), slot(Slot::RearBrakes)),
        rule("front tires", has(&["front tire", "front tyre"]), slot(Slot::TireSizeFront)),
        rule("rear tires", has(&["rear tire", "rear tyre"]), slot(Slot::TireSizeRear)),
        rule("front wheels", has(&["front wheel", "front rim"]), slot(Slot::WheelSizeFront)),
        rule("rear wheels", has(&["rear wheel", "rear rim"]), slot(Slot::WheelSizeRear)),
        // Lineage
        rule("production", has(&["production"]), slot(Slot::ProductionPeriod)),
        rule("platform", has(&["platform"]), slot(Slot::Platform)),
        rule("generation", has(&["generation"]), slot(Slot::Generation)),
    ]
});

/// Rule names in evaluation order.
pub fn rule_names() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|r| r.name)
}

fn resolve(target: Target, label: &str, value: &str) -> Option<(Slot, Basis)> {
    if let Target::Slot(slot) = target {
        return Some((slot, Basis::Label));
    }

    let candidates = target.units();
    if target.label_names_unit() {
        if let Some(unit) = candidates.iter().find(|u| units::mentions(label, **u)) {
            return target.slot_for(*unit).map(|slot| (slot, Basis::Label));
        }
    }
    if let Some(unit) = candidates.iter().find(|u| units::mentions(value, **u)) {
        return target.slot_for(*unit).map(|slot| (slot, Basis::Value));
    }

    let slot = target.slot_for(target.default_unit()?)?;
    Some((slot, Basis::Default))
}

/// Classify an already normalized label (see [`normalize_label`]).
///
/// Returns `None` when no rule matches, when the label is empty, or when the
/// label equals its value (a heading duplicated into both cells).
pub fn classify(label: &str, value: &str) -> Option<Classification> {
    if label.is_empty() || label == normalize_label(value) {
        return None;
    }

    let rule = RULES.iter().find(|r| r.when.matches(label))?;
    let (slot, basis) = resolve(rule.target, label, value)?;
    Some(Classification {
        slot,
        target: rule.target,
        basis,
        rule: rule.name,
    })
}

/// Classify a label as it appears on the page.
pub fn classify_label(label: &str, value: &str) -> Option<Classification> {
    classify(&normalize_label(label), &clean_value(value))
}
