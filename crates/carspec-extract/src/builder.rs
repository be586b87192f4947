//! Incremental construction of a [`CanonicalSpec`] from raw entries and free text.

use std::collections::BTreeMap;

use carspec_core::{
    CanonicalSpec, ConflictPolicy, EngineConfig, RawEntry, RawSpecifications, Slot, SpecSlots,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::classify::{classify, Basis, Classification};
use crate::conflict::{ConflictResolver, Resolution};
use crate::identity::{Identity, IdentitySource};
use crate::normalize::{clean_label, clean_value, normalize_label};
use crate::units::{self, Marker, UnitFamily};

static AUTOMATIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:automatic|aut\.|cvt|dct|dsg|dual[\s-]clutch|tiptronic|steptronic)").unwrap()
});
static MANUAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bman(?:ual|\.)").unwrap());

/// Origin of a populated slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Label of the raw entry the value came from, as stored in `raw_specifications`.
    Label(String),
    /// Regex match in an auxiliary text block.
    TextScan,
}

/// How much of the page made it into typed slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub populated_slots: usize,
    pub total_slots: usize,
    /// Entries accepted, repeated labels included.
    pub raw_entries: usize,
    pub distinct_labels: usize,
    /// Entries matched by a classification rule.
    pub classified_entries: usize,
    /// Writes where two different values competed for one slot.
    pub conflicts: usize,
}

impl Completeness {
    /// Share of accepted entries that a rule classified.
    pub fn coverage(&self) -> f64 {
        if self.raw_entries == 0 {
            0.0
        } else {
            self.classified_entries as f64 / self.raw_entries as f64
        }
    }
}

/// A finished record plus what the engine knows about how it was built.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub spec: CanonicalSpec,
    pub completeness: Completeness,
    pub provenance: BTreeMap<Slot, Provenance>,
    pub identity_source: IdentitySource,
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Table,
    Text,
}

/// Builds the typed slots and the raw map for one page.
#[derive(Debug)]
pub struct SpecBuilder {
    slots: SpecSlots,
    raw: RawSpecifications,
    provenance: BTreeMap<Slot, Provenance>,
    table: ConflictResolver,
    text: ConflictResolver,
    raw_entries: usize,
    classified: usize,
    conflicts: usize,
}

impl SpecBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_policies(config.table_policy, config.text_policy)
    }

    pub fn with_policies(table: ConflictPolicy, text: ConflictPolicy) -> Self {
        Self {
            slots: SpecSlots::default(),
            raw: RawSpecifications::new(),
            provenance: BTreeMap::new(),
            table: ConflictResolver::new(table),
            text: ConflictResolver::new(text),
            raw_entries: 0,
            classified: 0,
            conflicts: 0,
        }
    }

    /// Record one table row and route it to its canonical slot(s).
    ///
    /// The raw map always takes the latest value for a label. Typed slots follow
    /// the table policy.
    pub fn push(&mut self, entry: &RawEntry) -> Option<Classification> {
        let label = clean_label(&entry.label);
        if label.is_empty() {
            debug!("Skipping entry with empty label (value {:?})", entry.value);
            return None;
        }
        let value = clean_value(&entry.value);
        self.raw.insert(label.clone(), value.clone());
        self.raw_entries += 1;

        if value.is_empty() {
            debug!("Label {:?} has no value, kept raw only", label);
            return None;
        }

        let Some(classification) = classify(&normalize_label(&label), &value) else {
            debug!("No rule for label {:?}", label);
            return None;
        };
        self.classified += 1;
        debug!(
            "{:?} -> {} (rule '{}', {:?})",
            label, classification.slot, classification.rule, classification.basis
        );

        for (slot, v) in expand(&classification, &value) {
            self.write(slot, v, Channel::Table, Provenance::Label(label.clone()));
        }
        Some(classification)
    }

    pub fn push_all<'a>(&mut self, entries: impl IntoIterator<Item = &'a RawEntry>) {
        for entry in entries {
            self.push(entry);
        }
    }

    /// Scan an auxiliary text block for performance figures. Returns the
    /// number of slots written.
    pub fn scan_text(&mut self, text: &str) -> usize {
        let mut written = 0;
        for marker in Marker::ALL {
            if let Some(m) = units::scan_marker(text, marker) {
                let res = self.write(marker_slot(marker), m.to_string(), Channel::Text, Provenance::TextScan);
                if res.writes() {
                    written += 1;
                }
            }
        }
        written
    }

    pub fn populated_count(&self) -> usize {
        self.slots.populated_count()
    }

    pub fn slots(&self) -> &SpecSlots {
        &self.slots
    }

    pub fn raw(&self) -> &RawSpecifications {
        &self.raw
    }

    fn write(&mut self, slot: Slot, value: String, channel: Channel, origin: Provenance) -> Resolution {
        let resolver = match channel {
            Channel::Table => self.table,
            Channel::Text => self.text,
        };
        let current = self.slots.get_mut(slot);
        let res = resolver.resolve(current.as_deref(), &value);

        if res.is_conflict() {
            self.conflicts += 1;
            debug!(
                "Conflict on {} ({}): {:?} vs {:?} -> {:?}",
                slot,
                resolver.policy(),
                current.as_deref().unwrap_or_default(),
                value,
                res
            );
        }
        if res.writes() {
            *current = Some(value);
            self.provenance.insert(slot, origin);
        }
        res
    }

    /// Attach identity and freeze the record.
    pub fn finish(self, identity: Identity, version: String, source_url: String) -> Extraction {
        let completeness = Completeness {
            populated_slots: self.slots.populated_count(),
            total_slots: Slot::ALL.len(),
            raw_entries: self.raw_entries,
            distinct_labels: self.raw.len(),
            classified_entries: self.classified,
            conflicts: self.conflicts,
        };

        let spec = CanonicalSpec {
            brand: identity.brand,
            model: identity.model,
            year: identity.year,
            version,
            source_url,
            car_id: identity.car_id,
            slots: self.slots,
            raw_specifications: self.raw,
        };

        Extraction {
            spec,
            completeness,
            provenance: self.provenance,
            identity_source: identity.source,
        }
    }
}

fn marker_slot(marker: Marker) -> Slot {
    match marker {
        Marker::ZeroTo60Mph => Slot::Acceleration0To60Mph,
        Marker::ZeroTo100Kmh => Slot::Acceleration0To100Kmh,
        Marker::ZeroTo200Kmh => Slot::Acceleration0To200Kmh,
        Marker::QuarterMile => Slot::QuarterMileTime,
        Marker::TopSpeed => Slot::TopSpeedKmh,
    }
}

fn transmission_kind(value: &str) -> Option<&'static str> {
    if AUTOMATIC_RE.is_match(value) {
        Some("Automatic")
    } else if MANUAL_RE.is_match(value) {
        Some("Manual")
    } else {
        None
    }
}

/// Slot writes for one classified entry.
///
/// The classified slot gets the value verbatim. A unit-picked value that lists
/// several units of its family ("300 kW / 408 hp") is split into normalized
/// figures, one per slot. Displacement and transmission also feed their
/// derived slots.
fn expand(c: &Classification, value: &str) -> Vec<(Slot, String)> {
    if c.basis == Basis::Value {
        if let Some(family) = c.target.family() {
            let split: Vec<(Slot, String)> = units::extract_all(value, family)
                .into_iter()
                .filter_map(|m| c.target.slot_for(m.unit).map(|slot| (slot, m.to_string())))
                .collect();
            if split.len() > 1 {
                return split;
            }
        }
    }

    let mut writes = vec![(c.slot, value.to_string())];
    match c.slot {
        Slot::Displacement => {
            if let Some(m) = units::extract(value, UnitFamily::Displacement) {
                writes.push((Slot::DisplacementLiters, m.number));
            }
        }
        Slot::Transmission => {
            if let Some(kind) = transmission_kind(value) {
                writes.push((Slot::TransmissionType, kind.to_string()));
            }
            if let Some(gears) = units::gear_count(value) {
                writes.push((Slot::Gears, gears.to_string()));
            }
        }
        _ => {}
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::resolve;

    fn builder(table: ConflictPolicy) -> SpecBuilder {
        SpecBuilder::with_policies(table, ConflictPolicy::FirstWriteWins)
    }

    fn power_rows() -> Vec<RawEntry> {
        vec![
            RawEntry::new("Power (hp)", "300 hp"),
            RawEntry::new("Max Power", "310 hp"),
        ]
    }

    #[test]
    fn test_last_write_wins_policy() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push_all(&power_rows());
        assert_eq!(b.slots().get(Slot::PowerHp), Some("310 hp"));
        let ext = b.finish(resolve("2019 BMW 320i", "").unwrap(), String::new(), String::new());
        assert_eq!(ext.completeness.conflicts, 1);
        assert_eq!(
            ext.provenance.get(&Slot::PowerHp),
            Some(&Provenance::Label("Max Power".into()))
        );
    }

    #[test]
    fn test_first_write_wins_policy() {
        let mut b = builder(ConflictPolicy::FirstWriteWins);
        b.push_all(&power_rows());
        assert_eq!(b.slots().get(Slot::PowerHp), Some("300 hp"));
    }

    #[test]
    fn test_value_preserved_verbatim() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Power", "394 HP"));
        b.push(&RawEntry::new("0-100 km/h", "3.7 sec"));
        assert_eq!(b.slots().get(Slot::PowerHp), Some("394 HP"));
        assert_eq!(b.slots().get(Slot::Acceleration0To100Kmh), Some("3.7 sec"));
    }

    #[test]
    fn test_multi_unit_value_is_split() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Maximum power", "300 kW (408 PS; 402 hp) at 5500-6500 rpm"));
        assert_eq!(b.slots().get(Slot::PowerKw), Some("300 kW"));
        assert_eq!(b.slots().get(Slot::PowerHp), Some("402 hp"));
        assert_eq!(b.slots().get(Slot::PowerPs), Some("408 PS"));

        b.push(&RawEntry::new("Top speed", "250 km/h (155 mph)"));
        assert_eq!(b.slots().get(Slot::TopSpeedKmh), Some("250 km/h"));
        assert_eq!(b.slots().get(Slot::TopSpeedMph), Some("155 mph"));
    }

    #[test]
    fn test_label_unit_keeps_whole_value() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Power (kW)", "135 kW / 184 hp"));
        assert_eq!(b.slots().get(Slot::PowerKw), Some("135 kW / 184 hp"));
        assert_eq!(b.slots().get(Slot::PowerHp), None);
    }

    #[test]
    fn test_derived_slots() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Displacement", "1998 cm3 (2.0 l)"));
        b.push(&RawEntry::new("Transmission", "8-speed automatic"));
        let s = b.slots();
        assert_eq!(s.get(Slot::Displacement), Some("1998 cm3 (2.0 l)"));
        assert_eq!(s.get(Slot::DisplacementLiters), Some("2.0"));
        assert_eq!(s.get(Slot::TransmissionType), Some("Automatic"));
        assert_eq!(s.get(Slot::Gears), Some("8"));

        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Gearbox", "6-speed manual"));
        assert_eq!(b.slots().get(Slot::TransmissionType), Some("Manual"));
        assert_eq!(b.slots().get(Slot::Gears), Some("6"));
    }

    #[test]
    fn test_unextractable_value_stored_verbatim() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Max torque", "not published"));
        assert_eq!(b.slots().get(Slot::TorqueNm), Some("not published"));
    }

    #[test]
    fn test_raw_map_last_write_wins_and_keeps_unmatched() {
        let mut b = builder(ConflictPolicy::FirstWriteWins);
        b.push(&RawEntry::new("Colour:", "blue"));
        b.push(&RawEntry::new("Doors", "4"));
        b.push(&RawEntry::new("Doors", "5"));
        b.push(&RawEntry::new("  ", "orphan"));
        b.push(&RawEntry::new("Seats", ""));

        assert_eq!(b.raw().get("Colour").map(String::as_str), Some("blue"));
        assert_eq!(b.raw().get("Doors").map(String::as_str), Some("5"));
        assert_eq!(b.raw().get("Seats").map(String::as_str), Some(""));
        assert_eq!(b.raw().len(), 3);
        assert_eq!(b.slots().get(Slot::Doors), Some("4"));
        assert_eq!(b.slots().get(Slot::Seats), None);
    }

    #[test]
    fn test_text_scan_does_not_clobber_table_value() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("0-100 km/h", "4.4 s"));
        let written = b.scan_text("Acceleration 0-100 km/h: 4.2 sec; 0-60 mph: 4.0 sec");
        assert_eq!(written, 1);
        assert_eq!(b.slots().get(Slot::Acceleration0To100Kmh), Some("4.4 s"));
        assert_eq!(b.slots().get(Slot::Acceleration0To60Mph), Some("4.0 sec"));

        let ext = b.finish(resolve("2019 BMW 320i", "").unwrap(), String::new(), String::new());
        assert_eq!(
            ext.provenance.get(&Slot::Acceleration0To60Mph),
            Some(&Provenance::TextScan)
        );
        assert_eq!(ext.completeness.conflicts, 1);
    }

    #[test]
    fn test_text_scan_all_markers() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        let written = b.scan_text(
            "0-60 mph in 3.9 sec, 0-100 km/h: 4.1 sec, 0-200 km/h: 11.9 sec, \
             quarter mile 12.4 s, top speed of 305 km/h",
        );
        assert_eq!(written, 5);
        let s = b.slots();
        assert_eq!(s.get(Slot::Acceleration0To60Mph), Some("3.9 sec"));
        assert_eq!(s.get(Slot::Acceleration0To100Kmh), Some("4.1 sec"));
        assert_eq!(s.get(Slot::Acceleration0To200Kmh), Some("11.9 sec"));
        assert_eq!(s.get(Slot::QuarterMileTime), Some("12.4 sec"));
        assert_eq!(s.get(Slot::TopSpeedKmh), Some("305 km/h"));
    }

    #[test]
    fn test_heading_row_repeated_in_value_is_raw_only() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        assert!(b.push(&RawEntry::new("Engine type:", "Engine type:")).is_none());
        assert_eq!(b.slots().populated_count(), 0);
        assert_eq!(b.raw().get("Engine type").map(String::as_str), Some("Engine type:"));
    }

    #[test]
    fn test_completeness_counts() {
        let mut b = builder(ConflictPolicy::LastWriteWins);
        b.push(&RawEntry::new("Fuel type", "petrol"));
        b.push(&RawEntry::new("Colour", "blue"));
        let ext = b.finish(resolve("2019 BMW 320i", "").unwrap(), String::new(), String::new());
        let c = ext.completeness;
        assert_eq!(c.populated_slots, 1);
        assert_eq!(c.total_slots, Slot::ALL.len());
        assert_eq!(c.raw_entries, 2);
        assert_eq!(c.classified_entries, 1);
        assert!((c.coverage() - 0.5).abs() < f64::EPSILON);
    }
}
