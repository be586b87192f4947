//! Output shape tests: the persisted record must keep the flat field layout
//! existing consumers read.

use carspec_core::{CanonicalSpec, Slot};
use carspec_extract::{extract_spec, SourcePage};

fn sample_record() -> CanonicalSpec {
    let page = SourcePage::new(
        "2020 Mercedes-Benz C 300 4MATIC (aut. 9)",
        "https://www.automobile-catalog.com/car/2020/2911120/mercedes-benz_c_300_4matic.html",
    )
    .with_entry("Engine type", "Inline-4, turbo")
    .with_entry("Power", "258 hp")
    .with_entry("Combined fuel consumption", "34 mpg")
    .with_entry("Wheelbase", "2840 mm")
    .with_entry("Warranty", "4 years");
    extract_spec(&page).unwrap().spec
}

/// Identity fields are always present with their documented types.
#[test]
fn test_identity_fields() {
    let json = serde_json::to_value(sample_record()).unwrap();

    assert!(json["brand"].is_string());
    assert!(json["model"].is_string());
    assert!(json["year"].is_u64());
    assert!(json["version"].is_string());
    assert!(json["source_url"].is_string());
    assert_eq!(json["brand"], "Mercedes-Benz");
    assert_eq!(json["model"], "C 300 4MATIC");
    assert_eq!(json["car_id"], "2911120");
}

/// Slots sit at the top level under their field names; unset slots are omitted.
#[test]
fn test_flat_slot_fields() {
    let record = sample_record();
    let json = serde_json::to_value(&record).unwrap();
    let obj = json.as_object().unwrap();

    assert_eq!(json["engine_type"], "Inline-4, turbo");
    assert_eq!(json["power_hp"], "258 hp");
    assert_eq!(json["fuel_consumption_combined_mpg"], "34 mpg");
    assert_eq!(json["wheelbase"], "2840 mm");

    for slot in Slot::ALL {
        assert_eq!(obj.contains_key(slot.name()), record.get(*slot).is_some(), "{}", slot);
    }
    for group in ["engine", "drivetrain", "performance", "consumption", "dimensions", "body", "chassis", "lineage"] {
        assert!(!obj.contains_key(group), "group {} leaked into output", group);
    }
}

/// raw_specifications is a flat label → string map in sorted label order.
#[test]
fn test_raw_specifications_shape() {
    let json = serde_json::to_string(&sample_record()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let raw = value["raw_specifications"].as_object().unwrap();

    assert_eq!(raw.len(), 5);
    assert!(raw.values().all(|v| v.is_string()));
    assert_eq!(raw["Warranty"], "4 years");

    let combined = json.find("\"Combined fuel consumption\"").unwrap();
    let wheelbase = json.find("\"Wheelbase\"").unwrap();
    assert!(combined < wheelbase);
}

/// Records written by older producers, without car_id or with extra slots absent, still load.
#[test]
fn test_reads_minimal_record() {
    let record: CanonicalSpec = serde_json::from_value(serde_json::json!({
        "brand": "BMW",
        "model": "320i",
        "year": 2019,
        "version": "2019 BMW 320i",
        "source_url": "",
        "power_hp": "184 hp",
    }))
    .unwrap();

    assert_eq!(record.car_id, None);
    assert_eq!(record.get(Slot::PowerHp), Some("184 hp"));
    assert!(record.raw_specifications.is_empty());
}
