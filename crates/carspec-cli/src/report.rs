//! Human-readable summaries printed to stderr alongside the JSON output.

use carspec_extract::{Classification, Extraction, Provenance};

pub fn print_report(ext: &Extraction) {
    let c = &ext.completeness;
    eprintln!("=== carspec extraction report ===");
    eprintln!();
    eprintln!("Vehicle:            {} {} {}", ext.spec.year, ext.spec.brand, ext.spec.model);
    eprintln!("Identity from:      {:?}", ext.identity_source);
    eprintln!("Slots populated:    {}/{}", c.populated_slots, c.total_slots);
    eprintln!("Entries:            {} ({} distinct labels)", c.raw_entries, c.distinct_labels);
    eprintln!("Classified:         {} ({:.0}%)", c.classified_entries, c.coverage() * 100.0);
    eprintln!("Conflicts:          {}", c.conflicts);

    if !ext.provenance.is_empty() {
        eprintln!();
        eprintln!("Slots:");
        for (slot, origin) in &ext.provenance {
            let value = ext.spec.get(*slot).unwrap_or_default();
            match origin {
                Provenance::Label(label) => eprintln!("  {:<28} {:<24} <- {:?}", slot, value, label),
                Provenance::TextScan => eprintln!("  {:<28} {:<24} <- text scan", slot, value),
            }
        }
    }

    let unclassified: Vec<&String> = ext
        .spec
        .raw_specifications
        .keys()
        .filter(|label| !ext.provenance.values().any(|p| matches!(p, Provenance::Label(l) if l == *label)))
        .collect();
    if !unclassified.is_empty() {
        eprintln!();
        eprintln!("Raw only:");
        for label in unclassified {
            eprintln!("  - {}", label);
        }
    }
}

pub fn print_classification(label: &str, value: &str, result: Option<&Classification>) {
    match result {
        Some(c) => {
            println!("{:?} = {:?}", label, value);
            println!("  slot:   {}", c.slot);
            println!("  rule:   {}", c.rule);
            println!("  basis:  {:?}", c.basis);
        }
        None => println!("{:?} = {:?}: no matching rule (kept in raw_specifications only)", label, value),
    }
}
