//! Label and value hygiene applied before classification.

/// Collapse runs of whitespace (including non-breaking spaces) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label as stored in `raw_specifications`: whitespace collapsed, trailing colons dropped.
pub fn clean_label(label: &str) -> String {
    collapse_whitespace(label)
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

/// Value as stored: whitespace collapsed.
pub fn clean_value(value: &str) -> String {
    collapse_whitespace(value)
}

/// Label as seen by the classifier: lower-cased, en/em dashes folded to '-',
/// trailing punctuation trimmed.
pub fn normalize_label(label: &str) -> String {
    collapse_whitespace(label)
        .to_lowercase()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .trim_end_matches(|c: char| matches!(c, ':' | '.' | ';' | ',' | '*') || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  184 \n\t hp "), "184 hp");
        assert_eq!(collapse_whitespace("1998\u{a0}cm3"), "1998 cm3");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_clean_label_keeps_case() {
        assert_eq!(clean_label("Max Power: "), "Max Power");
        assert_eq!(clean_label("Torque (Nm)::"), "Torque (Nm)");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Top Speed:"), "top speed");
        assert_eq!(normalize_label("Curb weight *"), "curb weight");
        assert_eq!(normalize_label("Power (kW)"), "power (kw)");
        assert_eq!(normalize_label("Acceleration 0\u{2013}100 km/h"), "acceleration 0-100 km/h");
    }
}
