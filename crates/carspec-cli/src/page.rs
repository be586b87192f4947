//! Reading scraped pages and writing canonical records.

use std::path::Path;

use anyhow::Context;
use carspec_core::{CanonicalSpec, EngineConfig};
use carspec_extract::SourcePage;
use tracing::debug;

/// Load a page dump produced by the HTML traversal step.
pub fn load_page(path: &Path) -> anyhow::Result<SourcePage> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page {}", path.display()))?;
    let page: SourcePage = serde_json::from_str(&text)
        .with_context(|| format!("Invalid page JSON in {}", path.display()))?;
    debug!(
        "Loaded {} entries and {} text blocks from {}",
        page.entries.len(),
        page.text_blocks.len(),
        path.display()
    );
    Ok(page)
}

/// Config from `--config`, or from `CARSPEC_*` variables when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(p) => EngineConfig::from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => EngineConfig::from_env()?,
    };
    Ok(config)
}

/// Serialize the record as pretty JSON, to `out` or stdout.
pub fn write_spec(spec: &CanonicalSpec, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(spec)?;
    match out {
        Some(p) => {
            std::fs::write(p, json + "\n")
                .with_context(|| format!("Failed to write {}", p.display()))?;
            debug!("Wrote record to {}", p.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carspec_core::ConflictPolicy;

    #[test]
    fn test_load_page_and_write_spec() {
        let dir = tempfile::tempdir().unwrap();
        let page_path = dir.path().join("page.json");
        std::fs::write(
            &page_path,
            r#"{
                "title": "2019 BMW 320i (aut. 8)",
                "url": "https://www.automobile-catalog.com/car/2019/2877140/bmw_320i.html",
                "entries": [
                    {"label": "Power", "value": "184 hp"},
                    {"label": "Doors", "value": "4"}
                ]
            }"#,
        )
        .unwrap();

        let page = load_page(&page_path).unwrap();
        assert_eq!(page.entries.len(), 2);

        let ext = carspec_extract::extract_spec(&page).unwrap();
        let out_path = dir.path().join("out.json");
        write_spec(&ext.spec, Some(&out_path)).unwrap();

        let written: CanonicalSpec =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(written, ext.spec);
        assert_eq!(written.car_id.as_deref(), Some("2877140"));
    }

    #[test]
    fn test_load_page_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_page(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid page JSON"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carspec.json");
        std::fs::write(&path, r#"{"table_policy": "first-write-wins"}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.table_policy, ConflictPolicy::FirstWriteWins);
        assert_eq!(config.text_policy, ConflictPolicy::FirstWriteWins);
        assert!(config.scan_text_blocks);
    }
}
