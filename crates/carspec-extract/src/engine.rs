//! Extraction pipeline for one scraped page: entries → slots, text → slots, identity.

use carspec_core::{EngineConfig, RawEntry, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::{Extraction, SpecBuilder};
use crate::identity;
use crate::normalize::collapse_whitespace;

/// Everything the HTML traversal hands over for one vehicle page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePage {
    /// Page heading, e.g. "2019 BMW 320i (aut. 8)".
    pub title: String,
    /// Resource identifier the page was fetched from.
    pub url: String,
    /// Label/value rows in document order.
    pub entries: Vec<RawEntry>,
    /// Auxiliary prose scanned for performance figures.
    pub text_blocks: Vec<String>,
}

impl SourcePage {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_entry(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(RawEntry::new(label, value));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_blocks.push(text.into());
        self
    }
}

/// Turns [`SourcePage`]s into canonical records under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SpecEngine {
    config: EngineConfig,
}

impl SpecEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract one page.
    ///
    /// Identity is resolved first so an unparsable page fails before any slot
    /// work is done. A page with no usable rows still yields an identity-only
    /// record.
    pub fn extract(&self, page: &SourcePage) -> Result<Extraction> {
        let identity = match identity::resolve(&page.title, &page.url) {
            Ok(id) => id,
            Err(e) => {
                warn!("Rejecting page {:?}: {}", page.url, e);
                return Err(e);
            }
        };

        let mut builder = SpecBuilder::new(&self.config);
        builder.push_all(&page.entries);

        if self.config.scan_text_blocks {
            for block in &page.text_blocks {
                let written = builder.scan_text(block);
                if written > 0 {
                    debug!("Text scan filled {} slots", written);
                }
            }
        }

        if builder.populated_count() == 0 {
            warn!(
                "No slots populated from {} entries on {:?}, using {:?} identity only",
                page.entries.len(),
                page.url,
                identity.source
            );
        }

        let version = match collapse_whitespace(&page.title) {
            t if t.is_empty() => format!("{} {}", identity.brand, identity.model),
            t => t,
        };

        let extraction = builder.finish(identity, version, page.url.clone());
        let c = &extraction.completeness;
        info!(
            "Extracted {} {} {}: {}/{} slots from {} entries ({} conflicts)",
            extraction.spec.year,
            extraction.spec.brand,
            extraction.spec.model,
            c.populated_slots,
            c.total_slots,
            c.raw_entries,
            c.conflicts
        );
        Ok(extraction)
    }
}

/// Extract a page with the default configuration.
pub fn extract_spec(page: &SourcePage) -> Result<Extraction> {
    SpecEngine::default().extract(page)
}
