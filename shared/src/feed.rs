use serde_json::Value;

use crate::config::{DEFAULT_CSV_FILE, MapConfig};
use crate::csv::{CsvLayout, data_lines};
use crate::error::FeedError;
use crate::pin::{Pin, PinFactory, ViewOptions};
use crate::record::RawRecord;
use crate::resolver::{CategoryResolver, CategoryTables};
use crate::style::StyleRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub format: FeedFormat,
}

/// Which feed to fetch first, and the single source to try if it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPlan {
    pub primary: FeedSource,
    pub fallback: Option<FeedSource>,
}

impl FeedPlan {
    /// An explicit pins export is preferred with the CSV as fallback;
    /// otherwise the CSV is the only source. `base_url` is the directory the
    /// script was served from, used when no CSV URL is configured.
    pub fn from_config(config: &MapConfig, base_url: &str) -> Self {
        let csv = FeedSource {
            url: config
                .csv_url
                .clone()
                .unwrap_or_else(|| format!("{base_url}{DEFAULT_CSV_FILE}")),
            format: FeedFormat::Csv,
        };
        match &config.pins_url {
            Some(pins_url) => Self {
                primary: FeedSource {
                    url: pins_url.clone(),
                    format: FeedFormat::Json,
                },
                fallback: Some(csv),
            },
            None => Self {
                primary: csv,
                fallback: None,
            },
        }
    }
}

/// Directory part of a script URL, including the trailing slash.
pub fn base_url_of(script_src: &str) -> &str {
    match script_src.rfind('/') {
        Some(idx) => &script_src[..=idx],
        None => "",
    }
}

/// Append a `t=<stamp>` query parameter so static hosting caches are bypassed.
pub fn with_cache_buster(url: &str, stamp: u64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}t={stamp}")
}

/// Runs a whole feed through parsing, classification and pin construction.
#[derive(Debug, Clone)]
pub struct FeedLoader {
    resolver: CategoryResolver,
    styles: StyleRegistry,
    layout: CsvLayout,
    view: ViewOptions,
}

impl FeedLoader {
    pub fn new(
        tables: &CategoryTables,
        styles: StyleRegistry,
        layout: CsvLayout,
        view: ViewOptions,
    ) -> Result<Self, FeedError> {
        Ok(Self {
            resolver: CategoryResolver::new(tables)?,
            styles,
            layout,
            view,
        })
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn view(&self) -> &ViewOptions {
        &self.view
    }

    pub fn load(&self, format: FeedFormat, text: &str) -> Result<Vec<Pin>, FeedError> {
        match format {
            FeedFormat::Csv => Ok(self.load_csv(text)),
            FeedFormat::Json => self.load_json(text),
        }
    }

    /// Rows that do not parse are skipped; a CSV feed never fails as a whole.
    pub fn load_csv(&self, text: &str) -> Vec<Pin> {
        let mut skipped = 0usize;
        let records: Vec<RawRecord> = data_lines(text)
            .filter_map(|line| {
                let record = self.layout.parse_row(line);
                if record.is_none() {
                    skipped += 1;
                    tracing::debug!(row = %line, "skipping malformed csv row");
                }
                record
            })
            .collect();
        self.build_pins(records, skipped)
    }

    /// `{"pins": [...]}` or a bare array. Malformed entries are skipped; a
    /// document that is not JSON at all is an error so a fallback can run.
    pub fn load_json(&self, text: &str) -> Result<Vec<Pin>, FeedError> {
        let document: Value = serde_json::from_str(text)?;
        let entries = match &document {
            Value::Array(entries) => entries.as_slice(),
            Value::Object(map) => match map.get("pins") {
                Some(Value::Array(entries)) => entries.as_slice(),
                _ => {
                    tracing::warn!("pins document has no 'pins' array");
                    &[]
                }
            },
            _ => {
                tracing::warn!("pins document is neither an object nor an array");
                &[]
            }
        };

        let mut skipped = 0usize;
        let records: Vec<RawRecord> = entries
            .iter()
            .filter_map(|entry| {
                let record = RawRecord::from_json(entry);
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();
        Ok(self.build_pins(records, skipped))
    }

    /// Classification finishes for the whole feed before anything is shown.
    fn build_pins(&self, records: Vec<RawRecord>, mut skipped: usize) -> Vec<Pin> {
        let mut factory = PinFactory::new(&self.styles, &self.view);
        let mut pins = Vec::with_capacity(records.len());
        let mut debug_hidden = 0usize;

        for record in &records {
            if record.debug_only && !self.view.debug {
                debug_hidden += 1;
                continue;
            }
            let resolution = self
                .resolver
                .resolve(record.object_id.as_deref(), &record.category_signals);
            match factory.build(record, resolution) {
                Some(pin) => pins.push(pin),
                None => skipped += 1,
            }
        }

        tracing::info!(
            pins = pins.len(),
            skipped,
            debug_hidden,
            "feed classified"
        );
        pins
    }
}
