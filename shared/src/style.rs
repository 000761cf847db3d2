use serde::{Deserialize, Serialize};

use crate::category::CategoryKey;
use crate::config::Locale;
use crate::error::FeedError;

/// Visual appearance of one canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleEntry {
    #[serde(default)]
    pub glyph: Option<String>,
    pub color: String,
    pub label_ja: String,
    pub label_en: String,
}

impl StyleEntry {
    fn new(glyph: &str, color: &str, label_ja: &str, label_en: &str) -> Self {
        Self {
            glyph: Some(glyph.to_string()),
            color: color.to_string(),
            label_ja: label_ja.to_string(),
            label_en: label_en.to_string(),
        }
    }

    pub fn label(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ja => &self.label_ja,
            Locale::En => &self.label_en,
        }
    }

    /// Glyph shown in the marker; pins without one get a generic pushpin.
    pub fn glyph_or_default(&self) -> &str {
        self.glyph.as_deref().unwrap_or("📌")
    }
}

/// Ordered category → style table. Order is the order of the filter controls.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRegistry {
    entries: Vec<(CategoryKey, StyleEntry)>,
    other_idx: usize,
}

impl StyleRegistry {
    /// Build a registry from explicit entries. Every key may appear once and
    /// `other` must be present, since it is the fallback for unresolved pins.
    pub fn new(entries: Vec<(CategoryKey, StyleEntry)>) -> Result<Self, FeedError> {
        for (idx, (key, _)) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|(seen, _)| seen == key) {
                return Err(FeedError::Config(format!("duplicate style entry for '{key}'")));
            }
        }
        let other_idx = entries
            .iter()
            .position(|(key, _)| *key == CategoryKey::Other)
            .ok_or_else(|| FeedError::Config("style table has no 'other' entry".to_string()))?;
        Ok(Self { entries, other_idx })
    }

    /// Look up a style; keys without an entry render with the `other` style.
    pub fn get(&self, key: CategoryKey) -> &StyleEntry {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, style)| style)
            .unwrap_or(&self.entries[self.other_idx].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Reverse lookup used by the layer control, whose events carry labels.
    pub fn key_for_label(&self, label: &str, locale: Locale) -> Option<CategoryKey> {
        self.entries
            .iter()
            .find(|(_, style)| style.label(locale) == label)
            .map(|(key, _)| *key)
    }
}

impl StyleRegistry {
    /// The built-in StarRupture table, in filter-control order.
    pub fn star_rupture() -> Result<Self, FeedError> {
        use CategoryKey::*;
        Self::new(vec![
            (Scanner, StyleEntry::new("📡", "#2ecc71", "ジオスキャナー", "Geo Scanner")),
            (Start, StyleEntry::new("🚀", "#ffffff", "開始地点", "Start Point")),
            (Blueprint, StyleEntry::new("📜", "#3498db", "設計図", "Blueprints")),
            (Warbond, StyleEntry::new("💀", "#e74c3c", "戦時債権", "War Bonds")),
            (Point, StyleEntry::new("💎", "#f1c40f", "換金アイテム", "Cash Items")),
            (Lem, StyleEntry::new("⚡", "#9b59b6", "LEM", "LEM Gear")),
            (Cave, StyleEntry::new("⛏️", "#7f8c8d", "地下洞窟", "Caves")),
            (Monolith, StyleEntry::new("🗿", "#1abc9c", "モノリス", "Monoliths")),
            (Other, StyleEntry::new("📦", "#95a5a6", "その他", "Others")),
            (Trash, StyleEntry::new("❌", "#555555", "調査済み(空)", "Checked(Empty)")),
        ])
    }
}
