use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::config::Locale;

/// Two-language text. English falls back to Japanese, which is the language
/// the data is authored in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalizedText {
    pub ja: String,
    pub en: String,
}

impl LocalizedText {
    pub fn new(ja: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ja: ja.into(),
            en: en.into(),
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ja => &self.ja,
            Locale::En if self.en.trim().is_empty() => &self.ja,
            Locale::En => &self.en,
        }
    }
}

/// A feed row after parsing and before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Image-pixel coordinates; always finite.
    pub coords: (f64, f64),
    pub object_id: Option<String>,
    pub category_signals: Vec<String>,
    pub name: LocalizedText,
    pub memo: LocalizedText,
    /// Text scanned for rank keywords.
    pub rank_text: String,
    pub updated_at: Option<NaiveDateTime>,
    /// Entry only exists on debug pages.
    pub debug_only: bool,
}

/// Both coordinates finite, or nothing.
pub fn finite_coords(x: f64, y: f64) -> Option<(f64, f64)> {
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

pub fn parse_coord(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Timestamps as written by the pin editor, with RFC 3339 and bare dates
/// accepted too.
pub fn parse_updated_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Category ids out of a `[{"cat_id": ...}, ...]` blob. Anything that is
/// not that shape contributes no ids.
pub fn cat_ids_from_json(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(slots) => cat_ids(Some(&slots)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable categories field");
            Vec::new()
        }
    }
}

/// `cat_id` of every slot in a `contents` array. Numeric ids are kept as
/// their decimal spelling; other shapes are ignored.
fn cat_ids(slots: Option<&Value>) -> Vec<String> {
    slots
        .and_then(Value::as_array)
        .map(|slots| {
            slots
                .iter()
                .filter_map(|slot| scalar_text(slot.get("cat_id")))
                .collect()
        })
        .unwrap_or_default()
}

/// Trimmed text of a string or number field. Null, empty and structured
/// values count as absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn text_field(entry: &Map<String, Value>, key: &str) -> Option<String> {
    scalar_text(entry.get(key))
}

/// First usable text among `keys`, or empty.
fn first_text(entry: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| text_field(entry, key))
        .unwrap_or_default()
}

fn coord_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_coord(s),
        _ => None,
    }
}

impl RawRecord {
    /// Parse one exported pin object. `None` for entries that are not
    /// objects or lack usable coordinates; every other field is optional and
    /// ignored when it has an unexpected type.
    pub fn from_json(value: &Value) -> Option<Self> {
        let Some(entry) = value.as_object() else {
            tracing::debug!("skipping pin entry that is not an object");
            return None;
        };

        let coords_array = entry.get("coords").and_then(Value::as_array);
        let (x, y) = match coords_array.map(Vec::as_slice) {
            Some([x, y, ..]) => (coord_value(x)?, coord_value(y)?),
            _ => (coord_value(entry.get("x")?)?, coord_value(entry.get("y")?)?),
        };
        let coords = finite_coords(x, y)?;

        let object_id = text_field(entry, "obj_id")
            .or_else(|| text_field(entry, "attribute"))
            .map(|id| id.to_ascii_uppercase());

        let mut category_signals = cat_ids(entry.get("contents"));
        if category_signals.is_empty()
            && let Some(category) = text_field(entry, "category")
        {
            category_signals.push(category);
        }

        Some(Self {
            coords,
            object_id,
            category_signals,
            name: LocalizedText::new(
                first_text(entry, &["obj_jp", "name_jp", "name"]),
                first_text(entry, &["obj_en", "name_en"]),
            ),
            memo: LocalizedText::new(
                text_field(entry, "memo_jp").unwrap_or_default(),
                text_field(entry, "memo_en").unwrap_or_default(),
            ),
            rank_text: value.to_string(),
            updated_at: text_field(entry, "updated_at")
                .as_deref()
                .and_then(parse_updated_at),
            debug_only: entry.get("debug").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}
