use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Semantic landmark category. Only canonical keys are representable; the
/// alias spellings used by older feeds are folded in [`CategoryKey::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKey {
    Scanner,
    Start,
    Blueprint,
    Warbond,
    Point,
    Lem,
    Cave,
    Monolith,
    Other,
    Trash,
}

/// Alias spelling → canonical key. Both spellings appear in feed data and in
/// the category-id table, but only one filter entry may exist per key.
const ALIASES: &[(&str, CategoryKey)] = &[
    ("war_bonds", CategoryKey::Warbond),
    ("trade_item", CategoryKey::Point),
];

impl CategoryKey {
    pub const ALL: [CategoryKey; 10] = [
        CategoryKey::Scanner,
        CategoryKey::Start,
        CategoryKey::Blueprint,
        CategoryKey::Warbond,
        CategoryKey::Point,
        CategoryKey::Lem,
        CategoryKey::Cave,
        CategoryKey::Monolith,
        CategoryKey::Other,
        CategoryKey::Trash,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CategoryKey::Scanner => "scanner",
            CategoryKey::Start => "start",
            CategoryKey::Blueprint => "blueprint",
            CategoryKey::Warbond => "warbond",
            CategoryKey::Point => "point",
            CategoryKey::Lem => "lem",
            CategoryKey::Cave => "cave",
            CategoryKey::Monolith => "monolith",
            CategoryKey::Other => "other",
            CategoryKey::Trash => "trash",
        }
    }

    /// Parse a canonical key or one of its aliases. Matching is exact apart
    /// from surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == raw)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == raw)
                    .map(|&(_, key)| key)
            })
    }

    /// Hidden on an unfocused page until the reader opts in.
    pub fn hidden_by_default(self) -> bool {
        matches!(
            self,
            CategoryKey::Monolith
                | CategoryKey::Scanner
                | CategoryKey::Cave
                | CategoryKey::Other
                | CategoryKey::Point
        )
    }

    /// Focused views of these categories also show the start point for orientation.
    pub fn wants_start_point(self) -> bool {
        matches!(self, CategoryKey::Blueprint | CategoryKey::Lem)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategoryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategoryKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CategoryKey::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown category key '{raw}'")))
    }
}
