use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::category::CategoryKey;
use crate::error::FeedError;

/// Raw lookup tables as they appear in configuration. Values are category
/// key spellings (aliases allowed) except `category_names`, whose values are
/// category ids looked up again in `category_ids`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryTables {
    /// Explicit landmark type (`attribute` / `obj_id`) → key.
    #[serde(default)]
    pub object_ids: HashMap<String, String>,
    /// Content category id (`cat_id`) → key.
    #[serde(default)]
    pub category_ids: HashMap<String, String>,
    /// Localized category display name → category id.
    #[serde(default)]
    pub category_names: HashMap<String, String>,
}

impl CategoryTables {
    pub fn star_rupture() -> Self {
        let pairs = |items: &[(&str, &str)]| -> HashMap<String, String> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        Self {
            object_ids: pairs(&[
                ("GEO_SCANNER", "scanner"),
                ("SPACESHIP", "start"),
                ("UNDERGROUND_CAVE", "cave"),
                ("MONOLITH", "monolith"),
                ("COLONY", "other"),
                ("DRONE_WRECK", "other"),
                ("RUBBLE_PILE", "other"),
                ("PERSONAL_STORAGE", "other"),
                ("CONSOLE", "other"),
                ("ITEM_PRINTER", "other"),
                ("SEARCH", "other"),
                ("KEYCARD", "other"),
            ]),
            category_ids: pairs(&[
                ("blueprint", "blueprint"),
                ("lem", "lem"),
                ("war_bonds", "warbond"),
                ("trade_item", "point"),
                ("keycard", "other"),
                ("plant", "other"),
            ]),
            category_names: pairs(&[
                ("設計図", "blueprint"),
                ("LEM", "lem"),
                ("戦時債権", "war_bonds"),
                ("交換アイテム", "trade_item"),
                ("キーカード", "keycard"),
                ("植物", "plant"),
            ]),
        }
    }
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Determines the pin's icon and color.
    pub primary: CategoryKey,
    /// Every category the pin is filtered under; always contains `primary`.
    pub categories: BTreeSet<CategoryKey>,
}

/// Three-tier category lookup over normalized tables.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    object_ids: HashMap<String, CategoryKey>,
    category_ids: HashMap<String, CategoryKey>,
    category_names: HashMap<String, CategoryKey>,
}

impl CategoryResolver {
    /// Normalize every table value to a canonical key. Unknown values are a
    /// configuration error rather than a silent `other`.
    pub fn new(tables: &CategoryTables) -> Result<Self, FeedError> {
        let object_ids = tables
            .object_ids
            .iter()
            .map(|(id, key)| Ok((id.trim().to_ascii_uppercase(), parse_table_key(key)?)))
            .collect::<Result<HashMap<_, _>, FeedError>>()?;

        let category_ids = tables
            .category_ids
            .iter()
            .map(|(id, key)| Ok((id.trim().to_string(), parse_table_key(key)?)))
            .collect::<Result<HashMap<_, _>, FeedError>>()?;

        let category_names = tables
            .category_names
            .iter()
            .map(|(name, cat_id)| {
                let cat_id = cat_id.trim();
                let key = category_ids
                    .get(cat_id)
                    .copied()
                    .or_else(|| CategoryKey::parse(cat_id))
                    .ok_or_else(|| {
                        FeedError::Config(format!(
                            "category name '{name}' points at unknown category id '{cat_id}'"
                        ))
                    })?;
                Ok((name.trim().to_string(), key))
            })
            .collect::<Result<HashMap<_, _>, FeedError>>()?;

        Ok(Self {
            object_ids,
            category_ids,
            category_names,
        })
    }

    pub fn resolve(&self, object_id: Option<&str>, signals: &[String]) -> Resolution {
        let from_object = object_id
            .map(|id| id.trim().to_ascii_uppercase())
            .filter(|id| !id.is_empty())
            .and_then(|id| self.object_ids.get(&id).copied());

        let primary = from_object
            .or_else(|| signals.first().map(|signal| self.resolve_signal(signal)))
            .unwrap_or(CategoryKey::Other);

        let mut categories = BTreeSet::from([primary]);
        categories.extend(signals.iter().map(|signal| self.resolve_signal(signal)));

        Resolution {
            primary,
            categories,
        }
    }

    /// Category id, then localized name, then the signal as a key spelling.
    pub fn resolve_signal(&self, signal: &str) -> CategoryKey {
        let signal = signal.trim();
        self.category_ids
            .get(signal)
            .or_else(|| self.category_names.get(signal))
            .copied()
            .or_else(|| CategoryKey::parse(signal))
            .unwrap_or(CategoryKey::Other)
    }
}

fn parse_table_key(raw: &str) -> Result<CategoryKey, FeedError> {
    CategoryKey::parse(raw)
        .ok_or_else(|| FeedError::Config(format!("unknown category key '{raw}' in table")))
}
