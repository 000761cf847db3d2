use crate::category::CategoryKey;

pub const MAX_ZOOM: u8 = 5;
pub const DEFAULT_ZOOM: u8 = 2;
pub const IMAGE_WIDTH: f64 = 6253.0;
pub const IMAGE_HEIGHT: f64 = 7104.0;
/// Extra pannable margin around the image, in image pixels.
pub const MAP_PADDING: f64 = 1500.0;
pub const TILE_URL: &str =
    "https://lost-in-games.com/starrupture-map/tiles/{z}/{x}/{y}.webp?v=20260111_FINAL3";
pub const TILE_SIZE: u32 = 256;

pub const DEFAULT_CSV_FILE: &str = "master_data.csv";
pub const MAP_ELEMENT_ID: &str = "game-map";

pub const ATTR_SHOW_LABELS: &str = "data-show-labels";
pub const ATTR_ZOOM: &str = "data-zoom";
pub const ATTR_FILTER: &str = "data-filter";
pub const ATTR_CSV: &str = "data-csv";
pub const ATTR_PINS: &str = "data-pins";
/// Query-string parameter (not an element attribute) that enables debug mode.
pub const QUERY_DEBUG: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    Ja,
    #[default]
    En,
}

impl Locale {
    /// Japanese for any `ja*` language tag, English otherwise.
    pub fn from_language_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("ja") {
            Locale::Ja
        } else {
            Locale::En
        }
    }
}

/// Configuration read once from the hosting page.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub show_labels: bool,
    pub zoom: u8,
    /// Focused display mode: only this category starts active.
    pub focus: Option<CategoryKey>,
    pub debug: bool,
    pub csv_url: Option<String>,
    pub pins_url: Option<String>,
    pub locale: Locale,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            show_labels: false,
            zoom: DEFAULT_ZOOM,
            focus: None,
            debug: false,
            csv_url: None,
            pins_url: None,
            locale: Locale::default(),
        }
    }
}

impl MapConfig {
    /// Build the configuration from a lookup over the map element's
    /// attributes (plus [`QUERY_DEBUG`] from the page URL).
    pub fn from_attributes(locale: Locale, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).is_some_and(|value| value.trim() == "true");
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let zoom = lookup(ATTR_ZOOM)
            .and_then(|value| value.trim().parse::<u8>().ok())
            .map(|zoom| zoom.min(MAX_ZOOM))
            .unwrap_or(DEFAULT_ZOOM);

        let focus = non_empty(ATTR_FILTER).and_then(|raw| {
            let key = CategoryKey::parse(&raw);
            if key.is_none() {
                tracing::warn!(filter = %raw, "unknown focus category; showing default layers");
            }
            key
        });

        Self {
            show_labels: flag(ATTR_SHOW_LABELS),
            zoom,
            focus,
            debug: flag(QUERY_DEBUG),
            csv_url: non_empty(ATTR_CSV),
            pins_url: non_empty(ATTR_PINS),
            locale,
        }
    }

    /// The rank buttons only make sense where rank varies: the full map and LEM gear.
    pub fn shows_rank_control(&self) -> bool {
        matches!(self.focus, None | Some(CategoryKey::Lem))
    }

    /// Per-category toggles are hidden in focused mode.
    pub fn shows_layer_control(&self) -> bool {
        self.focus.is_none()
    }
}

/// Replace any `zoom-level-N` class in `class_name` with the one for `zoom`.
pub fn with_zoom_class(class_name: &str, zoom: u8) -> String {
    let mut classes: Vec<&str> = class_name
        .split_whitespace()
        .filter(|class| !is_zoom_class(class))
        .collect();
    let zoom_class = format!("zoom-level-{zoom}");
    classes.push(&zoom_class);
    classes.join(" ")
}

fn is_zoom_class(class: &str) -> bool {
    class
        .strip_prefix("zoom-level-")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
