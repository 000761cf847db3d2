use std::collections::BTreeSet;

use crate::category::CategoryKey;
use crate::config::Locale;
use crate::rank::Rank;
use crate::record::RawRecord;
use crate::resolver::Resolution;
use crate::style::{StyleEntry, StyleRegistry};
use crate::text_filter::clean_text_for_filter;

/// Index of a pin in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId(pub usize);

/// Separator between a category label and a name in focused-mode tooltips.
const LABEL_SEPARATOR: &str = "：";
const EMPTY_TOOLTIP: &str = "—";

/// When a blueprint pin's sequence number is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberingPolicy {
    Never,
    /// Only on pages focused on blueprints.
    #[default]
    FocusedBlueprint,
    Always,
}

/// Per-page rendering options that influence pin text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewOptions {
    pub locale: Locale,
    pub focus: Option<CategoryKey>,
    pub numbering: NumberingPolicy,
    pub debug: bool,
}

impl ViewOptions {
    fn numbers_blueprints(&self) -> bool {
        match self.numbering {
            NumberingPolicy::Never => false,
            NumberingPolicy::FocusedBlueprint => self.focus == Some(CategoryKey::Blueprint),
            NumberingPolicy::Always => true,
        }
    }
}

/// Counts blueprint-primary pins across one load pass, in feed order.
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    blueprints: u32,
}

impl SequenceCounter {
    /// Advance for every blueprint pin, whether or not the number is shown,
    /// so numbers stay stable across display modes.
    pub fn next(&mut self, primary: CategoryKey) -> Option<u32> {
        if primary == CategoryKey::Blueprint {
            self.blueprints += 1;
            Some(self.blueprints)
        } else {
            None
        }
    }
}

/// A fully resolved, render-ready landmark. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: PinId,
    pub position: (f64, f64),
    /// Primary category; decides icon and color.
    pub style_key: CategoryKey,
    /// Every category the pin is filtered under.
    pub categories: BTreeSet<CategoryKey>,
    pub rank: Rank,
    pub sequence: Option<u32>,
    /// Plain localized name.
    pub name: String,
    /// Name as HTML, with the sequence badge text when numbered.
    pub display_name: String,
    pub tooltip: String,
    pub popup_html: String,
    pub icon_html: String,
}

impl Pin {
    pub fn is_in(&self, key: CategoryKey) -> bool {
        self.categories.contains(&key)
    }
}

/// Turns classified records into pins for one load pass.
pub struct PinFactory<'a> {
    styles: &'a StyleRegistry,
    view: &'a ViewOptions,
    counter: SequenceCounter,
    next_id: usize,
}

impl<'a> PinFactory<'a> {
    pub fn new(styles: &'a StyleRegistry, view: &'a ViewOptions) -> Self {
        Self {
            styles,
            view,
            counter: SequenceCounter::default(),
            next_id: 0,
        }
    }

    /// `None` when the record's coordinates are unusable.
    pub fn build(&mut self, record: &RawRecord, resolution: Resolution) -> Option<Pin> {
        let (x, y) = record.coords;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let locale = self.view.locale;
        let style = self.styles.get(resolution.primary);
        let label = style.label(locale);

        let counted = self.counter.next(resolution.primary);
        let sequence = counted.filter(|_| self.view.numbers_blueprints());

        let name = record.name.get(locale).to_string();
        let memo = record.memo.get(locale);
        let raw_text = if memo.trim().is_empty() {
            name.as_str()
        } else {
            memo
        };

        let display_name = match sequence {
            Some(n) => format!(r#"{name} <span style="font-size:0.9em;color:#888;">(No.{n})</span>"#),
            None => name.clone(),
        };

        let tooltip = self.tooltip(&name, sequence, raw_text, label);
        let popup_html = popup_html(style, label, &display_name, memo, record);
        let icon_html = icon_html(style, sequence);

        let id = PinId(self.next_id);
        self.next_id += 1;

        Some(Pin {
            id,
            position: (x, y),
            style_key: resolution.primary,
            categories: resolution.categories,
            rank: Rank::classify(&record.rank_text),
            sequence,
            name,
            display_name,
            tooltip,
            popup_html,
            icon_html,
        })
    }

    fn tooltip(&self, name: &str, sequence: Option<u32>, raw_text: &str, label: &str) -> String {
        let text = match self.view.focus {
            None => raw_text.to_string(),
            Some(_) if !name.trim().is_empty() => match sequence {
                Some(n) => format!("{label}{LABEL_SEPARATOR}{name} (No.{n})"),
                None => format!("{label}{LABEL_SEPARATOR}{name}"),
            },
            Some(mode) => clean_text_for_filter(raw_text, mode),
        };

        [text.as_str(), raw_text, label]
            .into_iter()
            .find(|candidate| !candidate.trim().is_empty())
            .unwrap_or(EMPTY_TOOLTIP)
            .to_string()
    }
}

fn popup_html(
    style: &StyleEntry,
    label: &str,
    display_name: &str,
    memo: &str,
    record: &RawRecord,
) -> String {
    let mut html = format!(
        concat!(
            r#"<div style="font-family:sans-serif;min-width:180px;">"#,
            r#"<div style="font-size:10px;color:{color};font-weight:bold;text-transform:uppercase;">{label}</div>"#,
            r#"<div style="font-size:14px;font-weight:bold;margin:4px 0;border-bottom:1px solid #ccc;padding-bottom:4px;">{name}</div>"#,
        ),
        color = style.color,
        label = label,
        name = display_name,
    );
    if !memo.trim().is_empty() {
        html.push_str(&format!(
            r#"<div style="font-size:12px;color:#444;background:#f4f4f4;padding:5px;border-radius:3px;line-height:1.4;">{memo}</div>"#
        ));
    }
    if let Some(updated) = record.updated_at {
        html.push_str(&format!(
            r#"<div style="font-size:10px;color:#999;margin-top:4px;text-align:right;">{}</div>"#,
            updated.format("%Y-%m-%d")
        ));
    }
    html.push_str("</div>");
    html
}

fn icon_html(style: &StyleEntry, sequence: Option<u32>) -> String {
    let mut html = format!(
        r#"<div style="position:relative;">{}"#,
        style.glyph_or_default()
    );
    if let Some(n) = sequence {
        html.push_str(&format!(
            r#"<span style="position:absolute;bottom:-5px;right:-8px;background:#e74c3c;color:white;border-radius:50%;font-size:10px;min-width:16px;height:16px;text-align:center;line-height:16px;font-weight:bold;border:1px solid white;box-shadow:1px 1px 2px rgba(0,0,0,0.3);">{n}</span>"#
        ));
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::record::LocalizedText;

    fn record(name: &str, memo: &str) -> RawRecord {
        RawRecord {
            coords: (10.0, 20.0),
            object_id: None,
            category_signals: Vec::new(),
            name: LocalizedText::new(name, ""),
            memo: LocalizedText::new(memo, ""),
            rank_text: String::new(),
            updated_at: None,
            debug_only: false,
        }
    }

    fn resolution(primary: CategoryKey) -> Resolution {
        Resolution {
            primary,
            categories: BTreeSet::from([primary]),
        }
    }

    fn view(focus: Option<CategoryKey>, numbering: NumberingPolicy) -> ViewOptions {
        ViewOptions {
            locale: Locale::Ja,
            focus,
            numbering,
            debug: false,
        }
    }

    #[test]
    fn counter_only_advances_on_blueprints() {
        let mut counter = SequenceCounter::default();
        assert_eq!(counter.next(CategoryKey::Blueprint), Some(1));
        assert_eq!(counter.next(CategoryKey::Lem), None);
        assert_eq!(counter.next(CategoryKey::Blueprint), Some(2));
    }

    #[test]
    fn numbering_applies_only_in_blueprint_focus_by_default() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let focused = view(Some(CategoryKey::Blueprint), NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &focused);
        let first = factory
            .build(&record("チューブ", ""), resolution(CategoryKey::Blueprint))
            .expect("pin");
        let other = factory
            .build(&record("箱", ""), resolution(CategoryKey::Other))
            .expect("pin");
        let second = factory
            .build(&record("パイプ", ""), resolution(CategoryKey::Blueprint))
            .expect("pin");
        assert_eq!(first.sequence, Some(1));
        assert_eq!(other.sequence, None);
        assert_eq!(second.sequence, Some(2));
        assert!(second.display_name.starts_with("パイプ <span"));
        assert!(second.display_name.contains("(No.2)"));
        assert_eq!(second.name, "パイプ");
        assert!(second.icon_html.contains(">2</span>"));
        assert_eq!(second.id, PinId(2));

        let unfocused = view(None, NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &unfocused);
        let pin = factory
            .build(&record("チューブ", ""), resolution(CategoryKey::Blueprint))
            .expect("pin");
        assert_eq!(pin.sequence, None);
        assert_eq!(pin.display_name, "チューブ");
    }

    #[test]
    fn numbering_policy_always_and_never() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let always = view(None, NumberingPolicy::Always);
        let mut factory = PinFactory::new(&styles, &always);
        let pin = factory
            .build(&record("A", ""), resolution(CategoryKey::Blueprint))
            .expect("pin");
        assert_eq!(pin.sequence, Some(1));

        let never = view(Some(CategoryKey::Blueprint), NumberingPolicy::Never);
        let mut factory = PinFactory::new(&styles, &never);
        let pin = factory
            .build(&record("A", ""), resolution(CategoryKey::Blueprint))
            .expect("pin");
        assert_eq!(pin.sequence, None);
    }

    #[test]
    fn unfocused_tooltip_prefers_memo_then_name() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let unfocused = view(None, NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &unfocused);
        let pin = factory
            .build(&record("箱", "設計図：A"), resolution(CategoryKey::Other))
            .expect("pin");
        assert_eq!(pin.tooltip, "設計図：A");
        let pin = factory
            .build(&record("箱", ""), resolution(CategoryKey::Other))
            .expect("pin");
        assert_eq!(pin.tooltip, "箱");
    }

    #[test]
    fn focused_tooltip_uses_label_and_name() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let focused = view(Some(CategoryKey::Blueprint), NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &focused);
        let pin = factory
            .build(&record("チューブ", "memo"), resolution(CategoryKey::Blueprint))
            .expect("pin");
        assert_eq!(pin.tooltip, "設計図：チューブ (No.1)");

        let focused = view(Some(CategoryKey::Lem), NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &focused);
        let pin = factory
            .build(&record("セル", ""), resolution(CategoryKey::Lem))
            .expect("pin");
        assert_eq!(pin.tooltip, "LEM：セル");
    }

    #[test]
    fn focused_tooltip_without_name_filters_memo_lines() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let focused = view(Some(CategoryKey::Blueprint), NumberingPolicy::Never);
        let mut factory = PinFactory::new(&styles, &focused);
        let pin = factory
            .build(
                &record("", "設計図：アイテムA\nその他の行"),
                resolution(CategoryKey::Other),
            )
            .expect("pin");
        assert_eq!(pin.tooltip, "設計図：アイテムA");

        let pin = factory
            .build(&record("", "nothing relevant"), resolution(CategoryKey::Other))
            .expect("pin");
        assert_eq!(pin.tooltip, "nothing relevant");
    }

    #[test]
    fn tooltip_is_never_empty() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let unfocused = view(None, NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &unfocused);
        let pin = factory
            .build(&record("", ""), resolution(CategoryKey::Cave))
            .expect("pin");
        assert_eq!(pin.tooltip, "地下洞窟");
    }

    #[test]
    fn popup_carries_label_color_memo_and_date() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let unfocused = view(None, NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &unfocused);
        let mut rec = record("宇宙船", "ここから開始");
        rec.updated_at = crate::record::parse_updated_at("2026-01-11 09:30:00");
        let pin = factory
            .build(&rec, resolution(CategoryKey::Start))
            .expect("pin");
        assert!(pin.popup_html.contains("color:#ffffff"));
        assert!(pin.popup_html.contains(">開始地点</div>"));
        assert!(pin.popup_html.contains(">宇宙船</div>"));
        assert!(pin.popup_html.contains(">ここから開始</div>"));
        assert!(pin.popup_html.contains(">2026-01-11</div>"));
        assert!(pin.icon_html.contains("🚀"));
        assert!(!pin.icon_html.contains("<span"));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let unfocused = view(None, NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &unfocused);
        let mut rec = record("x", "");
        rec.coords = (f64::NAN, 1.0);
        assert!(factory.build(&rec, resolution(CategoryKey::Other)).is_none());
    }

    #[test]
    fn rank_comes_from_rank_text() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let unfocused = view(None, NumberingPolicy::default());
        let mut factory = PinFactory::new(&styles, &unfocused);
        let mut rec = record("LEM", "");
        rec.rank_text = "p1,1,2,LEM（上級）".into();
        let pin = factory
            .build(&rec, resolution(CategoryKey::Lem))
            .expect("pin");
        assert_eq!(pin.rank, Rank::Greater);
    }
}
