use std::collections::BTreeSet;

use crate::category::CategoryKey;
use crate::config::MapConfig;
use crate::pin::{Pin, PinId};
use crate::rank::RankFilter;
use crate::style::StyleRegistry;

/// User-driven mutations of the filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCommand {
    ToggleCategory { key: CategoryKey, on: bool },
    SetRank(RankFilter),
}

/// Which categories and which rank are currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub active: BTreeSet<CategoryKey>,
    pub rank: RankFilter,
}

impl FilterState {
    /// Initial state for a page.
    ///
    /// A focused page activates only its category, plus the start point for
    /// blueprint and LEM pages. Otherwise every styled category is active
    /// except the default-hidden ones, and `trash` outside debug mode.
    pub fn initial(config: &MapConfig, styles: &StyleRegistry) -> Self {
        let active = match config.focus {
            Some(focus) => {
                let mut active = BTreeSet::from([focus]);
                if focus.wants_start_point() {
                    active.insert(CategoryKey::Start);
                }
                active
            }
            None => styles
                .keys()
                .filter(|key| !key.hidden_by_default())
                .filter(|key| config.debug || *key != CategoryKey::Trash)
                .collect(),
        };
        Self {
            active,
            rank: RankFilter::All,
        }
    }

    pub fn apply(&mut self, command: FilterCommand) {
        match command {
            FilterCommand::ToggleCategory { key, on: true } => {
                self.active.insert(key);
            }
            FilterCommand::ToggleCategory { key, on: false } => {
                self.active.remove(&key);
            }
            FilterCommand::SetRank(rank) => self.rank = rank,
        }
    }

    /// Any active category matches, and the rank matches. Start points
    /// ignore the rank filter.
    pub fn is_visible(&self, pin: &Pin) -> bool {
        let category_match = pin.categories.iter().any(|key| self.active.contains(key));
        let rank_match = self.rank.matches(pin.rank) || pin.is_in(CategoryKey::Start);
        category_match && rank_match
    }
}

/// Categories offered as toggles, in registry order. `trash` is a debug aid.
pub fn layer_control_keys(styles: &StyleRegistry, debug: bool) -> Vec<CategoryKey> {
    styles
        .keys()
        .filter(|key| debug || *key != CategoryKey::Trash)
        .collect()
}

/// The rendering side of the engine: something that can show and hide pins.
pub trait MarkerLayer {
    fn is_attached(&self, id: PinId) -> bool;
    fn attach(&mut self, pin: &Pin);
    fn detach(&mut self, id: PinId);
}

/// What one resync changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub attached: usize,
    pub detached: usize,
    pub visible: usize,
}

/// The loaded pins together with the filter state that governs them.
#[derive(Debug, Clone)]
pub struct PinBoard {
    pins: Vec<Pin>,
    filter: FilterState,
}

impl PinBoard {
    pub fn new(pins: Vec<Pin>, filter: FilterState) -> Self {
        Self { pins, filter }
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn visible_ids(&self) -> BTreeSet<PinId> {
        self.pins
            .iter()
            .filter(|pin| self.filter.is_visible(pin))
            .map(|pin| pin.id)
            .collect()
    }

    /// Apply one command, then bring the layer in line with the new state.
    pub fn apply(&mut self, command: FilterCommand, layer: &mut impl MarkerLayer) -> SyncReport {
        self.filter.apply(command);
        self.sync(layer)
    }

    /// Attach every visible pin that is missing and detach every hidden pin
    /// that is present. Running it twice changes nothing the second time.
    pub fn sync(&self, layer: &mut impl MarkerLayer) -> SyncReport {
        let mut report = SyncReport::default();
        for pin in &self.pins {
            let visible = self.filter.is_visible(pin);
            let attached = layer.is_attached(pin.id);
            if visible {
                report.visible += 1;
            }
            if visible && !attached {
                layer.attach(pin);
                report.attached += 1;
            } else if !visible && attached {
                layer.detach(pin.id);
                report.detached += 1;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::*;
    use crate::rank::Rank;

    #[derive(Default)]
    struct RecordingLayer {
        attached: HashSet<PinId>,
        adds: usize,
        removes: usize,
    }

    impl MarkerLayer for RecordingLayer {
        fn is_attached(&self, id: PinId) -> bool {
            self.attached.contains(&id)
        }

        fn attach(&mut self, pin: &Pin) {
            assert!(self.attached.insert(pin.id), "pin {:?} attached twice", pin.id);
            self.adds += 1;
        }

        fn detach(&mut self, id: PinId) {
            assert!(self.attached.remove(&id), "pin {id:?} detached while absent");
            self.removes += 1;
        }
    }

    fn pin(id: usize, categories: &[CategoryKey], rank: Rank) -> Pin {
        Pin {
            id: PinId(id),
            position: (0.0, 0.0),
            style_key: categories[0],
            categories: categories.iter().copied().collect(),
            rank,
            sequence: None,
            name: format!("pin {id}"),
            display_name: format!("pin {id}"),
            tooltip: String::new(),
            popup_html: String::new(),
            icon_html: String::new(),
        }
    }

    fn board_with(active: &[CategoryKey]) -> PinBoard {
        let pins = vec![
            pin(0, &[CategoryKey::Start], Rank::Standard),
            pin(1, &[CategoryKey::Blueprint], Rank::Standard),
            pin(2, &[CategoryKey::Lem], Rank::Greater),
            pin(3, &[CategoryKey::Lem, CategoryKey::Blueprint], Rank::Lesser),
            pin(4, &[CategoryKey::Cave], Rank::Standard),
        ];
        let filter = FilterState {
            active: active.iter().copied().collect(),
            rank: RankFilter::All,
        };
        PinBoard::new(pins, filter)
    }

    fn ids(raw: &[usize]) -> BTreeSet<PinId> {
        raw.iter().map(|&id| PinId(id)).collect()
    }

    #[test]
    fn categories_are_or_combined() {
        let board = board_with(&[CategoryKey::Blueprint]);
        assert_eq!(board.visible_ids(), ids(&[1, 3]));

        let board = board_with(&[CategoryKey::Lem, CategoryKey::Cave]);
        assert_eq!(board.visible_ids(), ids(&[2, 3, 4]));
    }

    #[test]
    fn rank_filter_narrows_but_spares_start() {
        let mut board = board_with(&[CategoryKey::Start, CategoryKey::Lem]);
        let mut layer = RecordingLayer::default();
        board.apply(FilterCommand::SetRank(RankFilter::Greater), &mut layer);
        assert_eq!(board.visible_ids(), ids(&[0, 2]));
        board.apply(FilterCommand::SetRank(RankFilter::Lesser), &mut layer);
        assert_eq!(board.visible_ids(), ids(&[0, 3]));
    }

    #[test]
    fn start_pins_survive_every_rank_filter() {
        let mut board = board_with(&[CategoryKey::Start]);
        let mut layer = RecordingLayer::default();
        for rank in RankFilter::OPTIONS {
            board.apply(FilterCommand::SetRank(rank), &mut layer);
            assert!(board.visible_ids().contains(&PinId(0)), "hidden under {rank:?}");
        }
    }

    #[test]
    fn sync_is_idempotent() {
        let board = board_with(&[CategoryKey::Lem]);
        assert_eq!(board.pins().len(), 5);
        let mut layer = RecordingLayer::default();
        let first = board.sync(&mut layer);
        assert_eq!(first.attached, 2);
        let second = board.sync(&mut layer);
        assert_eq!(second, SyncReport { attached: 0, detached: 0, visible: 2 });
        assert_eq!(layer.adds, 2);
        assert_eq!(layer.removes, 0);
    }

    #[test]
    fn toggle_off_and_on_restores_visible_set() {
        let mut board = board_with(&[CategoryKey::Blueprint, CategoryKey::Cave]);
        let mut layer = RecordingLayer::default();
        board.sync(&mut layer);
        let before = layer.attached.clone();

        let off = board.apply(
            FilterCommand::ToggleCategory { key: CategoryKey::Blueprint, on: false },
            &mut layer,
        );
        assert_eq!(off.detached, 2);
        assert_eq!(layer.attached, HashSet::from([PinId(4)]));

        board.apply(
            FilterCommand::ToggleCategory { key: CategoryKey::Blueprint, on: true },
            &mut layer,
        );
        assert_eq!(layer.attached, before);
    }

    #[test]
    fn visibility_is_a_pure_function_of_state() {
        let board = board_with(&[CategoryKey::Lem, CategoryKey::Start]);
        let first = board.visible_ids();
        assert_eq!(board.visible_ids(), first);
    }

    #[test]
    fn focused_blueprint_page_also_shows_start() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let config = MapConfig {
            focus: Some(CategoryKey::Blueprint),
            ..MapConfig::default()
        };
        let state = FilterState::initial(&config, &styles);
        assert_eq!(
            state.active,
            BTreeSet::from([CategoryKey::Blueprint, CategoryKey::Start])
        );

        let config = MapConfig {
            focus: Some(CategoryKey::Warbond),
            ..MapConfig::default()
        };
        let state = FilterState::initial(&config, &styles);
        assert_eq!(state.active, BTreeSet::from([CategoryKey::Warbond]));
    }

    #[test]
    fn unfocused_page_hides_default_hidden_and_trash() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        let state = FilterState::initial(&MapConfig::default(), &styles);
        assert_eq!(
            state.active,
            BTreeSet::from([
                CategoryKey::Start,
                CategoryKey::Blueprint,
                CategoryKey::Warbond,
                CategoryKey::Lem,
            ])
        );
        assert_eq!(state.rank, RankFilter::All);

        let debug = MapConfig {
            debug: true,
            ..MapConfig::default()
        };
        let state = FilterState::initial(&debug, &styles);
        assert!(state.active.contains(&CategoryKey::Trash));
    }

    #[test]
    fn trash_toggle_only_offered_in_debug() {
        let styles = StyleRegistry::star_rupture().expect("built-in styles are valid");
        assert!(!layer_control_keys(&styles, false).contains(&CategoryKey::Trash));
        assert_eq!(layer_control_keys(&styles, true).len(), CategoryKey::ALL.len());
    }
}
