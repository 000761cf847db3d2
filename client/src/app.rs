use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use pinmap_shared::config::MAP_ELEMENT_ID;
use pinmap_shared::csv::CsvLayout;
use pinmap_shared::feed::{FeedLoader, FeedPlan};
use pinmap_shared::filter::layer_control_keys;
use pinmap_shared::resolver::CategoryTables;
use pinmap_shared::{
    FilterCommand, FilterState, MapConfig, NumberingPolicy, Pin, PinBoard, RankFilter,
    StyleRegistry, SyncReport, ViewOptions,
};

use crate::feed::load_pins;
use crate::leaflet::{LeafletLayer, LeafletMap};
use crate::page;
use crate::rank_control::RankControl;

const RANK_CONTROL_CLASS: &str = "rank-filter-control";

/// Loaded pins, the filter over them and the markers that render them.
struct MapSession {
    board: PinBoard,
    layer: LeafletLayer,
}

impl MapSession {
    fn apply(&mut self, command: FilterCommand) -> SyncReport {
        self.board.apply(command, &mut self.layer)
    }

    /// Swap in a freshly loaded pin set, keeping whatever the user already
    /// toggled while the feed was loading.
    fn replace_pins(&mut self, pins: Vec<Pin>) -> SyncReport {
        let filter = self.board.filter().clone();
        self.board = PinBoard::new(pins, filter);
        self.board.sync(&mut self.layer)
    }
}

type SharedSession = Rc<RefCell<MapSession>>;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Build the map inside `element` and start loading pins. Returns the mount
/// handle of the rank control, if one was shown.
pub fn start(
    window: &web_sys::Window,
    document: &web_sys::Document,
    element: &web_sys::Element,
) -> Result<Option<Box<dyn Any>>, JsValue> {
    let config = page::read_config(window, element);
    let styles = StyleRegistry::star_rupture().map_err(to_js_error)?;

    let map = LeafletMap::create(MAP_ELEMENT_ID, &config)?;
    let session: SharedSession = Rc::new(RefCell::new(MapSession {
        board: PinBoard::new(Vec::new(), FilterState::initial(&config, &styles)),
        layer: LeafletLayer::new(map.clone(), config.show_labels),
    }));

    let mount_handle = if config.shows_rank_control() {
        Some(mount_rank_control(&map, session.clone())?)
    } else {
        None
    };

    let plan = FeedPlan::from_config(&config, &page::script_base_url(document));
    let loader = FeedLoader::new(
        &CategoryTables::star_rupture(),
        styles,
        CsvLayout::default(),
        ViewOptions {
            locale: config.locale,
            focus: config.focus,
            numbering: NumberingPolicy::default(),
            debug: config.debug,
        },
    )
    .map_err(to_js_error)?;

    spawn_local(async move {
        let pins = match load_pins(&plan, &loader, page::now_millis()).await {
            Ok(pins) => pins,
            Err(e) => {
                web_sys::console::error_1(
                    &format!("failed to load pins; check the feed URL and CORS: {e}").into(),
                );
                return;
            }
        };
        if let Err(e) = install_pins(&session, &map, &config, loader.styles(), pins) {
            web_sys::console::error_1(&format!("failed to set up map layers: {e:?}").into());
        }
    });

    Ok(mount_handle)
}

fn mount_rank_control(map: &LeafletMap, session: SharedSession) -> Result<Box<dyn Any>, JsValue> {
    let container = map.add_corner_control(RANK_CONTROL_CLASS)?;
    let handle = mount_to(container, move || {
        let rank = RwSignal::new(RankFilter::All);
        Effect::new(move || {
            let selected = rank.get();
            session.borrow_mut().apply(FilterCommand::SetRank(selected));
        });
        view! { <RankControl rank=rank /> }
    });
    Ok(Box::new(handle))
}

/// Show the loaded pins, then offer per-category toggles wired to the filter.
fn install_pins(
    session: &SharedSession,
    map: &LeafletMap,
    config: &MapConfig,
    styles: &StyleRegistry,
    pins: Vec<Pin>,
) -> Result<(), JsValue> {
    let (total, report, active) = {
        let mut session = session.borrow_mut();
        let report = session.replace_pins(pins);
        (
            session.board.pins().len(),
            report,
            session.board.filter().active.clone(),
        )
    };
    web_sys::console::info_1(
        &format!("loaded {total} pins, {} visible", report.visible).into(),
    );

    let overlays: Vec<(String, bool)> = layer_control_keys(styles, config.debug)
        .into_iter()
        .map(|key| {
            (
                styles.get(key).label(config.locale).to_string(),
                active.contains(&key),
            )
        })
        .collect();
    map.add_layers_control(&overlays, config.shows_layer_control())?;

    for (event, on) in [("overlayadd", true), ("overlayremove", false)] {
        let session = session.clone();
        let styles = styles.clone();
        let locale = config.locale;
        map.on(event, move |e| {
            let Some(name) = Reflect::get(&e, &JsValue::from_str("name"))
                .ok()
                .and_then(|v| v.as_string())
            else {
                return;
            };
            let Some(key) = styles.key_for_label(&name, locale) else {
                return;
            };
            session
                .borrow_mut()
                .apply(FilterCommand::ToggleCategory { key, on });
        })?;
    }
    Ok(())
}
