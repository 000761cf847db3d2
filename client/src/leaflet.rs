#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::collections::HashMap;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use pinmap_shared::config::{
    IMAGE_HEIGHT, IMAGE_WIDTH, MAP_PADDING, MAX_ZOOM, MapConfig, TILE_SIZE, TILE_URL,
    with_zoom_class,
};
use pinmap_shared::{MarkerLayer, Pin, PinId};

const ICON_CLASS: &str = "emoji-icon";
const ICON_SIZE: [u32; 2] = [30, 30];
const ICON_ANCHOR: [u32; 2] = [15, 15];
const HANDLER_KEY_PREFIX: &str = "__pinmapHandler_";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions {
    min_zoom: u8,
    max_zoom: u8,
    zoom: u8,
    max_bounds_viscosity: f64,
    prefer_canvas: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileLayerOptions {
    min_zoom: u8,
    max_zoom: u8,
    tile_size: u32,
    no_wrap: bool,
    tms: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DivIconOptions<'a> {
    html: &'a str,
    class_name: &'static str,
    icon_size: [u32; 2],
    icon_anchor: [u32; 2],
}

/// Tooltip placement: permanent labels sit higher than hover tooltips.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    direction: &'static str,
    permanent: bool,
    sticky: bool,
    class_name: &'static str,
    opacity: f64,
    offset: [i32; 2],
}

impl TooltipOptions {
    pub fn for_labels(show_labels: bool) -> Self {
        if show_labels {
            Self {
                direction: "top",
                permanent: true,
                sticky: false,
                class_name: "item-tooltip-permanent",
                opacity: 0.9,
                offset: [0, -20],
            }
        } else {
            Self {
                direction: "top",
                permanent: false,
                sticky: true,
                class_name: "item-tooltip",
                opacity: 0.9,
                offset: [0, -10],
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayersControlOptions {
    collapsed: bool,
    position: &'static str,
}

#[derive(Serialize)]
struct ControlOptions {
    position: &'static str,
}

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

/// The global Leaflet namespace (`window.L`).
fn leaflet() -> Result<JsValue, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let l = Reflect::get(window.as_ref(), &JsValue::from_str("L"))?;
    if l.is_undefined() {
        return Err(js_error("Leaflet is not loaded (window.L is undefined)"));
    }
    Ok(l)
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
}

fn call(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let func: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| js_error(format!("{method} is not a function")))?;
    let args: Array = args.iter().collect();
    func.apply(target, &args)
}

fn point(x: f64, y: f64) -> JsValue {
    Array::of2(&JsValue::from_f64(x), &JsValue::from_f64(y)).into()
}

/// A Leaflet map over the tiled game image, in image-pixel coordinates.
#[derive(Clone)]
pub struct LeafletMap {
    l: JsValue,
    map: JsValue,
    element_id: String,
}

impl LeafletMap {
    /// Create the map, tile layer and bounds, and keep the element's
    /// `zoom-level-N` class current.
    pub fn create(element_id: &str, config: &MapConfig) -> Result<Self, JsValue> {
        let l = leaflet()?;
        let options = to_js(&MapOptions {
            min_zoom: 0,
            max_zoom: MAX_ZOOM,
            zoom: config.zoom,
            max_bounds_viscosity: 0.8,
            prefer_canvas: true,
        })?;
        let crs = get(&get(&l, "CRS")?, "Simple")?;
        Reflect::set(&options, &JsValue::from_str("crs"), &crs)?;

        let map = call(&l, "map", &[&JsValue::from_str(element_id), &options])?;
        let this = Self {
            l,
            map,
            element_id: element_id.to_string(),
        };

        let image_bounds = this.bounds((0.0, IMAGE_HEIGHT), (IMAGE_WIDTH, 0.0))?;
        let padded_bounds = this.bounds(
            (-MAP_PADDING, IMAGE_HEIGHT + MAP_PADDING),
            (IMAGE_WIDTH + MAP_PADDING, -MAP_PADDING),
        )?;
        call(&this.map, "setMaxBounds", &[&padded_bounds])?;
        call(&this.map, "fitBounds", &[&image_bounds])?;
        call(&this.map, "setZoom", &[&JsValue::from(config.zoom)])?;

        let tile_options = to_js(&TileLayerOptions {
            min_zoom: 0,
            max_zoom: MAX_ZOOM,
            tile_size: TILE_SIZE,
            no_wrap: true,
            tms: false,
        })?;
        Reflect::set(&tile_options, &JsValue::from_str("bounds"), &image_bounds)?;
        let tiles = call(
            &this.l,
            "tileLayer",
            &[&JsValue::from_str(TILE_URL), &tile_options],
        )?;
        call(&tiles, "addTo", &[&this.map])?;

        let for_zoom = this.clone();
        this.on("zoomend", move |_| for_zoom.update_zoom_class())?;
        this.update_zoom_class();

        Ok(this)
    }

    /// Image pixel coordinates to a map position at full zoom.
    pub fn unproject(&self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        call(
            &self.map,
            "unproject",
            &[&point(x, y), &JsValue::from(MAX_ZOOM)],
        )
    }

    fn bounds(&self, south_west: (f64, f64), north_east: (f64, f64)) -> Result<JsValue, JsValue> {
        let sw = self.unproject(south_west.0, south_west.1)?;
        let ne = self.unproject(north_east.0, north_east.1)?;
        call(&self.l, "latLngBounds", &[&sw, &ne])
    }

    fn zoom(&self) -> Option<u8> {
        call(&self.map, "getZoom", &[])
            .ok()
            .and_then(|z| z.as_f64())
            .map(|z| z.round().clamp(0.0, f64::from(MAX_ZOOM)) as u8)
    }

    fn update_zoom_class(&self) {
        let Some(zoom) = self.zoom() else {
            return;
        };
        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&self.element_id))
        else {
            return;
        };
        element.set_class_name(&with_zoom_class(&element.class_name(), zoom));
    }

    /// Subscribe to a map event. The handler lives as long as the page.
    pub fn on(&self, event: &str, handler: impl FnMut(JsValue) + 'static) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(JsValue)>::new(handler);
        let handler_js = closure.into_js_value();
        call(&self.map, "on", &[&JsValue::from_str(event), &handler_js])?;
        Reflect::set(
            &self.map,
            &JsValue::from_str(&format!("{HANDLER_KEY_PREFIX}{event}")),
            &handler_js,
        )?;
        Ok(())
    }

    /// One empty layer group per label, registered in a layers control so the
    /// user can toggle them. Groups flagged active start checked.
    pub fn add_layers_control(
        &self,
        overlays: &[(String, bool)],
        show_control: bool,
    ) -> Result<(), JsValue> {
        let overlay_map = js_sys::Object::new();
        for (label, active) in overlays {
            let group = call(&self.l, "layerGroup", &[])?;
            if *active {
                call(&group, "addTo", &[&self.map])?;
            }
            Reflect::set(&overlay_map, &JsValue::from_str(label), &group)?;
        }
        if !show_control {
            return Ok(());
        }
        let options = to_js(&LayersControlOptions {
            collapsed: false,
            position: "topright",
        })?;
        let control = call(
            &get(&self.l, "control")?,
            "layers",
            &[&JsValue::NULL, &overlay_map, &options],
        )?;
        call(&control, "addTo", &[&self.map])?;
        Ok(())
    }

    /// Add an empty bottom-right control and return its container element.
    pub fn add_corner_control(&self, class_name: &str) -> Result<web_sys::HtmlElement, JsValue> {
        let dom_util = get(&self.l, "DomUtil")?;
        let container = call(
            &dom_util,
            "create",
            &[&JsValue::from_str("div"), &JsValue::from_str(class_name)],
        )?;
        let dom_event = get(&self.l, "DomEvent")?;
        call(&dom_event, "disableClickPropagation", &[&container])?;

        let control = call(
            &self.l,
            "control",
            &[&to_js(&ControlOptions {
                position: "bottomright",
            })?],
        )?;
        let container_for_add = container.clone();
        let on_add = Closure::<dyn FnMut() -> JsValue>::new(move || container_for_add.clone());
        Reflect::set(&control, &JsValue::from_str("onAdd"), &on_add.into_js_value())?;
        call(&control, "addTo", &[&self.map])?;

        container
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| js_error("control container is not an element"))
    }

    fn marker(&self, pin: &Pin, show_labels: bool) -> Result<JsValue, JsValue> {
        let (x, y) = pin.position;
        let lat_lng = self.unproject(x, y)?;

        let icon = call(
            &self.l,
            "divIcon",
            &[&to_js(&DivIconOptions {
                html: &pin.icon_html,
                class_name: ICON_CLASS,
                icon_size: ICON_SIZE,
                icon_anchor: ICON_ANCHOR,
            })?],
        )?;
        let marker_options = js_sys::Object::new();
        Reflect::set(&marker_options, &JsValue::from_str("icon"), &icon)?;

        let marker = call(&self.l, "marker", &[&lat_lng, &marker_options])?;
        call(&marker, "bindPopup", &[&JsValue::from_str(&pin.popup_html)])?;
        call(
            &marker,
            "bindTooltip",
            &[
                &JsValue::from_str(&pin.tooltip),
                &to_js(&TooltipOptions::for_labels(show_labels))?,
            ],
        )?;
        Ok(marker)
    }
}

/// Pins rendered as Leaflet markers. Markers are built on first attach and
/// reused afterwards.
pub struct LeafletLayer {
    map: LeafletMap,
    show_labels: bool,
    markers: HashMap<PinId, JsValue>,
}

impl LeafletLayer {
    pub fn new(map: LeafletMap, show_labels: bool) -> Self {
        Self {
            map,
            show_labels,
            markers: HashMap::new(),
        }
    }

    fn marker_for(&mut self, pin: &Pin) -> Result<JsValue, JsValue> {
        if let Some(marker) = self.markers.get(&pin.id) {
            return Ok(marker.clone());
        }
        let marker = self.map.marker(pin, self.show_labels)?;
        self.markers.insert(pin.id, marker.clone());
        Ok(marker)
    }
}

impl MarkerLayer for LeafletLayer {
    fn is_attached(&self, id: PinId) -> bool {
        self.markers.get(&id).is_some_and(|marker| {
            call(&self.map.map, "hasLayer", &[marker])
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        })
    }

    fn attach(&mut self, pin: &Pin) {
        let result = self.marker_for(pin).and_then(|marker| {
            call(&marker, "addTo", &[&self.map.map])?;
            if self.show_labels {
                call(&marker, "openTooltip", &[])?;
            }
            Ok(())
        });
        if let Err(e) = result {
            web_sys::console::warn_1(&format!("failed to show pin {}: {e:?}", pin.id.0).into());
        }
    }

    fn detach(&mut self, id: PinId) {
        let Some(marker) = self.markers.get(&id) else {
            return;
        };
        if let Err(e) = call(&self.map.map, "removeLayer", &[marker]) {
            web_sys::console::warn_1(&format!("failed to hide pin {}: {e:?}", id.0).into());
        }
    }
}
