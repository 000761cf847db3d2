use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

use pinmap_shared::config::QUERY_DEBUG;
use pinmap_shared::feed::base_url_of;
use pinmap_shared::{Locale, MapConfig};

/// The page language: `<html lang>` first, then the browser's.
pub fn detect_locale(document: &web_sys::Document) -> Locale {
    let html_lang = document
        .document_element()
        .and_then(|el| el.get_attribute("lang"))
        .filter(|lang| !lang.trim().is_empty());
    let tag = html_lang
        .or_else(|| web_sys::window().and_then(|w| w.navigator().language()))
        .unwrap_or_default();
    Locale::from_language_tag(&tag)
}

fn query_param(window: &web_sys::Window, name: &str) -> Option<String> {
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(name)
}

/// Whether the page URL carries `?debug=true`.
pub fn debug_requested(window: &web_sys::Window) -> bool {
    query_param(window, QUERY_DEBUG).is_some_and(|value| value.trim() == "true")
}

/// Configuration from the map element's `data-*` attributes and the page URL.
pub fn read_config(window: &web_sys::Window, element: &web_sys::Element) -> MapConfig {
    let document = window.document();
    let locale = document
        .as_ref()
        .map(detect_locale)
        .unwrap_or_default();
    let debug = query_param(window, QUERY_DEBUG);
    MapConfig::from_attributes(locale, |name| {
        if name == QUERY_DEBUG {
            debug.clone()
        } else {
            element.get_attribute(name)
        }
    })
}

/// Directory of the script that loaded the map, so relative feeds resolve
/// next to it. Empty when there is no current script.
pub fn script_base_url(document: &web_sys::Document) -> String {
    let src = Reflect::get(document.as_ref(), &JsValue::from_str("currentScript"))
        .ok()
        .and_then(|script| script.dyn_into::<web_sys::HtmlScriptElement>().ok())
        .map(|script| script.src())
        .unwrap_or_default();
    base_url_of(&src).to_string()
}

/// Milliseconds since the epoch, used as a cache buster.
pub fn now_millis() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}
