mod app;
mod feed;
mod leaflet;
mod logging;
mod page;
mod rank_control;

use std::any::Any;
use std::cell::RefCell;

use pinmap_shared::config::MAP_ELEMENT_ID;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    logging::init(page::debug_requested(&window));
    let Some(document) = window.document() else {
        return;
    };
    let Some(element) = document.get_element_by_id(MAP_ELEMENT_ID) else {
        web_sys::console::error_1(&format!("#{MAP_ELEMENT_ID} element not found").into());
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop a previous mount if main() is re-entered so stale effects stop.
        let _old = slot.borrow_mut().take();
        match app::start(&window, &document, &element) {
            Ok(handle) => *slot.borrow_mut() = handle,
            Err(e) => {
                web_sys::console::error_1(&format!("map setup failed: {e:?}").into());
            }
        }
    });
}
