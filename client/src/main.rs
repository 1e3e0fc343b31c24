mod app;
mod canvas;
mod loader;
mod render_loop;

use leptos::mount::mount_to;
use leptos::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use footprint_shared::MapConfig;

use crate::app::App;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn attr_f64(el: &web_sys::Element, name: &str) -> Option<f64> {
    el.get_attribute(name)?.trim().parse().ok()
}

fn window_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w, h))
}

/// Build the map configuration from the mount element.
///
/// `data-config` may hold a (partial) JSON `MapConfig`; `data-land-url`,
/// `data-countries-url`, `data-width` and `data-height` override single
/// fields. Without an explicit size the window's inner size is used.
fn mount_config(el: &web_sys::Element) -> MapConfig {
    let mut config = match el.get_attribute("data-config") {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            web_sys::console::warn_1(&format!("ignoring invalid data-config: {e}").into());
            MapConfig::default()
        }),
        None => MapConfig::default(),
    };
    if let Some(url) = el.get_attribute("data-land-url") {
        config.data.land_url = url;
    }
    if let Some(url) = el.get_attribute("data-countries-url") {
        config.data.countries_url = url;
    }

    let (fallback_w, fallback_h) = window_size().unwrap_or((config.width, config.height));
    let width = attr_f64(el, "data-width").unwrap_or(fallback_w);
    let height = attr_f64(el, "data-height").unwrap_or(fallback_h);
    config.with_size(width, height)
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        return;
    };
    let config = mount_config(&target);

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop any previous mount so stale effects stop touching the page
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
