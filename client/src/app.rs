use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use footprint_shared::{
    Changes, ChoroplethMap, LoadError, LoadState, MapConfig, MapData, MapEvent, Tooltip,
};

use crate::canvas::MapCanvas;
use crate::loader;

/// Shared handle to the map model. The model itself is not reactive;
/// `revision` bumps whenever the scene needs a repaint and `tooltip` mirrors
/// the model's tooltip for the DOM overlay.
#[derive(Clone, Copy)]
pub(crate) struct MapHandle {
    pub map: StoredValue<ChoroplethMap>,
    pub revision: RwSignal<u64>,
    pub tooltip: RwSignal<Tooltip>,
    pub load_state: RwSignal<LoadState>,
}

impl MapHandle {
    fn new(config: MapConfig) -> Self {
        Self {
            map: StoredValue::new(ChoroplethMap::new(config)),
            revision: RwSignal::new(0),
            tooltip: RwSignal::new(Tooltip::default()),
            load_state: RwSignal::new(LoadState::Loading),
        }
    }

    pub fn dispatch(&self, event: MapEvent) {
        let changes = self
            .map
            .try_update_value(|map| map.handle(event))
            .unwrap_or_default();
        self.publish(changes);
    }

    fn publish(&self, changes: Changes) {
        if changes.redraw {
            self.revision.update(|r| *r = r.wrapping_add(1));
        }
        if changes.tooltip
            && let Some(tooltip) = self.map.try_with_value(|map| map.tooltip().clone())
        {
            self.tooltip.set(tooltip);
        }
    }

    fn finish_load(&self, result: Result<MapData, LoadError>) {
        if let Err(ref e) = result {
            web_sys::console::warn_1(&format!("map data load failed: {e}").into());
        }
        let state = self
            .map
            .try_update_value(|map| map.apply_load(result).clone())
            .unwrap_or(LoadState::Loading);
        if state == LoadState::Ready {
            let count = self.map.with_value(|map| map.countries().len());
            web_sys::console::info_1(&format!("map ready: {count} countries").into());
        }
        self.load_state.set(state);
        self.publish(Changes {
            redraw: true,
            tooltip: false,
        });
    }

    pub fn config(&self) -> MapConfig {
        self.map.with_value(|map| map.config().clone())
    }
}

#[component]
pub fn App(config: MapConfig) -> impl IntoView {
    let data_config = config.data.clone();
    let (width, height) = (config.width, config.height);
    let handle = MapHandle::new(config);
    provide_context(handle);

    spawn_local(async move {
        let result = loader::load_map_data(&data_config).await;
        handle.finish_load(result);
    });

    // "0" resets pan and zoom. Lives as long as the page.
    let _ = window_event_listener(ev::keydown, move |e| {
        if e.key() == "0" {
            handle.dispatch(MapEvent::Reset);
        }
    });

    let status = move || match handle.load_state.get() {
        LoadState::Loading => Some("Loading map data\u{2026}"),
        LoadState::Failed(_) => Some("Map data unavailable"),
        LoadState::Ready => None,
    };

    view! {
        <div
            class="footprint-map"
            style:width=format!("{width}px")
            style:height=format!("{height}px")
            style="position: relative; margin: 0 auto;"
        >
            <MapCanvas />
            <ZoomButtons />
            {move || status().map(|text| view! {
                <div class="map-status" style="position: absolute; top: 12px; left: 15px; font: 12px sans-serif; color: #666;">
                    {text}
                </div>
            })}
        </div>
        <MapTooltip />
    }
}

/// Zoom-in / zoom-out buttons over the top-left of the map.
#[component]
fn ZoomButtons() -> impl IntoView {
    let handle: MapHandle = expect_context();
    let button_style = "position: absolute; left: 15px; width: 28px; height: 28px; font: bold 16px sans-serif; line-height: 1; background: #fff; border: 1px solid #aaa; border-radius: 3px; cursor: pointer;";

    view! {
        <button
            id="zoom_in"
            title="Zoom in"
            style=button_style
            style:top="180px"
            on:click=move |_| handle.dispatch(MapEvent::ZoomIn)
        >
            "+"
        </button>
        <button
            id="zoom_out"
            title="Zoom out"
            style=button_style
            style:top="215px"
            on:click=move |_| handle.dispatch(MapEvent::ZoomOut)
        >
            "\u{2013}"
        </button>
    }
}

/// Country tooltip. Opacity transitions are left to CSS; once a fade-out
/// completes the element is hidden.
#[component]
fn MapTooltip() -> impl IntoView {
    let handle: MapHandle = expect_context();
    let tooltip = handle.tooltip;
    let displayed = RwSignal::new(false);
    let hide_timeout = Rc::new(RefCell::new(None::<Timeout>));

    Effect::new(move || {
        let (visible, fade_ms) = tooltip.with(|t| (t.is_visible(), t.transition_ms));
        if let Some(timeout) = hide_timeout.borrow_mut().take() {
            timeout.cancel();
        }
        if visible {
            displayed.set(true);
        } else if displayed.get_untracked() {
            *hide_timeout.borrow_mut() = Some(Timeout::new(fade_ms, move || displayed.set(false)));
        }
    });

    view! {
        <div
            class="tooltip"
            style="position: absolute; pointer-events: none; padding: 4px 6px; font: 12px sans-serif; background: #fff; border: 1px solid #ccc; border-radius: 3px; white-space: nowrap;"
            style:visibility=move || if displayed.get() { "visible" } else { "hidden" }
            style:left=move || format!("{}px", tooltip.with(|t| t.left))
            style:top=move || format!("{}px", tooltip.with(|t| t.top))
            style:opacity=move || tooltip.with(|t| t.opacity).to_string()
            style:transition=move || format!("opacity {}ms", tooltip.with(|t| t.transition_ms))
        >
            {move || {
                tooltip
                    .get()
                    .lines
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| view! {
                        {(i > 0).then(|| view! { <br /> })}
                        {line}
                    })
                    .collect_view()
            }}
        </div>
    }
}
