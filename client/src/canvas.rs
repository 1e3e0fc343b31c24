use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, MouseEvent, TouchEvent, WheelEvent};

use footprint_shared::colors::hex_css;
use footprint_shared::legend::Legend;
use footprint_shared::scene::SceneNode;
use footprint_shared::{ChoroplethMap, MapEvent, PointerEvent, WheelInput};

use crate::app::MapHandle;
use crate::render_loop::RenderScheduler;

const LEGEND_FONT: &str = "12px sans-serif";
const LEGEND_TEXT_COLOR: &str = "#333333";
const FOOTER_FONT: &str = "11px sans-serif";
const FOOTER_COLOR: &str = "#777777";
const FOOTER_INSET_X: f64 = 15.0;
const FOOTER_INSET_Y: f64 = 12.0;

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|dpr| dpr.is_finite() && *dpr > 0.0)
        .unwrap_or(1.0)
}

/// Client coordinates to canvas-local CSS pixels.
fn to_local(canvas_ref: NodeRef<Canvas>, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    let canvas = canvas_ref.get_untracked()?;
    let rect = canvas.get_bounding_client_rect();
    Some((client_x - rect.left(), client_y - rect.top()))
}

fn map_pointer(canvas_ref: NodeRef<Canvas>, e: &MouseEvent) -> PointerEvent {
    let (x, y) = to_local(canvas_ref, e.client_x() as f64, e.client_y() as f64)
        .unwrap_or((e.offset_x() as f64, e.offset_y() as f64));
    PointerEvent {
        x,
        y,
        page_x: e.page_x() as f64,
        page_y: e.page_y() as f64,
    }
}

/// Distance and client-space midpoint of a two-finger touch.
fn pinch_geometry(e: &TouchEvent) -> Option<(f64, (f64, f64))> {
    let touches = e.touches();
    if touches.length() != 2 {
        return None;
    }
    let (t0, t1) = (touches.get(0)?, touches.get(1)?);
    let dx = (t1.client_x() - t0.client_x()) as f64;
    let dy = (t1.client_y() - t0.client_y()) as f64;
    let mid = (
        (t0.client_x() + t1.client_x()) as f64 / 2.0,
        (t0.client_y() + t1.client_y()) as f64 / 2.0,
    );
    Some(((dx * dx + dy * dy).sqrt(), mid))
}

#[component]
pub fn MapCanvas() -> impl IntoView {
    let handle: MapHandle = expect_context();
    let config = handle.config();
    let (width, height) = (config.width, config.height);

    let canvas_ref = NodeRef::<Canvas>::new();
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    // Cached 2D context, dropped whenever the backing store is resized
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let dpr = device_pixel_ratio();
        let pw = (width * dpr).round().max(1.0) as u32;
        let ph = (height * dpr).round().max(1.0) as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            *cached_ctx.borrow_mut() = None;
        }

        let mut ctx_cache = cached_ctx.borrow_mut();
        if ctx_cache.is_none() {
            *ctx_cache = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
        }
        let Some(ctx) = ctx_cache.as_ref() else {
            return;
        };
        let _ = handle.map.try_with_value(|map| draw_map(ctx, map, dpr));
    });
    let scheduler = Rc::new(scheduler);

    let sched = scheduler.clone();
    Effect::new(move || {
        handle.revision.track();
        let _ = canvas_ref.get();
        sched.mark_dirty();
    });

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let p = map_pointer(canvas_ref, &e);
        handle.dispatch(MapEvent::Wheel(WheelInput {
            delta_y: e.delta_y(),
            delta_mode: e.delta_mode(),
            x: p.x,
            y: p.y,
        }));
    };

    let on_pointer_down = move |e: web_sys::PointerEvent| {
        if e.button() != 0 {
            return;
        }
        if let Some(target) = e.target()
            && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
        {
            el.set_pointer_capture(e.pointer_id()).ok();
            el.style().set_property("cursor", "grabbing").ok();
        }
        handle.dispatch(MapEvent::PointerDown(map_pointer(canvas_ref, &e)));
    };

    let on_pointer_move = move |e: web_sys::PointerEvent| {
        handle.dispatch(MapEvent::PointerMove(map_pointer(canvas_ref, &e)));
    };

    let on_pointer_up = move |e: web_sys::PointerEvent| {
        if let Some(target) = e.target()
            && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
        {
            el.style().set_property("cursor", "grab").ok();
        }
        handle.dispatch(MapEvent::PointerUp);
    };

    let on_pointer_leave = move |_: web_sys::PointerEvent| {
        handle.dispatch(MapEvent::PointerLeave);
    };

    let on_dblclick = move |e: MouseEvent| {
        e.prevent_default();
        handle.dispatch(MapEvent::DoubleClick {
            pointer: map_pointer(canvas_ref, &e),
            shift: e.shift_key(),
        });
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: TouchEvent| {
            if let Some((dist, _)) = pinch_geometry(&e) {
                e.prevent_default();
                // A second finger turns the gesture into a pinch.
                handle.dispatch(MapEvent::PointerUp);
                pinch_dist.set(dist);
            }
        }
    };

    let on_touch_move = move |e: TouchEvent| {
        let Some((dist, (cx, cy))) = pinch_geometry(&e) else {
            return;
        };
        e.prevent_default();
        let old = pinch_dist.get();
        pinch_dist.set(dist);
        if old <= 0.0 || dist <= 0.0 {
            return;
        }
        let (x, y) = to_local(canvas_ref, cx, cy).unwrap_or((cx, cy));
        handle.dispatch(MapEvent::Pinch {
            factor: dist / old,
            x,
            y,
        });
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="display: block; touch-action: none; cursor: grab;"
            style:width=format!("{width}px")
            style:height=format!("{height}px")
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:dblclick=on_dblclick
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        />
    }
}

// --- Canvas 2D rendering ---

fn draw_map(ctx: &CanvasRenderingContext2d, map: &ChoroplethMap, dpr: f64) {
    let config = map.config();
    let (w, h) = (config.width, config.height);
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
    ctx.clear_rect(0.0, 0.0, w, h);

    // Zoomed group. Stroke widths are in map units and scale with it.
    let t = map.transform();
    ctx.save();
    ctx.transform(t.k, 0.0, 0.0, t.k, t.x, t.y).ok();
    ctx.set_fill_style_str(&config.style.background);
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.set_line_join("round");
    for node in map.scene().draw_order() {
        draw_node(ctx, node);
    }
    ctx.restore();

    draw_legend(ctx, &map.legend());
    draw_footer(ctx, &config.footer, w, h);
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &SceneNode) {
    ctx.begin_path();
    for polygon in &node.geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut coords = ring.coords();
            let Some(first) = coords.next() else {
                continue;
            };
            ctx.move_to(first.x, first.y);
            for c in coords {
                ctx.line_to(c.x, c.y);
            }
            ctx.close_path();
        }
    }
    ctx.set_fill_style_str(&node.style.fill);
    ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    if node.style.stroke_width > 0.0 {
        ctx.set_stroke_style_str(&node.style.stroke);
        ctx.set_line_width(node.style.stroke_width);
        ctx.stroke();
    }
}

fn draw_legend(ctx: &CanvasRenderingContext2d, legend: &Legend) {
    let (ox, oy) = legend.origin;
    ctx.save();
    ctx.translate(ox, oy).ok();
    for swatch in &legend.swatches {
        ctx.set_fill_style_str(&hex_css(swatch.color));
        ctx.fill_rect(swatch.x, swatch.y, swatch.size, swatch.size);
    }
    ctx.set_font(LEGEND_FONT);
    ctx.set_text_align("start");
    ctx.set_fill_style_str(LEGEND_TEXT_COLOR);
    for label in &legend.labels {
        ctx.fill_text(&label.text, label.x, label.y).ok();
    }
    ctx.restore();
}

fn draw_footer(ctx: &CanvasRenderingContext2d, text: &str, w: f64, h: f64) {
    ctx.set_font(FOOTER_FONT);
    ctx.set_text_align("end");
    ctx.set_fill_style_str(FOOTER_COLOR);
    ctx.fill_text(text, w - FOOTER_INSET_X, h - FOOTER_INSET_Y).ok();
}
