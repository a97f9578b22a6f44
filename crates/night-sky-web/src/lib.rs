//! Browser bindings for the night-sky engine.
//!
//! `NightSky` mounts a sky on a canvas, probes the device once for a
//! quality tier and drives the simulation from `requestAnimationFrame`.
//! Several instances can live on one page.

pub mod canvas;
pub mod probe;
pub mod runner;

use std::cell::RefCell;
use std::rc::Rc;

use night_sky::{Sky, SkyConfig, SkyController};
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, Window};

use crate::canvas::CanvasSurface;
use crate::runner::{RenderLoop, SkyRunner};

/// Styles applied when the config asks for a pinned background canvas.
const FIXED_STYLE: [(&str, &str); 7] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("z-index", "-1"),
    ("pointer-events", "none"),
];

fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails harmlessly when a second instance mounts.
    let _ = console_log::init_with_level(log::Level::Info);
}

fn host() -> Result<(Window, Document), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    Ok((window, document))
}

fn parse_config(json: Option<String>) -> SkyConfig {
    match json.as_deref() {
        None | Some("") => SkyConfig::default(),
        Some(text) => SkyConfig::from_json(text).unwrap_or_else(|e| {
            log::warn!("invalid sky config ({}), using defaults", e);
            SkyConfig::default()
        }),
    }
}

/// Backing-store size for a canvas whose layout box is `layout`. Keeps
/// `current` only when layout is unknown or empty.
fn backing_size(current: (u32, u32), layout: Option<(f64, f64)>) -> (u32, u32) {
    match layout {
        Some((w, h)) if w.is_finite() && h.is_finite() && w >= 1.0 && h >= 1.0 => {
            (w.round() as u32, h.round() as u32)
        }
        _ => (current.0.max(1), current.1.max(1)),
    }
}

/// Size the backing store to what the canvas covers on screen. A pinned
/// canvas covers the viewport; otherwise its own layout box.
fn fit_canvas(canvas: &HtmlCanvasElement, window: &Window, pinned: bool) -> (f32, f32) {
    let layout = if pinned {
        match (window.inner_width(), window.inner_height()) {
            (Ok(w), Ok(h)) => w.as_f64().zip(h.as_f64()),
            _ => None,
        }
    } else {
        Some((canvas.client_width() as f64, canvas.client_height() as f64))
    };
    let (width, height) = backing_size((canvas.width(), canvas.height()), layout);
    if (width, height) != (canvas.width(), canvas.height()) {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    (width as f32, height as f32)
}

fn pin_behind_page(canvas: &HtmlCanvasElement) {
    let style = canvas.style();
    for (name, value) in FIXED_STYLE {
        if let Err(e) = style.set_property(name, value) {
            log::warn!("could not set {}: {:?}", name, e);
        }
    }
}

/// One animated sky bound to a canvas.
#[wasm_bindgen]
pub struct NightSky {
    canvas: HtmlCanvasElement,
    controller: SkyController,
    render_loop: RenderLoop,
}

#[wasm_bindgen]
impl NightSky {
    /// Mount on `canvas`. `config` is an optional JSON `SkyConfig`; invalid
    /// JSON falls back to defaults. Fails only without a 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> Result<NightSky, JsValue> {
        init_logging();
        let (window, document) = host()?;

        let mut config = parse_config(config);
        if config.seed.is_none() {
            config.seed = Some((js_sys::Math::random() * 9.007_199_254_740_991e15) as u64);
        }
        if config.fixed_position {
            pin_behind_page(&canvas);
        }

        let ctx: web_sys::CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        let (width, height) = fit_canvas(&canvas, &window, config.fixed_position);

        let outcome = probe::run(&window, &document);
        let sky = Rc::new(RefCell::new(Sky::new(outcome.tier, config, width, height)));
        let controller = SkyController::new(&sky);

        let surface = CanvasSurface::new(document, ctx, width, height);
        let runner = Rc::new(RefCell::new(SkyRunner::new(sky, surface)));
        let render_loop = RenderLoop::start(runner);

        Ok(NightSky { canvas, controller, render_loop })
    }

    /// Fire the explosion now. Returns false once the sky is gone.
    #[wasm_bindgen(js_name = triggerExplosion)]
    pub fn trigger_explosion(&self) -> bool {
        self.controller.trigger_explosion()
    }

    /// Queue a meteor shower. `pattern` is one of `single`, `parallel`,
    /// `radial`, `v-formation`, `cluster` or `random`; anything else means
    /// `random`. Returns the number of meteors queued.
    #[wasm_bindgen(js_name = triggerShower)]
    pub fn trigger_shower(&self, pattern: Option<String>) -> Option<u32> {
        self.controller
            .trigger_shower_named(pattern.as_deref())
            .map(|n| n as u32)
    }

    /// The tier picked at mount time, or `"stopped"` after `destroy`.
    pub fn tier(&self) -> String {
        self.controller
            .tier()
            .map(|t| t.as_str())
            .unwrap_or("stopped")
            .to_string()
    }

    /// Resize the canvas backing store and regenerate the scene.
    pub fn resize(&self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        if let Ok(mut runner) = self.render_loop.runner().try_borrow_mut() {
            runner.resize(width as f32, height as f32);
        }
    }

    /// Freeze animation while the host is scrolling.
    #[wasm_bindgen(js_name = setScrolling)]
    pub fn set_scrolling(&self, active: bool) {
        if let Ok(mut runner) = self.render_loop.runner().try_borrow_mut() {
            runner.set_scrolling(active);
        }
    }

    /// Freeze briefly; call from a scroll listener.
    #[wasm_bindgen(js_name = notifyScroll)]
    pub fn notify_scroll(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Ok(mut runner) = self.render_loop.runner().try_borrow_mut() {
            runner.notify_scroll(probe::now_ms(&window));
        }
    }

    /// True until `destroy`, or until the sky was dropped some other way.
    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.render_loop.is_running() && self.controller.is_attached()
    }

    /// Stop the loop and release the sky. Later calls are no-ops.
    pub fn destroy(&self) {
        self.render_loop.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_bad_config_uses_defaults() {
        assert_eq!(parse_config(None), SkyConfig::default());
        assert_eq!(parse_config(Some(String::new())), SkyConfig::default());
        assert_eq!(parse_config(Some("{not json".into())), SkyConfig::default());
    }

    #[test]
    fn backing_store_follows_layout() {
        // Default 300x150 store on a full-viewport canvas.
        assert_eq!(backing_size((300, 150), Some((1920.0, 1080.0))), (1920, 1080));
        assert_eq!(backing_size((300, 150), Some((1279.6, 719.4))), (1280, 719));
    }

    #[test]
    fn backing_store_kept_without_layout() {
        assert_eq!(backing_size((300, 150), None), (300, 150));
        assert_eq!(backing_size((300, 150), Some((0.0, 0.0))), (300, 150));
        assert_eq!(backing_size((0, 0), Some((f64::NAN, 10.0))), (1, 1));
    }

    #[test]
    fn config_json_is_applied() {
        let config = parse_config(Some(r#"{"fixedPosition": false, "starCount": 120}"#.into()));
        assert!(!config.fixed_position);
        assert_eq!(config.star_count, Some(120));
    }
}
