use night_sky::{CapabilityProbe, HardwareHints, ProbeOutcome};
use wasm_bindgen::JsValue;
use web_sys::{Document, Window};

use crate::canvas::{offscreen_context, CanvasSurface};

const PROBE_WIDTH: u32 = 192;
const PROBE_HEIGHT: u32 = 160;

/// Read coarse hardware hints from the navigator and media queries.
pub fn hardware_hints(window: &Window) -> HardwareHints {
    let navigator = window.navigator();
    let cores = navigator.hardware_concurrency();
    // Not in every browser, and not in web-sys.
    let memory = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64());
    let reduced_motion = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false);

    HardwareHints {
        hardware_concurrency: (cores.is_finite() && cores > 0.0).then_some(cores as u32),
        device_memory_gb: memory.map(|gb| gb as f32),
        reduced_motion,
    }
}

/// Monotonic milliseconds, falling back to wall time.
pub fn now_ms(window: &Window) -> f64 {
    match window.performance() {
        Some(perf) => perf.now(),
        None => js_sys::Date::now(),
    }
}

/// Benchmark gradient fills on a throwaway canvas and pick a tier.
pub fn run(window: &Window, document: &Document) -> ProbeOutcome {
    let probe = CapabilityProbe::new(hardware_hints(window));
    let mut surface = match offscreen_context(document, PROBE_WIDTH, PROBE_HEIGHT) {
        Ok((_canvas, ctx)) => Some(CanvasSurface::new(
            document.clone(),
            ctx,
            PROBE_WIDTH as f32,
            PROBE_HEIGHT as f32,
        )),
        Err(e) => {
            log::warn!("probe canvas unavailable: {:?}", e);
            None
        }
    };
    probe.run(surface.as_mut(), || now_ms(window))
}
