use std::cell::{Cell, RefCell};
use std::rc::Rc;

use night_sky::{Compositor, FrameDecision, FrameScheduler, Sky};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::canvas::CanvasSurface;

/// How long a `notifyScroll` ping keeps the sky frozen.
const SCROLL_SETTLE_MS: f64 = 150.0;

/// Everything one animation frame touches.
///
/// The sky is held as an `Option` so teardown can drop the last strong
/// reference even while a frame callback is still queued.
pub struct SkyRunner {
    sky: Option<Rc<RefCell<Sky>>>,
    compositor: Compositor,
    surface: CanvasSurface,
    scheduler: FrameScheduler,
    scrolling: bool,
    scroll_until_ms: f64,
}

impl SkyRunner {
    pub fn new(sky: Rc<RefCell<Sky>>, surface: CanvasSurface) -> Self {
        let scheduler = {
            let s = sky.borrow();
            FrameScheduler::new(s.settings().min_frame_interval(), s.config().max_step)
        };
        Self {
            sky: Some(sky),
            compositor: Compositor::new(),
            surface,
            scheduler,
            scrolling: false,
            scroll_until_ms: 0.0,
        }
    }

    pub fn set_scrolling(&mut self, active: bool) {
        self.scrolling = active;
    }

    pub fn notify_scroll(&mut self, now_ms: f64) {
        self.scroll_until_ms = now_ms + SCROLL_SETTLE_MS;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface.resize(width, height);
        if let Some(sky) = &self.sky {
            sky.borrow_mut().resize(width, height);
        }
        // Avoid one oversized step after the layout change.
        self.scheduler.reset();
    }

    /// Handle one refresh callback.
    pub fn tick(&mut self, now_ms: f64) {
        let Some(sky) = self.sky.clone() else {
            return;
        };
        let scrolling = self.scrolling || now_ms < self.scroll_until_ms;
        match self.scheduler.on_frame(now_ms, scrolling) {
            FrameDecision::Step { dt } => {
                // A trigger call may hold the sky; skip the frame rather than panic.
                let Ok(mut s) = sky.try_borrow_mut() else {
                    return;
                };
                s.step(dt);
                self.compositor.draw(&mut self.surface, &s);
            }
            FrameDecision::Skip | FrameDecision::Frozen => {}
        }
    }

    /// Drop the sky and free cached layers.
    pub fn teardown(&mut self) {
        self.compositor.release(&mut self.surface);
        self.sky = None;
    }
}

/// The single frame callback, shared with itself so it can re-queue.
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Self-rescheduling `requestAnimationFrame` loop with a stop flag.
///
/// One closure is allocated at start and re-queued every frame; `stop`
/// drops it, which breaks its reference to itself.
pub struct RenderLoop {
    runner: Rc<RefCell<SkyRunner>>,
    running: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl RenderLoop {
    pub fn start(runner: Rc<RefCell<SkyRunner>>) -> Self {
        let running = Rc::new(Cell::new(true));
        let pending = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let closure = {
            let (runner, running, pending, callback) =
                (runner.clone(), running.clone(), pending.clone(), callback.clone());
            Closure::wrap(Box::new(move |now: f64| {
                let again = frame(&running, &pending, || {
                    if let Ok(mut r) = runner.try_borrow_mut() {
                        r.tick(now);
                    }
                });
                if again {
                    if let Some(cb) = callback.borrow().as_ref() {
                        pending.set(request_animation_frame(cb));
                    }
                }
            }) as Box<dyn FnMut(f64)>)
        };
        pending.set(request_animation_frame(&closure));
        *callback.borrow_mut() = Some(closure);

        Self { runner, running, pending, callback }
    }

    pub fn runner(&self) -> &Rc<RefCell<SkyRunner>> {
        &self.runner
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Stop rescheduling, cancel the queued frame and free the callback.
    /// Idempotent.
    pub fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        // Nothing is queued any more, so the closure can go.
        if let Ok(mut cb) = self.callback.try_borrow_mut() {
            cb.take();
        }
        if let Ok(mut runner) = self.runner.try_borrow_mut() {
            runner.teardown();
        }
        log::info!("night sky stopped");
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_animation_frame(closure: &Closure<dyn FnMut(f64)>) -> Option<i32> {
    let window = web_sys::window()?;
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => Some(id),
        Err(e) => {
            log::error!("requestAnimationFrame failed: {:?}", e);
            None
        }
    }
}

/// Body of one frame callback. Returns whether to queue the next frame.
fn frame(running: &Cell<bool>, pending: &Cell<Option<i32>>, tick: impl FnOnce()) -> bool {
    pending.set(None);
    if !running.get() {
        return false;
    }
    tick();
    running.get()
}
