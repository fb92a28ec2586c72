// web.rs - Browser entry point
//
// JS owns the DOM side: measuring text rectangles, creating and positioning
// one canvas per rectangle, and running requestAnimationFrame. Each frame it
// calls `frame(now)` and keeps the loop going while that returns true.
//
//   const span = new SpoilerSpan(JSON.stringify({ density: 8 }));
//   span.layout(canvases, sizes);          // sizes = [w0, h0, w1, h1, ...]
//   const loop = t => { if (span.frame(t)) requestAnimationFrame(loop); };
//   requestAnimationFrame(loop);
//   el.onclick = () => span.activate(performance.now());

use std::collections::VecDeque;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::SpoilerConfig;
use crate::error::Error;
use crate::render::Surface;
use crate::reveal::{QueuedHost, Region, RevealController, RevealEvent, TimerToken, is_activation_key};

impl Surface for CanvasRenderingContext2d {
    fn clear(&mut self, width: f32, height: f32) {
        self.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn set_fill_color(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        self.set_global_alpha(alpha as f64);
        CanvasRenderingContext2d::fill_rect(self, x as f64, y as f64, w as f64, h as f64);
    }

    fn reset_alpha(&mut self) {
        self.set_global_alpha(1.0);
    }
}

fn context_2d(value: JsValue) -> Result<CanvasRenderingContext2d, String> {
    let canvas: HtmlCanvasElement = value
        .dyn_into()
        .map_err(|_| "not a canvas element".to_string())?;
    canvas
        .get_context("2d")
        .map_err(|e| format!("{e:?}"))?
        .ok_or_else(|| "2d context unavailable".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "unexpected context type".to_string())
}

#[wasm_bindgen]
pub struct SpoilerSpan {
    controller: RevealController<CanvasRenderingContext2d, QueuedHost>,
    // Stop-spawn timers with their due time
    timers: Vec<(TimerToken, f64)>,
    events: VecDeque<RevealEvent>,
}

#[wasm_bindgen]
impl SpoilerSpan {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<SpoilerSpan, JsError> {
        console_error_panic_hook::set_once();
        let config = SpoilerConfig::from_json(config_json)?;
        Ok(Self {
            controller: RevealController::new(config, QueuedHost::new())?,
            timers: Vec::new(),
            events: VecDeque::new(),
        })
    }

    /// Rebuild fields for freshly measured rectangles. `sizes` holds
    /// width/height pairs in canvas-local units, one pair per canvas.
    pub fn layout(&mut self, canvases: js_sys::Array, sizes: &[f32]) {
        let regions = canvases.iter().enumerate().map(|(i, value)| {
            let (w, h) = match sizes.get(2 * i..2 * i + 2) {
                Some(&[w, h]) => (w, h),
                _ => {
                    return Err(Error::SurfaceUnavailable {
                        region: i,
                        reason: "missing size".to_string(),
                    });
                }
            };
            let ctx = context_2d(value)
                .map_err(|reason| Error::SurfaceUnavailable { region: i, reason })?;
            Ok(Region::new(ctx, w, h))
        });
        self.controller.set_regions(regions);
    }

    pub fn resize_region(&mut self, index: usize, width: f32, height: f32) -> bool {
        self.controller.resize_region(index, width, height)
    }

    pub fn activate(&mut self, now: f64) {
        self.controller.activate();
        self.collect(now);
    }

    /// Keyboard activation; returns true when the key was consumed
    pub fn handle_key(&mut self, key: &str, now: f64) -> bool {
        if is_activation_key(key) {
            self.activate(now);
            true
        } else {
            false
        }
    }

    /// Run one animation frame. Returns false once the effect is inert.
    pub fn frame(&mut self, now: f64) -> bool {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|&(_, at)| at <= now);
        self.timers = pending;
        for (token, _) in due {
            self.controller.on_timer(token);
        }

        if let Some(token) = self.controller.host_mut().take_tick() {
            self.controller.on_tick(token, now);
        }
        self.collect(now);

        !self.controller.is_revealed() && !self.controller.is_disposed()
    }

    /// Next signal for the page: "revealing" or "revealed"
    pub fn take_event(&mut self) -> Option<String> {
        self.events.pop_front().map(|e| e.to_string())
    }

    pub fn reveal_duration_ms(&self) -> f64 {
        self.controller.config().reveal.reveal_duration_ms
    }

    pub fn state(&self) -> String {
        self.controller.state().to_string()
    }

    pub fn region_count(&self) -> usize {
        self.controller.region_count()
    }

    pub fn max_remaining_lifetime(&self) -> f32 {
        self.controller.max_remaining_lifetime()
    }

    pub fn dispose(&mut self) {
        self.controller.dispose();
        self.timers.clear();
    }

    fn collect(&mut self, now: f64) {
        let host = self.controller.host_mut();
        for t in host.take_timers() {
            self.timers.push((t.token, now + t.delay_ms));
        }
        self.events.extend(host.drain_events());
    }
}
