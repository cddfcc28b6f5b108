//! Browser bindings
//!
//! The page owns the canvas and the animation frame loop; it forwards
//! pointer events and frame deltas here and draws from `scene_json`.

use wasm_bindgen::prelude::*;

use super::{Clock, Session};
use crate::config::Config;

/// `Date.now()` in milliseconds
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Cloud Hopper starting...");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Game handle exported to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Session<BrowserClock>,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a run. An empty `config_json` uses the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, config_json: &str) -> Result<WebGame, JsValue> {
        let config = if config_json.trim().is_empty() {
            Config::default()
        } else {
            Config::from_json(config_json).map_err(to_js)?
        };
        let session = Session::new(seed, config, BrowserClock).map_err(to_js)?;
        Ok(Self { session })
    }

    /// Advance by `dt` seconds of real time; returns ticks run
    pub fn frame(&mut self, dt: f64) -> Result<u32, JsValue> {
        self.session.advance(dt).map_err(|err| {
            log::error!("Simulation halted: {}", err);
            to_js(err)
        })
    }

    pub fn on_press(&mut self) {
        self.session.press();
    }

    pub fn on_release(&mut self, x: f64, y: f64) {
        self.session.release(x, y);
    }

    pub fn on_move(&mut self, x: f64, y: f64) {
        self.session.pointer_moved(x, y);
    }

    pub fn restart(&mut self) -> Result<(), JsValue> {
        let seed = js_sys::Date::now() as u64;
        self.session.restart(seed).map_err(to_js)
    }

    /// Current frame as JSON
    pub fn scene_json(&self) -> Result<String, JsValue> {
        let scene = self.session.scene().map_err(to_js)?;
        serde_json::to_string(&scene).map_err(to_js)
    }

    pub fn score(&self) -> u64 {
        self.session.score()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }
}
