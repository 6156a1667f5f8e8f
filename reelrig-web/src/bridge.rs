//! `wasm-bindgen` surface consumed by the browser front end.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::game::{InitRequest, MachineController, StripRequest};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn entropy_seed() -> u64 {
    let now = js_sys::Date::now();
    let noise = js_sys::Math::random();
    // Both values are finite; the float-to-int casts saturate.
    (now as u64).rotate_left(21) ^ ((noise * 9_007_199_254_740_992.0) as u64)
}

#[wasm_bindgen]
pub struct WebMachine {
    controller: MachineController,
}

#[wasm_bindgen]
impl WebMachine {
    /// Create a machine from the embedded assets; without a seed one is drawn
    /// from the clock and `Math.random`.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(seed: Option<f64>) -> Self {
        let seed = seed
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map_or_else(entropy_seed, |value| value as u64);
        log::info!("slot machine seeded with {seed}");
        Self {
            controller: MachineController::from_assets(seed),
        }
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn seed(&self) -> f64 {
        self.controller.session().seed() as f64
    }

    /// Advance by one animation frame.
    ///
    /// # Errors
    ///
    /// Returns a JS error if the frame report cannot be converted.
    pub fn frame(&mut self, elapsed_ms: f64) -> Result<JsValue, JsValue> {
        to_js(&self.controller.advance(elapsed_ms))
    }

    /// Press the action button.
    ///
    /// # Errors
    ///
    /// Returns a JS error if the outcome cannot be converted.
    pub fn action(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.action())
    }

    /// Press the exit button.
    ///
    /// # Errors
    ///
    /// Returns a JS error if the outcome cannot be converted.
    pub fn exit(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.exit())
    }

    #[wasm_bindgen(js_name = toggleCard)]
    pub fn toggle_card(&mut self, index: u32) -> bool {
        self.controller.toggle_card(index as usize)
    }

    /// # Errors
    ///
    /// Returns a JS error if the events cannot be converted.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.drain_events())
    }

    /// # Errors
    ///
    /// Returns a JS error if the snapshot cannot be converted.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.snapshot())
    }

    /// Local stand-in for the `init-game` endpoint.
    ///
    /// # Errors
    ///
    /// Returns a JS error if the response cannot be converted.
    #[wasm_bindgen(js_name = initGame)]
    pub fn init_game(&self, query: &str) -> Result<JsValue, JsValue> {
        let request = InitRequest::from_query(query);
        to_js(&self.controller.session().serve_init(&request))
    }

    /// Local stand-in for the `generate-reel` endpoint.
    ///
    /// # Errors
    ///
    /// Returns a JS error if the response cannot be converted.
    #[wasm_bindgen(js_name = generateReel)]
    pub fn generate_reel(&self, query: &str) -> Result<JsValue, JsValue> {
        let request = StripRequest::from_query(query);
        to_js(&self.controller.session().serve_strip(&request))
    }
}
