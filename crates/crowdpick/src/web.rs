//! Browser binding: one `Picker` handle driven by `requestAnimationFrame`.

use crowdpick_core::{Advance, Orchestrator, Participant, PhotoRef, SessionConfig, Stage};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages in the browser console
    console_error_panic_hook::set_once();

    // A second init (e.g. hot reload) keeps the existing logger
    console_log::init_with_level(log::Level::Info).ok();

    log::info!("crowdpick WASM module initialized");
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct Picker {
    stage: Stage,
}

#[wasm_bindgen]
impl Picker {
    /// `config` may be `undefined` for the defaults, or a partial session table.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, config: JsValue) -> Result<Picker, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let session = Orchestrator::new(config, u64::from(seed)).map_err(js_error)?;
        Ok(Picker {
            stage: Stage::new(session),
        })
    }

    /// Replace the crowd with a list of `{ name, photo?, visible? }`.
    pub fn set_roster(&mut self, roster: JsValue) -> Result<(), JsValue> {
        let participants: Vec<Participant> = serde_wasm_bindgen::from_value(roster)?;
        self.stage.session.rebuild_roster(participants);
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: String) -> Result<(), JsValue> {
        self.stage.session.rename(index, name).map_err(js_error)
    }

    /// Swap (or clear) a photo. A photo that later fails to load needs no call.
    pub fn set_photo(&mut self, index: usize, photo: Option<String>) -> Result<(), JsValue> {
        self.stage
            .session
            .set_photo(index, photo.map(PhotoRef))
            .map_err(js_error)
    }

    /// The single trigger. Returns `"started"`, `"dismissed"` or `"ignored"`.
    pub fn advance(&mut self) -> String {
        match self.stage.advance() {
            Advance::Started { .. } => "started",
            Advance::Dismissed { .. } => "dismissed",
            Advance::Ignored => "ignored",
        }
        .to_owned()
    }

    pub fn reset(&mut self) {
        self.stage.session.reset();
    }

    /// Call when the page is hidden so the next frame does not see a huge gap.
    pub fn pause(&mut self) {
        self.stage.pause();
    }

    pub fn phase(&self) -> String {
        self.stage.session.phase().to_string()
    }

    /// Step to `timestamp_ms` (a `requestAnimationFrame` timestamp) and return
    /// agent transforms plus overlay state.
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<JsValue, JsValue> {
        let snapshot = self.stage.frame(timestamp_ms / 1000.0);
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }
}
