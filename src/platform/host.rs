//! Host integration (Telegram WebApp) and combined feedback
//!
//! The host object is looked up dynamically at `window.Telegram.WebApp`.
//! When it is absent every call is a silent no-op.

use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::audio::{AudioManager, SoundEffect};
use crate::feedback::{HapticNotifier, ImpactStrength};

const HEADER_COLOR: &str = "#0f172a";

fn web_app() -> Option<JsValue> {
    let window = web_sys::window()?;
    let telegram = Reflect::get(&window, &JsValue::from_str("Telegram")).ok()?;
    let app = Reflect::get(&telegram, &JsValue::from_str("WebApp")).ok()?;
    (!app.is_undefined() && !app.is_null()).then_some(app)
}

/// Call `target[name](...args)` if it is a function
fn call_method(target: &JsValue, name: &str, args: &[JsValue]) {
    let Ok(method) = Reflect::get(target, &JsValue::from_str(name)) else {
        return;
    };
    let Some(method) = method.dyn_ref::<Function>() else {
        return;
    };
    let result = match args {
        [] => method.call0(target),
        [a] => method.call1(target, a),
        [a, b, ..] => method.call2(target, a, b),
    };
    if let Err(e) = result {
        log::debug!("Host call {} failed: {:?}", name, e);
    }
}

/// Tell the host the game is ready and claim the full viewport
pub fn prepare_host() {
    let Some(app) = web_app() else {
        log::info!("No host integration found");
        return;
    };
    call_method(&app, "ready", &[]);
    call_method(&app, "expand", &[]);
    call_method(&app, "disableVerticalSwipes", &[]);
    call_method(&app, "setHeaderColor", &[JsValue::from_str(HEADER_COLOR)]);
    call_method(&app, "enableClosingConfirmation", &[]);
    log::info!("Host integration ready");
}

/// Haptics via the host when present, plus synthesized sound
pub struct HostFeedback {
    audio: Rc<AudioManager>,
}

impl HostFeedback {
    pub fn new(audio: Rc<AudioManager>) -> Self {
        Self { audio }
    }

    fn haptic(&self, method: &str, style: &str) {
        let Some(app) = web_app() else { return };
        let Ok(haptics) = Reflect::get(&app, &JsValue::from_str("HapticFeedback")) else {
            return;
        };
        if haptics.is_undefined() || haptics.is_null() {
            return;
        }
        call_method(&haptics, method, &[JsValue::from_str(style)]);
    }
}

impl HapticNotifier for HostFeedback {
    fn impact(&self, strength: ImpactStrength) {
        self.haptic("impactOccurred", strength.as_str());
        let effect = match strength {
            ImpactStrength::Light => SoundEffect::Collect,
            ImpactStrength::Medium | ImpactStrength::Heavy => SoundEffect::TurboCollect,
        };
        self.audio.play(effect);
    }

    fn success(&self) {
        self.haptic("notificationOccurred", "success");
        self.audio.play(SoundEffect::TurboActivate);
    }

    fn level_up(&self) {
        self.haptic("impactOccurred", ImpactStrength::Heavy.as_str());
        self.audio.play(SoundEffect::LevelUp);
    }
}
