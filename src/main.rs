//! Pixel Vacuum entry point
//!
//! Browser: canvas + WebGPU game loop. Native: headless autopilot that plays
//! the simulation and logs progress.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use pixel_vacuum::audio::AudioManager;
    use pixel_vacuum::consts::TURBO_TICK_MS;
    use pixel_vacuum::feedback::{LocalPhrases, PhraseSource};
    use pixel_vacuum::platform::{HostFeedback, LocalStore, RemotePhrases, prepare_host};
    use pixel_vacuum::renderer::{RenderState, build_frame};
    use pixel_vacuum::sim::{PointerPhase, UpgradeKind, Viewport};
    use pixel_vacuum::{Session, Tuning};

    /// Power dial change per key press
    const DIAL_STEP: f32 = 0.1;

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        phrases: Rc<dyn PhraseSource>,
        audio: Rc<AudioManager>,
        /// Last text written to each HUD element, to skip redundant DOM writes
        hud_cache: Vec<(&'static str, String)>,
    }

    impl Game {
        fn render(&mut self, time: f64) {
            let frame = build_frame(&self.session.state, time);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size, render_state.logical_size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn set_hud(&mut self, id: &'static str, text: String) {
            match self.hud_cache.iter_mut().find(|(key, _)| *key == id) {
                Some((_, cached)) if *cached == text => return,
                Some((_, cached)) => *cached = text.clone(),
                None => self.hud_cache.push((id, text.clone())),
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id(id) {
                el.set_text_content(Some(&text));
            }
        }

        /// Update the optional DOM HUD (elements that are missing are skipped)
        fn update_hud(&mut self) {
            let state = &self.session.state;
            let level = state.progress.level.to_string();
            let coins = state.progress.coins.to_string();
            let score = format!("{} / {}", state.score, state.total_for_level);
            let power_cost = state.upgrade_cost(UpgradeKind::Power).to_string();
            let size_cost = if state.is_size_maxed() {
                "MAX".to_string()
            } else {
                state.upgrade_cost(UpgradeKind::Size).to_string()
            };
            let turbo = if state.is_turbo() {
                format!("{:.1}s", state.turbo.time_left)
            } else {
                state.progress.turbo_cost.to_string()
            };
            let dial = format!("x{:.1}", state.power_dial);
            let announcement = if state.announcement.show {
                format!("LEVEL {}", state.announcement.level)
            } else {
                String::new()
            };
            let message = self.session.message().to_string();

            self.set_hud("hud-level", level);
            self.set_hud("hud-coins", coins);
            self.set_hud("hud-score", score);
            self.set_hud("hud-power-cost", power_cost);
            self.set_hud("hud-size-cost", size_cost);
            self.set_hud("hud-turbo", turbo);
            self.set_hud("hud-dial", dial);
            self.set_hud("announcement", announcement);
            self.set_hud("motivation", message);
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Canvas size in CSS pixels and physical pixels
    fn canvas_sizes(canvas: &HtmlCanvasElement) -> ((f32, f32), (u32, u32)) {
        let window = web_sys::window().expect("no window");
        let dpr = window.device_pixel_ratio();
        let mut css_w = canvas.client_width() as f64;
        let mut css_h = canvas.client_height() as f64;
        if css_w <= 0.0 || css_h <= 0.0 {
            css_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
            css_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        }
        let physical = (
            ((css_w * dpr) as u32).max(1),
            ((css_h * dpr) as u32).max(1),
        );
        ((css_w as f32, css_h as f32), physical)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pixel Vacuum starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let ((css_w, css_h), (width, height)) = canvas_sizes(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        prepare_host();

        let tuning = Tuning::load();
        let phrases: Rc<dyn PhraseSource> = match canvas.get_attribute("data-phrase-endpoint") {
            Some(endpoint) if !endpoint.is_empty() => {
                log::info!("Using remote phrases from {}", endpoint);
                Rc::new(RemotePhrases::new(endpoint, tuning.phrase_timeout_millis()))
            }
            _ => Rc::new(LocalPhrases),
        };

        let seed = js_sys::Date::now() as u64;
        let audio = Rc::new(AudioManager::new());
        let session = Session::start(
            tuning,
            Box::new(LocalStore),
            Box::new(HostFeedback::new(audio.clone())),
            Viewport::new(css_w, css_h),
            seed,
            now(),
        );
        log::info!("Session started with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state: None,
            phrases,
            audio,
            hud_cache: Vec::new(),
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, (width, height), (css_w, css_h))
            .await
            .expect("Failed to create device");
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_resize(canvas, game.clone());
        setup_turbo_timer(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Pixel Vacuum running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        for event_type in [
            "pointerdown",
            "pointermove",
            "pointerup",
            "pointerleave",
            "pointercancel",
        ] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let Some(phase) = PointerPhase::from_event_type(&event.type_()) else {
                    return;
                };
                let mut g = game.borrow_mut();
                if phase == PointerPhase::Down {
                    g.audio.resume();
                }
                g.session
                    .pointer(phase, event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard stand-ins for the shop buttons
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                match event.key().as_str() {
                    "1" => {
                        g.session.purchase_upgrade(UpgradeKind::Power);
                    }
                    "2" => {
                        g.session.purchase_upgrade(UpgradeKind::Size);
                    }
                    "t" | "T" => {
                        g.session.activate_turbo();
                    }
                    "r" | "R" => g.session.force_reset(now()),
                    "[" => {
                        let dial = g.session.state.power_dial - DIAL_STEP;
                        g.session.set_power_dial(dial);
                    }
                    "]" => {
                        let dial = g.session.state.power_dial + DIAL_STEP;
                        g.session.set_power_dial(dial);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let ((css_w, css_h), (width, height)) = canvas_sizes(&canvas);
            canvas.set_width(width);
            canvas.set_height(height);

            let mut g = game.borrow_mut();
            g.session.resize(css_w, css_h);
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize((width, height), (css_w, css_h));
            }
            log::debug!("Resized to {}x{}", css_w, css_h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_turbo_timer(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().session.turbo_countdown();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TURBO_TICK_MS as i32,
        );
        closure.forget();
    }

    /// Start a fetch for each milestone; results land on a later frame
    fn spawn_phrase_requests(game: &Rc<RefCell<Game>>) {
        let (requests, phrases) = {
            let mut g = game.borrow_mut();
            (g.session.take_phrase_requests(), g.phrases.clone())
        };
        for milestone in requests {
            let future = phrases.phrase_for(milestone);
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = future.await;
                game.borrow_mut().session.deliver_phrase(result);
            });
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.session.frame(time);
            g.render(time);
            g.update_hud();
        }
        spawn_phrase_requests(&game);

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use std::task::{Context, Poll, Waker};

    use glam::Vec2;
    use pixel_vacuum::consts::{FRAME_MS, TURBO_TICK_MS};
    use pixel_vacuum::FeedbackError;
    use pixel_vacuum::feedback::{LocalPhrases, NoopHaptics, PhraseFuture, PhraseSource};
    use pixel_vacuum::persistence::MemoryStore;
    use pixel_vacuum::sim::{PointerPhase, UpgradeKind, Viewport};
    use pixel_vacuum::{Session, Tuning};

    /// Field travel per frame while chasing pixels
    const CHASE_SPEED: f32 = 14.0;
    /// Give up after this many simulated frames
    const MAX_FRAMES: u64 = 600_000;

    /// Play until `target_level` is reached
    pub fn run(target_level: u32, seed: u64) {
        let viewport = Viewport::new(800.0, 600.0);
        let mut session = Session::start(
            Tuning::load(),
            Box::new(MemoryStore::new()),
            Box::new(NoopHaptics),
            viewport,
            seed,
            0.0,
        );
        let mut cursor = viewport.center();
        let mut now = 0.0;
        let mut next_turbo_tick = TURBO_TICK_MS as f64;
        let mut level = session.state.progress.level;

        for frame in 0..MAX_FRAMES {
            if level >= target_level {
                break;
            }

            if let Some(target) = nearest_pixel(&session, cursor) {
                let delta = target - cursor;
                cursor += delta.clamp_length_max(CHASE_SPEED);
            }
            session.pointer(PointerPhase::Move, cursor.x, cursor.y);

            now += FRAME_MS;
            session.frame(now);
            while now >= next_turbo_tick {
                session.turbo_countdown();
                next_turbo_tick += TURBO_TICK_MS as f64;
            }

            for milestone in session.take_phrase_requests() {
                let result = resolve_now(LocalPhrases.phrase_for(milestone));
                session.deliver_phrase(result);
                log::info!("{} pixels: {}", milestone, session.message());
            }

            spend_coins(&mut session);

            if session.state.progress.level != level {
                level = session.state.progress.level;
                log::info!(
                    "Reached level {} after {} frames ({} coins, power {}, size {})",
                    level,
                    frame + 1,
                    session.state.progress.coins,
                    session.state.progress.upgrades.power,
                    session.state.progress.upgrades.size,
                );
            }
        }

        log::info!(
            "Autopilot finished at level {} with {} pixels collected",
            session.state.progress.level,
            session.lifetime_collected()
        );
    }

    fn nearest_pixel(session: &Session, from: Vec2) -> Option<Vec2> {
        session
            .state
            .pixels
            .iter()
            .map(|p| p.pos)
            .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    }

    /// Buy whatever is affordable, cheapest first
    fn spend_coins(session: &mut Session) {
        loop {
            let state = &session.state;
            let size_cost = (!state.is_size_maxed()).then(|| state.upgrade_cost(UpgradeKind::Size));
            let power_cost = state.upgrade_cost(UpgradeKind::Power);
            let kind = match size_cost {
                Some(size_cost) if size_cost <= power_cost => UpgradeKind::Size,
                _ => UpgradeKind::Power,
            };
            if !session.purchase_upgrade(kind) {
                break;
            }
        }
        if session.state.pixels.len() > 40 {
            session.activate_turbo();
        }
    }

    /// Local phrases resolve on the first poll
    fn resolve_now(mut future: PhraseFuture) -> Result<String, FeedbackError> {
        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(result) => result,
            Poll::Pending => Err(FeedbackError::Timeout),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pixel Vacuum (native autopilot) starting...");
    log::info!("The playable game is the web build - run with `trunk serve`");

    let target_level = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(5);
    let seed = std::env::args()
        .nth(2)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    autopilot::run(target_level, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
