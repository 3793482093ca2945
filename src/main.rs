//! Chaos Shooter entry point
//!
//! Browser: keyboard in, one tick and one render per animation frame, DOM
//! HUD out. Native: a seeded headless run driven by an autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent};

    use chaos_shooter::renderer::{CanvasSurface, render};
    use chaos_shooter::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use chaos_shooter::{HudSnapshot, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        surface: CanvasSurface,
        input: TickInput,
        tuning: Tuning,
        last_hud: Option<HudSnapshot>,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, surface: CanvasSurface) -> Self {
            Self {
                state: GameState::with_tuning(seed, tuning.clone()),
                surface,
                input: TickInput::default(),
                tuning,
                last_hud: None,
            }
        }

        fn update(&mut self) {
            tick(&mut self.state, &self.input);
            // Clear one-shot inputs after processing
            self.input.pause = false;

            for event in self.state.drain_events() {
                if let GameEvent::GameOver { score, chaos_level } = event {
                    log::info!("Game over: score {} at chaos level {}", score, chaos_level);
                }
            }
        }

        fn render(&mut self) {
            self.surface.begin_frame();
            render(&self.state, &mut self.surface);
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            let hud = HudSnapshot::capture(&self.state);
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }

            set_text(document, "score", &hud.score.to_string());
            set_text(document, "lives", &hud.lives.to_string());
            set_text(document, "chaos-level", &hud.chaos_level.to_string());
            set_text(document, "kills-to-next", &hud.kills_to_next.to_string());
            set_text(document, "weapon", &hud.weapon);
            set_text(document, "powerups", &hud.powerups);
            set_text(document, "shield", &format!("{}/{}", hud.shield, hud.max_shield));
            if let Some(bar) = document.get_element_by_id("shield-bar") {
                let _ = bar.set_attribute("style", &format!("width: {}%", hud.shield_percent()));
            }

            set_hidden(document, "pause-menu", !hud.paused);
            set_hidden(document, "game-over", !hud.game_over);
            if hud.game_over {
                set_text(document, "final-score", &hud.score.to_string());
                set_text(document, "final-chaos", &hud.chaos_level.to_string());
            }

            self.last_hud = Some(hud);
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.state = GameState::with_tuning(seed, self.tuning.clone());
            self.input = TickInput::default();
            self.last_hud = None;
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    /// Map a key to the input flag it holds; `None` for unbound keys
    fn key_flag<'a>(input: &'a mut TickInput, key: &str) -> Option<&'a mut bool> {
        Some(match key {
            "ArrowLeft" | "a" | "A" => &mut input.left,
            "ArrowRight" | "d" | "D" => &mut input.right,
            "ArrowUp" | "w" | "W" | " " => &mut input.jump,
            "y" | "Y" => &mut input.debug_spin,
            "p" | "P" => &mut input.debug_level_up,
            "o" | "O" => &mut input.debug_invincible,
            "i" | "I" => &mut input.debug_god_gun,
            "u" | "U" => &mut input.debug_big_boy,
            "t" | "T" => &mut input.debug_carrier,
            _ => return None,
        })
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Chaos Shooter starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let surface = CanvasSurface::new(canvas)?;
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, Tuning::load(), surface)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone())?;
        setup_restart_button(&document, game.clone())?;
        setup_auto_pause(&window, &document, game.clone())?;

        set_hidden(&document, "hud", false);

        request_animation_frame(game);

        log::info!("Chaos Shooter running!");
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key == "Escape" {
                    g.input.pause = true;
                } else if let Some(flag) = key_flag(&mut g.input, &key) {
                    *flag = true;
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if let Some(flag) = key_flag(&mut g.input, &event.key()) {
                    *flag = false;
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.update();
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                log::info!("Game restarted with seed: {}", seed);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serde::Serialize;

    use chaos_shooter::renderer::{VertexBatch, render};
    use chaos_shooter::sim::{GameEvent, GameState, TickInput, tick};
    use chaos_shooter::{HudSnapshot, Tuning};

    const DEFAULT_FRAMES: u64 = 3600;

    #[derive(Serialize)]
    struct RunSummary {
        seed: u64,
        frames: u64,
        hud: HudSnapshot,
        last_frame_triangles: usize,
        last_frame_bytes: usize,
        events: Vec<GameEvent>,
    }

    fn env_u64(name: &str) -> Option<u64> {
        let raw = std::env::var(name).ok()?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring {}={:?}: {}", name, raw, e);
                None
            }
        }
    }

    /// Strafe back and forth and hop every second
    fn autopilot(state: &GameState) -> TickInput {
        let phase = (state.frame / 120) % 2 == 0;
        TickInput {
            right: phase,
            left: !phase,
            jump: state.frame % 60 == 0 || state.player.in_lava,
            ..Default::default()
        }
    }

    pub fn run() {
        env_logger::init();

        let seed = env_u64("CHAOS_SEED").unwrap_or(0xC4A05);
        let max_frames = env_u64("CHAOS_FRAMES").unwrap_or(DEFAULT_FRAMES);
        let mut state = GameState::with_tuning(seed, Tuning::load());
        let mut batch = VertexBatch::new();
        let mut events = Vec::new();

        log::info!("Chaos Shooter (headless) running {} frames with seed {}", max_frames, seed);

        while state.frame < max_frames && !state.is_over() {
            let input = autopilot(&state);
            tick(&mut state, &input);
            events.extend(state.drain_events());

            batch.clear();
            render(&state, &mut batch);
        }

        let summary = RunSummary {
            seed,
            frames: state.frame,
            hud: HudSnapshot::capture(&state),
            last_frame_triangles: batch.triangle_count(),
            last_frame_bytes: batch.as_bytes().len(),
            events,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("failed to encode run summary: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}
