//! Gut Runner entry point
//!
//! Natively this runs a headless autopilot session and prints the result.
//! In the browser it drives the game loop on a 2D canvas.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use gut_runner::consts::*;
    use gut_runner::lane_center_x;
    use gut_runner::persistence::SaveManager;
    use gut_runner::platform::{LocalStorage, MemoryStorage, Storage, SwipeDetector, intent_for_key};
    use gut_runner::run::RunController;
    use gut_runner::sim::{EntityKind, Food, GameEvent, ObstacleKind, PowerUpKind, STAGES};
    use gut_runner::track::{half_extents, player_box};
    use gut_runner::{Settings, Tuning, shop};

    type Controller = RunController<SaveManager<Box<dyn Storage>>, Vec<GameEvent>>;

    /// How long mission toasts stay up (ms)
    const TOAST_MS: f64 = 2500.0;

    struct Game {
        ctl: Controller,
        settings: Settings,
        swipe: SwipeDetector,
        ctx: CanvasRenderingContext2d,
        /// Canvas pixels per field unit
        scale: f64,
        last_time: f64,
        paused: bool,
        food: Food,
        /// Mission toast text and the time it expires
        toast: Option<(String, f64)>,
        /// Camera shake remaining (ms)
        shake_ms: f32,
    }

    impl Game {
        fn new(storage: Box<dyn Storage>, ctx: CanvasRenderingContext2d, scale: f64, seed: u64) -> Self {
            let settings = Settings::load(&storage);
            let save = SaveManager::open(storage);
            let food = Food::default();
            Self {
                ctl: RunController::new(save, Vec::new(), seed, food, Tuning::default()),
                swipe: settings.swipe_detector(),
                settings,
                ctx,
                scale,
                last_time: 0.0,
                paused: false,
                food,
                toast: None,
                shake_ms: 0.0,
            }
        }

        fn update(&mut self, dt_ms: f32, time: f64) {
            if self.paused {
                return;
            }
            self.ctl.advance(dt_ms);
            self.shake_ms = (self.shake_ms - dt_ms).max(0.0);

            for event in std::mem::take(self.ctl.sink_mut()) {
                match event {
                    GameEvent::MissionCompleted { text, .. } => {
                        self.toast = Some((text, time + TOAST_MS));
                    }
                    GameEvent::StageChanged { index } => {
                        self.toast = Some((STAGES[index].to_string(), time + TOAST_MS));
                    }
                    GameEvent::SessionEnded(record) => {
                        if self.settings.effective_screen_shake() {
                            self.shake_ms = 300.0;
                        }
                        show_game_over(record.score, record.distance, self.ctl.outcome().is_some_and(|o| o.is_new_high_score));
                    }
                    _ => {}
                }
            }
            if self.toast.as_ref().is_some_and(|(_, until)| time > *until) {
                self.toast = None;
            }
        }

        fn restart(&mut self, seed: u64) {
            self.ctl.restart(seed, self.food);
            self.ctl.sink_mut().clear();
            self.paused = false;
            self.toast = None;
            set_class("game-over", "hidden");
            log::info!("Started new run with seed: {}", seed);
        }

        fn render(&self) {
            let ctx = &self.ctx;
            let s = self.scale;
            let width = FIELD_WIDTH as f64 * s;
            let height = FIELD_HEIGHT as f64 * s;

            ctx.save();
            if self.shake_ms > 0.0 {
                let amount = self.shake_ms as f64 / 30.0;
                let _ = ctx.translate(amount, -amount);
            }

            ctx.set_fill_style_str("#3a0d12");
            ctx.fill_rect(0.0, 0.0, width, height);

            // Lane dividers
            ctx.set_fill_style_str("#5c1a22");
            for lane in 0..LANE_COUNT {
                let x = lane_center_x(lane) as f64 * s;
                ctx.fill_rect(x - 2.0, 0.0, 4.0, height);
            }

            for body in self.ctl.track().bodies() {
                let color = match body.kind {
                    EntityKind::Obstacle(ObstacleKind::Trap) => "#7a5230",
                    EntityKind::Obstacle(ObstacleKind::Spike) => "#c0c0c0",
                    EntityKind::Coin => "#d4a017",
                    EntityKind::PowerUp(PowerUpKind::Invincibility) => "#44ccff",
                    EntityKind::PowerUp(PowerUpKind::Magnet) => "#ff4466",
                };
                let half = half_extents(body.kind);
                ctx.set_fill_style_str(color);
                ctx.fill_rect(
                    (body.pos.x - half.x) as f64 * s,
                    (body.pos.y - half.y) as f64 * s,
                    (half.x * 2.0) as f64 * s,
                    (half.y * 2.0) as f64 * s,
                );
            }

            let session = self.ctl.session();
            let player = player_box(session);
            let tint = shop::find_skin(&session.loadout.cosmetic).map_or(0xffffff, |skin| skin.tint);
            let color = if session.is_invincible() {
                "#ffffff".to_string()
            } else {
                format!("#{:06x}", tint)
            };
            ctx.set_fill_style_str(&color);
            ctx.fill_rect(
                (player.center.x - player.half.x) as f64 * s,
                (player.center.y - player.half.y) as f64 * s,
                (player.half.x * 2.0) as f64 * s,
                (player.half.y * 2.0) as f64 * s,
            );
            ctx.restore();
        }

        fn update_hud(&self) {
            let session = self.ctl.session();
            set_text("hud-score", &(session.score.floor() as u64).to_string());
            set_text("hud-distance", &format!("{}m", session.distance.floor() as u64));
            set_text("hud-beans", &session.currency.to_string());
            set_text("hud-stage", session.stages.name());
            set_text("hud-gas", &format!("{:.0}%", session.gas.fraction() * 100.0));
            if session.multiplier() > 1 {
                set_text("hud-combo", &format!("x{}", session.multiplier()));
            } else {
                set_text("hud-combo", "");
            }
            match &self.toast {
                Some((text, _)) => {
                    set_text("toast", text);
                    set_class("toast", "");
                }
                None => set_class("toast", "hidden"),
            }
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.set_attribute("class", class);
        }
    }

    fn show_game_over(score: u64, distance: u64, new_best: bool) {
        set_text("final-score", &score.to_string());
        set_text("final-distance", &format!("{}m", distance));
        set_class("new-best", if new_best { "" } else { "hidden" });
        set_class("game-over", "");
    }

    fn open_storage() -> Box<dyn Storage> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                Box::new(MemoryStorage::new())
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Gut Runner starting...");

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

        // Fit the portrait field to the canvas height
        let dpr = window.device_pixel_ratio();
        let height = (canvas.client_height() as f64 * dpr).max(1.0);
        let scale = height / FIELD_HEIGHT as f64;
        canvas.set_width((FIELD_WIDTH as f64 * scale) as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(open_storage(), ctx, scale, seed)));
        log::info!("Game initialized with seed: {}", seed);
        let audio = game.borrow().ctl.persistence().data().audio_enabled;
        set_text("hud-audio", if audio { "On" } else { "Off" });

        setup_keyboard(game.clone());
        setup_swipe(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);
        log::info!("Gut Runner running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            let key = event.key();
            if let Some(intent) = intent_for_key(&key) {
                event.prevent_default();
                if !g.paused {
                    g.ctl.queue_intent(intent);
                }
                return;
            }
            match key.as_str() {
                "Escape" | "p" | "P" => {
                    if !g.ctl.is_over() {
                        g.paused = !g.paused;
                        log::info!("Paused: {}", g.paused);
                    }
                }
                "m" | "M" => {
                    let enabled = !g.ctl.persistence().data().audio_enabled;
                    g.ctl.persistence_mut().set_audio_enabled(enabled);
                    set_text("hud-audio", if enabled { "On" } else { "Off" });
                    log::info!("Audio enabled: {}", enabled);
                }
                "Enter" if g.ctl.is_over() => g.restart(js_sys::Date::now() as u64),
                "1" | "2" | "3" if g.ctl.is_over() => {
                    let idx = key.parse::<usize>().unwrap_or(1) - 1;
                    g.food = Food::ALL[idx];
                    set_text("food", g.food.as_str());
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_swipe(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut()
                    .swipe
                    .pointer_down(event.client_x() as f32, event.client_y() as f32, js_sys::Date::now());
            });
            let _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let intent = g
                    .swipe
                    .pointer_up(event.client_x() as f32, event.client_y() as f32, js_sys::Date::now());
                if let Some(intent) = intent
                    && !g.paused
                {
                    g.ctl.queue_intent(intent);
                }
            });
            let _ = canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().swipe.cancel();
            });
            let _ = canvas.add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("restart-btn"))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            game.borrow_mut().restart(js_sys::Date::now() as u64);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if !g.ctl.is_over() && !g.paused {
                    g.paused = true;
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                SIM_DT_MS
            };
            g.last_time = time;

            g.update(dt_ms, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use gut_runner::consts::SIM_DT_MS;
    use gut_runner::persistence::SaveManager;
    use gut_runner::platform::{FileStorage, MemoryStorage, Storage};
    use gut_runner::run::RunController;
    use gut_runner::sim::{Food, GameEvent};
    use gut_runner::{Settings, Tuning, missions};

    /// Runs that survive this long are ended (ms of simulated time)
    const MAX_RUN_MS: f32 = 5.0 * 60.0 * 1000.0;
    /// How far ahead of the player the autopilot looks
    const LOOKAHEAD: f32 = 350.0;

    fn open_storage() -> Box<dyn Storage> {
        match std::env::var("GUT_RUNNER_SAVE_DIR") {
            Ok(dir) => {
                log::info!("Saving to {}", dir);
                Box::new(FileStorage::new(dir))
            }
            Err(_) => Box::new(MemoryStorage::new()),
        }
    }

    fn load_tuning() -> Tuning {
        let Ok(path) = std::env::var("GUT_RUNNER_TUNING") else {
            return Tuning::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}", path, e);
                    Tuning::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run(args: &[String]) {
        let seed = args
            .get(1)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| chrono::Local::now().timestamp_millis() as u64);
        let food = args.get(2).and_then(|s| Food::from_str(s)).unwrap_or_default();

        let storage = open_storage();
        let settings = Settings::load(&storage);
        log::info!("Quality preset: {}", settings.quality.as_str());

        let save = SaveManager::open(storage);
        let mut ctl = RunController::new(save, Vec::new(), seed, food, load_tuning());

        let mut elapsed = 0.0;
        while !ctl.is_over() && elapsed < MAX_RUN_MS {
            if let Some(intent) = ctl.track().autopilot(ctl.session(), LOOKAHEAD) {
                ctl.queue_intent(intent);
            }
            ctl.step(SIM_DT_MS);
            elapsed += SIM_DT_MS;
        }
        if !ctl.is_over() {
            log::info!("Time limit reached, ending run");
            ctl.finish();
        }

        let events = ctl.sink();
        let stages = events
            .iter()
            .filter(|e| matches!(e, GameEvent::StageChanged { .. }))
            .count();
        let turbos = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TurboStarted { .. }))
            .count();

        let session = ctl.session();
        if let Some(record) = session.record() {
            println!("Seed:      {}", seed);
            println!("Food:      {}", food.as_str());
            println!("Score:     {}", record.score);
            println!("Distance:  {}m", record.distance);
            println!("Beans:     {}", record.currency);
            println!("Stages:    {} (ended in {})", stages, session.stages.name());
            println!("Turbos:    {}", turbos);
        }
        for event in events {
            if let GameEvent::MissionCompleted { text, .. } = event {
                println!("Mission:   {}", text);
            }
        }
        if let Some(outcome) = ctl.outcome() {
            if outcome.is_new_high_score {
                println!("New high score!");
            }
            if let Some(rank) = outcome.leaderboard_rank {
                println!("Leaderboard rank: #{}", rank);
            }
        }
        let save = ctl.persistence();
        println!("Bank:      {} beans", save.coins());
        for mission in missions::active(|id| save.mission_progress(id)) {
            println!(
                "Open:      {} ({}/{})",
                mission.description,
                save.mission_progress(mission.id),
                mission.goal
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Gut Runner (native) starting headless autopilot run...");

    let args: Vec<String> = std::env::args().collect();
    headless::run(&args);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
