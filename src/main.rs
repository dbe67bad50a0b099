//! Classroom Arcade entry point
//!
//! One wasm bundle serves both pages: it boots Prime Drop when the page has a
//! `#gameCanvas`, and the coin game when it has a `#coinApp` root.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod dom {
    //! DOM helpers shared by both pages

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement};

    pub fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    pub fn by_id(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    pub fn set_text(id: &str, text: &str) {
        if let Some(el) = by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    pub fn set_class(id: &str, class: &str, on: bool) {
        if let Some(el) = by_id(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    pub fn set_hidden(id: &str, hidden: bool) {
        set_class(id, "hidden", hidden);
    }

    pub fn set_disabled(id: &str, disabled: bool) {
        if let Some(el) = by_id(id) {
            if disabled {
                let _ = el.set_attribute("disabled", "");
            } else {
                let _ = el.remove_attribute("disabled");
            }
        }
    }

    pub fn set_input_value(id: &str, value: &str) {
        if let Some(input) = by_id(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
            input.set_value(value);
        }
    }

    pub fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = by_id(id) else {
            log::debug!("No #{} on this page", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Call `handler` with the input's value on every edit
    pub fn on_input(id: &str, mut handler: impl FnMut(String) + 'static) {
        let Some(input) = by_id(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) else {
            log::debug!("No input #{} on this page", id);
            return;
        };
        let source = input.clone();
        let closure =
            Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| handler(source.value()));
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Run `f` once after `ms`; returns the timer handle
    pub fn set_timeout(ms: i32, f: impl FnOnce() + 'static) -> Option<i32> {
        let window = web_sys::window()?;
        let closure = Closure::once(f);
        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                ms,
            )
            .ok();
        closure.forget();
        handle
    }

    pub fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod prime_drop_web {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use classroom_arcade::audio::{AudioManager, SoundEffect};
    use classroom_arcade::consts::*;
    use classroom_arcade::highscores::{ClearTimes, format_date};
    use classroom_arcade::renderer::{CanvasRenderer, build_scene};
    use classroom_arcade::sim::{DropEvent, DropPhase, DropState, TickInput, tick};
    use classroom_arcade::{Settings, format_time};

    use crate::dom;

    const TOAST_MS: i32 = 900;

    thread_local! {
        static TOAST_TIMER: Cell<Option<i32>> = const { Cell::new(None) };
    }

    /// Flash a short message over the playfield
    fn show_toast(message: &str) {
        let Some(toast) = dom::by_id("actionToast") else {
            return;
        };
        toast.set_text_content(Some(message));
        let _ = toast.class_list().add_1("show");
        if let (Some(window), Some(handle)) = (web_sys::window(), TOAST_TIMER.get()) {
            window.clear_timeout_with_handle(handle);
        }
        let handle = dom::set_timeout(TOAST_MS, || dom::set_class("actionToast", "show", false));
        TOAST_TIMER.set(handle);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Zone {
        Left,
        Right,
    }

    /// Game instance holding all state
    struct Game {
        state: DropState,
        renderer: CanvasRenderer,
        audio: AudioManager,
        settings: Settings,
        records: ClearTimes,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        keys_left: bool,
        keys_right: bool,
        pointer_active: bool,
        pointer_target: f32,
        touch_zones: HashMap<i32, Zone>,
        last_phase: DropPhase,
    }

    impl Game {
        fn new(seed: u64, renderer: CanvasRenderer) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                state: DropState::new(seed),
                renderer,
                audio,
                settings,
                records: ClearTimes::load(),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                keys_left: false,
                keys_right: false,
                pointer_active: false,
                pointer_target: GAME_WIDTH / 2.0,
                touch_zones: HashMap::new(),
                last_phase: DropPhase::Home,
            }
        }

        /// Fold keys, touch zones and the pointer into the tick input
        fn sync_input(&mut self) {
            let touch_left = self.touch_zones.values().any(|z| *z == Zone::Left);
            let touch_right = self.touch_zones.values().any(|z| *z == Zone::Right);
            self.input.left = self.keys_left || touch_left;
            self.input.right = self.keys_right || touch_right;
            self.input.pointer_x = self.pointer_active.then_some(self.pointer_target);
        }

        /// Aim the pointer steering at a client x, only while playing
        fn aim_pointer(&mut self, client_x: f64) {
            if !self.state.is_running() {
                return;
            }
            if let Some(x) = self.renderer.client_to_game_x(client_x) {
                self.pointer_target = x;
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.sync_input();

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pause = false;
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }

            if self.state.phase != self.last_phase {
                self.last_phase = self.state.phase;
                self.show_phase();
            }
        }

        fn handle_event(&mut self, event: DropEvent) {
            match event {
                DropEvent::Started => self.audio.play(SoundEffect::Start),
                DropEvent::Added { .. } => self.audio.play(SoundEffect::Add),
                DropEvent::Divided { .. } => self.audio.play(SoundEffect::Divide),
                DropEvent::Cleared { elapsed_ms } => {
                    self.audio.play(SoundEffect::Clear);
                    let rank = self.records.add_time(elapsed_ms, js_sys::Date::now());
                    if let Some(rank) = rank {
                        self.records.save();
                        log::info!("Clear time ranked #{}", rank);
                        if rank == 1 {
                            self.audio.play(SoundEffect::NewRecord);
                            show_toast("최고 기록!");
                        }
                    }
                    self.show_result(elapsed_ms, rank);
                }
                _ => {}
            }
        }

        fn render(&self) {
            let scene = build_scene(&self.state, &self.settings);
            self.renderer.render(&scene);
            dom::set_text("timer", &self.state.timer_text());
        }

        /// Toggle overlay screens for the current phase
        fn show_phase(&self) {
            let phase = self.state.phase;
            dom::set_class("homeScreen", "active", phase == DropPhase::Home);
            dom::set_class("pauseScreen", "active", phase == DropPhase::Paused);
            dom::set_class("resultScreen", "active", phase == DropPhase::Cleared);
            dom::set_hidden("pauseButton", phase != DropPhase::Playing);
            if phase == DropPhase::Home {
                let best = self
                    .records
                    .best()
                    .map(format_time)
                    .unwrap_or_else(|| "--:--.-".to_string());
                dom::set_text("bestTime", &best);
            }
        }

        fn show_result(&self, elapsed_ms: f64, rank: Option<usize>) {
            dom::set_text("resultTitle", "게임 클리어");
            dom::set_text(
                "resultMessage",
                &format!(
                    "{}까지 도달 시간: {}",
                    self.state.tuning.target_value,
                    format_time(elapsed_ms)
                ),
            );

            let Some(list) = dom::by_id("recordsList") else {
                return;
            };
            let html: String = self
                .records
                .entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let class = if rank == Some(i + 1) { " class=\"new\"" } else { "" };
                    format!(
                        "<li{}><span>{}.</span> {} <small>{}</small></li>",
                        class,
                        i + 1,
                        format_time(entry.elapsed_ms),
                        format_date(entry.timestamp)
                    )
                })
                .collect();
            list.set_inner_html(&html);
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.settings.save();
            self.audio.apply_settings(&self.settings);
            show_toast(if muted { "소리 끔" } else { "소리 켬" });
        }

        /// Pause from outside the game (tab hidden, window blur)
        fn auto_pause(&mut self, reason: &str) {
            if self.state.pause() {
                log::info!("Auto-paused ({})", reason);
                self.show_phase();
                self.last_phase = self.state.phase;
            }
        }
    }

    pub fn run(canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        log::info!("Prime Drop starting...");

        let mut renderer = CanvasRenderer::new(canvas.clone())?;
        renderer.resize(dom::by_id("canvasWrap").as_ref());

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, renderer)));
        log::info!("Game initialized with seed: {}", seed);
        game.borrow().show_phase();

        setup_input_handlers(&canvas, game.clone())?;
        setup_buttons(game.clone());
        setup_resize(game.clone())?;
        setup_auto_pause(game.clone())?;

        request_animation_frame(game);

        log::info!("Prime Drop running!");
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let phase = g.state.phase;
                match event.key().as_str() {
                    "ArrowLeft" => {
                        event.prevent_default();
                        g.keys_left = true;
                    }
                    "ArrowRight" => {
                        event.prevent_default();
                        g.keys_right = true;
                    }
                    "Escape" => match phase {
                        DropPhase::Playing => {
                            g.input.pause = true;
                            show_toast("일시정지");
                        }
                        DropPhase::Paused => {
                            g.input.pause = true;
                            show_toast("다시 시작!");
                        }
                        _ => {}
                    },
                    "i" | "I" => {
                        g.input.autopilot = !g.input.autopilot;
                        log::info!("Autopilot: {}", g.input.autopilot);
                    }
                    "m" | "M" => g.toggle_mute(),
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => {
                        event.prevent_default();
                        g.keys_left = false;
                    }
                    "ArrowRight" => {
                        event.prevent_default();
                        g.keys_right = false;
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer down: touches pick a hold zone, mouse/pen steer toward the pointer
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let client_x = event.client_x() as f64;
                if event.pointer_type() == "touch" {
                    let zone = if g.renderer.is_left_half(client_x) {
                        Zone::Left
                    } else {
                        Zone::Right
                    };
                    g.touch_zones.insert(event.pointer_id(), zone);
                } else {
                    g.pointer_active = true;
                    g.aim_pointer(client_x);
                }
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if event.pointer_type() == "touch" {
                    return;
                }
                let mut g = game.borrow_mut();
                if g.pointer_active {
                    g.aim_pointer(event.client_x() as f64);
                }
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer up / cancel / leave all release
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if event.pointer_type() == "touch" {
                    g.touch_zones.remove(&event.pointer_id());
                } else {
                    g.pointer_active = false;
                }
            });
            for name in ["pointerup", "pointercancel", "pointerleave"] {
                canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            }
            closure.forget();
        }

        Ok(())
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            dom::on_click("startButton", move || {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.state.start();
                show_toast("게임 시작!");
            });
        }
        {
            let game = game.clone();
            dom::on_click("resumeButton", move || {
                if game.borrow_mut().state.resume() {
                    show_toast("다시 시작!");
                }
            });
        }
        {
            let game = game.clone();
            dom::on_click("homeButton", move || {
                game.borrow_mut().state.reset_to_home();
                show_toast("홈으로 이동");
            });
        }
        {
            let game = game.clone();
            dom::on_click("restartButton", move || {
                game.borrow_mut().state.start();
                show_toast("다시 도전!");
            });
        }
        {
            let game = game.clone();
            dom::on_click("pauseButton", move || {
                if game.borrow_mut().state.pause() {
                    show_toast("일시정지");
                }
            });
        }
        dom::on_click("muteButton", move || game.borrow_mut().toggle_mute());
    }

    fn setup_resize(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let wrap = dom::by_id("canvasWrap");
            game.borrow_mut().renderer.resize(wrap.as_ref());
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().auto_pause("window blur");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
mod coin_web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::Document;

    use classroom_arcade::CoinError;
    use classroom_arcade::coin::session::{AUTO_FLIP_INTERVAL_MS, FLIP_ANIMATION_MS};
    use classroom_arcade::coin::{
        CoinApp, Face, Feedback, FirestoreConfig, FirestoreStore, GameStore, MemoryStore, User,
        View, auto_flip_label, create_game, join_game, upgrade_hint,
    };

    use crate::dom;

    /// Page state: the view machine plus browser timers
    struct Coin {
        app: CoinApp,
        rng: Pcg32,
        auto_timer: Option<i32>,
    }

    type Shared = Rc<RefCell<Coin>>;

    pub fn run(document: &Document) -> Result<(), JsValue> {
        log::info!("Coin game starting...");
        let coin = Rc::new(RefCell::new(Coin {
            app: CoinApp::new(),
            rng: Pcg32::seed_from_u64(js_sys::Date::now() as u64),
            auto_timer: None,
        }));

        match load_config(document) {
            Some(config) => {
                let store = Rc::new(FirestoreStore::new(config));
                wire(&coin, store.clone());
                render(&coin.borrow());

                let coin = coin.clone();
                spawn_local(async move {
                    match store.sign_in_anonymously().await {
                        Ok(user) => coin.borrow_mut().app.signed_in(user),
                        Err(e) => log::error!("Auth failed: {}", e),
                    }
                    render(&coin.borrow());
                });
            }
            None => {
                log::warn!("No #firebase-config on this page; games only live in this tab");
                wire(&coin, Rc::new(MemoryStore::new()));
                coin.borrow_mut().app.signed_in(User {
                    uid: "local".to_string(),
                });
                render(&coin.borrow());
            }
        }

        Ok(())
    }

    /// Read the Firebase settings embedded in the page
    fn load_config(document: &Document) -> Option<FirestoreConfig> {
        let text = document.get_element_by_id("firebase-config")?.text_content()?;
        FirestoreConfig::from_json(&text)
            .map_err(|e| log::error!("Bad firebase config: {}", e))
            .ok()
    }

    fn wire<S: GameStore + 'static>(coin: &Shared, store: Rc<S>) {
        // Navigation
        on_app(coin, "makerButton", CoinApp::open_maker);
        on_app(coin, "detectiveButton", CoinApp::open_detective);
        on_app(coin, "makerBack", CoinApp::back);
        on_app(coin, "detectiveBack", CoinApp::back);
        for id in ["makerHome", "leaveButton", "correctHome", "gameOverHome"] {
            let coin = coin.clone();
            dom::on_click(id, move || leave(&coin));
        }

        // Maker sliders
        {
            let coin = coin.clone();
            dom::on_input("probabilityInput", move |value| {
                let probability = value.parse().unwrap_or_default();
                coin.borrow_mut().app.form.set_probability(probability);
                render(&coin.borrow());
            });
        }
        {
            let coin = coin.clone();
            dom::on_input("maxGuessesInput", move |value| {
                let max_guesses = value.parse().unwrap_or_default();
                coin.borrow_mut().app.form.set_max_guesses(max_guesses);
                render(&coin.borrow());
            });
        }

        // Create
        {
            let coin = coin.clone();
            let store = store.clone();
            dom::on_click("createButton", move || {
                let (form, user, seed) = {
                    let mut c = coin.borrow_mut();
                    if !c.app.can_create() || !c.app.begin_request() {
                        return;
                    }
                    let seed: u64 = c.rng.random();
                    (c.app.form, c.app.user.clone(), seed)
                };
                render(&coin.borrow());

                let coin = coin.clone();
                let store = store.clone();
                spawn_local(async move {
                    let mut rng = Pcg32::seed_from_u64(seed);
                    let now = js_sys::Date::now() as u64;
                    let result = create_game(&*store, &mut rng, &form, user.as_ref(), now).await;
                    let outcome = coin.borrow_mut().app.finish_create(result);
                    if let Err(e) = outcome {
                        dom::alert(e.user_message());
                    }
                    render(&coin.borrow());
                });
            });
        }

        // Detective code box
        {
            let coin = coin.clone();
            dom::on_input("codeInput", move |value| {
                let mut c = coin.borrow_mut();
                c.app.set_code_input(&value);
                dom::set_input_value("codeInput", &c.app.code_input);
                drop(c);
                render(&coin.borrow());
            });
        }

        // Join
        {
            let coin = coin.clone();
            dom::on_click("joinButton", move || {
                let input = {
                    let mut c = coin.borrow_mut();
                    if !c.app.can_join() || !c.app.begin_request() {
                        return;
                    }
                    c.app.code_input.clone()
                };
                render(&coin.borrow());

                let coin = coin.clone();
                let store = store.clone();
                spawn_local(async move {
                    let result = join_game(&*store, &input).await;
                    let outcome = coin.borrow_mut().app.finish_join(result);
                    match outcome {
                        Ok(()) => dom::set_input_value("guessInput", ""),
                        Err(e) => dom::alert(e.user_message()),
                    }
                    render(&coin.borrow());
                });
            });
        }

        // Auto flip
        {
            let coin = coin.clone();
            dom::on_click("autoFlipButton", move || {
                let running = {
                    let mut c = coin.borrow_mut();
                    let Some(session) = c.app.session.as_mut() else {
                        return;
                    };
                    session.toggle_auto_flip()
                };
                if running {
                    auto_flip_step(&coin);
                    start_auto_timer(&coin);
                } else {
                    stop_auto_timer(&mut coin.borrow_mut());
                }
                render(&coin.borrow());
            });
        }

        // Guessing
        {
            let coin = coin.clone();
            dom::on_input("guessInput", move |value| {
                coin.borrow_mut().app.set_guess_input(&value);
                render(&coin.borrow());
            });
        }
        {
            let coin = coin.clone();
            dom::on_click("guessButton", move || {
                let result = coin.borrow_mut().app.submit_guess();
                match result {
                    Ok(Feedback::Wrong) => {}
                    Ok(_) => stop_auto_timer(&mut coin.borrow_mut()),
                    Err(CoinError::RoundOver) => {}
                    Err(e) => dom::alert(e.user_message()),
                }
                render(&coin.borrow());
            });
        }
    }

    /// Click handler that only drives the view machine
    fn on_app(coin: &Shared, id: &str, action: fn(&mut CoinApp)) {
        let coin = coin.clone();
        dom::on_click(id, move || {
            action(&mut coin.borrow_mut().app);
            render(&coin.borrow());
        });
    }

    fn leave(coin: &Shared) {
        {
            let mut c = coin.borrow_mut();
            stop_auto_timer(&mut c);
            c.app.reset();
        }
        dom::set_input_value("codeInput", "");
        dom::set_input_value("guessInput", "");
        render(&coin.borrow());
    }

    /// One auto-flip interval, followed by the flip animation
    fn auto_flip_step(coin: &Shared) {
        let flipped = {
            let mut c = coin.borrow_mut();
            let Coin { app, rng, .. } = &mut *c;
            let Some(session) = app.session.as_mut() else {
                return;
            };
            let flipped = session.auto_flip_tick(rng).is_some();
            let running = session.auto.running;
            if !running {
                stop_auto_timer(&mut c);
            }
            flipped
        };
        render(&coin.borrow());

        if flipped {
            let coin = coin.clone();
            dom::set_timeout(FLIP_ANIMATION_MS as i32, move || {
                {
                    let mut c = coin.borrow_mut();
                    let stopped = c
                        .app
                        .session
                        .as_mut()
                        .and_then(|session| session.finish_flip().map(|_| !session.auto.running))
                        .unwrap_or(false);
                    if stopped {
                        stop_auto_timer(&mut c);
                    }
                }
                render(&coin.borrow());
            });
        }
    }

    fn start_auto_timer(coin: &Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let tick_coin = coin.clone();
        let closure = Closure::<dyn FnMut()>::new(move || auto_flip_step(&tick_coin));
        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                AUTO_FLIP_INTERVAL_MS as i32,
            )
            .ok();
        closure.forget();

        let mut c = coin.borrow_mut();
        stop_auto_timer(&mut c);
        c.auto_timer = handle;
    }

    fn stop_auto_timer(coin: &mut Coin) {
        if let (Some(handle), Some(window)) = (coin.auto_timer.take(), web_sys::window()) {
            window.clear_interval_with_handle(handle);
        }
    }

    /// Push the view machine into the DOM
    fn render(coin: &Coin) {
        let app = &coin.app;
        dom::set_hidden("homeView", app.view != View::Home);
        dom::set_hidden("makerView", app.view != View::Maker);
        dom::set_hidden("detectiveView", app.view != View::Detective);
        dom::set_hidden("gameView", app.view != View::Game);
        dom::set_hidden("connecting", app.user.is_some());

        // Maker
        dom::set_text("probabilityValue", &format!("{}%", app.form.probability()));
        dom::set_text("maxGuessesValue", &format!("{}번", app.form.max_guesses()));
        dom::set_hidden("makerForm", app.created_code.is_some());
        dom::set_hidden("createdPanel", app.created_code.is_none());
        if let Some(code) = &app.created_code {
            dom::set_text("createdCode", code.as_str());
        }
        dom::set_disabled("createButton", !app.can_create());
        dom::set_text(
            "createButton",
            if app.loading { "생성 중..." } else { "게임 만들기" },
        );

        // Detective
        dom::set_disabled("joinButton", !app.can_join());
        dom::set_text("joinButton", if app.loading { "접속 중..." } else { "입장하기" });

        let Some(session) = &app.session else {
            return;
        };

        dom::set_text("gameCode", session.code.as_str());
        dom::set_text("remainingGuesses", &session.remaining_guesses().to_string());
        dom::set_class("guessBadge", "danger", session.on_last_guess());

        dom::set_class("coin", "flipping", session.flipping);
        dom::set_class("coin", "tails", session.face == Face::Tails);
        dom::set_text(
            "coinFace",
            match session.face {
                Face::Heads => "앞",
                Face::Tails => "뒤",
            },
        );

        dom::set_text("statTotal", &session.stats.total.to_string());
        dom::set_text("statHeads", &session.stats.heads.to_string());
        dom::set_text("statTails", &session.stats.tails.to_string());

        dom::set_text("autoFlipButton", &auto_flip_label(session));
        dom::set_class("autoFlipButton", "running", session.auto.running);
        dom::set_disabled("autoFlipButton", session.is_game_over());
        match upgrade_hint(session) {
            Some(hint) => {
                dom::set_text("upgradeHint", &hint);
                dom::set_hidden("upgradeHint", false);
            }
            None => dom::set_hidden("upgradeHint", true),
        }

        let finished = session.is_finished();
        dom::set_hidden("guessForm", finished);
        dom::set_disabled("guessButton", finished || app.guess_input.trim().is_empty());
        dom::set_hidden("wrongBanner", session.feedback != Some(Feedback::Wrong));
        dom::set_hidden("correctPanel", session.feedback != Some(Feedback::Correct));
        dom::set_hidden("gameOverPanel", session.feedback != Some(Feedback::GameOver));
        if let Some(answer) = session.revealed_probability() {
            let text = format!("{answer}%");
            dom::set_text("correctAnswer", &text);
            dom::set_text("gameOverAnswer", &text);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let document = dom::document().ok_or("no document")?;
    if let Some(loading) = document.get_element_by_id("loading") {
        let _ = loading.set_attribute("class", "hidden");
    }

    if let Some(canvas) = document.get_element_by_id("gameCanvas") {
        let canvas: web_sys::HtmlCanvasElement = canvas.dyn_into()?;
        return prime_drop_web::run(canvas);
    }
    if document.get_element_by_id("coinApp").is_some() {
        return coin_web::run(&document);
    }

    log::warn!("Page has neither #gameCanvas nor #coinApp; nothing to start");
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Classroom Arcade (native) starting...");
    log::info!("Both games run in the browser - use `trunk serve` for the web version");

    println!("\nRunning Prime Drop on autopilot...");
    demo_prime_drop();

    println!("\nPlaying a coin game against the in-memory store...");
    demo_coin_game();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn demo_prime_drop() {
    use classroom_arcade::consts::{SIM_DT, TICK_RATE};
    use classroom_arcade::format_time;
    use classroom_arcade::sim::{DropEvent, DropPhase, DropState, TickInput, tick};

    let mut state = DropState::new(2024);
    state.start();
    let input = TickInput {
        autopilot: true,
        ..TickInput::default()
    };

    // Ten minutes of play at most
    let max_ticks = (TICK_RATE as u32) * 60 * 10;
    let (mut divides, mut adds) = (0, 0);
    for _ in 0..max_ticks {
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            match event {
                DropEvent::Divided { .. } => divides += 1,
                DropEvent::Added { .. } => adds += 1,
                _ => {}
            }
        }
        if state.phase == DropPhase::Cleared {
            break;
        }
    }

    if state.phase == DropPhase::Cleared {
        println!(
            "✓ Cleared in {} ({} adds, {} divides)",
            format_time(state.elapsed_ms),
            adds,
            divides
        );
    } else {
        println!(
            "✗ Not cleared after {}: value {} ({} adds, {} divides)",
            format_time(state.elapsed_ms),
            state.value,
            adds,
            divides
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn demo_coin_game() {
    use classroom_arcade::coin::{MakerForm, MemoryStore, User, create_game, join_game};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    let store = MemoryStore::new();
    let mut rng = Pcg32::seed_from_u64(7);

    let mut form = MakerForm::default();
    form.set_probability(70);
    form.set_max_guesses(3);
    let maker = User {
        uid: "maker".to_string(),
    };

    let code = match pollster::block_on(create_game(&store, &mut rng, &form, Some(&maker), 0)) {
        Ok(code) => code,
        Err(e) => {
            log::error!("Could not create demo game: {}", e);
            return;
        }
    };
    println!("Created game {}", code);

    let mut session = match pollster::block_on(join_game(&store, code.as_str())) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Could not join demo game: {}", e);
            return;
        }
    };

    while session.stats.total < 10_000 {
        let batch = session.current_batch_size();
        session.flip_batch(batch, &mut rng);
    }
    let estimate = session.stats.heads_percent().unwrap_or(50.0).round();
    println!(
        "{} flips, {} heads -> guessing {}%",
        session.stats.total, session.stats.heads, estimate
    );

    match session.submit_guess(&estimate.to_string()) {
        Ok(feedback) => println!("Feedback: {:?}", feedback),
        Err(e) => println!("Guess rejected: {}", e),
    }
}
