//! Sakura Sigil entry point
//!
//! Handles platform-specific initialization and runs the display loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use sakura_sigil::Settings;
    use sakura_sigil::consts::*;
    use sakura_sigil::renderer::SigilRenderState;
    use sakura_sigil::sim::{FormationState, FrameInput, HandClassification, HandSignal, SceneState, tick};

    /// Display instance holding all state
    struct Game {
        state: SceneState,
        input: FrameInput,
        settings: Settings,
        render_state: Option<SigilRenderState>,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                state: SceneState::new(seed, &settings),
                input: FrameInput::default(),
                settings,
                render_state: None,
                last_time: 0.0,
            }
        }

        fn update(&mut self, dt: f32) {
            tick(&mut self.state, &self.input, dt.min(MAX_FRAME_DT));
        }

        /// Step to the next quality preset, persist it, and rebuild the cloud
        fn cycle_quality(&mut self) {
            let preset = self.settings.cycle_quality();
            self.settings.save();

            let seed = self.state.seed;
            self.state = SceneState::new(seed, &self.settings);
            if let Some(ref mut render_state) = self.render_state {
                render_state.upload_particles(&self.state);
            }
            log::info!(
                "Quality: {} ({} particles)",
                preset.as_str(),
                self.settings.particle_count
            );
        }

        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                f(&mut game.borrow_mut());
            }
        });
    }

    /// `true` assembles the sigil, `false` scatters it
    #[wasm_bindgen]
    pub fn set_formation_state(formed: bool) {
        let state = if formed {
            FormationState::Formed
        } else {
            FormationState::Chaos
        };
        with_game(|g| g.input.set_formation_state(state));
    }

    /// Normalized hand position in [0, 1], y pointing down
    #[wasm_bindgen]
    pub fn set_hand_signal(x: f32, y: f32, present: bool) {
        with_game(|g| g.input.set_hand_signal(x, y, present));
    }

    /// Full classifier reading: "OPEN", "CLOSED" or anything else for unknown
    #[wasm_bindgen]
    pub fn set_hand_classification(label: &str, x: f32, y: f32, present: bool) {
        let signal = HandSignal::new(HandClassification::from_str(label), x, y, present);
        with_game(|g| g.input.apply_hand_signal(signal));
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Sakura Sigil starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        let (width, height) = canvas_pixel_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = {
            let g = game.borrow();
            SigilRenderState::new(surface, &adapter, width, height, &g.state).await
        };
        match render_state {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Renderer unavailable: {}", e);
                return;
            }
        }

        // JS setters stay no-ops until the renderer is up
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        setup_input_handlers(&canvas, game.clone());
        setup_resize(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Sakura Sigil running!");
    }

    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    /// Keyboard and pointer stand in for the hand tracker
    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer position acts as a present hand
        {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let w = target.client_width().max(1) as f32;
                let h = target.client_height().max(1) as f32;
                let x = event.offset_x() as f32 / w;
                let y = event.offset_y() as f32 / h;
                game.borrow_mut().input.set_hand_signal(x, y, true);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().input.set_hand_signal(0.5, 0.5, false);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        let next = g.input.formation.toggled();
                        g.input.set_formation_state(next);
                        log::info!("Formation: {}", next.as_str());
                    }
                    "f" | "F" => g.input.set_formation_state(FormationState::Formed),
                    "c" | "C" => g.input.set_formation_state(FormationState::Chaos),
                    "q" | "Q" => g.cycle_quality(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let target = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_pixel_size(&window, &target);
            target.set_width(width);
            target.set_height(height);
            if let Some(ref mut render_state) = game.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // time is ms since page load
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sakura Sigil (native) starting...");
    log::info!("Native mode runs headless - use `trunk serve` for the web display");

    let settings = sakura_sigil::Settings::load();
    run_headless(&settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive the formation engine through a scripted gesture sequence
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(settings: &sakura_sigil::Settings) {
    use sakura_sigil::sim::{FrameInput, HandClassification, HandSignal, SceneState, tick};

    const DT: f32 = 1.0 / 60.0;

    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut state = SceneState::new(seed, settings);
    let mut input = FrameInput::default();

    let script = [
        ("open hand, centered", HandSignal::new(HandClassification::Open, 0.5, 0.5, true)),
        ("closed fist, upper left", HandSignal::new(HandClassification::Closed, 0.1, 0.1, true)),
        ("unknown pose, lower right", HandSignal::new(HandClassification::Unknown, 0.9, 0.9, true)),
        ("hand lost", HandSignal::absent()),
    ];

    for (label, signal) in script {
        input.apply_hand_signal(signal);
        for _ in 0..120 {
            tick(&mut state, &input, DT);
        }
        let camera = state.camera.position();
        log::info!(
            "{:<26} formation={:<6} mix={:.3} ornaments={:.3} camera=({:.2}, {:.2}, {:.2})",
            label,
            state.formation.as_str(),
            state.mix(),
            state.ornament_blend.mix(),
            camera.x,
            camera.y,
            camera.z
        );
    }
}
