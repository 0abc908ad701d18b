//! Blob Runner entry point
//!
//! On the web: canvas 2D presenter, keyboard wiring and the animation loop.
//! Natively: a headless autopilot run that exercises the whole pipeline.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::Clamped;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};

    use blob_runner::{Settings, Sprite, SpriteId};
    use blob_runner::platform::{FrameClock, KeyState};
    use blob_runner::renderer::{Framebuffer, Surface};
    use blob_runner::sim::{Game, GameEvent, GamePhase, TickInput, tick};

    /// Global the page may set to a JSON settings override
    const SETTINGS_GLOBAL: &str = "blobRunnerSettings";
    /// Canvas attribute naming an optional wallpaper image
    const WALLPAPER_ATTR: &str = "data-wallpaper";

    /// Everything the page keeps alive between frames
    struct Host {
        game: Game,
        keys: KeyState,
        clock: FrameClock,
        framebuffer: Framebuffer,
        ctx: CanvasRenderingContext2d,
    }

    impl Host {
        fn frame(&mut self, time: f64) {
            let dt = self.clock.tick(time);
            let input = TickInput::from_source(&self.keys);
            tick(&mut self.game, &input, dt);
            self.keys.end_frame();

            for event in self.game.drain_events() {
                match event {
                    GameEvent::GateConsumed { label, blobs } => log::debug!("Gate {} -> {} blobs", label, blobs),
                    GameEvent::GameOver { meters } => log::info!("Final distance: {:.0} m", meters),
                    _ => {}
                }
            }

            self.game.render(&mut self.framebuffer);
            self.present();
            self.draw_hud();
        }

        /// Blit the software framebuffer into the canvas
        fn present(&self) {
            let (w, h) = (self.framebuffer.width(), self.framebuffer.height());
            let image = match ImageData::new_with_u8_clamped_array_and_sh(Clamped(self.framebuffer.as_bytes()), w, h) {
                Ok(image) => image,
                Err(e) => {
                    log::warn!("ImageData failed: {:?}", e);
                    return;
                }
            };
            if let Err(e) = self.ctx.put_image_data(&image, 0.0, 0.0) {
                log::warn!("putImageData failed: {:?}", e);
            }
        }

        fn draw_hud(&self) {
            let ctx = &self.ctx;
            let w = self.framebuffer.width() as f64;
            let h = self.framebuffer.height() as f64;

            ctx.set_font("bold 18px monospace");
            ctx.set_fill_style_str("#ffffff");
            let _ = ctx.fill_text(&format!("{:.0} m", self.game.distance_traveled()), 12.0, 26.0);
            let _ = ctx.fill_text(&format!("Blobs: {}", self.game.blob_count()), 12.0, 48.0);

            let prompt = match self.game.phase {
                GamePhase::Ready => Some("Press Enter or steer to run"),
                GamePhase::GameOver => Some("Game over - Enter to restart"),
                GamePhase::Playing => None,
            };
            if let Some(text) = prompt {
                ctx.set_text_align("center");
                let _ = ctx.fill_text(text, w / 2.0, h / 2.0);
                ctx.set_text_align("start");
            }
        }
    }

    fn load_settings(window: &web_sys::Window) -> Settings {
        match js_sys::Reflect::get(window, &JsValue::from_str(SETTINGS_GLOBAL)) {
            Ok(value) => match value.as_string() {
                Some(json) => Settings::from_json_or_default(&json),
                None => Settings::default(),
            },
            Err(_) => Settings::default(),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Blob Runner starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::warn!("No <canvas id=\"canvas\"> on the page");
            return;
        };

        let (width, height) = fit_canvas(&canvas);

        let ctx = match canvas.get_context("2d") {
            Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
                Ok(ctx) => ctx,
                Err(_) => {
                    log::warn!("2d context has an unexpected type");
                    return;
                }
            },
            _ => {
                log::warn!("Canvas 2d context unavailable");
                return;
            }
        };

        let settings = load_settings(&window);
        let seed = js_sys::Date::now() as u64;
        let clock = FrameClock::new(settings.run.max_frame_dt);
        let host = Rc::new(RefCell::new(Host {
            game: Game::new(settings, seed),
            keys: KeyState::new(),
            clock,
            framebuffer: Framebuffer::new(width, height),
            ctx,
        }));
        log::info!("Canvas {}x{}, seed {}", width, height, seed);

        setup_keyboard(&window, host.clone());
        setup_focus_handlers(&window, &document, host.clone());
        if let Some(url) = canvas.get_attribute(WALLPAPER_ATTR) {
            load_wallpaper(&document, &url, host.clone());
        }
        setup_resize(&window, canvas, host.clone());

        request_animation_frame(host);
    }

    /// Match the backing store to the displayed size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        if canvas.width() != width || canvas.height() != height {
            canvas.set_width(width);
            canvas.set_height(height);
        }
        (width, height)
    }

    fn setup_resize(window: &web_sys::Window, canvas: HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = fit_canvas(&canvas);
            host.borrow_mut().framebuffer.resize(width, height);
            log::debug!("Canvas resized to {}x{}", width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Start loading the wallpaper; the slot stays `Loading` until the image answers
    fn load_wallpaper(document: &web_sys::Document, url: &str, host: Rc<RefCell<Host>>) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Cannot create image element: {:?}", e);
                return;
            }
        };

        {
            let host = host.clone();
            let document = document.clone();
            let loaded = image.clone();
            let onload = Closure::once(move || {
                let mut host = host.borrow_mut();
                match decode_image(&document, &loaded) {
                    Some(sprite) => host.game.assets.set_ready(SpriteId::Wallpaper, sprite),
                    None => host.game.assets.set_failed(SpriteId::Wallpaper),
                }
            });
            image.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
        }
        {
            let onerror = Closure::once(move || {
                host.borrow_mut().game.assets.set_failed(SpriteId::Wallpaper);
            });
            image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        }

        image.set_src(url);
    }

    /// Read a loaded image's pixels back through a scratch canvas
    fn decode_image(document: &web_sys::Document, image: &HtmlImageElement) -> Option<Sprite> {
        let (w, h) = (image.natural_width(), image.natural_height());
        let scratch = document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        scratch.set_width(w);
        scratch.set_height(h);
        let ctx = scratch
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.draw_image_with_html_image_element(image, 0.0, 0.0).ok()?;
        let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64).ok()?;
        Sprite::from_rgba8(w, h, &data.data().0)
    }

    fn setup_keyboard(window: &web_sys::Window, host: Rc<RefCell<Host>>) {
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if host.borrow_mut().keys.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                host.borrow_mut().keys.key_up(&event.code());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(window: &web_sys::Window, document: &web_sys::Document, host: Rc<RefCell<Host>>) {
        // Keys released while unfocused never send keyup
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                host.borrow_mut().keys.clear();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Hidden tabs stop animation frames; restart the clock when we come back
        {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
                    host.borrow_mut().clock.reset();
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        host.borrow_mut().frame(time);
        request_animation_frame(host);
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
    log::info!("Blob Runner (native) starting...");
    log::info!("Native mode runs a headless autopilot - serve the wasm build to play");

    native::run_demo(42, 90.0);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use blob_runner::Settings;
    use blob_runner::entity::{Actor, Entity, Gate, GateKind};
    use blob_runner::renderer::Framebuffer;
    use blob_runner::sim::{Game, GamePhase, TickInput, tick};

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Lateral slack before the autopilot steers
    const DEADBAND: f32 = 4.0;

    /// Run until the swarm is wiped out or `seconds` of play have passed
    pub fn run_demo(seed: u64, seconds: f32) {
        let settings = Settings::default();
        log::debug!("Settings: {}", settings.to_json());
        let mut game = Game::new(settings, seed);
        let mut framebuffer = Framebuffer::new(320, 240);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut game, &start, FRAME_DT);

        let mut frames = 0u64;
        while game.phase == GamePhase::Playing && game.elapsed < seconds {
            let input = autopilot(&game);
            tick(&mut game, &input, FRAME_DT);
            game.render(&mut framebuffer);

            frames += 1;
            if frames % 600 == 0 {
                log::info!("{:.0} m, {} blobs", game.distance_traveled(), game.blob_count());
            }
        }

        println!(
            "Ran {:.0} m in {:.1} s past {} gate rows with {} blobs left ({:?})",
            game.distance_traveled(),
            game.elapsed,
            game.spawner.rows_spawned(),
            game.blob_count(),
            game.phase
        );
    }

    /// Steer toward the best gate of the nearest row ahead
    fn autopilot(game: &Game) -> TickInput {
        let Some(player) = game.player() else {
            return TickInput::default();
        };
        let pos = player.center();
        let count = player.blob_count() as f32;
        let outcome = |g: &Gate| match g.kind() {
            GateKind::Add => count + g.value().floor(),
            GateKind::Multiply => (count * g.value()).floor(),
        };

        let ahead: Vec<&Gate> = game
            .renderer
            .entities()
            .iter()
            .filter_map(Entity::as_gate)
            .filter(|g| !g.is_consumed() && g.position().z > pos.z)
            .collect();
        let Some(next_z) = ahead.iter().map(|g| g.position().z).min_by(f32::total_cmp) else {
            return TickInput::default();
        };
        let Some(best) = ahead
            .iter()
            .filter(|g| g.position().z == next_z)
            .max_by(|a, b| outcome(**a).total_cmp(&outcome(**b)))
        else {
            return TickInput::default();
        };

        let dx = best.position().x - pos.x;
        TickInput {
            left: dx < -DEADBAND,
            right: dx > DEADBAND,
            ..Default::default()
        }
    }
}
