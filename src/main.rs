//! Warhost entry point
//!
//! The web build runs the interactive battle view. The native build runs a
//! headless battle and prints its report.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Sample army and world shared by both builds
mod demo {
    use warhost::battle::{BattleType, WorldHooks};
    use warhost::factions::{FactionId, TerritoryRef, TerritoryTier};
    use warhost::{ArmyStack, StackId, UnitRegistry};

    pub const DEMO_SEED: u64 = 0x5EED_BA77;

    /// Stand-in for the territory map
    #[derive(Debug, Default)]
    pub struct DemoWorld {
        pub conquered: Vec<String>,
        pub raided: Vec<String>,
    }

    impl WorldHooks for DemoWorld {
        fn conquer(&mut self, territory_id: &str) -> String {
            self.conquered.push(territory_id.to_string());
            format!("Territory {territory_id} claimed")
        }

        fn raid(&mut self, territory_id: &str) -> String {
            self.raided.push(territory_id.to_string());
            format!("Plundered 250 gold from {territory_id}")
        }
    }

    pub fn roster(registry: &UnitRegistry) -> Vec<ArmyStack> {
        [
            ("skeleton_warrior", 400),
            ("zombie", 250),
            ("skeleton_archer", 200),
            ("spectre", 40),
            ("blood_knight", 12),
            ("lich", 4),
            ("bone_dragon", 1),
            ("vampire_lord_hero", 1),
        ]
        .into_iter()
        .enumerate()
        .filter_map(|(i, (unit, count))| ArmyStack::from_registry(StackId(i as u64 + 1), unit, count, registry))
        .collect()
    }

    pub fn territory() -> TerritoryRef {
        TerritoryRef {
            id: "ashford".into(),
            name: "Ashford Parish".into(),
            faction: FactionId::ChurchInquisition,
            tier: TerritoryTier::Outpost,
        }
    }

    pub const BATTLE_TYPE: BattleType = BattleType::Conquer;
}

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use super::demo::{self, DemoWorld};
    use warhost::consts::{ARENA_HEIGHT, ARENA_WIDTH, FRAME_DT};
    use warhost::renderer::{RenderState, SQUAD_GRAB_RADIUS, build_frame};
    use warhost::{ArmyStack, BattlePhase, Battlefield, Settings, Side, StackId, UnitRegistry};

    /// Game instance holding all state
    struct Game {
        field: Battlefield,
        world: DemoWorld,
        roster: Vec<ArmyStack>,
        render_state: Option<RenderState>,
        last_time: f64,
        /// Device pixels per CSS pixel
        dpr: f32,
        dragging: Option<StackId>,
    }

    impl Game {
        fn new(dpr: f32) -> Self {
            let registry = Arc::new(UnitRegistry::standard());
            let roster = demo::roster(&registry);
            Self {
                field: Battlefield::new(registry, Settings::load()),
                world: DemoWorld::default(),
                roster,
                render_state: None,
                last_time: 0.0,
                dpr,
                dragging: None,
            }
        }

        fn begin(&mut self, seed: u64) {
            if self.roster.is_empty() {
                self.roster = demo::roster(self.field.registry());
            }
            match self.field.init_battle(&self.roster, demo::territory(), demo::BATTLE_TYPE, seed) {
                Ok(()) => log::info!("Battle initialized with seed: {}", seed),
                Err(e) => log::error!("Could not start battle: {e}"),
            }
        }

        fn update(&mut self, dt: f32) {
            if let Some(report) = self.field.advance(dt, &mut self.world) {
                log::info!("{} ({} rounds)", report.notice.message(), report.rounds);
                for line in &report.loot {
                    log::info!("{line}");
                }
                self.roster = report.roster;
            }
        }

        fn render(&mut self) {
            let vertices = build_frame(&self.field, self.dragging);
            let shake = self.field.visual().shake_offset;
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices, shake) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = render_state.viewport.size;
                        render_state.resize(size.x as u32, size.y as u32);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Pointer offset (CSS pixels) to arena pixels
        fn to_arena(&self, event: &PointerEvent) -> Option<Vec2> {
            let viewport = self.render_state.as_ref()?.viewport;
            let screen = Vec2::new(event.offset_x() as f32, event.offset_y() as f32) * self.dpr;
            Some(viewport.screen_to_arena(screen))
        }

        fn pick_squad(&self, at: Vec2) -> Option<StackId> {
            let session = self.field.session()?;
            let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
            session
                .player
                .iter()
                .filter_map(|s| session.position(s.id).map(|p| (s.id, (p * arena).distance(at))))
                .filter(|(_, d)| *d <= SQUAD_GRAB_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id)
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(el) = document.get_element_by_id("status") else {
                return;
            };
            let text = match self.field.session() {
                None => "No battle".to_string(),
                Some(s) => match s.phase {
                    BattlePhase::Deployment => format!("Deploy your forces at {}", s.territory.name),
                    BattlePhase::Combat => format!(
                        "{:.0}%  Undead {}  Defenders {}",
                        s.timeline.progress() * 100.0,
                        self.field.visual().live_count(Side::Player),
                        self.field.visual().live_count(Side::Enemy),
                    ),
                    BattlePhase::Results => s
                        .report
                        .as_ref()
                        .map(|r| r.notice.message().to_string())
                        .unwrap_or_default(),
                },
            };
            el.set_text_content(Some(&text));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger: {e}").into());
        }

        log::info!("Warhost starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let game = Rc::new(RefCell::new(Game::new(dpr as f32)));
        let seed = js_sys::Date::now() as u64;
        game.borrow_mut().begin(seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {e}");
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
                log::error!("Failed to get adapter: {e}");
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        match RenderState::new(surface, &adapter, width, height, arena).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {e}");
                return;
            }
        }

        setup_pointer_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Warhost running!");
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Grab a deployment marker
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.field.phase() != Some(BattlePhase::Deployment) {
                    return;
                }
                let picked = g.to_arena(&event).and_then(|at| g.pick_squad(at));
                g.dragging = picked;
            });
            let _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag it, in normalized arena coordinates
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let Some(id) = g.dragging else {
                    return;
                };
                let Some(at) = g.to_arena(&event) else {
                    return;
                };
                if let Err(e) = g.field.update_deployment_position(id, at.x / ARENA_WIDTH, at.y / ARENA_HEIGHT) {
                    log::warn!("{e}");
                    g.dragging = None;
                }
            });
            let _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().dragging = None;
            });
            let _ = canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // Start the fight, or line up the next one from the results screen
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                match g.field.phase() {
                    Some(BattlePhase::Deployment) => {
                        if let Err(e) = g.field.start_battle() {
                            log::warn!("{e}");
                        }
                    }
                    Some(BattlePhase::Results) | None => {
                        if let Err(e) = g.field.close_battle() {
                            log::warn!("{e}");
                            return;
                        }
                        g.begin(js_sys::Date::now() as u64);
                    }
                    Some(BattlePhase::Combat) => {}
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("retreat-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                match g.field.retreat() {
                    Ok(report) => {
                        log::info!("{}", report.notice.message());
                        g.roster = report.roster;
                    }
                    Err(e) => log::warn!("{e}"),
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("pause-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let paused = !g.field.is_paused();
                g.field.set_paused(paused);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.hidden() {
                game.borrow_mut().field.set_paused(true);
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
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
    use std::sync::Arc;

    use warhost::consts::FRAME_DT;
    use warhost::{Battlefield, QualityPreset, Settings, UnitRegistry};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(demo::DEMO_SEED);
    log::info!("Warhost (native) starting with seed {seed}");

    let registry = Arc::new(UnitRegistry::standard());
    let roster = demo::roster(&registry);
    let mut field = Battlefield::new(registry, Settings::from_preset(QualityPreset::Low));
    let mut world = demo::DemoWorld::default();

    if let Err(e) = field
        .init_battle(&roster, demo::territory(), demo::BATTLE_TYPE, seed)
        .and_then(|()| field.start_battle())
    {
        log::error!("{e}");
        std::process::exit(1);
    }

    // Drive the view at a steady 60 Hz until the timeline ends
    let mut frames = 0u32;
    let report = loop {
        if let Some(report) = field.advance(FRAME_DT, &mut world) {
            break report;
        }
        frames += 1;
        if frames % 600 == 0 {
            log::debug!("{} frames, {} particles alive", frames, field.visual().particles.iter().filter(|p| !p.dead).count());
        }
    };

    log::info!("{} after {} rounds ({} frames)", report.notice.message(), report.rounds, frames);
    log::info!(
        "Undead lost {} of {}, defenders lost {} of {}",
        report.player_casualties.lost,
        report.player_casualties.initial,
        report.enemy_casualties.lost,
        report.enemy_casualties.initial,
    );
    for line in &report.loot {
        log::info!("{line}");
    }
    match serde_json::to_string_pretty(&report.roster) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize roster: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
