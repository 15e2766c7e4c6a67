//! End-to-end behaviour of the client loop against recording fakes.

use glam::Vec2;
use skyview_assets::{AssetLoader, LoadError, MemoryLoader};
use skyview_client::{EngineConfig, FixedView, FollowTarget, GameEngine};
use skyview_common::{Key, KeyboardSnapshot, Rect, Size};
use skyview_input::{ContainerMetrics, HeadlessHost, HostEvent, HostEventKind};
use skyview_kernel::{
    Entity, FixedStepLoop, FrameLoop, FrameTicks, RenderHook, Simulation, TickContext,
};
use skyview_render::{DisplayObject, Layer, Renderer};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

type Log = Rc<RefCell<Vec<String>>>;

const FRAME: Duration = Duration::from_millis(16);

/// Runs one update and one render per frame while running. Panics on a
/// double start or double stop.
#[derive(Debug, Default)]
struct CountingLoop {
    running: bool,
    starts: u32,
    stops: u32,
}

impl FrameLoop for CountingLoop {
    fn start(&mut self) {
        assert!(!self.running, "loop started twice");
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        assert!(self.running, "loop stopped twice");
        self.running = false;
        self.stops += 1;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn advance(&mut self, elapsed: Duration) -> FrameTicks {
        if !self.running {
            return FrameTicks::idle();
        }
        FrameTicks {
            updates: 1,
            render: true,
            delta: elapsed.as_secs_f64(),
        }
    }
}

struct HookEntity {
    log: Log,
}

impl RenderHook for HookEntity {
    fn handle_render(&mut self, _delta: f64) {
        self.log.borrow_mut().push("hook".into());
    }
}

impl Entity for HookEntity {
    fn update(&mut self, _ctx: &TickContext<'_>) {}

    fn position(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn render_hook(&mut self) -> Option<&mut dyn RenderHook> {
        Some(self)
    }
}

struct RecordingSim {
    log: Log,
    entities: Vec<Box<dyn Entity>>,
    target: Option<Vec2>,
    destroys: Rc<Cell<u32>>,
}

impl RecordingSim {
    fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            entities: vec![Box::new(HookEntity { log: log.clone() })],
            target: None,
            destroys: Rc::default(),
        }
    }
}

impl Simulation for RecordingSim {
    fn update(&mut self, keys: &KeyboardSnapshot) {
        self.log
            .borrow_mut()
            .push(format!("update left={}", keys.is_held(Key::Left)));
        if keys.is_held(Key::Right) {
            self.target = Some(self.target.unwrap_or_default() + Vec2::new(10.0, 0.0));
        }
    }

    fn for_each_entity_mut(&mut self, f: &mut dyn FnMut(&mut dyn Entity)) {
        for e in &mut self.entities {
            f(e.as_mut());
        }
    }

    fn camera_target(&self) -> Option<Vec2> {
        self.target
    }

    fn destroy(&mut self) {
        self.destroys.set(self.destroys.get() + 1);
        self.entities.clear();
    }
}

/// Logs each draw with the stage position it observed.
struct RecordingRenderer {
    log: Log,
    sizes: Vec<Size>,
}

impl Renderer for RecordingRenderer {
    type Output = Vec2;

    fn resize(&mut self, size: Size) {
        self.sizes.push(size);
    }

    fn render(&mut self, root: &Layer) -> Vec2 {
        let stage_pos = match root.child(0) {
            Some(DisplayObject::Layer(stage)) => stage.position(),
            _ => Vec2::NAN,
        };
        self.log
            .borrow_mut()
            .push(format!("draw at ({}, {})", stage_pos.x, stage_pos.y));
        stage_pos
    }
}

type Engine = GameEngine<RecordingSim, CountingLoop, HeadlessHost, RecordingRenderer>;

fn build(size: Option<Size>, loader: Box<dyn AssetLoader>) -> (Engine, Log) {
    build_with(CountingLoop::default(), size, loader)
}

fn build_with<L: FrameLoop>(
    frame_loop: L,
    size: Option<Size>,
    loader: Box<dyn AssetLoader>,
) -> (GameEngine<RecordingSim, L, HeadlessHost, RecordingRenderer>, Log) {
    let log = Log::default();
    let engine = GameEngine::new(
        EngineConfig::default(),
        RecordingSim::new(&log),
        frame_loop,
        HeadlessHost::new(size.map(ContainerMetrics::new)),
        RecordingRenderer {
            log: log.clone(),
            sizes: Vec::new(),
        },
        loader,
    );
    (engine, log)
}

fn engine() -> (Engine, Log) {
    build(Some(Size::new(800, 600)), Box::new(MemoryLoader::new()))
}

#[test]
fn end_to_end_800x600() {
    let (engine, _) = engine();
    let root = engine.root();
    assert_eq!(root.child_count(), 2);
    assert_eq!(engine.layers(), vec![engine.stage().clone(), engine.ui().clone()]);

    let view = engine.camera().view_box();
    assert_eq!(
        engine.screen_to_world_position(400.0, 300.0),
        Vec2::new(400.0, 300.0) + view.origin()
    );
    assert_eq!(engine.renderer().sizes, vec![Size::new(800, 600)]);
}

#[test]
fn layer_order_follows_calls_and_indices() {
    let (mut engine, _) = engine();
    let mut expected = engine.layers();
    for index in [None, Some(0), None, Some(2), Some(100), Some(1), None] {
        let layer = engine.create_layer(index);
        match index {
            Some(i) => expected.insert(i.min(expected.len()), layer),
            None => expected.push(layer),
        }
    }
    assert_eq!(engine.layers(), expected);
}

#[test]
fn screen_to_world_inverts_forward_transform() {
    let strategies: Vec<Box<dyn skyview_client::CameraStrategy>> = vec![
        Box::new(FixedView::default()),
        Box::new(FixedView::new(Vec2::new(-120.0, 33.5), 3.0)),
        Box::new(FixedView::new(Vec2::new(5000.0, -7.0), 0.25)),
        Box::new(FollowTarget::new(1.5)),
        Box::new(FollowTarget::new(2.0).with_bounds(Rect::new(0.0, 0.0, 500.0, 500.0))),
    ];
    for strategy in strategies {
        let (mut engine, _) = engine();
        engine.simulation_mut().target = Some(Vec2::new(321.0, -45.0));
        engine.set_camera_strategy(strategy);
        engine.render(0.0);

        for world in [Vec2::ZERO, Vec2::new(12.5, -99.0), Vec2::new(1e4, 3e3)] {
            let screen = engine.world_to_screen_position(world.x, world.y);
            let back = engine.screen_to_world_position(screen.x, screen.y);
            assert!(
                back.abs_diff_eq(world, 1e-2),
                "round trip {world} -> {screen} -> {back}"
            );
        }
    }
}

#[test]
fn degenerate_scale_maps_to_identity() {
    let (mut engine, _) = engine();
    engine.set_camera_strategy(Box::new(FixedView::new(Vec2::new(10.0, 20.0), 0.0)));
    engine.render(0.0);
    engine.stage().set_scale(Vec2::ZERO);

    let w = engine.screen_to_world_position(5.0, 5.0);
    assert!(w.is_finite());
    assert_eq!(w, Vec2::new(15.0, 25.0));
}

#[test]
fn missing_container_degrades_to_fallback_surface() {
    let (engine, _) = build(None, Box::new(MemoryLoader::new()));
    assert_eq!(engine.surface_size(), Size::new(1, 1));
    assert_eq!(engine.renderer().sizes, vec![Size::new(1, 1)]);
}

#[test]
fn chained_add_load_merges_with_existing_resources() {
    let loader = MemoryLoader::new()
        .with_file("a.png", "A")
        .with_file("b.json", r#"{"hp": 3}"#)
        .with_file("old.txt", "O");
    let (mut engine, _) = build(Some(Size::new(800, 600)), Box::new(loader));

    let mut first = engine.add(("old", "old.txt")).load();
    engine.poll_loads();
    assert!(first.try_take().unwrap().is_ok());

    let mut ticket = engine.add(("a", "a.png")).add(("b", "b.json")).load();
    assert!(ticket.try_take().is_none());
    assert_eq!(engine.poll_loads(), 1);

    let table = ticket.try_take().unwrap().unwrap();
    for key in ["a", "b", "old"] {
        assert!(table.contains(key), "missing {key}");
    }
    assert_eq!(table.get("b").unwrap().json.as_ref().unwrap()["hp"], 3);
    assert_eq!(engine.resources().len(), 3);
    assert!(ticket.try_take().is_none());
}

#[test]
fn partial_failure_still_merges_loaded_assets() {
    let loader = MemoryLoader::new().with_file("a.png", "A");
    let (mut engine, _) = build(Some(Size::new(800, 600)), Box::new(loader));

    let mut ticket = engine.add_all([("a", "a.png"), ("gone", "gone.png")]).load();
    engine.poll_loads();

    match ticket.try_take() {
        Some(Err(LoadError::AssetsFailed { failures })) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].key, "gone");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(engine.resources().contains("a"));
    assert!(!engine.resources().contains("gone"));
}

#[test]
fn loop_keeps_ticking_while_load_in_flight() {
    let (loader, gate) = MemoryLoader::gated();
    let loader = loader.with_file("a.png", "A");
    let (mut engine, _) = build(Some(Size::new(800, 600)), Box::new(loader));
    engine.start();

    let mut ticket = engine.add(("a", "a.png")).load();
    for _ in 0..3 {
        assert!(engine.frame(FRAME).is_some());
    }
    assert!(ticket.try_take().is_none());
    assert_eq!(engine.loads_in_flight(), 1);

    gate.release_all();
    engine.frame(FRAME);
    assert!(ticket.try_take().unwrap().unwrap().contains("a"));
    assert_eq!(engine.update_count(), 4);
}

#[test]
fn abandoned_load_reports_disconnect() {
    let (loader, gate) = MemoryLoader::gated();
    let (mut engine, _) = build(Some(Size::new(800, 600)), Box::new(loader));

    let mut ticket = engine.add("x.png").load();
    gate.abandon_all();
    engine.poll_loads();
    assert_eq!(ticket.try_take(), Some(Err(LoadError::LoaderDisconnected)));
}

#[test]
fn blur_before_start_is_no_op() {
    let (mut engine, _) = engine();
    engine.host_mut().emit(HostEvent::Blur);
    engine.frame(FRAME);

    assert!(!engine.frame_loop().is_running());
    assert_eq!(engine.frame_loop().stops, 0);
    assert_eq!(engine.host().listener_count(HostEventKind::Focus), 0);
    assert_eq!(engine.focus().suspensions(), 0);
}

#[test]
fn repeated_blur_then_focus_stops_once_and_starts_once() {
    let (mut engine, _) = engine();
    engine.start();

    for event in [HostEvent::Blur, HostEvent::Blur, HostEvent::Focus, HostEvent::Focus] {
        engine.host_mut().emit(event);
    }
    engine.pump_events();

    let lp = engine.frame_loop();
    assert_eq!(lp.stops, 1);
    assert_eq!(lp.starts, 2, "initial start plus one resume");
    assert!(lp.is_running());
    assert_eq!(engine.host().listener_count(HostEventKind::Focus), 0);
}

#[test]
fn blur_focus_cycles_leave_no_focus_listeners() {
    let (mut engine, _) = engine();
    engine.start();

    for _ in 0..2 {
        engine.host_mut().emit(HostEvent::Blur);
        engine.host_mut().emit(HostEvent::Focus);
    }
    engine.frame(FRAME);

    assert_eq!(engine.frame_loop().stops, 2);
    assert_eq!(engine.frame_loop().starts, 3);
    assert_eq!(engine.host().listener_count(HostEventKind::Focus), 0);
    assert_eq!((engine.focus().suspensions(), engine.focus().resumes()), (2, 2));
}

#[test]
fn suspended_engine_does_not_tick() {
    let (mut engine, log) = engine();
    engine.start();
    engine.host_mut().emit(HostEvent::Blur);

    assert!(engine.frame(FRAME).is_none());
    assert_eq!(engine.update_count(), 0);
    assert!(log.borrow().is_empty());

    engine.host_mut().emit(HostEvent::Focus);
    assert!(engine.frame(FRAME).is_some());
    assert_eq!(engine.update_count(), 1);
}

#[test]
fn refocus_frame_runs_no_catch_up_updates() {
    let (mut engine, _) = build_with(
        EngineConfig::default().frame_loop(),
        Some(Size::new(800, 600)),
        Box::new(MemoryLoader::new()),
    );
    engine.start();
    engine.frame(FRAME);
    assert!(engine.frame(Duration::from_millis(60)).is_some());
    let before_blur = engine.update_count();
    assert_eq!(before_blur, 3);

    engine.host_mut().emit(HostEvent::Blur);
    assert!(engine.frame(FRAME).is_none());

    // The host reports the whole time spent unfocused.
    engine.host_mut().emit(HostEvent::Focus);
    assert!(engine.frame(Duration::from_secs(10)).is_some());
    assert_eq!(engine.update_count(), before_blur);

    engine.frame(Duration::from_millis(60));
    assert_eq!(engine.update_count(), before_blur + 3);
}

#[test]
fn render_and_create_layer_after_destroy_touch_nothing() {
    let (mut engine, log) = engine();
    engine.start();
    engine.frame(FRAME);
    let renders = engine.render_count();
    engine.destroy();
    log.borrow_mut().clear();

    let layer = engine.create_layer(None);
    assert!(engine.layers().is_empty());
    assert_eq!(engine.root().child_count(), 0);
    assert_eq!(layer.child_count(), 0);

    engine.update();
    let drawn = engine.render(0.016);
    assert!(drawn.is_nan());
    assert_eq!(*log.borrow(), vec!["draw at (NaN, NaN)".to_string()]);
    assert_eq!(engine.render_count(), renders);
    assert_eq!(engine.update_count(), 1);
}

#[test]
fn focus_after_stop_does_not_restart() {
    let (mut engine, _) = engine();
    engine.start();
    engine.host_mut().emit(HostEvent::Blur);
    engine.pump_events();
    engine.stop();

    engine.host_mut().emit(HostEvent::Focus);
    engine.pump_events();
    assert!(!engine.frame_loop().is_running());
    assert_eq!(engine.host().listener_count(HostEventKind::Focus), 0);
}

#[test]
fn tick_runs_keyboard_update_hooks_camera_draw_in_order() {
    let (mut engine, log) = engine();
    engine.set_camera_strategy(Box::new(FollowTarget::new(1.0)));
    engine.start();

    engine.host_mut().emit(HostEvent::Key {
        key: Key::Left,
        pressed: true,
    });
    engine.host_mut().emit(HostEvent::Key {
        key: Key::Right,
        pressed: true,
    });
    let drawn = engine.frame(FRAME).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "update left=true".to_string(),
            "hook".to_string(),
            "draw at (390, 300)".to_string(),
        ]
    );
    // Target moved to (10, 0) during update; the draw saw this frame's camera.
    assert_eq!(drawn, Vec2::new(390.0, 300.0));
    assert_eq!(engine.camera().view_box().center(), Vec2::new(10.0, 0.0));
}

#[test]
fn destroy_twice_is_safe_and_silences_events() {
    let (mut engine, _) = engine();
    engine.start();
    engine.host_mut().emit(HostEvent::Blur);
    engine.pump_events();
    let destroys = engine.simulation().destroys.clone();

    engine.destroy();
    engine.destroy();

    assert_eq!(engine.host().total_listeners(), 0);
    assert_eq!(destroys.get(), 1);
    assert!(!engine.is_running());

    let mouse = engine.mouse_position();
    let surface = engine.surface_size();
    for event in [
        HostEvent::PointerMove {
            client_x: 50.0,
            client_y: 60.0,
        },
        HostEvent::Blur,
        HostEvent::Focus,
        HostEvent::Resize {
            size: Size::new(10, 10),
        },
    ] {
        engine.host_mut().emit(event);
    }
    assert_eq!(engine.pump_events(), 0);
    assert_eq!(engine.mouse_position(), mouse);
    assert_eq!(engine.surface_size(), surface);
    assert_eq!(engine.frame_loop().starts, 1);
    assert!(engine.frame(FRAME).is_none());

    engine.start();
    assert!(!engine.is_running());
}

#[test]
fn drop_destroys_simulation() {
    let (engine, _) = engine();
    let destroys = engine.simulation().destroys.clone();
    drop(engine);
    assert_eq!(destroys.get(), 1);
}
