use crate::camera::{Camera, CameraStrategy, FixedView};
use crate::config::EngineConfig;
use crate::focus::FocusSuspension;
use glam::Vec2;
use skyview_assets::{
    AssetDescriptor, AssetLoader, BatchPoll, LoadCompleter, LoadError, LoadTicket, PendingBatch,
    ResourceTable,
};
use skyview_common::{Color, KeyboardSnapshot, Size};
use skyview_input::{
    HostEnvironment, HostEvent, HostEventKind, Keyboard, ListenerId, PointerTracker,
};
use skyview_kernel::{Entity, FrameLoop, FrameTimer, Simulation};
use skyview_render::{DisplayObject, Layer, Renderer, Shape, ShapeHandle};
use std::collections::BTreeMap;
use std::time::Duration;

const VIEW_BOX_COLOR: Color = Color(0xFF0000);

/// What a listener registered by the engine does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    PointerMove,
    Blur,
    Key,
    Resize,
    Resume,
}

#[derive(Debug)]
struct InFlight {
    batch: PendingBatch,
    completer: LoadCompleter,
}

/// The client render/update loop.
///
/// Drive it by calling [`GameEngine::frame`] once per host frame with the
/// real time elapsed since the previous call.
pub struct GameEngine<S, L, H, R>
where
    S: Simulation,
    L: FrameLoop,
    H: HostEnvironment,
    R: Renderer,
{
    config: EngineConfig,
    simulation: S,
    frame_loop: L,
    host: H,
    renderer: R,
    loader: Box<dyn AssetLoader>,

    root: Layer,
    stage: Layer,
    ui: Layer,
    camera: Camera,
    view_box_outline: Option<ShapeHandle>,
    surface: Size,

    keyboard: Keyboard,
    pointer: PointerTracker,
    focus: FocusSuspension,
    handlers: BTreeMap<ListenerId, Handler>,

    queue: Vec<AssetDescriptor>,
    in_flight: Vec<InFlight>,
    resources: ResourceTable,

    running: bool,
    destroyed: bool,
    timer: FrameTimer,
    update_count: u64,
    render_count: u64,
}

impl<S, L, H, R> GameEngine<S, L, H, R>
where
    S: Simulation,
    L: FrameLoop,
    H: HostEnvironment,
    R: Renderer,
{
    /// Build the engine: size the surface from the host container, create
    /// the stage and UI layers, and register the input listeners.
    pub fn new(
        config: EngineConfig,
        simulation: S,
        frame_loop: L,
        mut host: H,
        mut renderer: R,
        loader: Box<dyn AssetLoader>,
    ) -> Self {
        let surface = resolve_surface(host.container().map(|c| c.size), config.fallback_surface);
        renderer.resize(surface);

        let root = Layer::new("root");
        let stage = attach_layer(&root, "stage", None);
        let ui = attach_layer(&root, "ui", None);

        let camera = Camera::new(
            surface,
            Box::new(FixedView::new(Vec2::ZERO, config.camera_zoom)),
        );

        let view_box_outline = config.debug_view_box.then(|| {
            let outline = ShapeHandle::new(Shape::outline(
                Vec2::ZERO,
                surface.as_vec2(),
                VIEW_BOX_COLOR,
                1.0,
            ));
            stage.add_child(outline.clone());
            outline
        });

        let mut handlers = BTreeMap::new();
        for (kind, handler) in [
            (HostEventKind::PointerMove, Handler::PointerMove),
            (HostEventKind::Blur, Handler::Blur),
            (HostEventKind::Key, Handler::Key),
            (HostEventKind::Resize, Handler::Resize),
        ] {
            handlers.insert(host.subscribe(kind), handler);
        }

        tracing::info!(
            width = surface.width,
            height = surface.height,
            "engine created"
        );

        Self {
            config,
            simulation,
            frame_loop,
            host,
            renderer,
            loader,
            root,
            stage,
            ui,
            camera,
            view_box_outline,
            surface,
            keyboard: Keyboard::new(),
            pointer: PointerTracker::new(),
            focus: FocusSuspension::new(),
            handlers,
            queue: Vec::new(),
            in_flight: Vec::new(),
            resources: ResourceTable::new(),
            running: false,
            destroyed: false,
            timer: FrameTimer::default(),
            update_count: 0,
            render_count: 0,
        }
    }

    // ---- layers ----

    /// Create an empty layer. `None` appends it above every other layer;
    /// an index inserts it there, clamped to the end.
    ///
    /// After `destroy()` the layer is returned detached and is never drawn.
    pub fn create_layer(&mut self, index: Option<usize>) -> Layer {
        let label = format!("layer-{}", self.root.child_count());
        if self.destroyed {
            tracing::warn!(%label, "create_layer after destroy, layer left detached");
            return Layer::new(label);
        }
        attach_layer(&self.root, label, index)
    }

    /// The world layer the camera moves.
    pub fn stage(&self) -> &Layer {
        &self.stage
    }

    /// The screen-fixed UI layer.
    pub fn ui(&self) -> &Layer {
        &self.ui
    }

    /// The container every layer is attached to.
    pub fn root(&self) -> &Layer {
        &self.root
    }

    /// Layers in paint order.
    pub fn layers(&self) -> Vec<Layer> {
        self.root
            .children()
            .into_iter()
            .filter_map(|child| match child {
                DisplayObject::Layer(layer) => Some(layer),
                DisplayObject::Shape(_) => None,
            })
            .collect()
    }

    // ---- camera ----

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera_strategy(&mut self, strategy: Box<dyn CameraStrategy>) {
        self.camera.set_strategy(strategy);
    }

    /// Surface pixel to world coordinate, using the stage's current scale
    /// and the camera's current view box.
    pub fn screen_to_world_position(&self, x: f32, y: f32) -> Vec2 {
        self.camera.screen_to_world(&self.stage, Vec2::new(x, y))
    }

    pub fn world_to_screen_position(&self, x: f32, y: f32) -> Vec2 {
        self.camera.world_to_screen(&self.stage, Vec2::new(x, y))
    }

    /// Last pointer position in container pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.pointer.position()
    }

    pub fn mouse_world_position(&self) -> Vec2 {
        let p = self.pointer.position();
        self.screen_to_world_position(p.x, p.y)
    }

    // ---- resources ----

    /// Queue one asset for the next `load()`. Queuing while a load is
    /// running targets the next one; do not interleave.
    pub fn add(&mut self, descriptor: impl Into<AssetDescriptor>) -> &mut Self {
        let descriptor = descriptor.into();
        if self.queue.iter().any(|d| d.key == descriptor.key) {
            tracing::warn!(key = %descriptor.key, "asset key already queued, ignoring");
        } else {
            self.queue.push(descriptor);
        }
        self
    }

    pub fn add_all<I>(&mut self, descriptors: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<AssetDescriptor>,
    {
        for d in descriptors {
            self.add(d);
        }
        self
    }

    /// Number of descriptors waiting for `load()`.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Start loading everything queued.
    ///
    /// The ticket resolves once, during a later `poll_loads()`, with the
    /// merged resource table or the failures. Assets that did load are merged
    /// even when others failed. An empty queue resolves immediately.
    pub fn load(&mut self) -> LoadTicket {
        let batch = std::mem::take(&mut self.queue);
        if batch.is_empty() {
            return LoadTicket::resolved(Ok(self.resources.clone()));
        }
        tracing::info!(count = batch.len(), "load started");
        let batch = self.loader.begin(batch);
        let (completer, ticket) = LoadTicket::pair();
        self.in_flight.push(InFlight { batch, completer });
        ticket
    }

    /// Collect finished loads. Returns how many completed.
    pub fn poll_loads(&mut self) -> usize {
        let mut completed = 0;
        for flight in std::mem::take(&mut self.in_flight) {
            let result = match flight.batch.try_finish() {
                BatchPoll::Pending => {
                    self.in_flight.push(flight);
                    continue;
                }
                BatchPoll::Done(outcome) => {
                    let loaded = outcome.loaded.len();
                    self.resources.merge(outcome.loaded.into_iter().collect());
                    if outcome.failures.is_empty() {
                        tracing::info!(loaded, total = self.resources.len(), "load complete");
                        Ok(self.resources.clone())
                    } else {
                        tracing::warn!(
                            loaded,
                            failed = outcome.failures.len(),
                            "load completed with failures"
                        );
                        Err(LoadError::AssetsFailed {
                            failures: outcome.failures,
                        })
                    }
                }
                BatchPoll::Disconnected => {
                    tracing::warn!("asset loader disconnected");
                    Err(LoadError::LoaderDisconnected)
                }
            };
            flight.completer.complete(result);
            completed += 1;
        }
        completed
    }

    pub fn loads_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    // ---- lifecycle ----

    pub fn start(&mut self) {
        if self.destroyed {
            tracing::warn!("start after destroy ignored");
            return;
        }
        self.running = true;
        if !self.frame_loop.is_running() {
            self.frame_loop.start();
        }
        tracing::info!("engine started");
    }

    pub fn stop(&mut self) {
        self.running = false;
        if self.frame_loop.is_running() {
            self.frame_loop.stop();
        }
        tracing::info!("engine stopped");
    }

    /// Application-level running flag, independent of the loop's own state.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one host frame: deliver host events, collect loads, then run the
    /// updates and render the loop asks for. Returns the rendered output, if
    /// a render ran.
    pub fn frame(&mut self, elapsed: Duration) -> Option<R::Output> {
        if self.destroyed {
            return None;
        }
        self.pump_events();
        self.poll_loads();

        let ticks = self.frame_loop.advance(elapsed);
        for _ in 0..ticks.updates {
            self.update();
        }
        if !ticks.render {
            return None;
        }
        self.timer.record(elapsed);
        Some(self.render(ticks.delta))
    }

    /// One update tick: sample the keyboard, then step the simulation.
    /// Does nothing after `destroy()`.
    pub fn update(&mut self) {
        if self.destroyed {
            return;
        }
        let keys = self.keyboard.update();
        self.simulation.update(keys);
        self.update_count += 1;
    }

    /// One render: entity hooks, camera placement, then the draw.
    ///
    /// After `destroy()` only the draw runs, against the cleared root, and
    /// the render is not counted.
    pub fn render(&mut self, delta: f64) -> R::Output {
        if self.destroyed {
            tracing::warn!("render after destroy draws an empty scene");
            return self.renderer.render(&self.root);
        }
        self.simulation.for_each_entity_mut(&mut |entity: &mut dyn Entity| {
            if let Some(hook) = entity.render_hook() {
                hook.handle_render(delta);
            }
        });

        let target = self.simulation.camera_target();
        self.camera.place_container(&self.stage, target);

        if let Some(outline) = &self.view_box_outline {
            let view = self.camera.view_box();
            outline.update(|s| {
                s.position = view.origin();
                s.size = view.size();
            });
        }

        self.render_count += 1;
        self.renderer.render(&self.root)
    }

    /// Deliver queued host events to the engine's listeners. Returns the
    /// number of listener invocations.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(dispatch) = self.host.poll_event() {
            for id in dispatch.listeners {
                // An earlier listener in this dispatch may have removed it.
                if !self.host.is_subscribed(id) {
                    continue;
                }
                let Some(handler) = self.handler_for(id) else {
                    continue;
                };
                self.handle(id, handler, dispatch.event);
                handled += 1;
            }
        }
        handled
    }

    fn handler_for(&self, id: ListenerId) -> Option<Handler> {
        if self.focus.resume_listener() == Some(id) {
            return Some(Handler::Resume);
        }
        self.handlers.get(&id).copied()
    }

    fn handle(&mut self, id: ListenerId, handler: Handler, event: HostEvent) {
        match (handler, event) {
            (Handler::PointerMove, HostEvent::PointerMove { client_x, client_y }) => {
                let offset = self.host.container().map(|c| c.offset).unwrap_or(Vec2::ZERO);
                self.pointer.handle_move(Vec2::new(client_x, client_y), offset);
            }
            (Handler::Blur, HostEvent::Blur) => {
                self.keyboard.release_all();
                self.focus
                    .on_blur(self.running, &mut self.frame_loop, &mut self.host);
            }
            (Handler::Resume, HostEvent::Focus) => {
                self.focus
                    .on_focus(id, self.running, &mut self.frame_loop, &mut self.host);
            }
            (Handler::Key, HostEvent::Key { key, pressed }) => {
                self.keyboard.key_event(key, pressed);
            }
            (Handler::Resize, HostEvent::Resize { size }) => self.resize(size),
            (handler, event) => {
                tracing::debug!(?handler, ?event, "event does not match listener");
            }
        }
    }

    /// Resize the surface. A zero size degrades to the fallback.
    pub fn resize(&mut self, size: Size) {
        let size = resolve_surface(Some(size), self.config.fallback_surface);
        if size == self.surface {
            return;
        }
        self.surface = size;
        self.camera.set_viewport(size);
        self.renderer.resize(size);
        tracing::debug!(width = size.width, height = size.height, "surface resized");
    }

    /// Tear down: remove every listener the engine registered, stop the
    /// loop and destroy the simulation. Safe to call more than once.
    ///
    /// Loads already in flight can still be collected with `poll_loads()`.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        for id in std::mem::take(&mut self.handlers).into_keys() {
            self.host.unsubscribe(id);
        }
        self.focus.cancel(&mut self.host);

        self.running = false;
        if self.frame_loop.is_running() {
            self.frame_loop.stop();
        }
        self.simulation.destroy();
        self.root.clear();
        tracing::info!(
            updates = self.update_count,
            renders = self.render_count,
            "engine destroyed"
        );
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ---- accessors ----

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    pub fn keyboard(&self) -> &KeyboardSnapshot {
        self.keyboard.snapshot()
    }

    pub fn focus(&self) -> &FocusSuspension {
        &self.focus
    }

    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut S {
        &mut self.simulation
    }

    pub fn frame_loop(&self) -> &L {
        &self.frame_loop
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

impl<S, L, H, R> Drop for GameEngine<S, L, H, R>
where
    S: Simulation,
    L: FrameLoop,
    H: HostEnvironment,
    R: Renderer,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

fn attach_layer(root: &Layer, label: impl Into<String>, index: Option<usize>) -> Layer {
    let layer = Layer::new(label);
    let at = match index {
        Some(i) => root.add_child_at(layer.clone(), i),
        None => root.add_child(layer.clone()),
    };
    tracing::debug!(label = %layer.label(), index = at, "layer created");
    layer
}

fn resolve_surface(size: Option<Size>, fallback: Size) -> Size {
    match size {
        Some(size) if !size.is_empty() => size,
        other => {
            let fallback = if fallback.is_empty() {
                Size::default()
            } else {
                fallback
            };
            tracing::warn!(
                container = ?other,
                width = fallback.width,
                height = fallback.height,
                "no usable container size, using fallback surface"
            );
            fallback
        }
    }
}
