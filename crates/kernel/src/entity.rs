use glam::Vec2;
use skyview_common::KeyboardSnapshot;

/// Per-tick data handed to every entity during `Simulation::update`.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub tick: u64,
    /// Fixed step length in seconds.
    pub dt: f64,
    pub keys: &'a KeyboardSnapshot,
}

/// Render-phase hook. Invoked once per render with the frame delta, before
/// the camera places the stage.
pub trait RenderHook {
    fn handle_render(&mut self, delta: f64);
}

/// A simulated object. Behaviour lives in implementors; the kernel only
/// schedules it.
pub trait Entity {
    /// Advance one fixed step.
    fn update(&mut self, ctx: &TickContext<'_>);

    /// World-space position, used for camera targeting.
    fn position(&self) -> Vec2;

    /// Entities that draw something return `Some(self)` here.
    fn render_hook(&mut self) -> Option<&mut dyn RenderHook> {
        None
    }

    /// Release anything the entity holds outside the simulation.
    fn dispose(&mut self) {}
}

/// The simulation core as seen by the client loop.
pub trait Simulation {
    /// One simulation step. `keys` is the keyboard state sampled for this tick.
    fn update(&mut self, keys: &KeyboardSnapshot);

    /// Visit every live entity in a stable order.
    fn for_each_entity_mut(&mut self, f: &mut dyn FnMut(&mut dyn Entity));

    /// Where the camera should look, if anywhere.
    fn camera_target(&self) -> Option<Vec2> {
        None
    }

    /// Dispose every entity. Must be safe to call more than once.
    fn destroy(&mut self);
}
