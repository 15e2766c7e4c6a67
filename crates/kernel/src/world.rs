use crate::entity::{Entity, Simulation, TickContext};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use skyview_common::{EntityId, KeyboardSnapshot};
use std::collections::{BTreeMap, VecDeque};

/// Oldest events are dropped once the log holds this many.
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// An event record produced by every mutation to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Entity was added.
    Spawned { id: EntityId },
    /// Entity was removed and disposed.
    Despawned { id: EntityId },
    /// Simulation advanced one tick.
    Stepped { tick: u64 },
    /// World was torn down; carries how many entities were disposed.
    Destroyed { entities: usize },
}

/// Reference simulation core: an entity registry stepped at a fixed rate.
///
/// Uses BTreeMap for deterministic iteration order, so render hooks and
/// updates always visit entities in the same sequence.
pub struct World {
    entities: BTreeMap<EntityId, Box<dyn Entity>>,
    tick: u64,
    dt: f64,
    camera_target: Option<EntityId>,
    event_log: VecDeque<WorldEvent>,
    destroyed: bool,
}

impl World {
    /// Create an empty world stepping at 60 Hz.
    pub fn new() -> Self {
        Self::with_tick_rate(60.0)
    }

    /// Create an empty world with the given fixed update rate.
    pub fn with_tick_rate(hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self {
            entities: BTreeMap::new(),
            tick: 0,
            dt: 1.0 / hz,
            camera_target: None,
            event_log: VecDeque::with_capacity(64),
            destroyed: false,
        }
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Fixed step length in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The most recent events, oldest first. Bounded by `EVENT_LOG_CAPACITY`.
    pub fn events(&self) -> &VecDeque<WorldEvent> {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.event_log.drain(..).collect()
    }

    fn record(&mut self, event: WorldEvent) {
        if self.event_log.len() == EVENT_LOG_CAPACITY {
            self.event_log.pop_front();
        }
        self.event_log.push_back(event);
    }

    /// Add an entity. Returns its id.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(id, entity);
        self.record(WorldEvent::Spawned { id });
        tracing::debug!(id = %id.short(), "entity spawned");
        id
    }

    /// Remove and dispose an entity. Returns false if it did not exist.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(mut entity) = self.entities.remove(&id) else {
            return false;
        };
        entity.dispose();
        if self.camera_target == Some(id) {
            self.camera_target = None;
        }
        self.record(WorldEvent::Despawned { id });
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        match self.entities.get(&id) {
            Some(entity) => Some(entity.as_ref()),
            None => None,
        }
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Box<dyn Entity>> {
        self.entities.get_mut(&id)
    }

    /// Ids in iteration order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Make the camera follow an entity. Unknown ids clear the target.
    pub fn set_camera_target(&mut self, id: Option<EntityId>) {
        self.camera_target = id.filter(|id| self.entities.contains_key(id));
    }

    /// Advance the simulation by one fixed tick.
    pub fn step(&mut self, keys: &KeyboardSnapshot) {
        if self.destroyed {
            tracing::trace!("step ignored on destroyed world");
            return;
        }
        self.tick += 1;
        let ctx = TickContext {
            tick: self.tick,
            dt: self.dt,
            keys,
        };
        for entity in self.entities.values_mut() {
            entity.update(&ctx);
        }
        self.record(WorldEvent::Stepped { tick: self.tick });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("camera_target", &self.camera_target)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Simulation for World {
    fn update(&mut self, keys: &KeyboardSnapshot) {
        self.step(keys);
    }

    fn for_each_entity_mut(&mut self, f: &mut dyn FnMut(&mut dyn Entity)) {
        for entity in self.entities.values_mut() {
            f(entity.as_mut());
        }
    }

    fn camera_target(&self) -> Option<Vec2> {
        self.camera_target
            .and_then(|id| self.entities.get(&id))
            .map(|e| e.position())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let count = self.entities.len();
        for entity in self.entities.values_mut() {
            entity.dispose();
        }
        self.entities.clear();
        self.camera_target = None;
        self.destroyed = true;
        self.record(WorldEvent::Destroyed { entities: count });
        tracing::info!(entities = count, "world destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RenderHook;
    use skyview_common::Key;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Moves right while `Right` is held; counts renders and disposals.
    struct Mover {
        pos: Vec2,
        renders: Rc<Cell<u32>>,
        disposed: Rc<Cell<bool>>,
    }

    impl Mover {
        fn boxed() -> (Box<dyn Entity>, Rc<Cell<u32>>, Rc<Cell<bool>>) {
            let renders = Rc::new(Cell::new(0));
            let disposed = Rc::new(Cell::new(false));
            let m = Mover {
                pos: Vec2::ZERO,
                renders: renders.clone(),
                disposed: disposed.clone(),
            };
            (Box::new(m), renders, disposed)
        }
    }

    impl RenderHook for Mover {
        fn handle_render(&mut self, _delta: f64) {
            self.renders.set(self.renders.get() + 1);
        }
    }

    impl Entity for Mover {
        fn update(&mut self, ctx: &TickContext<'_>) {
            if ctx.keys.is_held(Key::Right) {
                self.pos.x += 1.0;
            }
        }

        fn position(&self) -> Vec2 {
            self.pos
        }

        fn render_hook(&mut self) -> Option<&mut dyn RenderHook> {
            Some(self)
        }

        fn dispose(&mut self) {
            self.disposed.set(true);
        }
    }

    struct Static;

    impl Entity for Static {
        fn update(&mut self, _ctx: &TickContext<'_>) {}

        fn position(&self) -> Vec2 {
            Vec2::new(5.0, 5.0)
        }
    }

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.entity_count(), 0);
        assert!((w.dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_tick_rate_falls_back_to_sixty() {
        let w = World::with_tick_rate(0.0);
        assert!((w.dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn spawn_and_despawn() {
        let mut w = World::new();
        let (mover, _, disposed) = Mover::boxed();
        let id = w.spawn(mover);
        assert_eq!(w.entity_count(), 1);
        assert!(w.get(id).is_some());

        assert!(w.despawn(id));
        assert!(disposed.get());
        assert_eq!(w.entity_count(), 0);
        assert!(!w.despawn(id));
    }

    #[test]
    fn step_passes_keys_to_entities() {
        let mut w = World::new();
        let (mover, _, _) = Mover::boxed();
        let id = w.spawn(mover);
        let mut keys = KeyboardSnapshot::default();
        keys.held.insert(Key::Right);
        w.step(&keys);
        w.step(&keys);
        assert_eq!(w.tick(), 2);
        assert_eq!(w.get(id).unwrap().position(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn render_hooks_are_optional() {
        let mut w = World::new();
        let (mover, renders, _) = Mover::boxed();
        w.spawn(mover);
        w.spawn(Box::new(Static));

        let mut hooked = 0;
        w.for_each_entity_mut(&mut |e| {
            if let Some(hook) = e.render_hook() {
                hook.handle_render(0.016);
                hooked += 1;
            }
        });
        assert_eq!(hooked, 1);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn camera_target_tracks_entity_position() {
        let mut w = World::new();
        let id = w.spawn(Box::new(Static));
        assert_eq!(Simulation::camera_target(&w), None);
        w.set_camera_target(Some(id));
        assert_eq!(Simulation::camera_target(&w), Some(Vec2::new(5.0, 5.0)));
        w.despawn(id);
        assert_eq!(Simulation::camera_target(&w), None);
    }

    #[test]
    fn unknown_camera_target_is_ignored() {
        let mut w = World::new();
        w.set_camera_target(Some(EntityId::new()));
        assert_eq!(Simulation::camera_target(&w), None);
    }

    #[test]
    fn destroy_disposes_once() {
        let mut w = World::new();
        let (mover, _, disposed) = Mover::boxed();
        w.spawn(mover);
        w.destroy();
        w.destroy();
        assert!(disposed.get());
        assert!(w.is_destroyed());
        let destroyed: Vec<_> = w
            .events()
            .iter()
            .filter(|e| matches!(e, WorldEvent::Destroyed { .. }))
            .collect();
        assert_eq!(destroyed, vec![&WorldEvent::Destroyed { entities: 1 }]);
    }

    #[test]
    fn step_after_destroy_is_ignored() {
        let mut w = World::new();
        w.destroy();
        w.step(&KeyboardSnapshot::default());
        assert_eq!(w.tick(), 0);
    }

    #[test]
    fn events_are_recorded() {
        let mut w = World::new();
        let id = w.spawn(Box::new(Static));
        w.step(&KeyboardSnapshot::default());
        w.despawn(id);
        assert_eq!(w.events().len(), 3);
        let drained = w.drain_events();
        assert_eq!(drained.len(), 3);
        assert!(w.events().is_empty());
    }

    #[test]
    fn event_log_keeps_only_recent_events() {
        let mut w = World::new();
        let keys = KeyboardSnapshot::default();
        // Ten simulated minutes at 60 Hz.
        for _ in 0..36_000 {
            w.step(&keys);
        }
        assert_eq!(w.events().len(), EVENT_LOG_CAPACITY);
        assert_eq!(w.events().back(), Some(&WorldEvent::Stepped { tick: 36_000 }));
        let oldest = 36_000 - EVENT_LOG_CAPACITY as u64 + 1;
        assert_eq!(w.events().front(), Some(&WorldEvent::Stepped { tick: oldest }));
    }

    #[test]
    fn iteration_order_is_deterministic() {
        let mut w = World::new();
        for _ in 0..50 {
            w.spawn(Box::new(Static));
        }
        let ids = w.ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
