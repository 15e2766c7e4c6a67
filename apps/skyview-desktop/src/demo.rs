//! The demo scene: a player square steered with the arrow keys or WASD,
//! surrounded by a ring of static blocks.

use glam::Vec2;
use skyview_common::{Color, Key, Rect};
use skyview_kernel::{Entity, RenderHook, TickContext, World};
use skyview_render::{Shape, ShapeHandle};

const PLAYER_SIZE: f32 = 24.0;
const PLAYER_SPEED: f32 = 240.0;
const BLOCK_SIZE: f32 = 48.0;

/// World area the camera is clamped to.
pub const WORLD_BOUNDS: Rect = Rect::new(-1200.0, -900.0, 2400.0, 1800.0);

pub struct Player {
    position: Vec2,
    shape: ShapeHandle,
}

impl Player {
    fn new(shape: ShapeHandle) -> Self {
        Self {
            position: Vec2::ZERO,
            shape,
        }
    }

    fn heading(ctx: &TickContext<'_>) -> Vec2 {
        let keys = ctx.keys;
        let x = keys.axis(Key::Left, Key::Right) + keys.axis(Key::A, Key::D);
        let y = keys.axis(Key::Up, Key::Down) + keys.axis(Key::W, Key::S);
        Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE).normalize_or_zero()
    }
}

impl Entity for Player {
    fn update(&mut self, ctx: &TickContext<'_>) {
        let boost = if ctx.keys.is_held(Key::Shift) { 2.5 } else { 1.0 };
        let step = Self::heading(ctx) * PLAYER_SPEED * boost * ctx.dt as f32;
        let min = WORLD_BOUNDS.origin();
        let max = min + WORLD_BOUNDS.size() - Vec2::splat(PLAYER_SIZE);
        self.position = (self.position + step).clamp(min, max);
        if ctx.keys.is_just_pressed(Key::Space) {
            self.position = Vec2::ZERO;
        }
    }

    fn position(&self) -> Vec2 {
        self.position + Vec2::splat(PLAYER_SIZE / 2.0)
    }

    fn render_hook(&mut self) -> Option<&mut dyn RenderHook> {
        Some(self)
    }
}

impl RenderHook for Player {
    fn handle_render(&mut self, _delta: f64) {
        self.shape.set_position(self.position);
    }
}

pub struct Block {
    position: Vec2,
}

impl Entity for Block {
    fn update(&mut self, _ctx: &TickContext<'_>) {}

    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Spawn the demo entities into `world`. Returns the shapes to add to the
/// stage, player last so it draws on top.
pub fn populate(world: &mut World) -> Vec<ShapeHandle> {
    let mut shapes = Vec::new();

    for i in 0..12 {
        let angle = i as f32 * std::f32::consts::TAU / 12.0;
        let position = Vec2::new(angle.cos() * 420.0, angle.sin() * 300.0);
        let color = if i % 2 == 0 {
            Color(0x2E8B57)
        } else {
            Color(0x8B5A2B)
        };
        shapes.push(ShapeHandle::new(Shape::filled(
            position,
            Vec2::splat(BLOCK_SIZE),
            color,
        )));
        world.spawn(Box::new(Block { position }));
    }

    shapes.push(ShapeHandle::new(Shape::outline(
        WORLD_BOUNDS.origin(),
        WORLD_BOUNDS.size(),
        Color::WHITE,
        4.0,
    )));

    let player_shape = ShapeHandle::new(Shape::filled(
        Vec2::ZERO,
        Vec2::splat(PLAYER_SIZE),
        Color(0xFFD700),
    ));
    let player = world.spawn(Box::new(Player::new(player_shape.clone())));
    world.set_camera_target(Some(player));
    shapes.push(player_shape);

    shapes
}
