//! Camera and viewport transform.
//!
//! A [`Placement`] says which world point sits at the top-left of the
//! surface and how many surface pixels one world unit covers. The camera
//! writes it onto the stage layer once per render; strategies decide it.

use glam::Vec2;
use skyview_common::{Rect, Size};
use skyview_render::Layer;
use std::fmt::Debug;

/// Replace a zero or non-finite scale with identity.
pub fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale != 0.0 {
        scale
    } else {
        1.0
    }
}

fn sanitize_scale2(scale: Vec2) -> Vec2 {
    Vec2::new(sanitize_scale(scale.x), sanitize_scale(scale.y))
}

/// Where the stage sits for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// World coordinate shown at the surface's top-left.
    pub origin: Vec2,
    /// Surface pixels per world unit.
    pub scale: f32,
}

impl Placement {
    pub const IDENTITY: Self = Self {
        origin: Vec2::ZERO,
        scale: 1.0,
    };
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Decides the placement for a frame.
pub trait CameraStrategy: Debug {
    fn place(&mut self, viewport: Size, target: Option<Vec2>) -> Placement;
}

/// A camera that stays where it is put.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedView {
    pub origin: Vec2,
    pub zoom: f32,
}

impl FixedView {
    pub fn new(origin: Vec2, zoom: f32) -> Self {
        Self { origin, zoom }
    }
}

impl Default for FixedView {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

impl CameraStrategy for FixedView {
    fn place(&mut self, _viewport: Size, _target: Option<Vec2>) -> Placement {
        Placement {
            origin: self.origin,
            scale: sanitize_scale(self.zoom),
        }
    }
}

/// Keeps the simulation's camera target in view.
///
/// The view centre only moves once the target leaves the deadzone around it.
/// With bounds set, the view never shows anything outside them; a view larger
/// than the bounds is centred on them instead.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowTarget {
    pub zoom: f32,
    /// Half-extents of the deadzone in world units.
    pub deadzone: Vec2,
    pub bounds: Option<Rect>,
    center: Option<Vec2>,
}

impl FollowTarget {
    pub fn new(zoom: f32) -> Self {
        Self {
            zoom,
            deadzone: Vec2::ZERO,
            bounds: None,
            center: None,
        }
    }

    pub fn with_deadzone(mut self, half_extents: Vec2) -> Self {
        self.deadzone = half_extents.abs();
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Current view centre, once a target has been seen.
    pub fn center(&self) -> Option<Vec2> {
        self.center
    }

    fn follow(&self, center: Vec2, target: Vec2) -> Vec2 {
        let offset = target - center;
        let excess = Vec2::new(
            excess(offset.x, self.deadzone.x),
            excess(offset.y, self.deadzone.y),
        );
        center + excess
    }
}

fn excess(offset: f32, half: f32) -> f32 {
    if offset > half {
        offset - half
    } else if offset < -half {
        offset + half
    } else {
        0.0
    }
}

fn clamp_axis(origin: f32, view: f32, min: f32, extent: f32) -> f32 {
    if view >= extent {
        min + (extent - view) / 2.0
    } else {
        origin.clamp(min, min + extent - view)
    }
}

impl CameraStrategy for FollowTarget {
    fn place(&mut self, viewport: Size, target: Option<Vec2>) -> Placement {
        let scale = sanitize_scale(self.zoom);
        let half_view = viewport.as_vec2() / scale / 2.0;

        let center = match (self.center, target) {
            (Some(c), Some(t)) => self.follow(c, t),
            (None, Some(t)) => t,
            (Some(c), None) => c,
            (None, None) => half_view,
        };
        self.center = Some(center);

        let mut origin = center - half_view;
        if let Some(b) = self.bounds {
            let view = half_view * 2.0;
            origin.x = clamp_axis(origin.x, view.x, b.x, b.width);
            origin.y = clamp_axis(origin.y, view.y, b.y, b.height);
        }
        Placement { origin, scale }
    }
}

/// Viewport state plus the strategy that moves it.
#[derive(Debug)]
pub struct Camera {
    viewport: Size,
    placement: Placement,
    strategy: Box<dyn CameraStrategy>,
}

impl Camera {
    pub fn new(viewport: Size, strategy: Box<dyn CameraStrategy>) -> Self {
        Self {
            viewport,
            placement: Placement::IDENTITY,
            strategy,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn CameraStrategy>) {
        self.strategy = strategy;
    }

    /// The placement written by the latest `place_container`.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Visible world rectangle for the latest placement.
    pub fn view_box(&self) -> Rect {
        let size = self.viewport.as_vec2() / sanitize_scale(self.placement.scale);
        Rect::new(self.placement.origin.x, self.placement.origin.y, size.x, size.y)
    }

    /// Ask the strategy for this frame's placement and apply it to `stage`.
    pub fn place_container(&mut self, stage: &Layer, target: Option<Vec2>) -> Placement {
        let mut placement = self.strategy.place(self.viewport, target);
        placement.scale = sanitize_scale(placement.scale);
        stage.set_scale(Vec2::splat(placement.scale));
        stage.set_position(-placement.origin * placement.scale);
        self.placement = placement;
        tracing::trace!(origin = ?placement.origin, scale = placement.scale, "camera placed");
        placement
    }

    /// Surface pixel to world coordinate, using `stage`'s current scale.
    pub fn screen_to_world(&self, stage: &Layer, screen: Vec2) -> Vec2 {
        screen / sanitize_scale2(stage.scale()) + self.view_box().origin()
    }

    /// World coordinate to surface pixel. Inverse of `screen_to_world`.
    pub fn world_to_screen(&self, stage: &Layer, world: Vec2) -> Vec2 {
        (world - self.view_box().origin()) * sanitize_scale2(stage.scale())
    }
}
