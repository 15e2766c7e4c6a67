use crate::scene::{Layer, ShapeStyle};
use serde::{Deserialize, Serialize};
use skyview_common::{Color, Size};
use std::fmt::Write as _;

/// Texture sampling used when scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Crisp pixels; the default for pixel-art scenes.
    #[default]
    Nearest,
    Linear,
}

/// Surface options handed to a renderer at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub background: Color,
    pub antialias: bool,
    pub transparent: bool,
    /// Device pixels per logical pixel.
    pub resolution: f32,
    pub scale_mode: ScaleMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background: Color::SKY,
            antialias: true,
            transparent: false,
            resolution: 1.0,
            scale_mode: ScaleMode::Nearest,
        }
    }
}

/// Renderer-agnostic interface. All backends implement this trait.
///
/// A renderer draws the scene graph rooted at `root` onto its surface. It
/// never restructures the graph.
pub trait Renderer {
    /// The output type produced per frame.
    type Output;

    /// Surface was resized. Sizes are never zero.
    fn resize(&mut self, size: Size);

    /// Draw one frame.
    fn render(&mut self, root: &Layer) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
///
/// Produces a human-readable listing of everything that would be drawn.
#[derive(Debug)]
pub struct DebugTextRenderer {
    config: RendererConfig,
    size: Size,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new(config: RendererConfig, size: Size) -> Self {
        Self {
            config,
            size,
            frames: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default(), Size::default())
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn render(&mut self, root: &Layer) -> String {
        self.frames += 1;
        let items = root.flatten();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}, bg={}) ===",
            self.frames, self.size.width, self.size.height, self.config.background
        );
        let _ = writeln!(out, "Layers: {}", root.child_count());
        let _ = writeln!(out, "Items: {}", items.len());
        for item in &items {
            let kind = match item.style {
                ShapeStyle::Fill => "fill",
                ShapeStyle::Outline { .. } => "outline",
            };
            let _ = writeln!(
                out,
                "  {kind} {} at=({:.1}, {:.1}) size=({:.1}, {:.1})",
                item.color, item.rect.x, item.rect.y, item.rect.width, item.rect.height
            );
        }
        out
    }
}
