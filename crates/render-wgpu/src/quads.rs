use bytemuck::{Pod, Zeroable};
use skyview_render::{DrawItem, ShapeStyle};

/// Per-instance data: a rectangle in surface pixels and a linear colour.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    /// x, y, width, height.
    pub rect: [f32; 4],
    pub color: [f32; 4],
}

/// Turn draw items into quad instances, scaled by `resolution`.
///
/// Filled rectangles map to one quad. Outlines map to four edge quads whose
/// thickness is clamped to half the smaller side. Empty or non-finite
/// rectangles are skipped.
pub fn build_instances(items: &[DrawItem], resolution: f32) -> Vec<QuadInstance> {
    let res = if resolution.is_finite() && resolution > 0.0 {
        resolution
    } else {
        1.0
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let r = item.rect;
        let (x, y, w, h) = (r.x * res, r.y * res, r.width * res, r.height * res);
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0
        {
            continue;
        }
        let color = item.color.to_rgba_f32();
        match item.style {
            ShapeStyle::Fill => out.push(QuadInstance {
                rect: [x, y, w, h],
                color,
            }),
            ShapeStyle::Outline { thickness } => {
                let t = (thickness * res).clamp(0.0, w.min(h) / 2.0);
                if t <= 0.0 {
                    continue;
                }
                for rect in [
                    [x, y, w, t],
                    [x, y + h - t, w, t],
                    [x, y + t, t, h - 2.0 * t],
                    [x + w - t, y + t, t, h - 2.0 * t],
                ] {
                    out.push(QuadInstance { rect, color });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyview_common::{Color, Rect};

    fn item(style: ShapeStyle, rect: Rect) -> DrawItem {
        DrawItem {
            rect,
            color: Color::WHITE,
            style,
        }
    }

    #[test]
    fn fill_is_one_quad() {
        let quads = build_instances(
            &[item(ShapeStyle::Fill, Rect::new(1.0, 2.0, 3.0, 4.0))],
            1.0,
        );
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].rect, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn outline_is_four_edges() {
        let quads = build_instances(
            &[item(
                ShapeStyle::Outline { thickness: 2.0 },
                Rect::new(0.0, 0.0, 10.0, 10.0),
            )],
            1.0,
        );
        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].rect, [0.0, 0.0, 10.0, 2.0]);
        assert_eq!(quads[3].rect, [8.0, 2.0, 2.0, 6.0]);
    }

    #[test]
    fn resolution_scales_rects() {
        let quads = build_instances(
            &[item(ShapeStyle::Fill, Rect::new(1.0, 1.0, 2.0, 2.0))],
            2.0,
        );
        assert_eq!(quads[0].rect, [2.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn degenerate_rects_are_skipped() {
        let quads = build_instances(
            &[
                item(ShapeStyle::Fill, Rect::new(0.0, 0.0, 0.0, 5.0)),
                item(ShapeStyle::Fill, Rect::new(f32::NAN, 0.0, 5.0, 5.0)),
                item(ShapeStyle::Outline { thickness: 0.0 }, Rect::new(0.0, 0.0, 5.0, 5.0)),
            ],
            1.0,
        );
        assert!(quads.is_empty());
    }
}
