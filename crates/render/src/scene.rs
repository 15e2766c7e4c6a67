use glam::Vec2;
use skyview_common::{Color, Rect};
use std::cell::RefCell;
use std::rc::Rc;

/// Nesting limit for `Layer::flatten`; deeper branches are skipped.
const MAX_DEPTH: usize = 64;

/// How a shape is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeStyle {
    Fill,
    Outline { thickness: f32 },
}

/// A coloured rectangle in its parent's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub style: ShapeStyle,
    pub position: Vec2,
    pub size: Vec2,
    pub color: Color,
    pub visible: bool,
}

impl Shape {
    pub fn filled(position: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            style: ShapeStyle::Fill,
            position,
            size,
            color,
            visible: true,
        }
    }

    pub fn outline(position: Vec2, size: Vec2, color: Color, thickness: f32) -> Self {
        Self {
            style: ShapeStyle::Outline { thickness },
            position,
            size,
            color,
            visible: true,
        }
    }
}

/// Shared handle to a shape. Clones point at the same shape.
#[derive(Debug, Clone)]
pub struct ShapeHandle(Rc<RefCell<Shape>>);

impl ShapeHandle {
    pub fn new(shape: Shape) -> Self {
        Self(Rc::new(RefCell::new(shape)))
    }

    /// Copy of the current shape.
    pub fn get(&self) -> Shape {
        *self.0.borrow()
    }

    pub fn set(&self, shape: Shape) {
        *self.0.borrow_mut() = shape;
    }

    pub fn set_position(&self, position: Vec2) {
        self.0.borrow_mut().position = position;
    }

    pub fn update(&self, f: impl FnOnce(&mut Shape)) {
        f(&mut self.0.borrow_mut());
    }
}

impl PartialEq for ShapeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Anything that can sit inside a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayObject {
    Layer(Layer),
    Shape(ShapeHandle),
}

impl From<Layer> for DisplayObject {
    fn from(layer: Layer) -> Self {
        Self::Layer(layer)
    }
}

impl From<ShapeHandle> for DisplayObject {
    fn from(shape: ShapeHandle) -> Self {
        Self::Shape(shape)
    }
}

#[derive(Debug)]
struct ContainerNode {
    label: String,
    position: Vec2,
    scale: Vec2,
    visible: bool,
    children: Vec<DisplayObject>,
}

/// Shared handle to a container in the scene graph.
///
/// Equality is identity: two handles are equal when they refer to the same
/// container.
#[derive(Debug, Clone)]
pub struct Layer(Rc<RefCell<ContainerNode>>);

impl Layer {
    pub fn new(label: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(ContainerNode {
            label: label.into(),
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            visible: true,
            children: Vec::new(),
        })))
    }

    pub fn label(&self) -> String {
        self.0.borrow().label.clone()
    }

    pub fn position(&self) -> Vec2 {
        self.0.borrow().position
    }

    pub fn set_position(&self, position: Vec2) {
        self.0.borrow_mut().position = position;
    }

    pub fn scale(&self) -> Vec2 {
        self.0.borrow().scale
    }

    pub fn set_scale(&self, scale: Vec2) {
        self.0.borrow_mut().scale = scale;
    }

    pub fn visible(&self) -> bool {
        self.0.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.0.borrow_mut().visible = visible;
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn child(&self, index: usize) -> Option<DisplayObject> {
        self.0.borrow().children.get(index).cloned()
    }

    /// Snapshot of the children in paint order.
    pub fn children(&self) -> Vec<DisplayObject> {
        self.0.borrow().children.clone()
    }

    pub fn index_of(&self, child: &DisplayObject) -> Option<usize> {
        self.0.borrow().children.iter().position(|c| c == child)
    }

    /// Append a child on top of the existing ones. Returns its index.
    pub fn add_child(&self, child: impl Into<DisplayObject>) -> usize {
        let len = self.child_count();
        self.add_child_at(child, len)
    }

    /// Insert a child at `index`; indices past the end append.
    /// Returns the index the child landed at. A layer cannot contain itself;
    /// such an insert is ignored.
    pub fn add_child_at(&self, child: impl Into<DisplayObject>, index: usize) -> usize {
        let child = child.into();
        if let DisplayObject::Layer(layer) = &child {
            if layer == self {
                tracing::warn!(label = %self.label(), "refusing to add a layer to itself");
                return self.child_count();
            }
        }
        let mut node = self.0.borrow_mut();
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        index
    }

    /// Remove a child. Returns false if it was not present.
    pub fn remove_child(&self, child: &DisplayObject) -> bool {
        let mut node = self.0.borrow_mut();
        match node.children.iter().position(|c| c == child) {
            Some(i) => {
                node.children.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.0.borrow_mut().children.clear();
    }

    /// Resolve the tree into screen-space draw items in paint order.
    pub fn flatten(&self) -> Vec<DrawItem> {
        let mut out = Vec::new();
        self.flatten_into(Vec2::ZERO, Vec2::ONE, 0, &mut out);
        out
    }

    fn flatten_into(&self, parent_pos: Vec2, parent_scale: Vec2, depth: usize, out: &mut Vec<DrawItem>) {
        if depth > MAX_DEPTH {
            tracing::warn!(label = %self.label(), "scene graph too deep, branch skipped");
            return;
        }
        let node = self.0.borrow();
        if !node.visible {
            return;
        }
        let pos = parent_pos + parent_scale * node.position;
        let scale = parent_scale * node.scale;
        for child in &node.children {
            match child {
                DisplayObject::Layer(layer) => layer.flatten_into(pos, scale, depth + 1, out),
                DisplayObject::Shape(shape) => {
                    let s = shape.get();
                    if !s.visible {
                        continue;
                    }
                    let origin = pos + scale * s.position;
                    let size = scale * s.size;
                    out.push(DrawItem {
                        rect: Rect::new(origin.x, origin.y, size.x, size.y),
                        color: s.color,
                        style: s.style,
                    });
                }
            }
        }
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// One resolved primitive, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub rect: Rect,
    pub color: Color,
    pub style: ShapeStyle,
}
