use glam::Vec2;
use skyview_common::{Key, Size};

/// Identifies one registered listener. Never reused by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Size and page offset of the element the surface lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerMetrics {
    pub size: Size,
    /// Top-left of the container in client coordinates.
    pub offset: Vec2,
}

impl ContainerMetrics {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

/// Events a host can deliver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer moved; coordinates are client (page) pixels.
    PointerMove { client_x: f32, client_y: f32 },
    /// Window lost focus.
    Blur,
    /// Window regained focus.
    Focus,
    Key { key: Key, pressed: bool },
    /// Container was resized.
    Resize { size: Size },
}

impl HostEvent {
    pub fn kind(&self) -> HostEventKind {
        match self {
            Self::PointerMove { .. } => HostEventKind::PointerMove,
            Self::Blur => HostEventKind::Blur,
            Self::Focus => HostEventKind::Focus,
            Self::Key { .. } => HostEventKind::Key,
            Self::Resize { .. } => HostEventKind::Resize,
        }
    }
}

/// What a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    PointerMove,
    Blur,
    Focus,
    Key,
    Resize,
}

/// One event plus the listeners subscribed to its kind when it was taken
/// off the queue, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub event: HostEvent,
    pub listeners: Vec<ListenerId>,
}

/// The host display environment as seen by the client.
///
/// Consumers drain `poll_event` one event at a time and must re-check
/// `is_subscribed` before invoking each listener, so a listener removed while
/// an earlier one runs is skipped.
pub trait HostEnvironment {
    /// Current container metrics, `None` if there is no container.
    fn container(&self) -> Option<ContainerMetrics>;

    fn subscribe(&mut self, kind: HostEventKind) -> ListenerId;

    /// Returns false if the listener was not registered.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;

    fn is_subscribed(&self, id: ListenerId) -> bool;

    /// Next queued event, or `None` when the queue is empty.
    fn poll_event(&mut self) -> Option<Dispatch>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kinds() {
        assert_eq!(HostEvent::Blur.kind(), HostEventKind::Blur);
        assert_eq!(HostEvent::Focus.kind(), HostEventKind::Focus);
        assert_eq!(
            HostEvent::PointerMove {
                client_x: 1.0,
                client_y: 2.0
            }
            .kind(),
            HostEventKind::PointerMove
        );
        assert_eq!(
            HostEvent::Resize {
                size: Size::new(1, 1)
            }
            .kind(),
            HostEventKind::Resize
        );
    }

    #[test]
    fn metrics_offset_builder() {
        let m = ContainerMetrics::new(Size::new(800, 600)).with_offset(Vec2::new(10.0, 20.0));
        assert_eq!(m.offset, Vec2::new(10.0, 20.0));
        assert_eq!(m.size, Size::new(800, 600));
    }
}
