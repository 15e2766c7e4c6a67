//! Window host backed by winit.
//!
//! The application forwards each `WindowEvent` to [`WinitHost::push_window_event`];
//! the client drains them through [`HostEnvironment`] like any other host.
//! Coordinates and sizes stay in physical pixels so they match the surface.

use crate::headless::HeadlessHost;
use crate::host::{ContainerMetrics, Dispatch, HostEnvironment, HostEvent, HostEventKind, ListenerId};
use skyview_common::{Key, Size};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, NativeKeyCode, PhysicalKey};
use winit::window::Window;

#[derive(Debug)]
pub struct WinitHost {
    inner: HeadlessHost,
}

impl WinitHost {
    pub fn new(window: &Window) -> Self {
        let size = window.inner_size();
        Self {
            inner: HeadlessHost::new(Some(ContainerMetrics::new(Size::new(
                size.width,
                size.height,
            )))),
        }
    }

    /// Queue the host event for `event`, if it maps to one.
    pub fn push_window_event(&mut self, event: &WindowEvent) {
        if let Some(ev) = translate_window_event(event) {
            self.inner.emit(ev);
        }
    }
}

impl HostEnvironment for WinitHost {
    fn container(&self) -> Option<ContainerMetrics> {
        self.inner.container()
    }

    fn subscribe(&mut self, kind: HostEventKind) -> ListenerId {
        self.inner.subscribe(kind)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.inner.unsubscribe(id)
    }

    fn is_subscribed(&self, id: ListenerId) -> bool {
        self.inner.is_subscribed(id)
    }

    fn poll_event(&mut self) -> Option<Dispatch> {
        self.inner.poll_event()
    }
}

/// Translates a winit `WindowEvent` into a `HostEvent`.
///
/// Returns `None` for events the client does not listen to.
pub fn translate_window_event(event: &WindowEvent) -> Option<HostEvent> {
    match event {
        WindowEvent::Focused(false) => Some(HostEvent::Blur),
        WindowEvent::Focused(true) => Some(HostEvent::Focus),
        WindowEvent::CursorMoved { position, .. } => Some(HostEvent::PointerMove {
            client_x: position.x as f32,
            client_y: position.y as f32,
        }),
        WindowEvent::KeyboardInput { event, .. } => Some(HostEvent::Key {
            key: map_key(event.physical_key),
            pressed: event.state == ElementState::Pressed,
        }),
        WindowEvent::Resized(size) => Some(HostEvent::Resize {
            size: Size::new(size.width, size.height),
        }),
        _ => None,
    }
}

pub fn map_key(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(code) => match code {
            KeyCode::ArrowLeft => Key::Left,
            KeyCode::ArrowRight => Key::Right,
            KeyCode::ArrowUp => Key::Up,
            KeyCode::ArrowDown => Key::Down,
            KeyCode::Space => Key::Space,
            KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
            KeyCode::Escape => Key::Escape,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
            KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            _ => Key::Other(0),
        },
        PhysicalKey::Unidentified(native) => Key::Other(native_code(native)),
    }
}

fn native_code(native: NativeKeyCode) -> u32 {
    match native {
        NativeKeyCode::Android(c) | NativeKeyCode::Xkb(c) => c,
        NativeKeyCode::MacOS(c) | NativeKeyCode::Windows(c) => u32::from(c),
        NativeKeyCode::Unidentified => 0,
    }
}
