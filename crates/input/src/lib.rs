//! Input capture and the host display environment.
//!
//! The host (a browser-like container, a desktop window, or a test fake) is
//! an injected capability: it reports the container size and delivers events
//! to explicitly registered listeners.
//!
//! # Invariants
//! - Events reach only listeners subscribed at dispatch time.
//! - Keyboard state is sampled once per update tick, never mid-tick.
//! - Pointer position is latest-event-wins, in container-local pixels.

mod headless;
mod host;
mod keyboard;
mod pointer;
#[cfg(feature = "winit")]
pub mod winit;

pub use headless::HeadlessHost;
pub use host::{ContainerMetrics, Dispatch, HostEnvironment, HostEvent, HostEventKind, ListenerId};
pub use keyboard::Keyboard;
pub use pointer::PointerTracker;
