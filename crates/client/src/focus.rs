use skyview_input::{HostEnvironment, HostEventKind, ListenerId};
use skyview_kernel::FrameLoop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Active,
    /// Loop stopped on blur; `resume` is the one-shot focus listener.
    Suspended { resume: ListenerId },
}

/// Stops the frame loop while the window is unfocused.
///
/// Both transitions are guarded on the application `running` flag and on the
/// loop's own state, so an unstarted engine is never suspended and a running
/// loop is never started twice. Rejected transitions are no-ops.
#[derive(Debug, Default)]
pub struct FocusSuspension {
    state: FocusState,
    suspensions: u64,
    resumes: u64,
}

impl FocusSuspension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self.state, FocusState::Suspended { .. })
    }

    /// The pending resume listener, if suspended.
    pub fn resume_listener(&self) -> Option<ListenerId> {
        match self.state {
            FocusState::Suspended { resume } => Some(resume),
            FocusState::Active => None,
        }
    }

    /// Number of times the loop was stopped on blur.
    pub fn suspensions(&self) -> u64 {
        self.suspensions
    }

    /// Number of times the loop was restarted on focus.
    pub fn resumes(&self) -> u64 {
        self.resumes
    }

    /// Window lost focus. Returns true if the loop was stopped.
    pub fn on_blur<L, H>(&mut self, running: bool, frame_loop: &mut L, host: &mut H) -> bool
    where
        L: FrameLoop + ?Sized,
        H: HostEnvironment + ?Sized,
    {
        if !(running && frame_loop.is_running()) {
            tracing::debug!(running, loop_running = frame_loop.is_running(), "blur ignored");
            return false;
        }

        frame_loop.stop();
        if let FocusState::Suspended { resume } = self.state {
            host.unsubscribe(resume);
        }
        let resume = host.subscribe(HostEventKind::Focus);
        self.state = FocusState::Suspended { resume };
        self.suspensions += 1;
        tracing::debug!(?resume, "suspended on blur");
        true
    }

    /// Focus event delivered to `listener`. Returns true if the loop was
    /// started. The resume listener is removed whether or not it resumed.
    pub fn on_focus<L, H>(
        &mut self,
        listener: ListenerId,
        running: bool,
        frame_loop: &mut L,
        host: &mut H,
    ) -> bool
    where
        L: FrameLoop + ?Sized,
        H: HostEnvironment + ?Sized,
    {
        match self.state {
            FocusState::Suspended { resume } if resume == listener => {}
            _ => {
                tracing::debug!(?listener, "focus ignored, not the resume listener");
                return false;
            }
        }

        let resumed = running && !frame_loop.is_running();
        if resumed {
            frame_loop.start();
            self.resumes += 1;
            tracing::debug!("resumed on focus");
        } else {
            tracing::debug!(running, "focus without resume");
        }
        host.unsubscribe(listener);
        self.state = FocusState::Active;
        resumed
    }

    /// Drop any pending resume listener without touching the loop.
    pub fn cancel<H: HostEnvironment + ?Sized>(&mut self, host: &mut H) {
        if let FocusState::Suspended { resume } = self.state {
            host.unsubscribe(resume);
        }
        self.state = FocusState::Active;
    }
}
