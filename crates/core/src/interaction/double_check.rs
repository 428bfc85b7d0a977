//! Two-step confirmation for destructive controls.
//!
//! The first activation arms the control and suppresses its default action
//! (the form is not submitted). A second activation while armed lets the
//! default action through. Losing focus disarms.

/// State of one control instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckState {
    #[default]
    Disarmed,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Press, click, or keyboard activation.
    Activate,
    /// The control lost focus.
    Blur,
}

/// An event delivered to the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEvent {
    kind: EventKind,
    default_prevented: bool,
}

impl ControlEvent {
    pub fn activate() -> Self {
        Self { kind: EventKind::Activate, default_prevented: false }
    }

    pub fn blur() -> Self {
        Self { kind: EventKind::Blur, default_prevented: false }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Stop the control's default action (submit, navigate) from running.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Arm-then-confirm control.
#[derive(Debug, Clone, Default)]
pub struct DoubleCheck {
    state: CheckState,
}

impl DoubleCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == CheckState::Armed
    }

    pub fn arm(&mut self) {
        self.state = CheckState::Armed;
    }

    pub fn reset(&mut self) {
        self.state = CheckState::Disarmed;
    }

    /// Whether a destructive action may proceed now. The state is left as is.
    pub fn confirm(&self) -> bool {
        self.is_armed()
    }

    /// Handle an activation: arm and suppress when disarmed, let it through when armed.
    pub fn activate(&mut self, event: &mut ControlEvent) {
        if !self.confirm() {
            event.prevent_default();
            self.arm();
        }
    }

    /// Handle focus loss.
    pub fn blur(&mut self, _event: &mut ControlEvent) {
        self.reset();
    }

    /// Run a caller-supplied handler and then the control's own handler for `event`.
    ///
    /// Neither handler can drop the other; a caller that prevents the default
    /// still leaves the state transition to the control.
    pub fn dispatch(&mut self, event: &mut ControlEvent, caller: impl FnOnce(&mut ControlEvent)) {
        caller(event);
        match event.kind() {
            EventKind::Activate => self.activate(event),
            EventKind::Blur => self.blur(event),
        }
    }

    /// Pick the label matching the current state.
    pub fn label<'a>(&self, disarmed: &'a str, armed: &'a str) -> &'a str {
        match self.state {
            CheckState::Disarmed => disarmed,
            CheckState::Armed => armed,
        }
    }
}
