//! Response turn bookkeeping.
//!
//! The server rejects a `response.create` while another response is in
//! progress. Requests are therefore recorded as pending and released one at
//! a time once the active response is done.

/// Tracks whether a response is in flight and whether another is wanted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TurnTracker {
    response_active: bool,
    awaiting_ack: bool,
    create_pending: bool,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a new response should be created.
    pub fn request(&mut self) {
        self.create_pending = true;
    }

    /// Returns true if a pending request may be sent now, marking it sent.
    pub fn take_create(&mut self) -> bool {
        if !self.create_pending || self.response_active {
            return false;
        }
        self.create_pending = false;
        self.response_active = true;
        self.awaiting_ack = true;
        true
    }

    pub fn on_response_created(&mut self) {
        self.response_active = true;
        self.awaiting_ack = false;
    }

    pub fn on_response_done(&mut self) {
        self.response_active = false;
        self.awaiting_ack = false;
    }

    /// An error event right after our `response.create` means it was
    /// rejected; free the slot so the next request can go out.
    pub fn on_error(&mut self) {
        if self.awaiting_ack {
            self.awaiting_ack = false;
            self.response_active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.response_active
    }

    pub fn has_pending(&self) -> bool {
        self.create_pending
    }
}
