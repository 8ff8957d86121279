//! What a mounted hook needs from its surroundings.
//!
//! A host is the element the hook is attached to plus the channel it talks
//! over. The browser implementation lives in `web::dom`; tests use an
//! in-memory recorder.

use frames::Frame;

/// Error returned when an outbound frame cannot be handed to the channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,
    #[error("channel rejected frame: {0}")]
    Rejected(String),
}

pub trait HookHost: 'static {
    /// Routing key for frames to and from this hook (the host element id).
    fn topic(&self) -> Option<String>;

    /// Read an attribute of the host element.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Hand an outbound frame to the channel without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the channel is closed or refuses the frame.
    fn push(&self, frame: &Frame) -> Result<(), ChannelError>;

    /// Scroll the page element with `dom_id` into view, aligned to the bottom
    /// of the viewport. Returns `false` when no such element exists.
    fn scroll_into_view(&self, dom_id: &str) -> bool;
}
