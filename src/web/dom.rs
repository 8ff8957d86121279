//! [`HookHost`] over a live DOM element.

use frames::Frame;
use web_sys::HtmlElement;

use super::socket;
use crate::host::{ChannelError, HookHost};

/// The element a map hook is attached to. Its `id` is the routing topic.
pub struct DomHost {
    element: HtmlElement,
}

impl DomHost {
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl HookHost for DomHost {
    fn topic(&self) -> Option<String> {
        let id = self.element.id();
        (!id.is_empty()).then_some(id)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn push(&self, frame: &Frame) -> Result<(), ChannelError> {
        socket::send(frame)
    }

    fn scroll_into_view(&self, dom_id: &str) -> bool {
        let Some(target) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(dom_id))
        else {
            return false;
        };
        target.scroll_into_view_with_bool(false);
        true
    }
}
