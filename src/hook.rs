//! Lifecycle shell around one [`SyncController`].
//!
//! The hook shares its controller with the widget's click listeners through a
//! weak handle: once the hook is destroyed, a click that still reaches a
//! stale listener finds nothing to upgrade and is dropped.

#[cfg(test)]
#[path = "hook_test.rs"]
mod hook_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use frames::Frame;

use crate::adapter::MarkerClickHandler;
use crate::config::SyncConfig;
use crate::controller::{MountError, SyncController};
use crate::host::HookHost;
use crate::location::LocationId;
use crate::widget::MapWidget;

type Shared<W, H> = Rc<RefCell<SyncController<W, H>>>;

/// A mounted map hook.
pub struct MapHook<W: MapWidget, H: HookHost> {
    inner: Shared<W, H>,
}

impl<W: MapWidget, H: HookHost> MapHook<W, H> {
    /// Mount a map in `container` with an explicit config.
    ///
    /// # Errors
    ///
    /// Returns [`MountError`] when the mount aborts; nothing stays registered.
    pub fn mount(host: H, config: SyncConfig, container: &W::Container) -> Result<Self, MountError> {
        let inner: Shared<W, H> = Rc::new(RefCell::new(SyncController::new(host, config)));
        let weak = Rc::downgrade(&inner);
        let on_click: MarkerClickHandler = Rc::new(move |id: &LocationId| deliver_click(&weak, id));
        inner.borrow_mut().mount(container, Some(on_click))?;
        Ok(Self { inner })
    }

    /// Mount a map configured from the host element's attributes.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::Config`] for unusable attributes, otherwise the
    /// same failures as [`MapHook::mount`].
    pub fn mount_from_attributes(host: H, container: &W::Container) -> Result<Self, MountError> {
        let config = SyncConfig::from_attributes(|name| host.attribute(name))?;
        Self::mount(host, config, container)
    }

    /// Deliver one inbound frame.
    pub fn handle_frame(&self, frame: &Frame) {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.handle_frame(frame),
            Err(_) => log::warn!("{}: map busy, frame dropped", frame.event),
        }
    }

    /// Notify the hook that its channel dropped.
    pub fn channel_closed(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.channel_closed(),
            Err(_) => log::warn!("map busy, channel close not applied"),
        }
    }

    #[must_use]
    pub fn topic(&self) -> Option<String> {
        self.inner.borrow().host().topic()
    }

    /// Run `f` against the controller.
    #[cfg(test)]
    pub(crate) fn inspect<R>(&self, f: impl FnOnce(&SyncController<W, H>) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Unmount: pending requests are discarded and the map is torn down.
    pub fn destroy(self) {
        self.inner.borrow_mut().unmount();
    }
}

fn deliver_click<W: MapWidget, H: HookHost>(weak: &Weak<RefCell<SyncController<W, H>>>, id: &LocationId) {
    let Some(inner) = weak.upgrade() else {
        log::debug!("marker {id} clicked after unmount");
        return;
    };
    match inner.try_borrow_mut() {
        Ok(mut controller) => {
            controller.on_marker_clicked(id);
        }
        Err(_) => log::warn!("marker {id} click dropped, map busy"),
    }
}
