//! Browser entry points (`hydrate` feature).
//!
//! JavaScript calls [`init`] once per page, then creates a [`LiveMapHook`]
//! for each element carrying a map hook and calls `destroyed()` when the
//! element leaves the page. Inbound frames are routed to hooks by topic (the
//! element id); frames without a topic go to every mounted hook.

pub mod dom;
pub mod leaflet;
mod socket;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use frames::Frame;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use self::dom::DomHost;
use self::leaflet::LeafletWidget;
use crate::hook::MapHook;

type LiveHook = MapHook<LeafletWidget, DomHost>;

thread_local! {
    static HOOKS: RefCell<HashMap<u32, Rc<LiveHook>>> = RefCell::new(HashMap::new());
    static NEXT_KEY: Cell<u32> = const { Cell::new(0) };
}

/// Install logging and open the frame socket.
///
/// `socket_url` defaults to `/api/ws` on the page's host.
///
/// # Errors
///
/// Fails when no URL can be derived from the page.
#[wasm_bindgen]
pub fn init(socket_url: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        log::debug!("console logger already installed: {err}");
    }

    let url = socket_url
        .or_else(socket::default_url)
        .ok_or_else(|| JsValue::from_str("cannot derive socket url from page location"))?;
    if !socket::spawn(url) {
        log::debug!("socket already running");
    }
    Ok(())
}

/// A map hook bound to one page element.
#[wasm_bindgen]
pub struct LiveMapHook {
    key: u32,
}

#[wasm_bindgen]
impl LiveMapHook {
    /// Mount a map on `element`, configured from its `data-*` attributes.
    ///
    /// # Errors
    ///
    /// Returns the mount error as a string; nothing stays registered.
    #[wasm_bindgen(constructor)]
    pub fn mounted(element: HtmlElement) -> Result<LiveMapHook, JsValue> {
        let host = DomHost::new(element.clone());
        let hook = LiveHook::mount_from_attributes(host, &element).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let key = NEXT_KEY.with(|next| {
            let key = next.get().wrapping_add(1);
            next.set(key);
            key
        });
        HOOKS.with(|hooks| {
            hooks.borrow_mut().insert(key, Rc::new(hook));
        });
        Ok(Self { key })
    }

    /// Unmount the map and forget its pending requests.
    pub fn destroyed(self) {
        let Some(hook) = HOOKS.with(|hooks| hooks.borrow_mut().remove(&self.key)) else {
            return;
        };
        match Rc::try_unwrap(hook) {
            Ok(hook) => hook.destroy(),
            // Still referenced by an in-progress dispatch; unmounts on drop.
            Err(shared) => drop(shared),
        }
    }
}

fn mounted_hooks(topic: Option<&str>) -> Vec<Rc<LiveHook>> {
    HOOKS.with(|hooks| {
        hooks
            .borrow()
            .values()
            .filter(|hook| topic.is_none() || hook.topic().as_deref() == topic)
            .cloned()
            .collect()
    })
}

fn dispatch_frame(frame: &Frame) {
    let targets = mounted_hooks(frame.topic.as_deref());
    if targets.is_empty() {
        log::debug!("{}: no mounted map for topic {:?}", frame.event, frame.topic);
    }
    for hook in targets {
        hook.handle_frame(frame);
    }
}

fn dispatch_closed() {
    for hook in mounted_hooks(None) {
        hook.channel_closed();
    }
}
