//! Websocket frame channel shared by every mounted map.
//!
//! One connection per page. Outbound frames go through an unbounded channel
//! drained by the send half; inbound frames are decoded and handed to the
//! hook registry. On disconnect the registry is told the channel closed and
//! the loop reconnects with exponential backoff.

use std::cell::{Cell, RefCell};

use frames::Frame;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::consts::SOCKET_PATH;
use crate::host::ChannelError;
use crate::reconnect::Backoff;

thread_local! {
    static OUTBOUND: RefCell<Option<UnboundedSender<Vec<u8>>>> = const { RefCell::new(None) };
    static CONNECTED: Cell<bool> = const { Cell::new(false) };
}

/// `ws(s)://<host>/api/ws` for the current page.
pub fn default_url() -> Option<String> {
    let location = web_sys::window()?.location();
    let (Ok(protocol), Ok(host)) = (location.protocol(), location.host()) else {
        return None;
    };
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    Some(format!("{scheme}://{host}{SOCKET_PATH}"))
}

/// Start the connection loop as a local task. Returns `false` if one is
/// already running.
pub fn spawn(url: String) -> bool {
    if OUTBOUND.with(|slot| slot.borrow().is_some()) {
        return false;
    }
    let (tx, rx) = mpsc::unbounded::<Vec<u8>>();
    OUTBOUND.with(|slot| *slot.borrow_mut() = Some(tx));
    wasm_bindgen_futures::spawn_local(socket_loop(url, rx));
    true
}

/// Queue `frame` for the server.
///
/// # Errors
///
/// [`ChannelError::Closed`] while disconnected, [`ChannelError::Rejected`] if
/// the send half has gone away.
pub fn send(frame: &Frame) -> Result<(), ChannelError> {
    if !CONNECTED.with(Cell::get) {
        return Err(ChannelError::Closed);
    }
    OUTBOUND.with(|slot| match slot.borrow().as_ref() {
        Some(tx) => tx
            .unbounded_send(frames::encode_frame(frame))
            .map_err(|err| ChannelError::Rejected(err.to_string())),
        None => Err(ChannelError::Closed),
    })
}

async fn socket_loop(url: String, mut rx: UnboundedReceiver<Vec<u8>>) {
    let mut backoff = Backoff::new();

    loop {
        let established = Cell::new(false);
        match connect_and_run(&url, &mut rx, &established).await {
            Ok(()) => log::info!("socket disconnected"),
            Err(err) => log::warn!("socket error: {err}"),
        }

        CONNECTED.with(|connected| connected.set(false));
        let stale = drain(&mut rx);
        if stale > 0 {
            log::debug!("dropped {stale} unsent frame(s)");
        }
        super::dispatch_closed();

        let delay_ms = backoff.after_attempt(established.get());
        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(delay_ms))).await;
    }
}

fn drain(rx: &mut UnboundedReceiver<Vec<u8>>) -> usize {
    let mut count = 0;
    while let Ok(Some(_)) = rx.try_next() {
        count += 1;
    }
    count
}

/// Run one connection until either half ends. `established` is set once a
/// frame has been written or read, which a refused handshake never reaches.
async fn connect_and_run(
    url: &str,
    rx: &mut UnboundedReceiver<Vec<u8>>,
    established: &Cell<bool>,
) -> Result<(), String> {
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
    let (mut ws_write, mut ws_read) = ws.split();
    CONNECTED.with(|connected| connected.set(true));
    log::info!("socket connected to {url}");

    let send_task = async {
        while let Some(bytes) = rx.next().await {
            if ws_write.send(Message::Bytes(bytes)).await.is_err() {
                break;
            }
            established.set(true);
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            if msg.is_ok() {
                established.set(true);
            }
            match msg {
                Ok(Message::Bytes(bytes)) => match frames::decode_frame(&bytes) {
                    Ok(frame) => super::dispatch_frame(&frame),
                    Err(err) => log::warn!("dropping undecodable frame: {err}"),
                },
                Ok(Message::Text(_)) => log::debug!("ignoring text message"),
                Err(err) => {
                    log::warn!("socket read failed: {err}");
                    break;
                }
            }
        }
    };

    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;
    Ok(())
}
