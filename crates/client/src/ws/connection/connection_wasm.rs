//! Browser connection loop built on `web_sys::WebSocket`.
//!
//! Socket callbacks forward into channels so a single `spawn_local` task
//! can multiplex inbound frames, the outbound queue and control messages
//! with `select!`, mirroring the desktop loop. Closures are kept alive
//! for the session and dropped on teardown instead of being leaked.

use std::rc::Rc;

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::{select, FutureExt, StreamExt};
use shopdash_shared::RealtimeEvent;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{js_sys, CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use super::super::fanout::FanoutChannel;
use super::{
    dispatch_frame, drop_non_text_frame, ConnectionState, Control, ReconnectConfig, SessionEnd,
    WsHandle,
};
use crate::{log_error, log_info, log_warn};

type EventCallback = Rc<dyn Fn(RealtimeEvent)>;
type StateCallback = Rc<dyn Fn(ConnectionState)>;

/// A managed WebSocket connection. Dropping it (or calling
/// [`WsConnection::disconnect`]) stops the loop and closes the socket.
pub struct WsConnection {
    handle: WsHandle,
    control: UnboundedSender<Control>,
}

impl WsConnection {
    /// Open a connection to `url` and start the reconnect loop.
    pub fn new(
        url: impl Into<String>,
        fanout: FanoutChannel,
        on_event: impl Fn(RealtimeEvent) + 'static,
        on_state: impl Fn(ConnectionState) + 'static,
        config: ReconnectConfig,
    ) -> Self {
        let url = url.into();
        let (outbound_tx, outbound_rx) = mpsc::unbounded();
        let (control_tx, control_rx) = mpsc::unbounded();
        let handle = WsHandle::new(outbound_tx, fanout.clone());

        let on_event: EventCallback = Rc::new(on_event);
        let on_state: StateCallback = Rc::new(on_state);
        spawn_local(run_loop(
            url,
            outbound_rx,
            control_rx,
            fanout,
            on_event,
            on_state,
            config,
        ));

        Self {
            handle,
            control: control_tx,
        }
    }

    /// Clonable handle for queueing outbound frames.
    pub fn handle(&self) -> WsHandle {
        self.handle.clone()
    }

    /// Retry now. Wakes a parked loop after the retry cap was reached and
    /// cuts a pending backoff delay short.
    pub fn connect(&self) {
        let _ = self.control.unbounded_send(Control::Resume);
    }

    /// Close the socket, stop the loop and release the fan-out channel.
    pub fn disconnect(&self) {
        let _ = self.control.unbounded_send(Control::Shutdown);
        self.handle.fanout.close();
    }
}

async fn run_loop(
    url: String,
    mut outbound_rx: UnboundedReceiver<RealtimeEvent>,
    mut control_rx: UnboundedReceiver<Control>,
    fanout: FanoutChannel,
    on_event: EventCallback,
    on_state: StateCallback,
    config: ReconnectConfig,
) {
    let mut attempt: u32 = 0;
    'outer: loop {
        if attempt == 0 {
            on_state(ConnectionState::Connecting);
        }
        match open_socket(&url).await {
            Ok(session) => {
                log_info!("connected to {}", url);
                attempt = 0;
                on_state(ConnectionState::Connected);
                let end =
                    run_session(session, &mut outbound_rx, &mut control_rx, &fanout, &on_event)
                        .await;
                match end {
                    SessionEnd::Shutdown => break 'outer,
                    SessionEnd::Closed => log_warn!("connection to {} closed", url),
                }
            }
            Err(e) => log_error!("connect to {} failed: {}", url, e),
        }

        if attempt >= config.max_attempts {
            log_error!("giving up on {} after {} attempts", url, config.max_attempts);
            on_state(ConnectionState::Failed {
                reason: format!("gave up after {} attempts", config.max_attempts),
            });
            loop {
                match control_rx.next().await {
                    Some(Control::Resume) => {
                        attempt = 0;
                        continue 'outer;
                    }
                    Some(Control::Shutdown) | None => break 'outer,
                }
            }
        }

        let delay = config.delay_for_attempt(attempt);
        attempt += 1;
        on_state(ConnectionState::Reconnecting { attempt });
        log_info!(
            "reconnecting to {} in {}ms (attempt {}/{})",
            url,
            delay,
            attempt,
            config.max_attempts
        );
        select! {
            _ = gloo_timers::future::TimeoutFuture::new(delay).fuse() => {}
            ctrl = control_rx.next() => match ctrl {
                Some(Control::Resume) => {}
                Some(Control::Shutdown) | None => break 'outer,
            },
        }
    }

    on_state(ConnectionState::Disconnected);
    fanout.close();
}

/// One open socket plus the channels and closures that feed it. The
/// closures must stay alive for the session; dropping this tears the
/// socket down.
struct Session {
    ws: WebSocket,
    frames: UnboundedReceiver<String>,
    closed: UnboundedReceiver<()>,
    _callbacks: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}

async fn open_socket(url: &str) -> Result<Session, String> {
    use std::cell::RefCell;

    let ws = WebSocket::new(url).map_err(|e| format!("failed to create socket: {e:?}"))?;

    let is_open = Rc::new(RefCell::new(false));
    let error_reason = Rc::new(RefCell::new(None::<String>));
    let (frame_tx, frames) = mpsc::unbounded();
    let (closed_tx, closed) = mpsc::unbounded();
    let mut callbacks: Vec<Closure<dyn FnMut(JsValue)>> = Vec::new();

    let is_open_cb = is_open.clone();
    let onopen = Closure::wrap(Box::new(move |_: JsValue| {
        *is_open_cb.borrow_mut() = true;
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    callbacks.push(onopen);

    let onmessage = Closure::wrap(Box::new(move |e: JsValue| {
        let e: MessageEvent = e.unchecked_into();
        if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
            let _ = frame_tx.unbounded_send(String::from(text));
        } else {
            drop_non_text_frame(0);
        }
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    callbacks.push(onmessage);

    let error_reason_err = error_reason.clone();
    let onerror = Closure::wrap(Box::new(move |e: JsValue| {
        let e: ErrorEvent = e.unchecked_into();
        *error_reason_err.borrow_mut() = Some(if e.message().is_empty() {
            "socket error".to_string()
        } else {
            e.message()
        });
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    callbacks.push(onerror);

    let error_reason_close = error_reason.clone();
    let onclose = Closure::wrap(Box::new(move |e: JsValue| {
        let e: CloseEvent = e.unchecked_into();
        if !e.reason().is_empty() {
            *error_reason_close.borrow_mut() = Some(e.reason());
        }
        let _ = closed_tx.unbounded_send(());
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    callbacks.push(onclose);

    // Poll for the open event, 5 second budget.
    for _ in 0..500 {
        if *is_open.borrow() {
            return Ok(Session {
                ws,
                frames,
                closed,
                _callbacks: callbacks,
            });
        }
        if let Some(reason) = error_reason.borrow().clone() {
            ws.set_onclose(None);
            let _ = ws.close();
            return Err(reason);
        }
        gloo_timers::future::TimeoutFuture::new(10).await;
    }

    ws.set_onclose(None);
    let _ = ws.close();
    Err("connection timeout".to_string())
}

async fn run_session(
    mut session: Session,
    outbound_rx: &mut UnboundedReceiver<RealtimeEvent>,
    control_rx: &mut UnboundedReceiver<Control>,
    fanout: &FanoutChannel,
    on_event: &EventCallback,
) -> SessionEnd {
    let Session {
        ws,
        frames,
        closed,
        _callbacks: _,
    } = &mut session;
    loop {
        select! {
            frame = frames.next() => match frame {
                Some(raw) => dispatch_frame(&raw, fanout, &|event| on_event(event)),
                None => return SessionEnd::Closed,
            },
            _ = closed.next() => return SessionEnd::Closed,
            event = outbound_rx.next() => {
                let Some(event) = event else { return SessionEnd::Shutdown };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if let Err(e) = ws.send_with_str(&json) {
                            log_error!("send failed: {:?}", e);
                            return SessionEnd::Closed;
                        }
                    }
                    Err(e) => log_error!("failed to serialize outbound event: {}", e),
                }
            },
            ctrl = control_rx.next() => match ctrl {
                Some(Control::Resume) => {}
                Some(Control::Shutdown) | None => return SessionEnd::Shutdown,
            },
        }
    }
}
