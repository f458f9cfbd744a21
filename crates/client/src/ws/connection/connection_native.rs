//! Desktop connection loop built on tokio-tungstenite.
//!
//! A single spawned task owns the socket, the outbound queue and the
//! control channel, multiplexing them with `select!`. Because the task
//! owns everything, backoff timers are interruptible: a `Resume` control
//! frame cancels the wait instead of racing a sleeping timer.

use std::sync::Arc;
use std::time::Duration;

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::{SinkExt, StreamExt};
use shopdash_shared::RealtimeEvent;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::super::fanout::FanoutChannel;
use super::{
    dispatch_frame, drop_non_text_frame, ConnectionState, Control, ReconnectConfig, SessionEnd,
    WsHandle,
};
use crate::{log_error, log_info, log_warn};

type EventCallback = Arc<dyn Fn(RealtimeEvent) + Send + Sync>;
type StateCallback = Arc<dyn Fn(ConnectionState) + Send + Sync>;

/// A managed WebSocket connection. Dropping it (or calling
/// [`WsConnection::disconnect`]) stops the loop and closes the socket.
pub struct WsConnection {
    handle: WsHandle,
    control: UnboundedSender<Control>,
}

impl WsConnection {
    /// Open a connection to `url` and start the reconnect loop.
    ///
    /// `on_event` receives every decoded inbound event; `on_state` every
    /// state transition. Both run on the connection task.
    pub fn new(
        url: impl Into<String>,
        fanout: FanoutChannel,
        on_event: impl Fn(RealtimeEvent) + Send + Sync + 'static,
        on_state: impl Fn(ConnectionState) + Send + Sync + 'static,
        config: ReconnectConfig,
    ) -> Self {
        let url = url.into();
        let (outbound_tx, outbound_rx) = mpsc::unbounded();
        let (control_tx, control_rx) = mpsc::unbounded();
        let handle = WsHandle::new(outbound_tx, fanout.clone());

        let on_event: EventCallback = Arc::new(on_event);
        let on_state: StateCallback = Arc::new(on_state);
        tokio::spawn(run_loop(
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
    // Reconnect attempts since the last healthy session.
    let mut attempt: u32 = 0;
    'outer: loop {
        if attempt == 0 {
            on_state(ConnectionState::Connecting);
        }
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                log_info!("connected to {}", url);
                attempt = 0;
                on_state(ConnectionState::Connected);
                match run_session(stream, &mut outbound_rx, &mut control_rx, &fanout, &on_event)
                    .await
                {
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
            // Park until someone asks for a fresh round of attempts.
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
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(delay as u64)) => {}
            ctrl = control_rx.next() => match ctrl {
                Some(Control::Resume) => {}
                Some(Control::Shutdown) | None => break 'outer,
            },
        }
    }

    on_state(ConnectionState::Disconnected);
    fanout.close();
}

/// Drive one connected session until the socket drops or a shutdown is
/// requested. Outbound frames queued while the socket was down are
/// drained here, so nothing queued during an outage is lost.
async fn run_session(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    outbound_rx: &mut UnboundedReceiver<RealtimeEvent>,
    control_rx: &mut UnboundedReceiver<Control>,
    fanout: &FanoutChannel,
    on_event: &EventCallback,
) -> SessionEnd {
    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    dispatch_frame(text.as_str(), fanout, &|event| on_event(event));
                }
                Some(Ok(Message::Binary(bytes))) => drop_non_text_frame(bytes.len()),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                Some(Err(e)) => {
                    log_error!("socket error: {}", e);
                    return SessionEnd::Closed;
                }
            },
            event = outbound_rx.next() => {
                let Some(event) = event else { return SessionEnd::Shutdown };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            log_error!("send failed: {}", e);
                            return SessionEnd::Closed;
                        }
                    }
                    Err(e) => log_error!("failed to serialize outbound event: {}", e),
                }
            },
            ctrl = control_rx.next() => match ctrl {
                Some(Control::Resume) => {}
                Some(Control::Shutdown) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }
            },
        }
    }
}
