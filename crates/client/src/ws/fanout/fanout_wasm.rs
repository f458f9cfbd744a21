//! Web implementation backed by `web_sys::BroadcastChannel`.

use std::cell::RefCell;
use std::rc::Rc;

use shopdash_shared::{SyncEnvelope, FANOUT_CHANNEL};
use wasm_bindgen::prelude::*;
use web_sys::{BroadcastChannel, MessageEvent};

use crate::{log_error, log_warn};

/// A handle on the shared "products-sync" broadcast channel. Clones share
/// one underlying channel; `close()` releases it for all clones, after
/// which posts are no-ops.
#[derive(Clone)]
pub struct FanoutChannel {
    chan: Rc<RefCell<Option<BroadcastChannel>>>,
}

impl FanoutChannel {
    /// Open the channel and start delivering inbound envelopes to
    /// `on_envelope`. Envelopes the peer serialized are carried as JSON
    /// text; anything that does not decode as a known envelope is dropped.
    pub fn open(on_envelope: impl Fn(SyncEnvelope) + 'static) -> Self {
        let chan = match BroadcastChannel::new(FANOUT_CHANNEL) {
            Ok(chan) => chan,
            Err(e) => {
                // No BroadcastChannel support; realtime still works over
                // the socket, only cross-tab sync is lost.
                log_warn!("BroadcastChannel unavailable: {:?}", e);
                return Self {
                    chan: Rc::new(RefCell::new(None)),
                };
            }
        };

        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                log_warn!("dropping non-text fan-out message");
                return;
            };
            match serde_json::from_str::<SyncEnvelope>(&text) {
                Ok(envelope) => on_envelope(envelope),
                Err(e) => log_warn!("dropping unrecognized fan-out message: {}", e),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        chan.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        Self {
            chan: Rc::new(RefCell::new(Some(chan))),
        }
    }

    /// Broadcast an envelope to every other context on the channel.
    /// The browser never delivers it back to this context.
    pub fn post(&self, envelope: &SyncEnvelope) {
        let borrow = self.chan.borrow();
        let Some(chan) = borrow.as_ref() else {
            return;
        };
        match serde_json::to_string(envelope) {
            Ok(json) => {
                if let Err(e) = chan.post_message(&JsValue::from_str(&json)) {
                    log_error!("fan-out post failed: {:?}", e);
                }
            }
            Err(e) => log_error!("fan-out serialize failed: {}", e),
        }
    }

    /// Release the channel. Later posts and receives are no-ops.
    pub fn close(&self) {
        if let Some(chan) = self.chan.borrow_mut().take() {
            chan.set_onmessage(None);
            chan.close();
        }
    }
}
