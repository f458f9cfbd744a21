//! Desktop implementation backed by a process-wide broadcast bus.
//!
//! All windows of the desktop app live in one process, so a
//! `tokio::sync::broadcast` channel plays the role the browser's
//! `BroadcastChannel` plays on the web. Every frame is tagged with the
//! posting channel's id so a channel never receives its own posts.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use shopdash_shared::SyncEnvelope;
use tokio::sync::{broadcast, Notify};

use crate::log_warn;

#[derive(Clone)]
struct BusFrame {
    origin: u64,
    envelope: SyncEnvelope,
}

static BUS: OnceLock<broadcast::Sender<BusFrame>> = OnceLock::new();
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn bus() -> &'static broadcast::Sender<BusFrame> {
    BUS.get_or_init(|| broadcast::channel(64).0)
}

/// A handle on the process-wide product sync bus. Clones share the same
/// origin id; `close()` stops delivery for all clones and makes later
/// posts no-ops.
#[derive(Clone)]
pub struct FanoutChannel {
    id: u64,
    open: Arc<AtomicBool>,
    closed: Arc<Notify>,
}

impl FanoutChannel {
    /// Subscribe to the bus and deliver every envelope posted by *other*
    /// channels to `on_envelope`.
    pub fn open(on_envelope: impl Fn(SyncEnvelope) + Send + Sync + 'static) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let open = Arc::new(AtomicBool::new(true));
        let closed = Arc::new(Notify::new());

        let mut rx = bus().subscribe();
        let open_flag = open.clone();
        let closed_signal = closed.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = closed_signal.notified() => break,
                    frame = rx.recv() => match frame {
                        Ok(frame) => {
                            if !open_flag.load(Ordering::Relaxed) {
                                break;
                            }
                            if frame.origin != id {
                                on_envelope(frame.envelope);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // No delivery guarantees on this channel; the
                            // catalog converges through the fetch path.
                            log_warn!("fan-out receiver lagged, skipped {} envelopes", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Self { id, open, closed }
    }

    /// Broadcast an envelope to every other open channel in the process.
    pub fn post(&self, envelope: &SyncEnvelope) {
        if !self.open.load(Ordering::Relaxed) {
            return;
        }
        // Errors only mean there are no other subscribers right now.
        let _ = bus().send(BusFrame {
            origin: self.id,
            envelope: envelope.clone(),
        });
    }

    /// Release the channel. Later posts and receives are no-ops.
    pub fn close(&self) {
        self.open.store(false, Ordering::Relaxed);
        self.closed.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use shopdash_shared::{Product, SyncSource};
    use std::time::Duration;

    fn product(id: i64) -> Product {
        Product {
            id,
            title: "Echo Test Product".to_string(),
            description: "Testing echo functionality".to_string(),
            price: 123.45,
            category: "beauty".to_string(),
            rating: None,
            stock: None,
            discount_percentage: None,
            brand: None,
            thumbnail: None,
            images: None,
        }
    }

    // The bus is process-wide, so channels opened by concurrently running
    // tests legitimately deliver into each other; assertions filter for
    // this test's own envelopes instead of assuming a quiet bus.

    #[tokio::test]
    async fn delivers_to_others_never_to_sender() {
        let (a_tx, mut a_rx) = futures_channel::mpsc::unbounded();
        let (b_tx, mut b_rx) = futures_channel::mpsc::unbounded();

        let a = FanoutChannel::open(move |env| {
            let _ = a_tx.unbounded_send(env);
        });
        let b = FanoutChannel::open(move |env| {
            let _ = b_tx.unbounded_send(env);
        });

        let envelope = SyncEnvelope::new_product(product(101), SyncSource::Local);
        a.post(&envelope);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            let received = tokio::time::timeout_at(deadline, b_rx.next())
                .await
                .expect("delivery to sibling timed out")
                .expect("channel closed");
            if received == envelope {
                break;
            }
        }

        // The poster itself must never see its own envelope.
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(Some(received)) = a_rx.try_next() {
            assert_ne!(received, envelope, "sender received its own post");
        }

        a.close();
        b.close();
    }

    #[tokio::test]
    async fn closed_channel_neither_posts_nor_receives() {
        let (tx, mut rx) = futures_channel::mpsc::unbounded();
        let listener = FanoutChannel::open(move |env| {
            let _ = tx.unbounded_send(env);
        });
        let (probe_tx, mut probe_rx) = futures_channel::mpsc::unbounded();
        let probe = FanoutChannel::open(move |env| {
            let _ = probe_tx.unbounded_send(env);
        });
        let poster = FanoutChannel::open(|_| {});

        let after_close = SyncEnvelope::new_product(product(102), SyncSource::Local);
        listener.close();
        poster.post(&after_close);

        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(Some(received)) = rx.try_next() {
            assert_ne!(received, after_close, "closed channel still received");
        }

        // Posts after close go nowhere, not even to open channels.
        let after_poster_close = SyncEnvelope::new_product(product(103), SyncSource::Local);
        poster.close();
        poster.post(&after_poster_close);
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(Some(received)) = probe_rx.try_next() {
            assert_ne!(received, after_poster_close, "closed channel still posted");
        }
        probe.close();
    }
}
