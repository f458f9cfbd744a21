//! Same-origin fan-out of new-product events.
//!
//! The echo endpoint reflects frames only to the sender's own connection,
//! so tab-to-tab consistency needs a channel that never touches the
//! network. On the web that is the browser's `BroadcastChannel`; on
//! desktop it is a process-wide broadcast bus shared by all windows.
//! Both guarantee that a posted envelope is delivered to every *other*
//! open channel and never echoed back to its poster.

#[cfg(target_arch = "wasm32")]
mod fanout_wasm;
#[cfg(target_arch = "wasm32")]
pub use fanout_wasm::FanoutChannel;

#[cfg(not(target_arch = "wasm32"))]
mod fanout_native;
#[cfg(not(target_arch = "wasm32"))]
pub use fanout_native::FanoutChannel;
