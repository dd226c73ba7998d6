//! Host document over the Chrome DevTools Protocol.
//!
//! Attaches to an already open tab of a Chrome started with remote debugging
//! and exposes it as a [`HostDocument`](movesync_protocols::HostDocument):
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │  BotController  │ ◄──────────────► │   Chrome tab     │
//! │  (CdpHost)      │       CDP        │  (move list page)│
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! Move-list notifications come from a `MutationObserver` injected into the
//! page that reports through a `Runtime.addBinding` callback.
//!
//! Start Chrome with:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```

pub mod cdp;
mod host;
mod scripts;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use host::CdpHost;
pub use scripts::NOTIFY_BINDING;
