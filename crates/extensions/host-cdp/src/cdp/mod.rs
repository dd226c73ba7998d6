//! Minimal Chrome DevTools Protocol client.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.attach_matching("chess.com/play").await?;
//! page.wait_for_load().await?;
//! let title = page.evaluate("document.title").await?;
//! ```

mod client;
mod connection;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
