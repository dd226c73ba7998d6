//! # movesync Core
//!
//! The move-synchronization controller.
//!
//! ```text
//! start() ──► extract ──► recommend (bounded retry) ──► inject
//!    │
//!    └──► observe move list ──► toggle ──► extract ──► recommend ──► inject
//!                   │
//!                   └── game result ──► stop()
//! ```
//!
//! [`BotController`] owns the single [`Session`] and is the only entry point a
//! UI needs: `start()`, `stop()` and a status stream.

mod controller;
mod engine;
mod error;
mod extract;
mod inject;
mod retry;
mod session;
mod toggle;
mod watch;

#[cfg(test)]
mod fakes;

pub use controller::{BotController, BotOptions};
pub use engine::EngineClient;
pub use error::{ExtractError, InjectError};
pub use extract::MoveExtractor;
pub use inject::MoveInjector;
pub use retry::{RetryOutcome, RetryPolicy, RetryTask};
pub use session::Session;
pub use toggle::{MoveToggle, TogglePhase};
