//! # movesync Protocols
//!
//! Shared types and interface definitions for the movesync workspace.
//! Contains only definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`HostDocument`] - The observed page: ply list, move input, move-list
//!   notifications and the game-result marker
//! - [`MoveRecommender`] - A single request against the recommendation service
//!
//! ## Core Types
//!
//! - [`MoveSequence`] - Ordered list of played moves, rebuilt on every read
//! - [`BotState`] / [`BotStatus`] - Controller state as rendered by a UI

pub mod engine;
pub mod error;
pub mod host;
pub mod moves;
pub mod state;

pub use engine::{BestMove, EngineReply, EngineRequest, MoveRecommender};
pub use error::{EngineError, HostError};
pub use host::{ElementHandle, HostDocument, MutationEvent, Subscription, SubscriptionId};
pub use moves::{MoveNotation, MoveSequence, PlyNode};
pub use state::{BotState, BotStatus};
