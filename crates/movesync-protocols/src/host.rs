//! Host document protocol.
//!
//! The host is the live page the controller observes: it yields the recorded
//! plies, exposes the move input, delivers move-list change notifications and
//! reports whether the game has ended.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::HostError;
use crate::moves::PlyNode;

/// Subscription identifier type.
pub type SubscriptionId = String;

/// Opaque reference to a located element in the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One structural-change notification on the move-list container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEvent {
    /// Number of mutation records batched into this notification.
    #[serde(default)]
    pub records: usize,
}

/// An active move-list subscription.
///
/// Notifications arrive in the order the observed tree changed. There is
/// exactly one consumer.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    events: mpsc::UnboundedReceiver<MutationEvent>,
}

impl Subscription {
    pub fn new(id: impl Into<SubscriptionId>, events: mpsc::UnboundedReceiver<MutationEvent>) -> Self {
        Self {
            id: id.into(),
            events,
        }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Wait for the next notification. `None` once the source is gone.
    pub async fn next(&mut self) -> Option<MutationEvent> {
        self.events.recv().await
    }
}

/// The observed page.
#[async_trait]
pub trait HostDocument: Send + Sync {
    /// Read every recorded ply element in display order.
    async fn ply_nodes(&self) -> Result<Vec<PlyNode>, HostError>;

    /// Locate the move input surface. `Ok(None)` when it is absent.
    async fn find_move_input(&self) -> Result<Option<ElementHandle>, HostError>;

    /// Set the value of a located input.
    async fn set_input_value(&self, input: &ElementHandle, value: &str) -> Result<(), HostError>;

    /// Dispatch the confirm (Enter) trigger on a located input.
    async fn dispatch_confirm(&self, input: &ElementHandle) -> Result<(), HostError>;

    /// Drop the host's reference to a located element. The handle is
    /// unusable afterwards.
    async fn release_element(&self, element: &ElementHandle) -> Result<(), HostError>;

    /// Subscribe to structural changes of the move-list container, subtree
    /// included. Fails with [`HostError::ElementNotFound`] if the container
    /// is absent.
    async fn observe_move_list(&self) -> Result<Subscription, HostError>;

    /// Release a subscription. The event channel closes afterwards.
    async fn disconnect(&self, id: &SubscriptionId) -> Result<(), HostError>;

    /// Whether a game-result marker is present anywhere in the page.
    async fn has_game_result(&self) -> Result<bool, HostError>;
}
