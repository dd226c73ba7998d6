//! [`HostDocument`] backed by a CDP page session.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use movesync_config::{BrowserConfig, SelectorsConfig};
use movesync_protocols::{
    ElementHandle, HostDocument, HostError, MutationEvent, PlyNode, Subscription, SubscriptionId,
};

use crate::cdp::{BindingCalled, CdpClient, CdpError, CdpResponse, PageSession};
use crate::scripts;

type Subscribers = Arc<Mutex<HashMap<SubscriptionId, mpsc::UnboundedSender<MutationEvent>>>>;

/// Payload the injected observer passes to the notify binding.
#[derive(Debug, Deserialize)]
struct NotifyPayload {
    subscription: SubscriptionId,
    #[serde(default)]
    records: usize,
}

/// A live Chrome tab as the controller's host document.
pub struct CdpHost {
    page: PageSession,
    selectors: SelectorsConfig,
    subscribers: Subscribers,
    next_subscription: AtomicU64,
    pump: tokio::task::JoinHandle<()>,
    // Owns the browser connection.
    _client: CdpClient,
}

impl CdpHost {
    /// Connect to the browser, attach to the first tab whose URL contains
    /// the configured pattern and wait for it to be ready.
    pub async fn attach(browser: &BrowserConfig, selectors: SelectorsConfig) -> Result<Self, CdpError> {
        let client = CdpClient::connect(&browser.endpoint).await?;
        let page = client.attach_matching(&browser.page_url_pattern).await?;
        page.wait_for_load().await?;
        info!("Attached to {}", page.url().await?);
        Self::from_page(client, page, selectors).await
    }

    /// Wrap an already attached page.
    pub async fn from_page(
        client: CdpClient,
        page: PageSession,
        selectors: SelectorsConfig,
    ) -> Result<Self, CdpError> {
        let events = page
            .take_events()
            .ok_or_else(|| CdpError::InvalidResponse("Page events already taken".to_string()))?;
        page.add_binding(scripts::NOTIFY_BINDING).await?;

        let subscribers: Subscribers = Arc::new(Mutex::new(HashMap::new()));
        let pump = tokio::spawn(pump_events(events, subscribers.clone()));

        Ok(Self {
            page,
            selectors,
            subscribers,
            next_subscription: AtomicU64::new(1),
            pump,
            _client: client,
        })
    }
}

impl Drop for CdpHost {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[async_trait]
impl HostDocument for CdpHost {
    async fn ply_nodes(&self) -> Result<Vec<PlyNode>, HostError> {
        let value = self.page.evaluate(&scripts::ply_nodes(&self.selectors)).await?;
        serde_json::from_value(value).map_err(|e| HostError::Malformed(format!("ply list: {}", e)))
    }

    async fn find_move_input(&self) -> Result<Option<ElementHandle>, HostError> {
        let object = self
            .page
            .evaluate_handle(&scripts::query(&self.selectors.move_input))
            .await?;
        if object.is_null() {
            return Ok(None);
        }
        Ok(object.object_id.map(ElementHandle::new))
    }

    async fn set_input_value(&self, input: &ElementHandle, value: &str) -> Result<(), HostError> {
        self.page
            .call_function_on(input.as_str(), scripts::SET_VALUE, vec![Value::from(value)])
            .await?;
        Ok(())
    }

    async fn dispatch_confirm(&self, input: &ElementHandle) -> Result<(), HostError> {
        self.page
            .call_function_on(input.as_str(), scripts::DISPATCH_CONFIRM, Vec::new())
            .await?;
        Ok(())
    }

    async fn release_element(&self, element: &ElementHandle) -> Result<(), HostError> {
        self.page.release_object(element.as_str()).await?;
        trace!("Released {}", element.as_str());
        Ok(())
    }

    async fn observe_move_list(&self) -> Result<Subscription, HostError> {
        let n = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        let id: SubscriptionId = format!("move-list-{}", n);

        // Registered first so no notification is lost.
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().insert(id.clone(), tx);

        let installed = self
            .page
            .evaluate(&scripts::observe(&self.selectors.move_list, &id))
            .await;
        match installed {
            Ok(Value::Bool(true)) => {
                debug!("Observing move list as {}", id);
                Ok(Subscription::new(id, rx))
            }
            Ok(_) => {
                self.subscribers.lock().remove(&id);
                Err(HostError::ElementNotFound(self.selectors.move_list.clone()))
            }
            Err(e) => {
                self.subscribers.lock().remove(&id);
                Err(e.into())
            }
        }
    }

    async fn disconnect(&self, id: &SubscriptionId) -> Result<(), HostError> {
        let known = self.subscribers.lock().remove(id).is_some();
        let removed = self.page.evaluate(&scripts::unobserve(id)).await?;
        if !known && removed != Value::Bool(true) {
            return Err(HostError::UnknownSubscription(id.clone()));
        }
        debug!("Disconnected {}", id);
        Ok(())
    }

    async fn has_game_result(&self) -> Result<bool, HostError> {
        self.page
            .evaluate(&scripts::exists(&self.selectors.game_result))
            .await?
            .as_bool()
            .ok_or_else(|| HostError::Malformed("game result check did not return a boolean".to_string()))
    }
}

/// Forward binding calls to their subscription until the page session ends.
async fn pump_events(mut events: mpsc::UnboundedReceiver<CdpResponse>, subscribers: Subscribers) {
    while let Some(event) = events.recv().await {
        match event.method.as_deref() {
            Some("Runtime.bindingCalled") => route_binding(event.params, &subscribers),
            Some("Runtime.executionContextsCleared") => {
                // The page navigated; every injected observer is gone.
                let dropped = {
                    let mut subscribers = subscribers.lock();
                    let n = subscribers.len();
                    subscribers.clear();
                    n
                };
                if dropped > 0 {
                    warn!("Page context cleared, dropped {} move list subscriptions", dropped);
                }
            }
            _ => {}
        }
    }
    debug!("Page event stream closed");
    subscribers.lock().clear();
}

fn route_binding(params: Option<Value>, subscribers: &Subscribers) {
    let Some(binding) = params.and_then(|p| serde_json::from_value::<BindingCalled>(p).ok()) else {
        return;
    };
    if binding.name != scripts::NOTIFY_BINDING {
        return;
    }
    let payload: NotifyPayload = match serde_json::from_str(&binding.payload) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Ignoring malformed notification: {}", e);
            return;
        }
    };

    let subscribers = subscribers.lock();
    match subscribers.get(&payload.subscription) {
        Some(tx) => {
            let _ = tx.send(MutationEvent {
                records: payload.records,
            });
        }
        None => trace!("Notification for unknown subscription {}", payload.subscription),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn binding(payload: &str) -> Option<Value> {
        Some(json!({"name": scripts::NOTIFY_BINDING, "payload": payload, "executionContextId": 1}))
    }

    fn subscribed(id: &str) -> (Subscribers, mpsc::UnboundedReceiver<MutationEvent>) {
        let subscribers: Subscribers = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        subscribers.lock().insert(id.to_string(), tx);
        (subscribers, rx)
    }

    #[test]
    fn test_route_binding_to_subscription() {
        let (subscribers, mut rx) = subscribed("move-list-1");
        route_binding(binding(r#"{"subscription":"move-list-1","records":2}"#), &subscribers);

        assert_eq!(rx.try_recv().unwrap(), MutationEvent { records: 2 });
    }

    #[test]
    fn test_route_binding_ignores_other_subscriptions() {
        let (subscribers, mut rx) = subscribed("move-list-1");
        route_binding(binding(r#"{"subscription":"move-list-9","records":1}"#), &subscribers);
        route_binding(binding("not json"), &subscribers);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_route_binding_ignores_other_bindings() {
        let (subscribers, mut rx) = subscribed("move-list-1");
        let params = json!({"name": "somethingElse", "payload": r#"{"subscription":"move-list-1"}"#});
        route_binding(Some(params), &subscribers);

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_pump_drops_subscribers_on_context_clear() {
        let (subscribers, mut rx) = subscribed("move-list-1");
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_events(events_rx, subscribers.clone()));

        let cleared: CdpResponse = serde_json::from_value(json!({
            "method": "Runtime.executionContextsCleared",
            "params": {},
            "sessionId": "S1"
        }))
        .unwrap();
        events_tx.send(cleared).unwrap();

        assert!(rx.recv().await.is_none());
        drop(events_tx);
        pump.await.unwrap();
        assert!(subscribers.lock().is_empty());
    }
}
