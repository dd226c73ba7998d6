//! In-memory host and engine used by the unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use movesync_protocols::{
    ElementHandle, EngineError, HostDocument, HostError, MoveNotation, MoveRecommender,
    MoveSequence, MutationEvent, PlyNode, Subscription, SubscriptionId,
};

struct HostState {
    plies: Vec<PlyNode>,
    fail_plies: bool,
    input_present: bool,
    move_list_present: bool,
    game_over: bool,
    fail_game_result: bool,
    fail_input: bool,
    injected: Vec<String>,
    confirms: usize,
    released: Vec<ElementHandle>,
    subscribe_calls: usize,
    next_id: usize,
    sender: Option<(SubscriptionId, mpsc::UnboundedSender<MutationEvent>)>,
    disconnected: Vec<SubscriptionId>,
}

/// Scriptable [`HostDocument`].
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new(plies: Vec<PlyNode>) -> Self {
        Self {
            state: Mutex::new(HostState {
                plies,
                fail_plies: false,
                input_present: true,
                move_list_present: true,
                game_over: false,
                fail_game_result: false,
                fail_input: false,
                injected: Vec::new(),
                confirms: 0,
                released: Vec::new(),
                subscribe_calls: 0,
                next_id: 0,
                sender: None,
                disconnected: Vec::new(),
            }),
        }
    }

    pub fn set_plies(&self, plies: Vec<PlyNode>) {
        self.state.lock().plies = plies;
    }

    pub fn fail_plies(&self, fail: bool) {
        self.state.lock().fail_plies = fail;
    }

    pub fn set_input_present(&self, present: bool) {
        self.state.lock().input_present = present;
    }

    pub fn set_move_list_present(&self, present: bool) {
        self.state.lock().move_list_present = present;
    }

    pub fn set_game_over(&self, over: bool) {
        self.state.lock().game_over = over;
    }

    pub fn fail_game_result(&self, fail: bool) {
        self.state.lock().fail_game_result = fail;
    }

    /// Fire one move-list notification. False when nobody is subscribed.
    pub fn notify(&self) -> bool {
        match &self.state.lock().sender {
            Some((_, tx)) => tx.send(MutationEvent { records: 1 }).is_ok(),
            None => false,
        }
    }

    /// Drop the notification source without a disconnect call.
    pub fn close_notifications(&self) {
        self.state.lock().sender = None;
    }

    pub fn injected(&self) -> Vec<String> {
        self.state.lock().injected.clone()
    }

    pub fn confirms(&self) -> usize {
        self.state.lock().confirms
    }

    pub fn fail_input(&self, fail: bool) {
        self.state.lock().fail_input = fail;
    }

    pub fn released(&self) -> Vec<ElementHandle> {
        self.state.lock().released.clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state.lock().subscribe_calls
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.lock().sender.is_some()
    }

    pub fn disconnected(&self) -> Vec<SubscriptionId> {
        self.state.lock().disconnected.clone()
    }
}

#[async_trait]
impl HostDocument for FakeHost {
    async fn ply_nodes(&self) -> Result<Vec<PlyNode>, HostError> {
        let state = self.state.lock();
        if state.fail_plies {
            return Err(HostError::Unavailable("page is gone".to_string()));
        }
        Ok(state.plies.clone())
    }

    async fn find_move_input(&self) -> Result<Option<ElementHandle>, HostError> {
        let state = self.state.lock();
        Ok(state.input_present.then(|| ElementHandle::new("input-1")))
    }

    async fn set_input_value(&self, _input: &ElementHandle, value: &str) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.fail_input {
            return Err(HostError::Script("input rejected the value".to_string()));
        }
        state.injected.push(value.to_string());
        Ok(())
    }

    async fn dispatch_confirm(&self, _input: &ElementHandle) -> Result<(), HostError> {
        self.state.lock().confirms += 1;
        Ok(())
    }

    async fn release_element(&self, element: &ElementHandle) -> Result<(), HostError> {
        self.state.lock().released.push(element.clone());
        Ok(())
    }

    async fn observe_move_list(&self) -> Result<Subscription, HostError> {
        let mut state = self.state.lock();
        state.subscribe_calls += 1;
        if !state.move_list_present {
            return Err(HostError::ElementNotFound("move list".to_string()));
        }
        state.next_id += 1;
        let id = format!("sub-{}", state.next_id);
        let (tx, rx) = mpsc::unbounded_channel();
        state.sender = Some((id.clone(), tx));
        Ok(Subscription::new(id, rx))
    }

    async fn disconnect(&self, id: &SubscriptionId) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.sender.as_ref().is_some_and(|(current, _)| current == id) {
            state.sender = None;
        }
        state.disconnected.push(id.clone());
        Ok(())
    }

    async fn has_game_result(&self) -> Result<bool, HostError> {
        let state = self.state.lock();
        if state.fail_game_result {
            return Err(HostError::Script("result lookup failed".to_string()));
        }
        Ok(state.game_over)
    }
}

/// Scriptable [`MoveRecommender`].
///
/// Queued errors are returned first, then the fixed answer.
pub struct ScriptedEngine {
    answer: Mutex<MoveNotation>,
    errors: Mutex<VecDeque<EngineError>>,
    delay: Mutex<Duration>,
    requests: Mutex<Vec<MoveSequence>>,
}

impl ScriptedEngine {
    pub fn answering(mv: &str) -> Self {
        Self {
            answer: Mutex::new(mv.to_string()),
            errors: Mutex::new(VecDeque::new()),
            delay: Mutex::new(Duration::ZERO),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, mv: &str) {
        *self.answer.lock() = mv.to_string();
    }

    pub fn fail_next(&self, n: usize) {
        let mut errors = self.errors.lock();
        for _ in 0..n {
            errors.push_back(EngineError::Network("connection refused".to_string()));
        }
    }

    pub fn push_error(&self, error: EngineError) {
        self.errors.lock().push_back(error);
    }

    /// Delay every answer, success or failure.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<MoveSequence> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl MoveRecommender for ScriptedEngine {
    async fn recommend(&self, moves: &MoveSequence) -> Result<MoveNotation, EngineError> {
        self.requests.lock().push(moves.clone());
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = self.errors.lock().pop_front() {
            return Err(e);
        }
        Ok(self.answer.lock().clone())
    }
}
