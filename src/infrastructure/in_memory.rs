use crate::domain::event::Event;
use crate::domain::ports::StateStore;
use crate::domain::state::AppState;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::trace;

/// Events a subscriber may fall behind by before it starts losing them.
/// A lagging receiver gets `RecvError::Lagged` with the number it missed.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Most recent events kept by [`InMemoryStateStore::history`].
pub const HISTORY_CAPACITY: usize = 1024;

struct Inner {
    state: AppState,
    history: VecDeque<Event>,
    history_capacity: usize,
}

impl Inner {
    fn record(&mut self, event: Event) {
        if self.history_capacity == 0 {
            return;
        }
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }
}

/// A thread-safe in-memory state store.
///
/// Events are reduced under a single write lock, recorded in dispatch order and
/// then broadcast to subscribers, so a subscriber that reads the state after
/// receiving an event always sees that event applied. Only the last
/// `history_capacity` events are retained.
#[derive(Clone)]
pub struct InMemoryStateStore {
    inner: Arc<RwLock<Inner>>,
    events: broadcast::Sender<Event>,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::build(AppState::default(), EVENT_CHANNEL_CAPACITY, HISTORY_CAPACITY)
    }
}

impl InMemoryStateStore {
    /// Creates a new store holding the default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `state`.
    pub fn with_state(state: AppState) -> Self {
        Self::build(state, EVENT_CHANNEL_CAPACITY, HISTORY_CAPACITY)
    }

    /// Creates a store with explicit bounds. `events` is raised to 1 when zero.
    pub fn with_capacity(events: usize, history: usize) -> Self {
        Self::build(AppState::default(), events, history)
    }

    fn build(state: AppState, events: usize, history: usize) -> Self {
        let (events, _) = broadcast::channel(events.max(1));
        Self {
            inner: Arc::new(RwLock::new(Inner {
                state,
                history: VecDeque::with_capacity(history.min(HISTORY_CAPACITY)),
                history_capacity: history,
            })),
            events,
        }
    }

    /// The most recently dispatched events, oldest first.
    pub async fn history(&self) -> Vec<Event> {
        self.inner.read().await.history.iter().cloned().collect()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn dispatch(&self, event: Event) -> Result<()> {
        let mut inner = self.inner.write().await;
        trace!(target: "walletflow::store", event = event.name(), "dispatch");
        inner.state.apply(&event);
        inner.record(event.clone());
        // No subscribers is fine.
        let _ = self.events.send(event);
        Ok(())
    }

    async fn state(&self) -> Result<AppState> {
        Ok(self.inner.read().await.state.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}
