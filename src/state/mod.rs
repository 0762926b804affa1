//! Shared application state: the turn coordinator, the storage slot, and
//! the SSE hubs feeding the shared display and the operator console.

pub mod coordinator;
pub mod session;
mod sse;
pub mod story;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock, watch};

use crate::dao::story_store::StoryStore;
use crate::state::coordinator::TurnCoordinator;

pub use self::sse::{OperatorSseState, SseHub, SseState};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the coordinator and database handles.
pub struct AppState {
    story_store: RwLock<Option<Arc<dyn StoryStore>>>,
    sse: SseState,
    coordinator: Mutex<TurnCoordinator>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(coordinator: TurnCoordinator) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            story_store: RwLock::new(None),
            sse: SseState::new(16, 16),
            coordinator: Mutex::new(coordinator),
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current story store, if one is installed.
    pub async fn story_store(&self) -> Option<Arc<dyn StoryStore>> {
        let guard = self.story_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new story store implementation and leave degraded mode.
    pub async fn set_story_store(&self, store: Arc<dyn StoryStore>) {
        {
            let mut guard = self.story_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current story store and enter degraded mode.
    pub async fn clear_story_store(&self) {
        {
            let mut guard = self.story_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Broadcast hub used for the shared display SSE stream.
    pub fn display_sse(&self) -> &SseHub {
        self.sse.display()
    }

    /// Broadcast hub used for the operator SSE stream.
    pub fn operator_sse(&self) -> &SseHub {
        self.sse.operator().hub()
    }

    /// Token guard that ensures a single operator SSE subscriber at a time.
    pub fn operator_token(&self) -> &Mutex<Option<String>> {
        self.sse.operator().token()
    }

    /// Take the coordinator lock, serializing command dispatch.
    ///
    /// The guard is held for the whole command, persistence calls included,
    /// so events from all stations form one ordered stream.
    pub async fn lock_coordinator(&self) -> MutexGuard<'_, TurnCoordinator> {
        self.coordinator.lock().await
    }
}
