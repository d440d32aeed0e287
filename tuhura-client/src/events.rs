//! Session notifications published by the HTTP layer.

use tokio::sync::broadcast;

use crate::routes::Route;

const EVENT_CAPACITY: usize = 16;

/// Something the composition root needs to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected a request with `401`; persisted credentials are gone.
    LoginRequired {
        /// API path whose response triggered the teardown.
        path: String,
        /// Where the user should be sent.
        redirect_to: Route,
    },
}

impl SessionEvent {
    /// A [`SessionEvent::LoginRequired`] pointing at the login route.
    pub fn login_required(path: impl Into<String>) -> Self {
        Self::LoginRequired {
            path: path.into(),
            redirect_to: Route::Login,
        }
    }
}

/// Fan-out channel for [`SessionEvent`]s.
#[derive(Clone, Debug)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    /// Creates a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Registers a new subscriber. Only events published afterwards are seen.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Delivers `event` to current subscribers. Fire-and-forget.
    pub fn publish(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("session event dropped: no subscribers");
        }
    }
}
