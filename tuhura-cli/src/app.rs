//! Composition root: storage, HTTP client, auth service, and session context.

use std::sync::Arc;

use anyhow::{Context, Result};
use client::{
    ApiClient, AuthService, FileStorage, Route, SessionContext, SessionEvent, SessionStore,
};
use shared::config::ClientConfig;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

/// Everything a command needs, wired leaf-first.
pub struct App {
    pub context: SessionContext,
    events: broadcast::Receiver<SessionEvent>,
}

impl App {
    /// Builds the object graph and hydrates the session from storage.
    pub fn build(config: &ClientConfig) -> Result<Self> {
        let storage = FileStorage::new(config.storage_path.clone());
        debug!(path = %storage.path().display(), "using session storage");
        let store = SessionStore::new(Arc::new(storage));

        let api = ApiClient::new(config, store.clone())
            .with_context(|| format!("failed to build HTTP client for {}", config.api_base_url))?;
        let events = api.subscribe();
        let auth = Arc::new(AuthService::new(api));

        let mut context = SessionContext::new(auth, store);
        context.initialize();
        Ok(Self { context, events })
    }

    /// Reacts to session notifications raised while the command ran.
    pub fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::LoginRequired { path, redirect_to }) => {
                    let had_session = self.context.is_authenticated();
                    self.context.teardown();
                    match login_required_notice(had_session, &path, redirect_to) {
                        Some(notice) => eprintln!("{notice}"),
                        None => debug!(path = %path, "credentials rejected with no active session"),
                    }
                }
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

/// What to tell the user after a `401` teardown. Rejections that did not end
/// an active session (a wrong password, say) are already reported as errors.
fn login_required_notice(had_session: bool, path: &str, redirect_to: Route) -> Option<String> {
    had_session.then(|| {
        format!(
            "Your session is no longer valid ({path} was rejected). Log in again with `tuhura login` ({redirect_to})."
        )
    })
}
