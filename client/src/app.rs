//! Application context: every long-lived client component, built once.
//!
//! DESIGN
//! ======
//! The stores and the refresh coordinator are shared handles. Everything here
//! is constructed from one transport so the pipeline, the auth flows and the
//! refresh exchange can never disagree about where requests go.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::rc::Rc;

use session::{CredentialStore, Pipeline, RefreshCoordinator, SessionConfig, SessionStore, Transport};

use crate::net::api::{AuthApi, TodoApi};
use crate::state::router::{Location, Navigator, View};
use crate::state::todos::TodosState;

pub struct AppContext {
    pub config: SessionConfig,
    pub credentials: CredentialStore,
    pub sessions: SessionStore,
    pub refresher: RefreshCoordinator,
    pub auth: AuthApi,
    pub todo_api: TodoApi,
    pub todos: TodosState,
    pub navigator: Navigator,
}

impl AppContext {
    pub fn new(config: SessionConfig, transport: Rc<dyn Transport>, initial_path: &str) -> Self {
        let credentials = CredentialStore::new();
        let sessions = SessionStore::new();
        let refresher = RefreshCoordinator::new(Rc::clone(&transport), credentials.clone(), sessions.clone());
        let pipeline = Pipeline::new(transport, credentials.clone(), refresher.clone(), config.expiry);
        let auth = AuthApi::new(pipeline.clone(), credentials.clone(), sessions.clone(), refresher.clone());
        let todo_api = TodoApi::new(pipeline);
        let todos = TodosState::new(todo_api.clone(), &sessions);
        let navigator = Navigator::new(sessions.clone(), initial_path);
        Self { config, credentials, sessions, refresher, auth, todo_api, todos, navigator }
    }

    /// Try to resume a previous session, then load the list if it is showing.
    pub async fn boot(&self) -> Location {
        match self.auth.restore().await {
            Ok(Some(user)) => log::info!("resumed session for {}", user.username),
            Ok(None) => {}
            Err(err) => log::warn!("session restore failed: {err}"),
        }
        let location = self.navigator.location();
        if location.view == View::Todos {
            if let Err(err) = self.todos.reload().await {
                log::warn!("initial todo load failed: {err}");
            }
        }
        location
    }
}
