//! Typed wrappers over the backend's auth and todo endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every call goes through the shared [`Pipeline`], so todo calls inherit
//! credential attachment and refresh-and-replay. The auth flows are the only
//! code outside the refresh coordinator that writes the credential and
//! session stores.
//!
//! ERROR HANDLING
//! ==============
//! Failures surface as [`ApiError`]; nothing here swallows an error. Sign-out
//! is the one flow that completes its local effect even when the server call
//! fails.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use session::{
    ApiError, CredentialStore, Pipeline, RefreshCoordinator, RequestSpec, SessionStore, TokenGrant, User,
};

use super::types::{CreatedTodo, ListQuery, SignInRequest, SignUpRequest, Todo, TodoDraft};

pub const SIGN_UP_ENDPOINT: &str = "/users/auth/signup";
pub const SIGN_IN_ENDPOINT: &str = "/users/auth/signin";
pub const LOGOUT_ENDPOINT: &str = "/users/auth/logout";
pub const ME_ENDPOINT: &str = "/users/me";
pub const TODOS_ENDPOINT: &str = "/todos";

fn todo_path(id: &str) -> String {
    format!("{TODOS_ENDPOINT}/{id}")
}

/// Sign-up, sign-in, sign-out and session restore.
#[derive(Clone)]
pub struct AuthApi {
    pipeline: Pipeline,
    credentials: CredentialStore,
    sessions: SessionStore,
    refresher: RefreshCoordinator,
}

impl AuthApi {
    pub fn new(
        pipeline: Pipeline,
        credentials: CredentialStore,
        sessions: SessionStore,
        refresher: RefreshCoordinator,
    ) -> Self {
        Self { pipeline, credentials, sessions, refresher }
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] with the backend's validation messages, or any
    /// transport/decode failure. The session is unchanged on error.
    pub async fn sign_up(&self, form: &SignUpRequest) -> Result<User, ApiError> {
        let spec = RequestSpec::post(SIGN_UP_ENDPOINT).anonymous().json(form)?;
        let grant: TokenGrant = self.pipeline.send_json(&spec).await?;
        log::info!("signed up as {}", form.username);
        self.install(grant).await
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// As [`Self::sign_up`].
    pub async fn sign_in(&self, form: &SignInRequest) -> Result<User, ApiError> {
        let spec = RequestSpec::post(SIGN_IN_ENDPOINT).anonymous().json(form)?;
        let grant: TokenGrant = self.pipeline.send_json(&spec).await?;
        self.install(grant).await
    }

    /// Sign out locally, then ask the backend to drop the refresh cookie.
    ///
    /// # Errors
    ///
    /// The logout call's failure. The local sign-out has already happened.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.refresher.halt("signed out");
        self.credentials.clear();
        self.sessions.set_signed_out();
        log::info!("signed out");

        let spec = RequestSpec::delete(LOGOUT_ENDPOINT).anonymous();
        self.pipeline.send(&spec).await.map(drop)
    }

    /// Profile of the account the current credential belongs to. The
    /// session store is updated with it.
    ///
    /// # Errors
    ///
    /// Any pipeline failure, including [`ApiError::SessionExpired`]. The
    /// stored profile is left as it was.
    pub async fn who_am_i(&self) -> Result<User, ApiError> {
        let user: User = self.pipeline.send_json(&RequestSpec::get(ME_ENDPOINT)).await?;
        self.sessions.set_signed_in(user.clone());
        Ok(user)
    }

    /// Resume a cookie-backed session at startup.
    ///
    /// Returns `Ok(None)` when there is no session to resume; the app simply
    /// stays signed out.
    ///
    /// # Errors
    ///
    /// Only a failed profile lookup after a successful refresh.
    pub async fn restore(&self) -> Result<Option<User>, ApiError> {
        self.refresher.rearm();
        if let Err(err) = self.refresher.refresh().await {
            log::info!("no session to restore: {err}");
            return Ok(None);
        }
        if let Some(user) = self.sessions.current().user() {
            return Ok(Some(user.clone()));
        }
        self.who_am_i().await.map(Some)
    }

    async fn install(&self, grant: TokenGrant) -> Result<User, ApiError> {
        self.refresher.rearm();
        self.credentials.set(grant.credential());
        let user = match grant.user {
            Some(user) => {
                self.sessions.set_signed_in(user.clone());
                user
            }
            None => match self.who_am_i().await {
                Ok(user) => user,
                Err(err) => {
                    log::warn!("credential issued but profile lookup failed: {err}");
                    self.credentials.clear();
                    return Err(err);
                }
            },
        };
        log::info!("signed in as {}", user.username);
        Ok(user)
    }
}

/// CRUD over `/todos`. All calls carry the bearer credential.
#[derive(Clone)]
pub struct TodoApi {
    pipeline: Pipeline,
}

impl TodoApi {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn create(&self, draft: &TodoDraft) -> Result<String, ApiError> {
        let spec = RequestSpec::post(TODOS_ENDPOINT).json(draft)?;
        let created: CreatedTodo = self.pipeline.send_json(&spec).await?;
        Ok(created.id)
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn get(&self, id: &str) -> Result<Todo, ApiError> {
        self.pipeline.send_json(&RequestSpec::get(todo_path(id))).await
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Todo>, ApiError> {
        let spec = query.apply(RequestSpec::get(TODOS_ENDPOINT));
        // The backend sends `null` rather than `[]` for an empty page.
        let todos: Option<Vec<Todo>> = self.pipeline.send_json(&spec).await?;
        Ok(todos.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn update(&self, id: &str, draft: &TodoDraft) -> Result<Todo, ApiError> {
        let spec = RequestSpec::patch(todo_path(id)).json(draft)?;
        self.pipeline.send_json(&spec).await
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.pipeline.send(&RequestSpec::delete(todo_path(id))).await.map(drop)
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn complete(&self, id: &str) -> Result<(), ApiError> {
        let spec = RequestSpec::put(format!("{}/complete", todo_path(id)));
        self.pipeline.send(&spec).await.map(drop)
    }

    /// # Errors
    ///
    /// Any pipeline failure.
    pub async fn incomplete(&self, id: &str) -> Result<(), ApiError> {
        let spec = RequestSpec::put(format!("{}/incomplete", todo_path(id)));
        self.pipeline.send(&spec).await.map(drop)
    }
}
