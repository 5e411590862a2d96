//! Todo list view state.
//!
//! Holds the current page of todos plus the list query and user-facing
//! warnings. Rejected calls put the backend's messages into `warnings`; an
//! expired session wipes everything so nothing from the previous account is
//! left on screen.

#[cfg(test)]
#[path = "todos_test.rs"]
mod todos_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use session::{ApiError, SessionStore, Subscription};

use crate::net::api::TodoApi;
use crate::net::types::{ListQuery, Todo, TodoDraft};

/// Plain snapshot of what the list view renders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodosView {
    pub items: Vec<Todo>,
    pub query: ListQuery,
    pub loading: bool,
    pub warnings: Vec<String>,
}

pub struct TodosState {
    api: TodoApi,
    view: Rc<RefCell<TodosView>>,
    _subscription: Subscription,
}

impl TodosState {
    pub fn new(api: TodoApi, sessions: &SessionStore) -> Self {
        let view = Rc::new(RefCell::new(TodosView::default()));
        let weak: Weak<RefCell<TodosView>> = Rc::downgrade(&view);
        let subscription = sessions.subscribe(move |session| {
            if !session.is_signed_in() {
                if let Some(view) = weak.upgrade() {
                    *view.borrow_mut() = TodosView::default();
                }
            }
        });
        Self { api, view, _subscription: subscription }
    }

    #[must_use]
    pub fn snapshot(&self) -> TodosView {
        self.view.borrow().clone()
    }

    /// Fetch the page described by the current query.
    ///
    /// # Errors
    ///
    /// The list call's failure, after it has been recorded in the view.
    pub async fn reload(&self) -> Result<(), ApiError> {
        let query = {
            let mut view = self.view.borrow_mut();
            view.loading = true;
            view.query
        };
        let outcome = self.api.list(&query).await;
        let mut view = self.view.borrow_mut();
        view.loading = false;
        match outcome {
            Ok(items) => {
                view.items = items;
                view.warnings.clear();
                Ok(())
            }
            Err(err) => {
                record(&mut view, &err);
                Err(err)
            }
        }
    }

    /// Replace the query and reload.
    ///
    /// # Errors
    ///
    /// As [`Self::reload`].
    pub async fn set_query(&self, query: ListQuery) -> Result<(), ApiError> {
        self.view.borrow_mut().query = query;
        self.reload().await
    }

    /// # Errors
    ///
    /// As [`Self::reload`].
    pub async fn next_page(&self) -> Result<(), ApiError> {
        let query = self.view.borrow().query.next_page();
        self.set_query(query).await
    }

    /// # Errors
    ///
    /// As [`Self::reload`].
    pub async fn previous_page(&self) -> Result<(), ApiError> {
        let query = self.view.borrow().query.previous_page();
        self.set_query(query).await
    }

    /// Create a todo and reload the page it may appear on.
    ///
    /// # Errors
    ///
    /// The create or reload failure, recorded in the view.
    pub async fn add(&self, draft: &TodoDraft) -> Result<String, ApiError> {
        let id = self.track(self.api.create(draft).await)?;
        self.reload().await?;
        Ok(id)
    }

    /// Flip an item's completion flag.
    ///
    /// # Errors
    ///
    /// The complete/incomplete failure, recorded in the view.
    pub async fn toggle(&self, id: &str) -> Result<(), ApiError> {
        let completed = self.view.borrow().items.iter().find(|t| t.id == id).is_some_and(|t| t.completed);
        let outcome = if completed { self.api.incomplete(id).await } else { self.api.complete(id).await };
        self.track(outcome)?;
        if let Some(todo) = self.view.borrow_mut().items.iter_mut().find(|t| t.id == id) {
            todo.completed = !completed;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// The update failure, recorded in the view.
    pub async fn edit(&self, id: &str, draft: &TodoDraft) -> Result<(), ApiError> {
        let updated = self.track(self.api.update(id, draft).await)?;
        if let Some(todo) = self.view.borrow_mut().items.iter_mut().find(|t| t.id == id) {
            *todo = updated;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// The delete failure, recorded in the view.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.track(self.api.delete(id).await)?;
        self.view.borrow_mut().items.retain(|t| t.id != id);
        Ok(())
    }

    fn track<T>(&self, outcome: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &outcome {
            record(&mut self.view.borrow_mut(), err);
        }
        outcome
    }
}

fn record(view: &mut TodosView, err: &ApiError) {
    if err.is_session_expired() {
        log::info!("session expired; clearing todo list");
        *view = TodosView::default();
        return;
    }
    log::warn!("todo request failed: {err}");
    view.warnings = if err.messages().is_empty() { vec![err.to_string()] } else { err.messages().to_vec() };
}
