//! Wire DTOs for the todo and auth endpoints.
//!
//! DESIGN
//! ======
//! These mirror the backend's camelCase JSON. Deadlines and timestamps stay
//! RFC 3339 strings; formatting belongs to the view layer.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use session::{RequestSpec, User};

/// A todo as returned by `GET /todos` and `GET /todos/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    /// Present when the backend joins the author row.
    #[serde(default)]
    pub author: Option<User>,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub completed: bool,
    pub deadline: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body for create (`POST /todos`) and update (`PATCH /todos/{id}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoDraft {
    pub title: String,
    pub body: String,
    /// RFC 3339, e.g. `2022-06-23T22:16:50Z`.
    pub deadline: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedTodo {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sort orders understood by `GET /todos?sortBy=`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreationAsc,
    CreationDesc,
    DeadlineAsc,
    DeadlineDesc,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreationAsc => "creationASC",
            Self::CreationDesc => "creationDESC",
            Self::DeadlineAsc => "deadlineASC",
            Self::DeadlineDesc => "deadlineDESC",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "creationASC" => Some(Self::CreationAsc),
            "creationDESC" => Some(Self::CreationDesc),
            "deadlineASC" => Some(Self::DeadlineAsc),
            "deadlineDESC" => Some(Self::DeadlineDesc),
            _ => None,
        }
    }
}

/// Pagination and filter parameters for `GET /todos`.
///
/// `None` fields are left out of the query string and the backend applies its
/// own default for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub sort_by: Option<SortBy>,
    pub only_completed: Option<bool>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { page_size: Some(10), page: Some(0), sort_by: Some(SortBy::CreationAsc), only_completed: Some(false) }
    }
}

impl ListQuery {
    /// No parameters at all.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self { page_size: None, page: None, sort_by: None, only_completed: None }
    }

    #[must_use]
    pub fn next_page(self) -> Self {
        Self { page: Some(self.page.unwrap_or(0) + 1), ..self }
    }

    #[must_use]
    pub fn previous_page(self) -> Self {
        Self { page: Some(self.page.unwrap_or(0).saturating_sub(1)), ..self }
    }

    /// Append the set parameters to `spec` in the backend's documented order.
    #[must_use]
    pub fn apply(&self, mut spec: RequestSpec) -> RequestSpec {
        if let Some(page_size) = self.page_size {
            spec = spec.query("pageSize", page_size);
        }
        if let Some(page) = self.page {
            spec = spec.query("page", page);
        }
        if let Some(sort_by) = self.sort_by {
            spec = spec.query("sortBy", sort_by.as_str());
        }
        if let Some(only_completed) = self.only_completed {
            spec = spec.query("onlyCompleted", only_completed);
        }
        spec
    }
}
