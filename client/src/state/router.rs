//! Client-side navigation gated by the session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views never decide on their own whether they may render. Every navigation
//! and every session transition is resolved through [`session::guard::check`]
//! against the static [`ROUTES`] table, so a refresh failure anywhere in the
//! app lands the user on the sign-in view.
//!
//! DESIGN
//! ======
//! The navigator subscribes to the session store with a weak handle to its
//! own state; dropping the navigator drops the subscription.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use session::guard::{self, Decision, RouteDescriptor, SIGN_IN_PATH};
use session::{Session, SessionStore, Subscription};

pub const HOME_PATH: &str = "/";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Todos,
    SignIn,
    NotFound,
}

pub const ROUTES: &[RouteDescriptor<View>] = &[
    RouteDescriptor { path: HOME_PATH, view: View::Todos, needs_auth: true },
    RouteDescriptor { path: SIGN_IN_PATH, view: View::SignIn, needs_auth: false },
];

/// Where the app currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub view: View,
}

fn route_for(path: &str) -> Option<&'static RouteDescriptor<View>> {
    ROUTES.iter().find(|route| route.path == path)
}

fn needs_auth(path: &str) -> bool {
    route_for(path).is_some_and(|route| route.needs_auth)
}

struct NavState {
    location: Location,
    /// Protected path the user was turned away from, revisited after sign-in.
    return_to: Option<String>,
}

impl NavState {
    fn resolve(&mut self, session: &Session, path: &str) -> Location {
        let Some(route) = route_for(path) else {
            self.location = Location { path: path.to_owned(), view: View::NotFound };
            return self.location.clone();
        };
        self.location = match guard::check(session, route) {
            Decision::Allow => Location { path: route.path.to_owned(), view: route.view },
            Decision::Redirect { to } => {
                log::info!("{path} needs a session; redirecting to {to}");
                self.return_to = Some(route.path.to_owned());
                Location { path: to.to_owned(), view: route_for(to).map_or(View::NotFound, |r| r.view) }
            }
        };
        self.location.clone()
    }

    fn on_session(&mut self, session: &Session) {
        if session.is_signed_in() {
            if self.location.view == View::SignIn {
                let target = self.return_to.take().unwrap_or_else(|| HOME_PATH.to_owned());
                self.resolve(session, &target);
            }
        } else if needs_auth(&self.location.path) {
            let path = self.location.path.clone();
            self.resolve(session, &path);
        }
    }
}

pub struct Navigator {
    sessions: SessionStore,
    state: Rc<RefCell<NavState>>,
    _subscription: Subscription,
}

impl Navigator {
    /// Start at `initial_path`, already resolved against the current session.
    pub fn new(sessions: SessionStore, initial_path: &str) -> Self {
        let mut nav = NavState {
            location: Location { path: initial_path.to_owned(), view: View::NotFound },
            return_to: None,
        };
        nav.resolve(&sessions.current(), initial_path);
        let state = Rc::new(RefCell::new(nav));

        let weak: Weak<RefCell<NavState>> = Rc::downgrade(&state);
        let subscription = sessions.subscribe(move |session| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().on_session(session);
            }
        });
        Self { sessions, state, _subscription: subscription }
    }

    pub fn navigate(&self, path: &str) -> Location {
        let session = self.sessions.current();
        self.state.borrow_mut().resolve(&session, path)
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.state.borrow().location.clone()
    }

    #[must_use]
    pub fn return_to(&self) -> Option<String> {
        self.state.borrow().return_to.clone()
    }
}
