use super::*;
use std::rc::Rc;

use futures::executor::block_on;
use serde_json::json;
use session::testing::{Recorded, Reply, ScriptedTransport, sample_user, sample_user_json};
use session::{ExpiryPolicy, Method, TransportError};

use crate::net::types::SortBy;

struct Rig {
    transport: Rc<ScriptedTransport>,
    credentials: CredentialStore,
    sessions: SessionStore,
    refresher: RefreshCoordinator,
    auth: AuthApi,
    todos: TodoApi,
}

fn rig(handler: impl Fn(&Recorded) -> Reply + 'static) -> Rig {
    let transport = Rc::new(ScriptedTransport::new(handler));
    let credentials = CredentialStore::new();
    let sessions = SessionStore::new();
    let refresher = RefreshCoordinator::new(transport.clone(), credentials.clone(), sessions.clone());
    let pipeline =
        Pipeline::new(transport.clone(), credentials.clone(), refresher.clone(), ExpiryPolicy::default());
    let auth = AuthApi::new(pipeline.clone(), credentials.clone(), sessions.clone(), refresher.clone());
    let todos = TodoApi::new(pipeline);
    Rig { transport, credentials, sessions, refresher, auth, todos }
}

fn sign_in_form() -> SignInRequest {
    SignInRequest { email: "john@example.com".to_owned(), password: "hunter22".to_owned() }
}

fn todo_json(id: &str, title: &str) -> serde_json::Value {
    json!({ "id": id, "title": title, "body": "", "completed": false, "deadline": "2022-06-24T22:16:50Z" })
}

// =============================================================
// Sign-in / sign-up
// =============================================================

#[test]
fn sign_in_installs_credential_and_session() {
    let rig = rig(|req| {
        assert_eq!(req.path, SIGN_IN_ENDPOINT);
        assert!(req.bearer.is_none());
        Reply::data(200, json!({ "accessToken": "abc", "user": sample_user_json("john") }))
    });

    let user = block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    assert_eq!(user, sample_user("john"));
    assert_eq!(rig.credentials.get().map(|c| c.expose().to_owned()), Some("abc".to_owned()));
    assert_eq!(rig.sessions.current().user(), Some(&sample_user("john")));
    let body = rig.transport.calls()[0].body.clone().unwrap();
    assert_eq!(body, json!({ "email": "john@example.com", "password": "hunter22" }));
}

#[test]
fn sign_up_sends_username() {
    let rig = rig(|_| Reply::data(201, json!({ "accessToken": "abc", "user": sample_user_json("jane") })));
    let form = SignUpRequest {
        email: "jane@example.com".to_owned(),
        password: "hunter22".to_owned(),
        username: "jane".to_owned(),
    };

    block_on(rig.auth.sign_up(&form)).unwrap();

    let call = &rig.transport.calls()[0];
    assert_eq!(call.path, SIGN_UP_ENDPOINT);
    assert_eq!(call.body.as_ref().and_then(|b| b.get("username")).cloned(), Some(json!("jane")));
    assert!(rig.sessions.is_signed_in());
}

#[test]
fn grant_without_profile_fetches_who_am_i() {
    let rig = rig(|req| match req.path.as_str() {
        SIGN_IN_ENDPOINT => Reply::data(200, json!({ "accessToken": "abc" })),
        ME_ENDPOINT if req.bearer.as_deref() == Some("abc") => Reply::data(200, sample_user_json("john")),
        _ => Reply::status(404),
    });

    let user = block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    assert_eq!(user.username, "john");
    assert_eq!(rig.transport.count(ME_ENDPOINT), 1);
    assert!(rig.sessions.is_signed_in());
}

#[test]
fn failed_profile_lookup_leaves_signed_out() {
    let rig = rig(|req| match req.path.as_str() {
        SIGN_IN_ENDPOINT => Reply::data(200, json!({ "accessToken": "abc" })),
        _ => Reply::errors(500, &["database unavailable"]),
    });

    let err = block_on(rig.auth.sign_in(&sign_in_form())).unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert!(!rig.credentials.is_present());
    assert!(!rig.sessions.is_signed_in());
}

#[test]
fn bad_password_keeps_state_and_surfaces_messages() {
    let rig = rig(|_| Reply::errors(401, &["wrong email or password"]));

    let err = block_on(rig.auth.sign_in(&sign_in_form())).unwrap_err();

    // Anonymous calls never refresh, so a 401 here is a plain rejection.
    assert!(matches!(err, ApiError::Rejected { status: 401, .. }));
    assert_eq!(err.messages(), ["wrong email or password".to_owned()]);
    assert_eq!(rig.refresher.flights_started(), 0);
    assert!(!rig.sessions.is_signed_in());
}

#[test]
fn sign_in_rearms_halted_refresher() {
    let rig = rig(|_| Reply::data(200, json!({ "accessToken": "abc", "user": sample_user_json("john") })));
    rig.refresher.halt("signed out");

    block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    assert!(!rig.refresher.is_halted());
}

#[test]
fn who_am_i_refreshes_stored_profile() {
    let rig = rig(|req| match req.path.as_str() {
        SIGN_IN_ENDPOINT => Reply::data(200, json!({ "accessToken": "abc", "user": sample_user_json("john") })),
        ME_ENDPOINT => Reply::data(200, sample_user_json("johnny")),
        _ => Reply::status(404),
    });
    block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    let me = block_on(rig.auth.who_am_i()).unwrap();

    assert_eq!(me, sample_user("johnny"));
    assert_eq!(rig.sessions.current().user(), Some(&me));
}

#[test]
fn failed_who_am_i_keeps_stored_profile() {
    let rig = rig(|req| match req.path.as_str() {
        SIGN_IN_ENDPOINT => Reply::data(200, json!({ "accessToken": "abc", "user": sample_user_json("john") })),
        _ => Reply::errors(500, &["database unavailable"]),
    });
    block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    block_on(rig.auth.who_am_i()).unwrap_err();

    assert_eq!(rig.sessions.current().user(), Some(&sample_user("john")));
}

// =============================================================
// Sign-out
// =============================================================

#[test]
fn sign_out_clears_local_state_and_halts_refresh() {
    let rig = rig(|_| Reply::data(200, json!({ "accessToken": "abc", "user": sample_user_json("john") })));
    block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    block_on(rig.auth.sign_out()).unwrap();

    assert!(!rig.credentials.is_present());
    assert!(!rig.sessions.is_signed_in());
    assert!(rig.refresher.is_halted());
    let logout = rig.transport.calls().into_iter().find(|c| c.path == LOGOUT_ENDPOINT).unwrap();
    assert_eq!(logout.method, Method::Delete);
}

#[test]
fn sign_out_reports_server_failure_after_local_sign_out() {
    let rig = rig(|req| match req.path.as_str() {
        LOGOUT_ENDPOINT => Reply::Fail(TransportError::Network("connection reset".to_owned())),
        _ => Reply::data(200, json!({ "accessToken": "abc", "user": sample_user_json("john") })),
    });
    block_on(rig.auth.sign_in(&sign_in_form())).unwrap();

    let err = block_on(rig.auth.sign_out()).unwrap_err();

    assert!(matches!(err, ApiError::Transport(TransportError::Network(_))));
    assert!(!rig.sessions.is_signed_in());
    assert!(!rig.credentials.is_present());
}

// =============================================================
// Restore
// =============================================================

#[test]
fn restore_resumes_cookie_session() {
    let rig = rig(|req| match req.path.as_str() {
        session::refresh::REFRESH_PATH => Reply::data(200, json!({ "accessKey": "fresh" })),
        ME_ENDPOINT => Reply::data(200, sample_user_json("john")),
        _ => Reply::status(404),
    });

    let user = block_on(rig.auth.restore()).unwrap();

    assert_eq!(user.map(|u| u.username), Some("john".to_owned()));
    assert_eq!(rig.credentials.get().map(|c| c.expose().to_owned()), Some("fresh".to_owned()));
    assert!(rig.sessions.is_signed_in());
}

#[test]
fn restore_without_cookie_stays_signed_out() {
    let rig = rig(|_| Reply::errors(401, &["refresh key is missing"]));

    let user = block_on(rig.auth.restore()).unwrap();

    assert!(user.is_none());
    assert!(!rig.sessions.is_signed_in());
    assert_eq!(rig.transport.count(ME_ENDPOINT), 0);
}

// =============================================================
// Todos
// =============================================================

#[test]
fn create_returns_new_id() {
    let rig = rig(|_| Reply::data(201, json!({ "id": "t9" })));
    let draft = TodoDraft {
        title: "Do dishes tomorrow".to_owned(),
        body: String::new(),
        deadline: "2022-06-24T22:16:50Z".to_owned(),
    };

    let id = block_on(rig.todos.create(&draft)).unwrap();

    assert_eq!(id, "t9");
    let call = &rig.transport.calls()[0];
    assert_eq!((call.method, call.path.as_str()), (Method::Post, TODOS_ENDPOINT));
}

#[test]
fn list_passes_query_and_decodes_items() {
    let rig = rig(|_| Reply::data(200, json!([todo_json("t1", "dishes"), todo_json("t2", "plants")])));
    let query = ListQuery { sort_by: Some(SortBy::DeadlineDesc), only_completed: Some(true), ..ListQuery::default() };

    let todos = block_on(rig.todos.list(&query)).unwrap();

    assert_eq!(todos.len(), 2);
    assert_eq!(
        rig.transport.calls()[0].path,
        "/todos?pageSize=10&page=0&sortBy=deadlineDESC&onlyCompleted=true"
    );
}

#[test]
fn empty_page_decodes_as_empty_list() {
    let rig = rig(|_| Reply::data(200, serde_json::Value::Null));
    assert!(block_on(rig.todos.list(&ListQuery::default())).unwrap().is_empty());
}

#[test]
fn item_calls_hit_item_paths() {
    let rig = rig(|req| match req.method {
        Method::Get | Method::Patch => Reply::data(200, todo_json("t1", "dishes")),
        _ => Reply::status(200),
    });
    let draft = TodoDraft { title: "dishes".to_owned(), ..TodoDraft::default() };

    assert_eq!(block_on(rig.todos.get("t1")).unwrap().id, "t1");
    block_on(rig.todos.update("t1", &draft)).unwrap();
    block_on(rig.todos.complete("t1")).unwrap();
    block_on(rig.todos.incomplete("t1")).unwrap();
    block_on(rig.todos.delete("t1")).unwrap();

    let seen: Vec<(Method, String)> = rig.transport.calls().into_iter().map(|c| (c.method, c.path)).collect();
    assert_eq!(
        seen,
        vec![
            (Method::Get, "/todos/t1".to_owned()),
            (Method::Patch, "/todos/t1".to_owned()),
            (Method::Put, "/todos/t1/complete".to_owned()),
            (Method::Put, "/todos/t1/incomplete".to_owned()),
            (Method::Delete, "/todos/t1".to_owned()),
        ]
    );
}

#[test]
fn todo_calls_refresh_and_replay_on_expiry() {
    let rig = rig(|req| match (req.path.as_str(), req.bearer.as_deref()) {
        (session::refresh::REFRESH_PATH, _) => Reply::data(200, json!({ "accessKey": "xyz" })),
        (_, Some("xyz")) => Reply::data(200, todo_json("t1", "dishes")),
        _ => Reply::status(401),
    });
    rig.credentials.set(session::Credential::new("old"));

    let todo = block_on(rig.todos.get("t1")).unwrap();

    assert_eq!(todo.title, "dishes");
    assert_eq!(rig.refresher.flights_started(), 1);
    assert_eq!(rig.transport.count("/todos/t1"), 2);
}

#[test]
fn validation_messages_reach_the_caller() {
    let rig = rig(|_| Reply::errors(422, &["title is required"]));
    let err = block_on(rig.todos.create(&TodoDraft::default())).unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 422, .. }));
    assert_eq!(err.messages(), ["title is required".to_owned()]);
}
