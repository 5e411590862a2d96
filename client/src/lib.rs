//! Browser client for the todo service.
//!
//! SYSTEM CONTEXT
//! ==============
//! All session handling lives in the `session` crate. This crate adds the
//! todo and auth endpoint wrappers, the navigation and list state that react
//! to session transitions, and (with `hydrate`) the `fetch` transport plus the
//! WASM entry point.

pub mod app;
pub mod net;
pub mod state;

#[cfg(feature = "hydrate")]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg(feature = "hydrate")]
thread_local! {
    static APP: std::cell::OnceCell<std::rc::Rc<app::AppContext>> = const { std::cell::OnceCell::new() };
}

/// WASM entry point: build the app context and resume any previous session.
#[cfg(feature = "hydrate")]
#[wasm_bindgen]
pub fn hydrate() {
    use std::rc::Rc;

    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("console logger unavailable: {err}").into());
    }

    let config = session::SessionConfig::default();
    let transport = Rc::new(net::browser::BrowserTransport::new(config.clone()));
    let path = match web_sys::window().map(|w| w.location().pathname()) {
        Some(Ok(path)) => path,
        _ => state::router::HOME_PATH.to_owned(),
    };
    let context = Rc::new(app::AppContext::new(config, transport, &path));

    APP.with(|slot| {
        if slot.set(Rc::clone(&context)).is_err() {
            log::warn!("hydrate called twice; keeping the first app context");
        }
    });
    wasm_bindgen_futures::spawn_local(async move {
        let location = context.boot().await;
        log::info!("booted at {}", location.path);
    });
}
