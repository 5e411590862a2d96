//! `fetch`-backed [`Transport`] for the browser build.
//!
//! Requests are sent with `credentials: include` so the backend's HTTP-only
//! refresh cookie travels with sign-in, refresh and logout calls.

use std::pin::pin;
use std::time::Duration;

use futures::future::{Either, select};
use gloo_net::http::{Request, RequestBuilder};
use session::{Dispatch, HttpResponse, Method, SessionConfig, Transport, TransportError};
use web_sys::RequestCredentials;

pub struct BrowserTransport {
    config: SessionConfig,
}

impl BrowserTransport {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    fn builder(&self, request: Dispatch<'_>) -> RequestBuilder {
        let url = self.config.url(&request.spec.path);
        let builder = match request.spec.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Patch => Request::patch(&url),
            Method::Delete => Request::delete(&url),
        };
        let builder = builder
            .query(request.spec.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .credentials(RequestCredentials::Include);
        match request.bearer {
            Some(credential) => builder.header("Authorization", &credential.header_value()),
            None => builder,
        }
    }

    async fn exchange(&self, request: Dispatch<'_>) -> Result<HttpResponse, TransportError> {
        let builder = self.builder(request);
        let request = match &request.spec.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = request.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(HttpResponse::new(status, body))
    }
}

fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

#[async_trait::async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn dispatch(&self, request: Dispatch<'_>) -> Result<HttpResponse, TransportError> {
        let exchange = pin!(self.exchange(request));
        let deadline = pin!(gloo_timers::future::TimeoutFuture::new(timeout_millis(self.config.request_timeout)));
        match select(exchange, deadline).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => {
                log::warn!("{} {} timed out", request.spec.method.as_str(), request.spec.path);
                Err(TransportError::Timeout)
            }
        }
    }
}
