//! Outermost request boundary
//!
//! Writes the access log for every request answered below 400, and turns
//! anything the handlers did not deal with into an envelope:
//!
//! - handler panics become `500 Internal error was raised`
//! - [`UnhandledFailure`] responses (unknown route, unsupported method) are
//!   logged at error level with the request path and remote address

use std::{
    any::Any,
    convert::Infallible,
    future::Future,
    net::SocketAddr,
    panic::AssertUnwindSafe,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    extract::{ConnectInfo, Request},
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tower::{Layer, Service};
use tracing::{error, info};

use crate::error::{ApiError, UnhandledFailure};

/// Layer installing [`RequestBoundary`]
#[derive(Debug, Clone, Default)]
pub struct RequestBoundaryLayer;

impl RequestBoundaryLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestBoundaryLayer {
    type Service = RequestBoundary<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestBoundary { inner }
    }
}

/// Access logging and last-resort failure handling
#[derive(Debug, Clone)]
pub struct RequestBoundary<S> {
    inner: S,
}

impl<S> Service<Request> for RequestBoundary<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let method = request.method().clone();
        let uri = request.uri().clone();
        let remote = remote_addr(&request);

        Box::pin(async move {
            let response = match AssertUnwindSafe(inner.call(request)).catch_unwind().await {
                Ok(Ok(response)) => response,
                Ok(Err(never)) => match never {},
                Err(panic) => {
                    error!(
                        method = %method,
                        path = %uri.path(),
                        remote = %remote,
                        panic = panic_message(panic.as_ref()),
                        "Unhandled failure while serving request"
                    );
                    ApiError::unhandled(500, "Internal error was raised").into_response()
                },
            };

            log_outcome(&method, &uri, &remote, &response);
            Ok(response)
        })
    }
}

fn log_outcome(method: &Method, uri: &Uri, remote: &str, response: &Response) {
    let status = response.status().as_u16();

    if let Some(failure) = response.extensions().get::<UnhandledFailure>() {
        error!(
            method = %method,
            path = %uri.path(),
            remote = %remote,
            code = failure.code,
            "{}",
            failure.message
        );
    }

    if status < 400 {
        info!(
            target: "access",
            remote = %remote,
            method = %method,
            uri = %uri,
            status,
            "request served"
        );
    }
}

fn remote_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
