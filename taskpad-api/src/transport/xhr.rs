//! Callback-driven request object
//!
//! [`XhrShim`] mimics an asynchronous HTTP request object. `send` runs the
//! dispatcher, fills in [`status`](XhrShim::status) and
//! [`response_text`](XhrShim::response_text), then invokes the load callback.
//! The error callback is reserved for transport-level failures: using the
//! object out of order, or the dispatcher panicking. A panic never propagates
//! past `send`.
//!
//! # Example
//!
//! ```
//! use axum::http::Method;
//! use std::sync::{Arc, Mutex};
//! use taskpad_api::{server::TaskpadServer, transport::XhrShim};
//!
//! let seen = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&seen);
//!
//! let mut xhr = XhrShim::new(TaskpadServer::in_memory());
//! xhr.open(Method::GET, "/api/tasks");
//! xhr.on_load(move |response| *sink.lock().unwrap() = Some(response.status));
//! xhr.send(None);
//!
//! assert_eq!(xhr.status(), 401);
//! assert_eq!(*seen.lock().unwrap(), Some(401));
//! ```

use crate::{
    envelope::Envelope,
    server::{ApiRequest, TaskpadServer},
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::panic::{catch_unwind, AssertUnwindSafe};
use taskpad_shared::transport::{bearer_token, HttpResponse, TransportError};
use tracing::{debug, error};

type LoadCallback = Box<dyn FnOnce(HttpResponse) + Send>;
type ErrorCallback = Box<dyn FnOnce(TransportError) + Send>;

/// Lifecycle of a request object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Created, `open` not called yet
    Unsent,

    /// `open` called; headers may be set
    Opened,

    /// `send` finished (successfully or not)
    Done,
}

/// Request object bound to an in-process server
pub struct XhrShim {
    server: TaskpadServer,
    ready_state: ReadyState,
    method: Option<Method>,
    url: Option<String>,
    headers: HeaderMap,
    status: u16,
    response_text: String,
    on_load: Option<LoadCallback>,
    on_error: Option<ErrorCallback>,
}

impl XhrShim {
    /// Creates an unsent request object
    pub fn new(server: TaskpadServer) -> Self {
        Self {
            server,
            ready_state: ReadyState::Unsent,
            method: None,
            url: None,
            headers: HeaderMap::new(),
            status: 0,
            response_text: String::new(),
            on_load: None,
            on_error: None,
        }
    }

    /// Current lifecycle state
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Status of the completed request (0 until completion)
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Body text of the completed request (empty until completion)
    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// Sets method and url, resetting any previous request state
    pub fn open(&mut self, method: Method, url: impl Into<String>) {
        self.method = Some(method);
        self.url = Some(url.into());
        self.headers.clear();
        self.status = 0;
        self.response_text.clear();
        self.ready_state = ReadyState::Opened;
    }

    /// Adds a request header
    ///
    /// # Errors
    ///
    /// - `TransportError::InvalidState` if `open` has not been called
    /// - `TransportError::InvalidHeader` if name or value is not valid HTTP
    pub fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        if self.ready_state != ReadyState::Opened {
            return Err(TransportError::InvalidState(
                "set_request_header called before open".to_string(),
            ));
        }

        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.append(header_name, header_value);

        Ok(())
    }

    /// Registers the completion callback
    pub fn on_load<F>(&mut self, callback: F)
    where
        F: FnOnce(HttpResponse) + Send + 'static,
    {
        self.on_load = Some(Box::new(callback));
    }

    /// Registers the transport-failure callback
    pub fn on_error<F>(&mut self, callback: F)
    where
        F: FnOnce(TransportError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
    }

    /// Dispatches the request and fires exactly one callback
    pub fn send(&mut self, body: Option<&str>) {
        let (Some(method), Some(url)) = (self.method.clone(), self.url.clone()) else {
            self.fail(TransportError::InvalidState("send called before open".to_string()));
            return;
        };
        if self.ready_state != ReadyState::Opened {
            self.fail(TransportError::InvalidState(
                "request already sent; call open again".to_string(),
            ));
            return;
        }

        let token = bearer_token(&self.headers).map(str::to_string);
        let server = self.server.clone();

        let outcome = catch_unwind(AssertUnwindSafe(move || -> Envelope {
            let body = match ApiRequest::parse_body(body.unwrap_or_default()) {
                Ok(body) => body,
                Err(e) => return e.into_envelope(),
            };

            server.dispatch(ApiRequest {
                method,
                path: url,
                body,
                token,
            })
        }));

        match outcome {
            Ok(envelope) => {
                self.status = envelope.status;
                self.response_text = envelope.to_json_text();
                self.ready_state = ReadyState::Done;
                debug!(status = self.status, "In-process request completed");

                if let Some(callback) = self.on_load.take() {
                    callback(HttpResponse::new(self.status, self.response_text.clone()));
                }
            }
            Err(_) => {
                error!("Dispatcher panicked while handling request");
                self.fail(TransportError::Network("Request failed".to_string()));
            }
        }
    }

    fn fail(&mut self, err: TransportError) {
        self.ready_state = ReadyState::Done;
        self.status = 0;
        self.response_text.clear();

        if let Some(callback) = self.on_error.take() {
            callback(err);
        }
    }
}
