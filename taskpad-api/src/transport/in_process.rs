//! [`Transport`] over an in-process server
//!
//! Each `send` drives a fresh [`XhrShim`] on the blocking pool and bridges its
//! callbacks back to the caller through a oneshot channel, so completion is
//! always observed asynchronously.

use super::xhr::XhrShim;
use crate::server::TaskpadServer;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use taskpad_shared::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use tokio::sync::oneshot;

type Completion = oneshot::Sender<Result<HttpResponse, TransportError>>;

/// Transport that dispatches to a [`TaskpadServer`] in the same process
#[derive(Clone)]
pub struct InProcessTransport {
    server: TaskpadServer,
}

impl InProcessTransport {
    pub fn new(server: TaskpadServer) -> Self {
        Self { server }
    }

    /// The server requests are dispatched to
    pub fn server(&self) -> &TaskpadServer {
        &self.server
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        let slot: Arc<Mutex<Option<Completion>>> = Arc::new(Mutex::new(Some(tx)));
        let server = self.server.clone();

        tokio::task::spawn_blocking(move || drive(server, request, slot))
            .await
            .map_err(|e| TransportError::Network(format!("Request task failed: {}", e)))?;

        rx.await.map_err(|_| {
            TransportError::Network("Request completed without a response".to_string())
        })?
    }
}

fn drive(server: TaskpadServer, request: HttpRequest, slot: Arc<Mutex<Option<Completion>>>) {
    let mut xhr = XhrShim::new(server);

    let on_load = Arc::clone(&slot);
    xhr.on_load(move |response| complete(&on_load, Ok(response)));
    let on_error = Arc::clone(&slot);
    xhr.on_error(move |err| complete(&on_error, Err(err)));

    xhr.open(request.method, request.url);
    for (name, value) in request.headers.iter() {
        let Ok(value) = value.to_str() else {
            complete(
                &slot,
                Err(TransportError::InvalidHeader(format!("{}: not visible ASCII", name))),
            );
            return;
        };
        if let Err(e) = xhr.set_request_header(name.as_str(), value) {
            complete(&slot, Err(e));
            return;
        }
    }

    xhr.send(request.body.as_deref());
}

fn complete(slot: &Mutex<Option<Completion>>, outcome: Result<HttpResponse, TransportError>) {
    if let Some(tx) = slot.lock().take() {
        // Receiver gone means the caller stopped waiting
        let _ = tx.send(outcome);
    }
}
