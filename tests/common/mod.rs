//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use waymark::error::BoxError;
use waymark::http::{Request, Response, Transport, TransportError};
use waymark::middleware::{Flow, HookResult, Lifecycle, Middleware, Phase};

/// Ordered log of hook invocations, shared by every recorder in a test.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    /// Drain the entries recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Lifecycle middleware recording `name:phase:uri` for every hook.
pub struct Recorder {
    name: &'static str,
    journal: Journal,
    halt_on: Option<Phase>,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            halt_on: None,
        }
    }

    /// Return `Flow::Halt` from the hook for `phase`.
    pub fn halting(mut self, phase: Phase) -> Self {
        self.halt_on = Some(phase);
        self
    }

    pub fn into_middleware(self) -> Middleware {
        Middleware::lifecycle(self)
    }

    fn record(&self, phase: Phase, request: &Request) -> HookResult {
        self.journal
            .push(format!("{}:{}:{}", self.name, phase, request.uri));
        Ok(Flow::from(self.halt_on != Some(phase)))
    }
}

impl Lifecycle for Recorder {
    fn entered(&self, request: &Request) -> HookResult {
        self.record(Phase::Entered, request)
    }

    fn updated(&self, request: &Request, _response: &Response) -> HookResult {
        self.record(Phase::Updated, request)
    }

    fn failed(&self, request: &Request, _response: &Response) -> HookResult {
        self.record(Phase::Failed, request)
    }

    fn exited(&self, request: &Request) -> Result<(), BoxError> {
        self.record(Phase::Exited, request).map(|_| ())
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Lifecycle middleware with only an `entered` hook.
pub struct EnteredOnly {
    pub name: &'static str,
    pub journal: Journal,
}

impl Lifecycle for EnteredOnly {
    fn entered(&self, request: &Request) -> HookResult {
        self.journal
            .push(format!("{}:entered:{}", self.name, request.uri));
        Ok(Flow::Proceed)
    }
}

/// Plain function middleware recording `name:call:uri:status`.
pub fn recording_handler(name: &'static str, journal: &Journal) -> Middleware {
    let journal = journal.clone();
    Middleware::handler(move |request, response| {
        journal.push(format!("{name}:call:{}:{}", request.uri, response.status));
        Ok(Flow::Proceed)
    })
}

/// Scripted transport outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Response),
    Status(u16),
    Network(&'static str),
}

/// Transport replaying queued replies; replies `200 OK` once the queue is empty.
///
/// With a gate, every fetch waits for `release()` before answering.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<Request>>,
    gate: Option<Arc<Notify>>,
    started: Arc<Notify>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Default::default()
        }
    }

    /// Let one waiting fetch complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Wait until a fetch has started.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    /// Requests exactly as the transport received them.
    pub fn seen(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Ok(Response::ok()))
    }
}

impl Transport for ScriptedTransport {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>> {
        async move {
            self.seen.lock().unwrap().push(request.clone());
            self.started.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.next_reply() {
                Reply::Ok(response) => Ok(response),
                Reply::Status(status) => Err(TransportError::Status {
                    uri: request.uri.clone(),
                    response: Response::new(status, "Error"),
                }),
                Reply::Network(message) => Err(TransportError::Network {
                    uri: request.uri.clone(),
                    message: message.to_string(),
                }),
            }
        }
        .boxed()
    }
}

/// Start a mock backend answering every connection with `status` and `body`.
///
/// Returns the bound address; the port is picked by the OS.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
