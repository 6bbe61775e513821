//! Shared utilities for integration tests.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

use reset_watch::collaborators::{MemoryEmailStore, RecordingNavigator, RecordingNotifier};
use reset_watch::config::ResetConfig;
use reset_watch::service::{ResetRequest, ResetService, ServiceResponse, TransportError};
use reset_watch::ResetController;

pub const CONFIRMED: &str = "email activated.";

/// In-memory reset service that records every call.
#[derive(Default)]
#[allow(dead_code)]
pub struct SpyService {
    submits: AtomicU32,
    checks: AtomicU32,
    check_times: Mutex<Vec<Instant>>,
    submit_statuses: Mutex<VecDeque<u16>>,
    submit_delay: Duration,
    confirm_on: Option<u32>,
    transient_on: HashSet<u32>,
}

#[allow(dead_code)]
impl SpyService {
    /// Never confirms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirms on the `n`th check overall.
    pub fn confirming_on(n: u32) -> Self {
        Self {
            confirm_on: Some(n),
            ..Self::default()
        }
    }

    pub fn with_transient_failures(mut self, calls: &[u32]) -> Self {
        self.transient_on = calls.iter().copied().collect();
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Status codes returned by successive submits; 200 once exhausted.
    pub fn with_submit_statuses(self, statuses: &[u16]) -> Self {
        *self.submit_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn submits(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn check_times(&self) -> Vec<Instant> {
        self.check_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResetService for SpyService {
    async fn request_password_reset(
        &self,
        _request: &ResetRequest,
    ) -> Result<ServiceResponse, TransportError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        let status = self.submit_statuses.lock().unwrap().pop_front().unwrap_or(200);
        match status {
            0 => Err(TransportError::Connect("connection refused".into())),
            200 => Ok(ServiceResponse::new(200, Some("reset email sent".into()))),
            status => Ok(ServiceResponse::new(status, Some("rejected".into()))),
        }
    }

    async fn check_email_confirmed(
        &self,
        _email: &str,
    ) -> Result<ServiceResponse, TransportError> {
        let call = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_times.lock().unwrap().push(Instant::now());
        if self.transient_on.contains(&call) {
            return Err(TransportError::Connect("connection reset".into()));
        }
        if self.confirm_on == Some(call) {
            Ok(ServiceResponse::new(200, Some(CONFIRMED.into())))
        } else {
            Ok(ServiceResponse::new(200, Some("email not activated.".into())))
        }
    }
}

/// A controller wired to a spy service and recording collaborators.
#[allow(dead_code)]
pub struct Harness {
    pub controller: ResetController,
    pub service: Arc<SpyService>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub store: Arc<MemoryEmailStore>,
}

#[allow(dead_code)]
pub fn harness(config: ResetConfig, service: SpyService) -> Harness {
    let service = Arc::new(service);
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let store = Arc::new(MemoryEmailStore::default());

    let controller = ResetController::new(
        config,
        service.clone(),
        notifier.clone(),
        navigator.clone(),
        store.clone(),
    );

    Harness {
        controller,
        service,
        notifier,
        navigator,
        store,
    }
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` receives the request path and body and returns status and body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some((path, body)) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(path, body).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request, returning its path and body.
#[allow(dead_code)]
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = &text[..header_end];
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);

        let body = &text[header_end + 4..];
        if body.len() >= content_length {
            let path = headers.split_whitespace().nth(1)?.to_string();
            return Some((path, body.to_string()));
        }
    }
}
