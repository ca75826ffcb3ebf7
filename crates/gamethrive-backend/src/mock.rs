//! An in-process [`Backend`] that records every request.
//!
//! Used by the SDK's own tests (enable the `mock` feature from
//! `[dev-dependencies]`). It can:
//! - record requests in arrival order,
//! - answer from a queue of scripted results, falling back to a default
//!   responder,
//! - hold every response "in flight" until released, to exercise
//!   concurrent triggers against a pending call.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::{Backend, BackendError, BackendRequest, BackendResponse, Endpoint, Method};

type Responder = dyn Fn(&BackendRequest) -> Result<BackendResponse, BackendError> + Send + Sync;

/// How long [`RecordingBackend::wait_for_requests`] waits before giving up.
const WAIT_LIMIT: Duration = Duration::from_secs(300);

/// A recording, scriptable backend. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RecordingBackend {
    inner: Arc<Inner>,
}

struct Inner {
    requests: Mutex<Vec<BackendRequest>>,
    scripted: Mutex<VecDeque<Result<BackendResponse, BackendError>>>,
    responder: Mutex<Arc<Responder>>,
    recorded: watch::Sender<usize>,
    held: watch::Sender<bool>,
}

impl RecordingBackend {
    /// A backend that registers every new player as `player-1` and
    /// answers everything else with `{"success": true}`.
    pub fn new() -> Self {
        Self::with_player_id("player-1")
    }

    /// Like [`new`](Self::new) but assigns `player_id` on registration.
    pub fn with_player_id(player_id: &str) -> Self {
        let player_id = player_id.to_string();
        let responder: Arc<Responder> = Arc::new(move |req: &BackendRequest| {
            let body = match (req.method, &req.endpoint) {
                (Method::Post, Endpoint::Players) => {
                    serde_json::json!({"success": true, "id": player_id})
                }
                (Method::Get, Endpoint::Player(_)) => serde_json::json!({"tags": {}}),
                _ => serde_json::json!({"success": true}),
            };
            Ok(BackendResponse::ok_json(body))
        });
        Self {
            inner: Arc::new(Inner {
                requests: Mutex::new(Vec::new()),
                scripted: Mutex::new(VecDeque::new()),
                responder: Mutex::new(responder),
                recorded: watch::Sender::new(0),
                held: watch::Sender::new(false),
            }),
        }
    }

    /// Replaces the default responder.
    pub fn respond_with<F>(&self, responder: F)
    where
        F: Fn(&BackendRequest) -> Result<BackendResponse, BackendError> + Send + Sync + 'static,
    {
        *lock(&self.inner.responder) = Arc::new(responder);
    }

    /// Queues a result for the next request, ahead of the default
    /// responder. Queued results are consumed in FIFO order.
    pub fn push_result(&self, result: Result<BackendResponse, BackendError>) {
        lock(&self.inner.scripted).push_back(result);
    }

    /// Queues a failure for the next request.
    pub fn fail_next(&self) {
        self.push_result(Err(BackendError::Unavailable("scripted failure".into())));
    }

    /// Holds every response until [`release`](Self::release) is called.
    /// Requests are still recorded immediately.
    pub fn hold(&self) {
        self.inner.held.send_replace(true);
    }

    /// Lets held (and future) requests complete.
    pub fn release(&self) {
        self.inner.held.send_replace(false);
    }

    /// Snapshot of every request received so far.
    pub fn requests(&self) -> Vec<BackendRequest> {
        lock(&self.inner.requests).clone()
    }

    /// Requests whose path equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<BackendRequest> {
        lock(&self.inner.requests)
            .iter()
            .filter(|r| r.path() == path)
            .cloned()
            .collect()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        *self.inner.recorded.borrow()
    }

    /// Waits until at least `count` requests have been recorded.
    ///
    /// # Panics
    /// Panics if the count isn't reached within a generous limit, so a
    /// broken test fails instead of hanging.
    pub async fn wait_for_requests(&self, count: usize) {
        let mut rx = self.inner.recorded.subscribe();
        let reached = tokio::time::timeout(WAIT_LIMIT, rx.wait_for(|n| *n >= count))
            .await
            .map(|r| r.is_ok());
        assert!(
            matches!(reached, Ok(true)),
            "expected {count} backend requests, saw {}",
            self.request_count()
        );
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RecordingBackend {
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        {
            let mut requests = lock(&self.inner.requests);
            requests.push(request.clone());
            self.inner.recorded.send_replace(requests.len());
        }

        let mut held = self.inner.held.subscribe();
        // The sender lives as long as `self`, so this can't fail.
        let _ = held.wait_for(|h| !*h).await;

        let scripted = lock(&self.inner.scripted).pop_front();
        match scripted {
            Some(result) => result,
            None => {
                let responder = Arc::clone(&lock(&self.inner.responder));
                responder(&request)
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamethrive_protocol::PlayerId;

    #[tokio::test]
    async fn test_execute_records_request_and_assigns_player() {
        let backend = RecordingBackend::with_player_id("abc");
        let req = BackendRequest::post(Endpoint::Players, &serde_json::json!({})).unwrap();

        let resp = backend.execute(req).await.unwrap();

        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let backend = RecordingBackend::new();
        backend.fail_next();
        let req = BackendRequest::get(Endpoint::Player(PlayerId::new("p")));

        assert!(backend.execute(req.clone()).await.is_err());
        assert!(backend.execute(req).await.is_ok());
    }

    #[tokio::test]
    async fn test_hold_keeps_request_pending_until_release() {
        let backend = RecordingBackend::new();
        backend.hold();
        let req = BackendRequest::get(Endpoint::Player(PlayerId::new("p")));

        let task = tokio::spawn({
            let backend = backend.clone();
            async move { backend.execute(req).await }
        });
        backend.wait_for_requests(1).await;
        assert!(!task.is_finished());

        backend.release();
        assert!(task.await.unwrap().is_ok());
    }
}
