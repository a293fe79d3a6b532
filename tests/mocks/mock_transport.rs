use async_trait::async_trait;
use resilient_fetch::error::{FetchError, FetchResult};
use resilient_fetch::{HttpRequest, HttpResponse, HttpTransport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What the transport does for one call.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Step {
    /// Answer immediately
    Respond(u16, String),
    /// Answer after a delay
    Delayed(Duration, u16, String),
    /// Fail at the connection level
    NetworkError(String),
    /// Never answer
    Hang,
}

#[allow(dead_code)]
impl Step {
    pub fn ok(body: &str) -> Self {
        Step::Respond(200, body.to_string())
    }

    pub fn status(status: u16) -> Self {
        Step::Respond(status, String::new())
    }
}

/// Marks a call as in flight; counts it as cancelled if dropped before finishing.
struct InFlight {
    completed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicUsize>,
    finished: bool,
}

impl InFlight {
    fn finish(mut self) {
        self.finished = true;
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Scripted transport for testing.
///
/// Plays queued steps in order, then repeats the fallback step forever.
#[allow(dead_code)]
#[derive(Clone)]
pub struct ScriptedTransport {
    steps: Arc<Mutex<VecDeque<Step>>>,
    fallback: Step,
    requests: Arc<Mutex<Vec<(Instant, HttpRequest)>>>,
    started: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(steps: Vec<Step>, fallback: Step) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            fallback,
            requests: Arc::new(Mutex::new(Vec::new())),
            started: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always play the same step.
    pub fn always(step: Step) -> Self {
        Self::new(Vec::new(), step)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        let requests = self.requests.lock().unwrap();
        requests.iter().map(|(_, request)| request.clone()).collect()
    }

    /// Gaps between consecutive call start times.
    pub fn gaps(&self) -> Vec<Duration> {
        let requests = self.requests.lock().unwrap();
        requests
            .windows(2)
            .map(|pair| pair[1].0.duration_since(pair[0].0))
            .collect()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        steps.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> FetchResult<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        self.started.fetch_add(1, Ordering::SeqCst);

        let guard = InFlight {
            completed: self.completed.clone(),
            cancelled: self.cancelled.clone(),
            finished: false,
        };

        let result = match self.next_step() {
            Step::Respond(status, body) => Ok(HttpResponse::new(status, body)),
            Step::Delayed(delay, status, body) => {
                tokio::time::sleep(delay).await;
                Ok(HttpResponse::new(status, body))
            }
            Step::NetworkError(message) => Err(FetchError::Network(message)),
            Step::Hang => std::future::pending::<FetchResult<HttpResponse>>().await,
        };

        guard.finish();
        result
    }
}
