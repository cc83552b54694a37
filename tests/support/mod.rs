//! Shared helpers for integration tests: a recording subscriber, a scripted
//! call and a server that drops connections.

#![allow(dead_code)]

use std::io::Read;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use fluxcall::call::{Call, Callback, Response};
use fluxcall::reactive::{StreamEvent, Subscriber, Subscription};
use fluxcall::{Error, Result};

struct Recorded<T> {
    events: Vec<StreamEvent<T>>,
    subscription: Option<Subscription>,
}

/// Shared view of what a [`RecordingSubscriber`] has seen.
pub struct Recording<T> {
    inner: Arc<(Mutex<Recorded<T>>, Condvar)>,
}

impl<T> Clone for Recording<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: std::fmt::Debug> Recording<T> {
    /// Events rendered as `next <item>`, `error <message>` or `complete`.
    pub fn describe(&self) -> Vec<String> {
        let recorded = self.inner.0.lock().unwrap();
        recorded
            .events
            .iter()
            .map(|event| match event {
                StreamEvent::Next(item) => format!("next {item:?}"),
                StreamEvent::Error(error) => format!("error {error}"),
                StreamEvent::Complete => "complete".to_string(),
            })
            .collect()
    }

    pub fn take_events(&self) -> Vec<StreamEvent<T>> {
        std::mem::take(&mut self.inner.0.lock().unwrap().events)
    }

    pub fn subscription(&self) -> Subscription {
        self.inner
            .0
            .lock()
            .unwrap()
            .subscription
            .clone()
            .expect("subscribed")
    }

    /// Block until a terminal event arrives, or panic after `timeout`.
    pub fn await_terminal(&self, timeout: Duration) {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap();
        let (guard, result) = cvar
            .wait_timeout_while(guard, timeout, |r| {
                !r.events.last().is_some_and(StreamEvent::is_terminal)
            })
            .unwrap();
        assert!(
            !result.timed_out(),
            "no terminal event within {timeout:?}, saw {} events",
            guard.events.len()
        );
    }
}

/// Subscriber that records every event and optionally rejects items.
pub struct RecordingSubscriber<T> {
    recording: Recording<T>,
    initial_request: u64,
    reject_next: bool,
    reject_error: bool,
}

impl<T> RecordingSubscriber<T> {
    /// Requests everything on subscribe.
    pub fn new() -> (Self, Recording<T>) {
        Self::with_request(u64::MAX)
    }

    pub fn with_request(initial_request: u64) -> (Self, Recording<T>) {
        let recording = Recording {
            inner: Arc::new((
                Mutex::new(Recorded {
                    events: Vec::new(),
                    subscription: None,
                }),
                Condvar::new(),
            )),
        };
        let subscriber = Self {
            recording: recording.clone(),
            initial_request,
            reject_next: false,
            reject_error: false,
        };
        (subscriber, recording)
    }

    /// Fail every `on_next` with a subscriber error.
    pub fn rejecting(mut self) -> Self {
        self.reject_next = true;
        self
    }

    /// Record every error, then fail `on_error` with a subscriber error.
    pub fn rejecting_errors(mut self) -> Self {
        self.reject_error = true;
        self
    }

    fn push(&self, event: StreamEvent<T>) {
        let (lock, cvar) = &*self.recording.inner;
        lock.lock().unwrap().events.push(event);
        cvar.notify_all();
    }
}

impl<T: Send> Subscriber<T> for RecordingSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.recording.inner.0.lock().unwrap().subscription = Some(subscription.clone());
        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }

    fn on_next(&mut self, item: T) -> Result<()> {
        if self.reject_next {
            return Err(Error::subscriber("rejected by test"));
        }
        self.push(StreamEvent::Next(item));
        Ok(())
    }

    fn on_error(&mut self, error: Error) -> Result<()> {
        self.push(StreamEvent::Error(error));
        if self.reject_error {
            return Err(Error::subscriber("error rejected by test"));
        }
        Ok(())
    }

    fn on_complete(&mut self) {
        self.push(StreamEvent::Complete);
    }
}

pub type Outcome = fn() -> Result<Response<String>>;

pub fn ok_hey() -> Result<Response<String>> {
    Ok(Response::success("hey".to_string()))
}

pub fn not_found() -> Result<Response<String>> {
    Ok(Response::error(reqwest::StatusCode::NOT_FOUND, "missing"))
}

pub fn disconnected() -> Result<Response<String>> {
    Err(Error::io("connection closed before message completed"))
}

/// Counters shared by a [`StubCall`] and all of its clones.
#[derive(Default)]
pub struct StubStats {
    pub clones: AtomicUsize,
    pub executions: AtomicUsize,
    pub cancels: AtomicUsize,
    pub parked: Mutex<Vec<Arc<dyn Callback<String>>>>,
}

/// Call that answers from a script instead of the network.
pub struct StubCall {
    outcome: Outcome,
    stats: Arc<StubStats>,
    park: bool,
    canceled: AtomicBool,
}

impl StubCall {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            stats: Arc::default(),
            park: false,
            canceled: AtomicBool::new(false),
        }
    }

    /// Hold enqueued callbacks in [`StubStats::parked`] instead of answering.
    pub fn parking(mut self) -> Self {
        self.park = true;
        self
    }

    pub fn stats(&self) -> Arc<StubStats> {
        self.stats.clone()
    }
}

impl Call<String> for StubCall {
    fn clone_call(&self) -> Box<dyn Call<String>> {
        self.stats.clones.fetch_add(1, Ordering::SeqCst);
        Box::new(Self {
            outcome: self.outcome,
            stats: self.stats.clone(),
            park: self.park,
            canceled: AtomicBool::new(false),
        })
    }

    fn execute(&self) -> Result<Response<String>> {
        self.stats.executions.fetch_add(1, Ordering::SeqCst);
        (self.outcome)()
    }

    fn enqueue(&self, callback: Arc<dyn Callback<String>>) {
        self.stats.executions.fetch_add(1, Ordering::SeqCst);
        if self.park {
            self.stats.parked.lock().unwrap().push(callback);
            return;
        }
        let outcome = self.outcome;
        std::thread::spawn(move || match outcome() {
            Ok(response) => callback.on_response(response),
            Err(error) => callback.on_failure(error),
        });
    }

    fn cancel(&self) {
        self.stats.cancels.fetch_add(1, Ordering::SeqCst);
        self.canceled.store(true, Ordering::SeqCst);
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// A server that reads one request and closes the connection without answering.
pub fn disconnecting_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            drop(stream);
        }
    });
    format!("http://{addr}")
}

/// A server that accepts connections and never answers.
pub fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            held.push(stream);
        }
    });
    format!("http://{addr}")
}
