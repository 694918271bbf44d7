//! # Mock Clients & Testing Guide
//!
//! In-memory stand-ins for a service client and its cursors, so request wiring
//! can be tested without a network.
//!
//! | Type | Stands in for | What it records |
//! |------|---------------|-----------------|
//! | [`MockClient`] | a real service client | clients created / closed via [`MockClientStats`] |
//! | [`MockCursor`] | a paginating iterator | the scripted steps not yet consumed |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 1: Counting client lifecycles</b></summary>
//!
//! Share a [`MockClientStats`] with the factory and assert on it after the
//! request. Every `make_request` should leave `created() == closed()`.
//!
//! ```rust
//! use request_wrapper::mock::{MockClient, MockClientStats, MockError};
//! use request_wrapper::{ApiRequest, RequestContext, UnaryRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stats = MockClientStats::default();
//! let factory = MockClient::factory(RequestContext::new(), stats.clone());
//! let ping: UnaryRequest<MockClient, (), &'static str, MockError> =
//!     UnaryRequest::new((), |_client, _req, _ctx| Box::pin(async { Ok("pong") }));
//!
//! ping.make_request(&factory, &mut Vec::<&str>::new()).await.unwrap();
//! assert_eq!(stats.created(), 1);
//! assert_eq!(stats.open(), 0);
//! # }
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Scripted cursors</b></summary>
//!
//! Build the exact sequence a cursor should produce, including failures that
//! are hard to trigger against a real service (expired page tokens, quota
//! errors halfway through a listing).
//!
//! ```rust
//! use request_wrapper::mock::{MockCursor, MockError};
//! use request_wrapper::{Cursor, CursorStep};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let script = MockCursor::new()
//!     .then_yield(1)
//!     .then_fail(MockError::Request("quota exceeded".into()));
//!
//! let mut cursor = script.clone();
//! assert_eq!(cursor.next().await, CursorStep::Yielded(1));
//! assert!(matches!(cursor.next().await, CursorStep::Failed(_)));
//! assert_eq!(cursor.next().await, CursorStep::Exhausted);
//! script.verify();
//! # }
//! ```
//! </details>
//!
//! ## Failure Injection
//!
//! - Construction failure: [`MockClient::failing_factory`].
//! - Close failure: [`MockClientStats::fail_close`].
//! - Cursor failure: [`MockCursor::then_fail`].

use crate::client::{ClientFactory, ServiceClient};
use crate::context::RequestContext;
use crate::cursor::{Cursor, CursorStep};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Errors produced by the mocks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("close failed")]
    Close,
}

#[derive(Debug, Default)]
struct StatsInner {
    created: AtomicUsize,
    closed: AtomicUsize,
    fail_close: AtomicBool,
}

/// Lifecycle counters shared between a test and the clients it hands out.
#[derive(Debug, Clone, Default)]
pub struct MockClientStats {
    inner: Arc<StatsInner>,
}

impl MockClientStats {
    /// Clients built so far.
    pub fn created(&self) -> usize {
        self.inner.created.load(Ordering::SeqCst)
    }

    /// `close` calls so far, failed ones included.
    pub fn closed(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Clients built but not yet closed.
    pub fn open(&self) -> usize {
        self.created().saturating_sub(self.closed())
    }

    /// Makes every later `close` call fail with [`MockError::Close`].
    pub fn fail_close(&self, fail: bool) {
        self.inner.fail_close.store(fail, Ordering::SeqCst);
    }
}

/// A client that owns nothing and counts its own lifecycle.
#[derive(Debug)]
pub struct MockClient {
    serial: usize,
    stats: MockClientStats,
}

impl MockClient {
    /// Position of this client in creation order, starting at 0.
    pub fn serial(&self) -> usize {
        self.serial
    }

    /// A factory whose clients report to `stats`.
    pub fn factory(
        context: RequestContext,
        stats: MockClientStats,
    ) -> ClientFactory<MockClient, MockError> {
        ClientFactory::new(context, move || {
            let stats = stats.clone();
            async move {
                let serial = stats.inner.created.fetch_add(1, Ordering::SeqCst);
                Ok(MockClient { serial, stats })
            }
        })
    }

    /// A factory whose constructor always fails with `error`.
    pub fn failing_factory(
        context: RequestContext,
        error: MockError,
    ) -> ClientFactory<MockClient, MockError> {
        ClientFactory::new(context, move || {
            let error = error.clone();
            async move { Err(error) }
        })
    }
}

#[async_trait]
impl ServiceClient for MockClient {
    type Error = MockError;

    async fn close(self) -> Result<(), MockError> {
        self.stats.inner.closed.fetch_add(1, Ordering::SeqCst);
        if self.stats.inner.fail_close.load(Ordering::SeqCst) {
            return Err(MockError::Close);
        }
        Ok(())
    }
}

/// A cursor that replays a fixed script of steps, then reports exhaustion.
///
/// Clones share the script, so a test can keep one handle for
/// [`verify`](Self::verify) while the request consumes another.
pub struct MockCursor<V, E> {
    script: Arc<Mutex<VecDeque<CursorStep<V, E>>>>,
}

impl<V, E> Default for MockCursor<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Clone for MockCursor<V, E> {
    fn clone(&self) -> Self {
        Self {
            script: self.script.clone(),
        }
    }
}

impl<V, E> MockCursor<V, E> {
    /// An empty script: the first `next` reports exhaustion.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn then_yield(self, value: V) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(CursorStep::Yielded(value));
        self
    }

    pub fn then_fail(self, error: E) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(CursorStep::Failed(error));
        self
    }

    /// Steps not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Panics unless every scripted step was consumed.
    pub fn verify(&self) {
        let remaining = self.remaining();
        if remaining != 0 {
            panic!("Not all cursor steps were consumed. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl<V, E> Cursor for MockCursor<V, E>
where
    V: Send,
    E: Send,
{
    type Item = V;
    type Error = E;

    async fn next(&mut self) -> CursorStep<V, E> {
        let step = self.script.lock().unwrap().pop_front();
        step.unwrap_or(CursorStep::Exhausted)
    }
}
