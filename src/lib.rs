//! # Request Wrapper
//!
//! > **Issue requests against any resource-owning service client without
//! > rewriting the client lifecycle for every call.**
//!
//! Service SDKs tend to hand out clients that own connections and must be
//! closed after use. Writing "build a client, call it, close it, forward the
//! result" by hand for every request shape gets repetitive and error-prone,
//! especially on the error paths. This crate writes that loop once.
//!
//! ## Core Concepts
//!
//! - [`ServiceClient`] - the external client. The only thing required of it is
//!   an async `close`.
//! - [`ClientFactory`] - builds a fresh client on demand and carries the
//!   [`RequestContext`] (cancellation + deadline) handed to every operation.
//! - [`UnaryRequest`] - a payload plus a call that returns one response.
//! - [`PaginatedRequest`] - a payload plus a function that opens a [`Cursor`];
//!   the cursor is drained until it reports [`CursorStep::Exhausted`].
//! - [`ResponseHandler`] - where responses go, one call per response, in order.
//!
//! Both request types implement [`ApiRequest::make_request`], which:
//!
//! 1. asks the factory for a client (a construction error is returned as is),
//! 2. runs the operation and delivers its responses,
//! 3. closes the client, on every path,
//! 4. returns the operation's own error, if any.
//!
//! A failed `close` is logged and reported to the optional
//! [disposal observer](ClientFactory::with_disposal_observer), but never
//! returned: it cannot turn a successful request into a failed one, nor
//! replace the error of a failed one.
//!
//! ## Example
//!
//! ```rust
//! use request_wrapper::mock::{MockClient, MockClientStats, MockCursor, MockError};
//! use request_wrapper::{ApiRequest, BoxCursor, PaginatedRequest, RequestContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stats = MockClientStats::default();
//! let factory = MockClient::factory(RequestContext::new(), stats.clone());
//!
//! let pages: MockCursor<u32, MockError> = MockCursor::new().then_yield(1).then_yield(2);
//! let list: PaginatedRequest<MockClient, (), u32, MockError> =
//!     PaginatedRequest::new((), move |_client: &MockClient, _req: &(), _ctx: &RequestContext| {
//!         Box::new(pages.clone()) as BoxCursor<'_, u32, MockError>
//!     });
//!
//! let mut ids: Vec<u32> = Vec::new();
//! list.make_request(&factory, &mut ids).await.unwrap();
//!
//! assert_eq!(ids, vec![1, 2]);
//! assert_eq!(stats.open(), 0);
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! A request runs as one sequential future and starts no tasks or timers of
//! its own. Concurrent requests each lease their own client and share nothing
//! mutable; sharing a factory between them only requires its constructor to be
//! callable concurrently, which the `Send + Sync` bound on it guarantees.
//!
//! ## Testing
//!
//! The [`mock`] module provides a counting [`MockClient`](mock::MockClient)
//! and a scripted [`MockCursor`](mock::MockCursor).

pub mod client;
pub mod context;
pub mod cursor;
pub mod error;
pub mod handler;
mod lease;
pub mod mock;
pub mod paginated;
pub mod request;
pub mod tracing;

// Re-export core types for convenience
pub use client::{ClientFactory, DisposalObserver, ServiceClient};
pub use context::RequestContext;
pub use cursor::{BoxCursor, Cursor, CursorStep, PageInfo, StreamCursor};
pub use error::{ContextError, DisposalError};
pub use handler::{handler_fn, HandlerFn, ResponseHandler};
pub use paginated::{CursorFn, PaginatedRequest};
pub use request::{ApiRequest, UnaryFn, UnaryRequest};
