//! # Paginated Requests
//!
//! [`PaginatedRequest`] runs a full sweep over a [`Cursor`](crate::Cursor) with one leased
//! client: every response the cursor yields goes to the handler as soon as it
//! is produced, in order, until the cursor is exhausted or fails.
//!
//! Delivery is not transactional. When the cursor fails halfway, the handler
//! has already seen the responses before the failure and the request returns
//! the cursor's error.

use crate::client::{short_type_name, ClientFactory, ServiceClient};
use crate::context::RequestContext;
use crate::cursor::{BoxCursor, CursorStep};
use crate::handler::ResponseHandler;
use crate::lease::ClientLease;
use crate::request::ApiRequest;
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, instrument, trace};

/// Opens the cursor for a [`PaginatedRequest`]. Opening does not fail; a
/// cursor reports problems from its first `next` call.
pub type CursorFn<C, R, V, E> =
    dyn for<'a> Fn(&'a C, &'a R, &'a RequestContext) -> BoxCursor<'a, V, E> + Send + Sync;

/// A request payload paired with the function that opens a cursor over its
/// results.
///
/// # Example
///
/// ```rust
/// use futures::stream;
/// use request_wrapper::mock::{MockClient, MockClientStats, MockError};
/// use request_wrapper::{ApiRequest, BoxCursor, PaginatedRequest, RequestContext, StreamCursor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let factory = MockClient::factory(RequestContext::new(), MockClientStats::default());
///
/// let list: PaginatedRequest<MockClient, &'static str, String, MockError> =
///     PaginatedRequest::new("logs-", |_client: &MockClient, prefix: &&'static str, _ctx: &RequestContext| {
///         let names = (1..=3).map(|n| Ok::<_, MockError>(format!("{prefix}{n}")));
///         Box::new(StreamCursor::new(stream::iter(names.collect::<Vec<_>>())))
///             as BoxCursor<'_, String, MockError>
///     });
///
/// let mut names: Vec<String> = Vec::new();
/// list.make_request(&factory, &mut names).await.unwrap();
/// assert_eq!(names, ["logs-1", "logs-2", "logs-3"]);
/// # }
/// ```
pub struct PaginatedRequest<C, R, V, E> {
    request: R,
    open: Box<CursorFn<C, R, V, E>>,
}

impl<C, R, V, E> PaginatedRequest<C, R, V, E> {
    pub fn new<F>(request: R, open: F) -> Self
    where
        F: for<'a> Fn(&'a C, &'a R, &'a RequestContext) -> BoxCursor<'a, V, E>
            + Send
            + Sync
            + 'static,
    {
        Self {
            request,
            open: Box::new(open),
        }
    }

    /// The payload the cursor is opened with on every run.
    pub fn request(&self) -> &R {
        &self.request
    }
}

impl<C, R, V: Send, E: Send> PaginatedRequest<C, R, V, E> {
    /// Pulls from the cursor until it is exhausted or fails.
    async fn drain(
        &self,
        client: &C,
        ctx: &RequestContext,
        handler: &mut dyn ResponseHandler<V>,
    ) -> Result<(), E> {
        let mut cursor = (self.open)(client, &self.request, ctx);
        let mut delivered = 0usize;

        loop {
            match cursor.next().await {
                CursorStep::Yielded(response) => {
                    handler.handle_response(response);
                    delivered += 1;
                    trace!(delivered, page = ?cursor.page_info(), "Delivered response");
                }
                CursorStep::Exhausted => {
                    debug!(delivered, "Cursor exhausted");
                    return Ok(());
                }
                CursorStep::Failed(e) => {
                    debug!(delivered, "Cursor failed");
                    return Err(e);
                }
            }
        }
    }
}

impl<C, R: fmt::Debug, V, E> fmt::Debug for PaginatedRequest<C, R, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedRequest")
            .field("client", &short_type_name::<C>())
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C, R, V, E> ApiRequest<C, E> for PaginatedRequest<C, R, V, E>
where
    C: ServiceClient,
    R: Send + Sync + 'static,
    V: Send + 'static,
    E: Send + 'static,
{
    type Response = V;

    #[instrument(skip_all, fields(client = short_type_name::<C>()))]
    async fn make_request(
        &self,
        factory: &ClientFactory<C, E>,
        handler: &mut dyn ResponseHandler<V>,
    ) -> Result<(), E> {
        let lease = ClientLease::acquire(factory).await?;
        let outcome = self.drain(lease.client(), factory.context(), handler).await;
        lease.dispose().await;
        outcome
    }
}
