//! # Single-Response Requests
//!
//! This module defines the [`ApiRequest`] entry point shared by every request
//! shape and the [`UnaryRequest`] wrapper for calls that return one response.

use crate::client::{short_type_name, ClientFactory, ServiceClient};
use crate::context::RequestContext;
use crate::handler::ResponseHandler;
use crate::lease::ClientLease;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use tracing::instrument;

/// A request that can be run against clients built by a [`ClientFactory`].
///
/// Every implementation follows the same lifecycle: lease a fresh client,
/// run the operation, close the client, hand the responses to `handler`.
/// Construction and operation errors are returned unchanged. Close errors
/// are never returned.
///
/// Requests of different shapes against the same client type can be stored
/// together as `Box<dyn ApiRequest<C, E, Response = V>>`.
#[async_trait]
pub trait ApiRequest<C, E>: Send + Sync
where
    C: ServiceClient,
    E: Send + 'static,
{
    type Response: Send;

    /// Runs the request once with a freshly leased client.
    ///
    /// Cancelling the returned future (dropping it, or losing a `select!` or
    /// `timeout` race) skips `close`: the leased client is dropped in place
    /// and a warning is logged. The same happens if `handler` panics. To stop
    /// a request early and still close the client, cancel the factory's
    /// [`RequestContext`] and let the operation return.
    async fn make_request(
        &self,
        factory: &ClientFactory<C, E>,
        handler: &mut dyn ResponseHandler<Self::Response>,
    ) -> Result<(), E>;
}

/// Operation behind a [`UnaryRequest`]: one call, one response.
pub type UnaryFn<C, R, V, E> = dyn for<'a> Fn(&'a C, &'a R, &'a RequestContext) -> BoxFuture<'a, Result<V, E>>
    + Send
    + Sync;

/// A request payload paired with the call that sends it.
///
/// # Example
///
/// ```rust
/// use request_wrapper::mock::{MockClient, MockClientStats, MockError};
/// use request_wrapper::{ApiRequest, RequestContext, UnaryRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let factory = MockClient::factory(RequestContext::new(), MockClientStats::default());
///
/// let request: UnaryRequest<MockClient, u32, String, MockError> =
///     UnaryRequest::new(7, |_client: &MockClient, id: &u32, _ctx: &RequestContext| {
///         Box::pin(async move { Ok(format!("bucket-{id}")) })
///     });
///
/// let mut responses: Vec<String> = Vec::new();
/// request.make_request(&factory, &mut responses).await.unwrap();
/// assert_eq!(responses, vec!["bucket-7".to_string()]);
/// # }
/// ```
pub struct UnaryRequest<C, R, V, E> {
    request: R,
    call: Box<UnaryFn<C, R, V, E>>,
}

impl<C, R, V, E> UnaryRequest<C, R, V, E> {
    pub fn new<F>(request: R, call: F) -> Self
    where
        F: for<'a> Fn(&'a C, &'a R, &'a RequestContext) -> BoxFuture<'a, Result<V, E>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            request,
            call: Box::new(call),
        }
    }

    /// The payload sent on every run.
    pub fn request(&self) -> &R {
        &self.request
    }
}

impl<C, R: fmt::Debug, V, E> fmt::Debug for UnaryRequest<C, R, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryRequest")
            .field("client", &short_type_name::<C>())
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C, R, V, E> ApiRequest<C, E> for UnaryRequest<C, R, V, E>
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

        let outcome = (self.call)(lease.client(), &self.request, factory.context())
            .await
            .map(|response| handler.handle_response(response));

        lease.dispose().await;
        outcome
    }
}
