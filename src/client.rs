//! # Client Factory
//!
//! This module defines the [`ServiceClient`] contract and the [`ClientFactory`]
//! that manufactures short-lived clients for the request wrappers.

use crate::context::RequestContext;
use crate::error::DisposalError;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A resource-owning handle to an external service.
///
/// The adapter never builds or configures clients itself. It only asks a
/// [`ClientFactory`] for a fresh one, borrows it for one operation, and then
/// closes it. `close` takes `self` by value so a client can only be closed once.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use request_wrapper::ServiceClient;
///
/// struct BucketClient;
///
/// #[async_trait]
/// impl ServiceClient for BucketClient {
///     type Error = std::io::Error;
///
///     async fn close(self) -> Result<(), Self::Error> {
///         // flush, hang up the connection, ...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ServiceClient: Send + Sync + 'static {
    /// Error reported when releasing the client fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Releases the client's underlying resources.
    async fn close(self) -> Result<(), Self::Error>;
}

type Constructor<C, E> = dyn Fn() -> BoxFuture<'static, Result<C, E>> + Send + Sync;

/// Callback invoked with every swallowed [`DisposalError`].
pub type DisposalObserver = dyn Fn(&DisposalError) + Send + Sync;

/// Builds clients of type `C` on demand, all bound to the same [`RequestContext`].
///
/// A factory is built once per client type and shared by every request issued
/// against that type. It holds no state besides the constructor and the
/// context: each [`new_client`](Self::new_client) call runs the constructor
/// again. Cloning shares the constructor.
///
/// The constructor may be called from several tasks at once when a factory is
/// shared across concurrent requests, hence the `Send + Sync` bound.
pub struct ClientFactory<C, E> {
    constructor: Arc<Constructor<C, E>>,
    context: RequestContext,
    disposal_observer: Option<Arc<DisposalObserver>>,
}

impl<C, E> ClientFactory<C, E>
where
    C: ServiceClient,
    E: Send + 'static,
{
    pub fn new<F, Fut>(context: RequestContext, constructor: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C, E>> + Send + 'static,
    {
        Self {
            constructor: Arc::new(move || constructor().boxed()),
            context,
            disposal_observer: None,
        }
    }

    /// Registers a callback for client close failures.
    ///
    /// Close failures are still swallowed; the observer only gets to see them.
    pub fn with_disposal_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&DisposalError) + Send + Sync + 'static,
    {
        self.disposal_observer = Some(Arc::new(observer));
        self
    }

    /// Runs the constructor once. Its error is returned as is.
    pub async fn new_client(&self) -> Result<C, E> {
        (self.constructor)().await
    }
}

impl<C, E> ClientFactory<C, E> {
    /// The context handed to every operation run with clients from this factory.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub(crate) fn disposal_observer(&self) -> Option<Arc<DisposalObserver>> {
        self.disposal_observer.clone()
    }
}

impl<C, E> Clone for ClientFactory<C, E> {
    fn clone(&self) -> Self {
        Self {
            constructor: self.constructor.clone(),
            context: self.context.clone(),
            disposal_observer: self.disposal_observer.clone(),
        }
    }
}

impl<C, E> fmt::Debug for ClientFactory<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("client", &short_type_name::<C>())
            .field("context", &self.context)
            .field("disposal_observer", &self.disposal_observer.is_some())
            .finish()
    }
}

/// Type name without the module path (e.g. "StorageClient" instead of
/// "my_app::gcs::StorageClient"), for log fields.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
