//! # Client Lease
//!
//! Scoped ownership of one client for the duration of one request. Both request
//! wrappers go through here, so acquisition and release live in one place:
//!
//! 1. [`ClientLease::acquire`] asks the factory for a client. A construction
//!    error is returned before anything is leased.
//! 2. The wrapper borrows the client through [`ClientLease::client`].
//! 3. [`ClientLease::dispose`] closes it. Close errors are logged, passed to
//!    the factory's disposal observer, and dropped.
//!
//! If the lease is dropped without `dispose` (the request future was cancelled
//! or a handler panicked) the client is dropped in place and a warning is logged.

use crate::client::{short_type_name, ClientFactory, DisposalObserver, ServiceClient};
use crate::error::DisposalError;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) struct ClientLease<C: ServiceClient> {
    client: C,
    observer: Option<Arc<DisposalObserver>>,
    pending: PendingClose,
}

impl<C: ServiceClient> ClientLease<C> {
    pub(crate) async fn acquire<E>(factory: &ClientFactory<C, E>) -> Result<Self, E>
    where
        E: Send + 'static,
    {
        let client = factory.new_client().await?;
        let name = short_type_name::<C>();
        debug!(client = name, "Client acquired");
        Ok(Self {
            client,
            observer: factory.disposal_observer(),
            pending: PendingClose {
                client: name,
                armed: true,
            },
        })
    }

    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// Closes the client. Never fails.
    pub(crate) async fn dispose(self) {
        let Self {
            client,
            observer,
            mut pending,
        } = self;
        pending.armed = false;

        let name = pending.client;
        match client.close().await {
            Ok(()) => debug!(client = name, "Client closed"),
            Err(e) => {
                let err = DisposalError::new(name, e);
                warn!(client = name, error = %err, "Ignoring client close failure");
                if let Some(observer) = observer {
                    observer(&err);
                }
            }
        }
    }
}

/// Logs when a lease goes away without being disposed.
struct PendingClose {
    client: &'static str,
    armed: bool,
}

impl Drop for PendingClose {
    fn drop(&mut self) {
        if self.armed {
            warn!(client = self.client, "Client dropped without close");
        }
    }
}
