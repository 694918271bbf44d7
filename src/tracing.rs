//! # Observability & Tracing
//!
//! The adapter logs through the `tracing` crate and never installs a subscriber
//! itself. Applications that want its output call [`setup_tracing`] at startup
//! (or install their own subscriber). Without `RUST_LOG` it shows close
//! failures and this crate's client lifecycle.
//!
//! ## What Gets Traced
//!
//! - **Requests**: a `make_request` span per run, with the client type as the
//!   `client` field.
//! - **Client lifecycle**: `Client acquired` / `Client closed` at `debug`.
//! - **Pagination**: one `trace` event per delivered response (with the
//!   cursor's page info) and a `debug` event when the sweep ends.
//! - **Swallowed failures**: `warn` when a client fails to close or is dropped
//!   without being closed.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Close failures only
//! RUST_LOG=warn cargo run
//!
//! # Client lifecycle
//! RUST_LOG=request_wrapper=debug cargo run
//!
//! # Every delivered page item
//! RUST_LOG=request_wrapper=trace cargo run
//! ```

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid: swallowed close failures
/// from anywhere, client lifecycle from this crate.
pub const DEFAULT_FILTER: &str = "warn,request_wrapper=debug";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one is left alone.
pub fn setup_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .is_ok()
}
