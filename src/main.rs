//! # Request Wrapper Demo
//!
//! Runs one single-response request and one paginated listing against a small
//! in-memory catalog client.
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! ```

use async_trait::async_trait;
use request_wrapper::tracing::setup_tracing;
use request_wrapper::{
    handler_fn, ApiRequest, BoxCursor, ClientFactory, Cursor, CursorStep, PageInfo,
    PaginatedRequest, RequestContext, ServiceClient, UnaryRequest,
};
use std::convert::Infallible;
use std::time::Duration;
use tracing::{info, Instrument};

const CATALOG: [&str; 5] = ["anvil", "bellows", "chisel", "drill", "easel"];

/// Pretend connection to a catalog service.
struct CatalogClient;

impl CatalogClient {
    async fn item(&self, index: usize) -> Result<String, String> {
        CATALOG
            .get(index)
            .map(|name| name.to_string())
            .ok_or_else(|| format!("no item at {index}"))
    }

    async fn page(&self, start: usize, size: usize) -> Vec<String> {
        CATALOG
            .iter()
            .skip(start)
            .take(size)
            .map(|name| name.to_string())
            .collect()
    }
}

#[async_trait]
impl ServiceClient for CatalogClient {
    type Error = Infallible;

    async fn close(self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Lists the catalog two items per page.
struct CatalogPages<'a> {
    client: &'a CatalogClient,
    buffer: Vec<String>,
    next_start: Option<usize>,
}

#[async_trait]
impl<'a> Cursor for CatalogPages<'a> {
    type Item = String;
    type Error = String;

    async fn next(&mut self) -> CursorStep<String, String> {
        if self.buffer.is_empty() {
            let Some(start) = self.next_start else {
                return CursorStep::Exhausted;
            };
            let mut page = self.client.page(start, 2).await;
            self.next_start = (page.len() == 2).then_some(start + 2);
            page.reverse();
            self.buffer = page;
        }
        match self.buffer.pop() {
            Some(item) => CursorStep::Yielded(item),
            None => CursorStep::Exhausted,
        }
    }

    fn page_info(&self) -> Option<PageInfo> {
        Some(PageInfo {
            token: self.next_start.map(|start| start.to_string()),
            max_size: Some(2),
            remaining: self.buffer.len(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let context = RequestContext::new().with_timeout(Duration::from_secs(5));
    let factory: ClientFactory<CatalogClient, String> =
        ClientFactory::new(context, || async { Ok(CatalogClient) });

    let lookup: UnaryRequest<CatalogClient, usize, String, String> =
        UnaryRequest::new(2, |client: &CatalogClient, index: &usize, _ctx: &RequestContext| {
            Box::pin(client.item(*index))
        });

    let span = tracing::info_span!("lookup");
    async {
        let mut handler = handler_fn(|item: String| info!(%item, "Found item"));
        lookup.make_request(&factory, &mut handler).await
    }
    .instrument(span)
    .await?;

    let listing: PaginatedRequest<CatalogClient, (), String, String> = PaginatedRequest::new(
        (),
        |client: &CatalogClient, _req: &(), _ctx: &RequestContext| {
            Box::new(CatalogPages {
                client,
                buffer: Vec::new(),
                next_start: Some(0),
            }) as BoxCursor<'_, String, String>
        },
    );

    let span = tracing::info_span!("listing");
    let mut items: Vec<String> = Vec::new();
    listing
        .make_request(&factory, &mut items)
        .instrument(span)
        .await?;

    info!(count = items.len(), ?items, "Listed catalog");
    Ok(())
}
