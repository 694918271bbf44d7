//! A token-paginated storage client driven through the request wrappers, the
//! way a real SDK client would be.

use async_trait::async_trait;
use request_wrapper::{
    handler_fn, ApiRequest, BoxCursor, ClientFactory, ContextError, Cursor, CursorStep, PageInfo,
    PaginatedRequest, RequestContext, ServiceClient, UnaryRequest,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Test Client ---

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
enum BucketError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("page token rejected: {0}")]
    BadToken(String),
    #[error(transparent)]
    Context(#[from] ContextError),
}

#[derive(Debug, Clone, PartialEq)]
struct Object {
    name: String,
    size: u64,
}

#[derive(Debug)]
struct ListObjects {
    prefix: String,
    page_size: usize,
}

/// Server-side state shared by every client the factory builds.
#[derive(Default)]
struct Bucket {
    objects: Vec<Object>,
    /// Page fetches that fail with `BadToken`, by page number.
    poisoned_page: Option<usize>,
    page_fetches: AtomicUsize,
    open_connections: AtomicUsize,
}

struct BucketClient {
    bucket: Arc<Bucket>,
}

impl BucketClient {
    fn connect(bucket: Arc<Bucket>) -> Self {
        bucket.open_connections.fetch_add(1, Ordering::SeqCst);
        Self { bucket }
    }

    async fn stat(&self, name: &str) -> Result<Object, BucketError> {
        self.bucket
            .objects
            .iter()
            .find(|o| o.name == name)
            .cloned()
            .ok_or_else(|| BucketError::NotFound(name.to_string()))
    }

    /// Returns one page and the token of the next one.
    async fn list_page(
        &self,
        prefix: &str,
        token: Option<&str>,
        page_size: usize,
    ) -> Result<(Vec<Object>, Option<String>), BucketError> {
        let page_no = self.bucket.page_fetches.fetch_add(1, Ordering::SeqCst);
        if self.bucket.poisoned_page == Some(page_no) {
            return Err(BucketError::BadToken(token.unwrap_or_default().to_string()));
        }
        let start: usize = match token {
            Some(t) => t.parse().map_err(|_| BucketError::BadToken(t.to_string()))?,
            None => 0,
        };
        let matching: Vec<&Object> = self
            .bucket
            .objects
            .iter()
            .filter(|o| o.name.starts_with(prefix))
            .collect();
        let page = matching
            .iter()
            .skip(start)
            .take(page_size)
            .map(|o| (*o).clone())
            .collect();
        let end = start + page_size;
        let next = (end < matching.len()).then(|| end.to_string());
        Ok((page, next))
    }
}

#[async_trait]
impl ServiceClient for BucketClient {
    type Error = std::io::Error;

    async fn close(self) -> Result<(), std::io::Error> {
        self.bucket.open_connections.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Cursor borrowing the client for the whole sweep.
struct ObjectPages<'a> {
    client: &'a BucketClient,
    request: &'a ListObjects,
    ctx: &'a RequestContext,
    buffer: VecDeque<Object>,
    token: Option<String>,
    done: bool,
}

#[async_trait]
impl<'a> Cursor for ObjectPages<'a> {
    type Item = Object;
    type Error = BucketError;

    async fn next(&mut self) -> CursorStep<Object, BucketError> {
        while self.buffer.is_empty() {
            if self.done {
                return CursorStep::Exhausted;
            }
            if let Some(err) = self.ctx.err() {
                return CursorStep::Failed(err.into());
            }
            let fetched = self
                .client
                .list_page(
                    &self.request.prefix,
                    self.token.as_deref(),
                    self.request.page_size,
                )
                .await;
            match fetched {
                Ok((page, next)) => {
                    self.buffer.extend(page);
                    self.done = next.is_none();
                    self.token = next;
                }
                Err(e) => return CursorStep::Failed(e),
            }
        }
        match self.buffer.pop_front() {
            Some(object) => CursorStep::Yielded(object),
            None => CursorStep::Exhausted,
        }
    }

    fn page_info(&self) -> Option<PageInfo> {
        Some(PageInfo {
            token: self.token.clone(),
            max_size: Some(self.request.page_size as u32),
            remaining: self.buffer.len(),
        })
    }
}

fn bucket(names: &[&str]) -> Bucket {
    Bucket {
        objects: names
            .iter()
            .enumerate()
            .map(|(i, name)| Object {
                name: name.to_string(),
                size: (i as u64 + 1) * 100,
            })
            .collect(),
        ..Bucket::default()
    }
}

fn factory(bucket: Arc<Bucket>, ctx: RequestContext) -> ClientFactory<BucketClient, BucketError> {
    ClientFactory::new(ctx, move || {
        let bucket = bucket.clone();
        async move { Ok(BucketClient::connect(bucket)) }
    })
}

fn list_objects(
    prefix: &str,
    page_size: usize,
) -> PaginatedRequest<BucketClient, ListObjects, Object, BucketError> {
    PaginatedRequest::new(
        ListObjects {
            prefix: prefix.to_string(),
            page_size,
        },
        |client: &BucketClient, request: &ListObjects, ctx: &RequestContext| {
            Box::new(ObjectPages {
                client,
                request,
                ctx,
                buffer: VecDeque::new(),
                token: None,
                done: false,
            }) as BoxCursor<'_, Object, BucketError>
        },
    )
}

fn names(objects: &[Object]) -> Vec<&str> {
    objects.iter().map(|o| o.name.as_str()).collect()
}

// --- Tests ---

#[tokio::test]
async fn test_listing_walks_every_page() {
    let bucket = Arc::new(bucket(&["logs/1", "logs/2", "img/a", "logs/3", "logs/4", "logs/5"]));
    let factory = factory(bucket.clone(), RequestContext::new());

    let mut objects: Vec<Object> = Vec::new();
    list_objects("logs/", 2)
        .make_request(&factory, &mut objects)
        .await
        .unwrap();

    assert_eq!(names(&objects), ["logs/1", "logs/2", "logs/3", "logs/4", "logs/5"]);
    assert_eq!(bucket.page_fetches.load(Ordering::SeqCst), 3);
    assert_eq!(bucket.open_connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_listing_with_no_matches_is_empty_success() {
    let bucket = Arc::new(bucket(&["img/a", "img/b"]));
    let factory = factory(bucket.clone(), RequestContext::new());

    let mut objects: Vec<Object> = Vec::new();
    let result = list_objects("logs/", 10)
        .make_request(&factory, &mut objects)
        .await;

    assert_eq!(result, Ok(()));
    assert!(objects.is_empty());
    assert_eq!(bucket.open_connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_page_keeps_earlier_pages() {
    let bucket = Arc::new(Bucket {
        poisoned_page: Some(1),
        ..bucket(&["a", "b", "c", "d"])
    });
    let factory = factory(bucket.clone(), RequestContext::new());

    let mut objects: Vec<Object> = Vec::new();
    let err = list_objects("", 2)
        .make_request(&factory, &mut objects)
        .await
        .unwrap_err();

    assert_eq!(err, BucketError::BadToken("2".into()));
    assert_eq!(names(&objects), ["a", "b"]);
    assert_eq!(bucket.open_connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_can_stop_sweep_through_context() {
    let bucket = Arc::new(bucket(&["a", "b", "c", "d", "e", "f"]));
    let ctx = RequestContext::new();
    let factory = factory(bucket.clone(), ctx.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut handler = handler_fn(move |object: Object| {
        sink.lock().unwrap().push(object.name);
        ctx.cancel();
    });

    let err = list_objects("", 2)
        .make_request(&factory, &mut handler)
        .await
        .unwrap_err();

    // The buffered page still drains; the next fetch sees the cancellation
    assert_eq!(err, BucketError::Context(ContextError::Cancelled));
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(bucket.page_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(bucket.open_connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stat_reuses_factory_with_fresh_clients() {
    let bucket = Arc::new(bucket(&["report.csv", "summary.txt"]));
    let factory = factory(bucket.clone(), RequestContext::new());

    let stat = |name: &str| -> UnaryRequest<BucketClient, String, Object, BucketError> {
        UnaryRequest::new(
            name.to_string(),
            |client: &BucketClient, name: &String, _ctx: &RequestContext| {
                Box::pin(client.stat(name))
            },
        )
    };

    let mut objects: Vec<Object> = Vec::new();
    stat("summary.txt")
        .make_request(&factory, &mut objects)
        .await
        .unwrap();
    let missing = stat("missing.bin")
        .make_request(&factory, &mut objects)
        .await;

    assert_eq!(
        objects,
        vec![Object {
            name: "summary.txt".into(),
            size: 200
        }]
    );
    assert_eq!(missing, Err(BucketError::NotFound("missing.bin".into())));
    assert_eq!(bucket.open_connections.load(Ordering::SeqCst), 0);
}
