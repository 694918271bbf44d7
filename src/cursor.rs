//! # Cursors
//!
//! Pull-based sources of responses for paginated requests. The paging itself
//! (tokens, page sizes, prefetching) belongs to the service client; the
//! adapter only calls [`Cursor::next`] until it reports [`CursorStep::Exhausted`]
//! or [`CursorStep::Failed`].

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Outcome of one [`Cursor::next`] call.
///
/// Exhaustion is its own variant rather than a special error value, so the
/// paginated loop never has to compare errors to find out it is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorStep<V, E> {
    /// The next response.
    Yielded(V),
    /// No more responses. Not an error.
    Exhausted,
    /// The cursor failed; the sweep stops here.
    Failed(E),
}

impl<V, E> CursorStep<V, E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, CursorStep::Exhausted)
    }
}

/// `Ok(None)` means exhausted.
impl<V, E> From<Result<Option<V>, E>> for CursorStep<V, E> {
    fn from(result: Result<Option<V>, E>) -> Self {
        match result {
            Ok(Some(value)) => CursorStep::Yielded(value),
            Ok(None) => CursorStep::Exhausted,
            Err(e) => CursorStep::Failed(e),
        }
    }
}

/// Paging state reported by a cursor, for logging or for resuming a sweep later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Token of the next page to fetch. `None` once the last page is fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Maximum number of items requested per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
    /// Items already fetched and not yet returned by `next`.
    #[serde(default)]
    pub remaining: usize,
}

/// A sequential producer of responses with an explicit end.
#[async_trait]
pub trait Cursor: Send {
    type Item: Send;
    type Error: Send;

    /// Produces the next response, or reports exhaustion or failure.
    async fn next(&mut self) -> CursorStep<Self::Item, Self::Error>;

    /// Current paging state, if the cursor tracks one.
    fn page_info(&self) -> Option<PageInfo> {
        None
    }
}

/// A boxed cursor borrowing from the client that produced it.
pub type BoxCursor<'a, V, E> = Box<dyn Cursor<Item = V, Error = E> + 'a>;

/// Adapts a `Stream` of results into a [`Cursor`]. The end of the stream is
/// exhaustion.
///
/// ```rust
/// use futures::stream;
/// use request_wrapper::{Cursor, CursorStep, StreamCursor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut cursor = StreamCursor::new(stream::iter(vec![Ok::<_, String>(1), Ok(2)]));
/// assert_eq!(cursor.next().await, CursorStep::Yielded(1));
/// assert_eq!(cursor.next().await, CursorStep::Yielded(2));
/// assert_eq!(cursor.next().await, CursorStep::Exhausted);
/// # }
/// ```
#[derive(Debug)]
pub struct StreamCursor<S> {
    stream: S,
}

impl<S> StreamCursor<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[async_trait]
impl<S, V, E> Cursor for StreamCursor<S>
where
    S: Stream<Item = Result<V, E>> + Send + Unpin,
    V: Send,
    E: Send,
{
    type Item = V;
    type Error = E;

    async fn next(&mut self) -> CursorStep<V, E> {
        match self.stream.next().await {
            Some(Ok(value)) => CursorStep::Yielded(value),
            Some(Err(e)) => CursorStep::Failed(e),
            None => CursorStep::Exhausted,
        }
    }
}
