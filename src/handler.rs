//! # Response Handlers
//!
//! The sink every request wrapper delivers into. A handler is called once per
//! response, in the order responses are produced, on the task that is driving
//! the request. It takes ownership of each response; the wrappers keep nothing.

/// Receives the responses produced by a request.
///
/// Handlers cannot fail. A handler that needs to stop a sweep early should
/// cancel the factory's [`RequestContext`](crate::RequestContext) instead.
pub trait ResponseHandler<V>: Send {
    fn handle_response(&mut self, response: V);
}

/// Collects every response, in delivery order.
impl<V: Send> ResponseHandler<V> for Vec<V> {
    fn handle_response(&mut self, response: V) {
        self.push(response);
    }
}

/// Adapter that turns an `FnMut(V)` closure into a [`ResponseHandler`].
///
/// ```rust
/// use request_wrapper::{handler_fn, ResponseHandler};
///
/// let mut total = 0;
/// {
///     let mut handler = handler_fn(|n: u32| total += n);
///     handler.handle_response(2);
///     handler.handle_response(3);
/// }
/// assert_eq!(total, 5);
/// ```
pub struct HandlerFn<F>(F);

pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn(f)
}

impl<V, F> ResponseHandler<V> for HandlerFn<F>
where
    F: FnMut(V) + Send,
{
    fn handle_response(&mut self, response: V) {
        (self.0)(response)
    }
}
