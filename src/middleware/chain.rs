//! Middleware chain composition.
//!
//! `compose(h, [a, b])` produces a handler that behaves like `a(b(h))`: the
//! first middleware listed is outermost, so it runs first on the way in and
//! last on the way out.
//!
//! The chain is assembled again on every invocation, with that request's
//! context, from an immutable snapshot taken at composition time. Composing
//! the same base handler twice yields two independent chains.

use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, IntoHandler};
use crate::middleware::{Middleware, MiddlewareFn};
use crate::request::Request;
use crate::response::Response;

/// A base handler plus the middleware that wrap it.
struct Chain {
    base: BoxedHandler,
    middleware: Box<[MiddlewareFn]>,
}

impl Handler for Chain {
    fn call(&self, ctx: &mut Context, res: &mut Response, req: &Request) {
        let mut handler = Arc::clone(&self.base);
        for mw in self.middleware.iter().rev() {
            handler = mw(ctx, handler);
        }
        handler.call(ctx, res, req);
    }
}

/// Wraps `base` in `middleware`, first element outermost.
///
/// ```rust
/// use switchyard::{compose, handler_fn, BoxedHandler, Handler, Middleware};
///
/// let auth = Middleware::plain(|next: BoxedHandler| {
///     handler_fn(move |ctx, res, req| {
///         if req.header("authorization").is_some() {
///             next.call(ctx, res, req);
///         } else {
///             res.set_status(switchyard::StatusCode::UNAUTHORIZED);
///         }
///     })
/// });
///
/// let h = compose(|res: &mut switchyard::Response, _req: &switchyard::Request| {
///     res.write_str("secret");
/// }, [auth]);
/// ```
pub fn compose<M>(
    base: impl IntoHandler<M>,
    middleware: impl IntoIterator<Item = Middleware>,
) -> BoxedHandler {
    let base = base.into_handler_like().normalize();
    let middleware = middleware.into_iter().map(Middleware::normalize).collect();
    Arc::new(Chain { base, middleware })
}
