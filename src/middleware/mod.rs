//! Middleware layer.
//!
//! Middleware intercepts a request on its way to the handler and is the
//! right place for cross-cutting concerns: structured tracing, request-id
//! injection, authentication-header inspection.
//!
//! A middleware is a transform from one [`BoxedHandler`] to another. Two
//! shapes are accepted and both normalize to [`MiddlewareFn`]:
//!
//! - [`Middleware::Plain`]: `Fn(BoxedHandler) -> BoxedHandler`, lifted by
//!   ignoring the context.
//! - [`Middleware::Contextual`]: `Fn(&mut Context, BoxedHandler) -> BoxedHandler`.
//!
//! A middleware must not touch the handler it is given; it returns a new one
//! that may run code before and after delegating, or never delegate at all.
//!
//! Built-in middleware:
//! - [`trace`]: per-request span with method, path, status, latency

use std::any::Any;
use std::sync::Arc;

use tracing::error;

use crate::context::Context;
use crate::handler::BoxedHandler;

pub mod chain;
pub mod trace;

pub use chain::compose;
pub use trace::trace;

/// The normalized middleware form.
pub type MiddlewareFn = Arc<dyn Fn(&mut Context, BoxedHandler) -> BoxedHandler + Send + Sync>;

/// Signature of a context-oblivious middleware.
pub type PlainMiddleware = dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync;

/// Every middleware shape the router accepts.
#[derive(Clone)]
pub enum Middleware {
    Plain(Arc<PlainMiddleware>),
    Contextual(MiddlewareFn),
}

impl Middleware {
    /// Wraps a `Fn(BoxedHandler) -> BoxedHandler` transform.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self::Plain(Arc::new(f))
    }

    /// Wraps a transform that also receives the request context.
    pub fn contextual<F>(f: F) -> Self
    where
        F: Fn(&mut Context, BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self::Contextual(Arc::new(f))
    }

    /// Reduces either shape to the two-argument form.
    pub fn normalize(self) -> MiddlewareFn {
        match self {
            Self::Plain(f) => Arc::new(move |_ctx: &mut Context, next: BoxedHandler| f(next)),
            Self::Contextual(f) => f,
        }
    }

    /// Recovers a middleware from a dynamically typed value.
    ///
    /// Accepts a boxed [`Middleware`], `Arc<PlainMiddleware>` or
    /// [`MiddlewareFn`].
    ///
    /// # Panics
    ///
    /// Any other type is a configuration error: it is logged and registration
    /// aborts.
    pub fn from_any(value: Box<dyn Any + Send + Sync>) -> Self {
        let value = match value.downcast::<Middleware>() {
            Ok(m) => return *m,
            Err(v) => v,
        };
        let value = match value.downcast::<Arc<PlainMiddleware>>() {
            Ok(f) => return Self::Plain(*f),
            Err(v) => v,
        };
        match value.downcast::<MiddlewareFn>() {
            Ok(f) => Self::Contextual(*f),
            Err(v) => {
                error!(type_id = ?(*v).type_id(), "unknown middleware type");
                panic!(
                    "unknown middleware type; expected a function \
                     Fn(BoxedHandler) -> BoxedHandler or \
                     Fn(&mut Context, BoxedHandler) -> BoxedHandler"
                );
            }
        }
    }
}
