//! Handler contract and normalization.
//!
//! # One contract, four accepted shapes
//!
//! Every route ends up stored as a [`BoxedHandler`]: an
//! `Arc<dyn Handler>` that is invoked with the request's [`Context`], the
//! [`Response`] sink and the [`Request`]. Callers may hand the router any of
//! four shapes, captured by the closed enum [`HandlerLike`]:
//!
//! ```text
//! HandlerLike::Handler(Arc<dyn Handler>)         ← already conforming, kept as-is
//! HandlerLike::Http(Arc<dyn HttpHandler>)        ← context-oblivious, wrapped
//! HandlerLike::ContextFn(fn(&mut C, &mut W, &R)) ← plain function, wrapped
//! HandlerLike::Fn(fn(&mut W, &R))                ← plain function, wrapped
//!        ↓ HandlerLike::normalize()
//! BoxedHandler                                   ← what the route table stores
//! ```
//!
//! [`IntoHandler`] lets registration calls accept each shape directly. It is
//! sealed: the set of shapes is closed, so an unsupported handler is a type
//! error at the call site. Values that only arrive at runtime go through
//! [`HandlerLike::from_any`], the one place that can still see a foreign
//! shape, and it aborts registration.

use std::any::Any;
use std::sync::Arc;

use tracing::error;

use crate::context::Context;
use crate::request::Request;
use crate::response::Response;

// ── Contracts ─────────────────────────────────────────────────────────────────

/// The normalized handler contract.
///
/// Implement this for types that want the request context. Implementations
/// are shared across concurrent requests, hence `Send + Sync`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut Context, res: &mut Response, req: &Request);
}

/// A handler that does not know about [`Context`].
///
/// Registering one wraps it in an adapter that ignores the context.
pub trait HttpHandler: Send + Sync + 'static {
    fn serve_http(&self, res: &mut Response, req: &Request);
}

/// A type-erased handler shared across concurrent requests.
///
/// Composed handlers are immutable once built, so sharing them is one atomic
/// increment per request.
pub type BoxedHandler = Arc<dyn Handler>;

/// Signature of a plain context-aware handler function.
pub type ContextFn = dyn Fn(&mut Context, &mut Response, &Request) + Send + Sync;

/// Signature of a plain context-oblivious handler function.
pub type PlainFn = dyn Fn(&mut Response, &Request) + Send + Sync;

// ── Function wrappers ─────────────────────────────────────────────────────────

/// Newtype that turns a context-aware closure into a [`Handler`].
pub struct HandlerFunc<F>(pub F);

impl<F> Handler for HandlerFunc<F>
where
    F: Fn(&mut Context, &mut Response, &Request) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context, res: &mut Response, req: &Request) {
        (self.0)(ctx, res, req);
    }
}

/// Newtype that turns a context-oblivious closure into an [`HttpHandler`].
pub struct HttpFunc<F>(pub F);

impl<F> HttpHandler for HttpFunc<F>
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
    fn serve_http(&self, res: &mut Response, req: &Request) {
        (self.0)(res, req);
    }
}

/// Boxes a context-aware closure as a [`BoxedHandler`].
///
/// This is the usual way for middleware to build the handler they return:
///
/// ```rust
/// use switchyard::{handler_fn, BoxedHandler, Handler};
///
/// fn tag(next: BoxedHandler) -> BoxedHandler {
///     handler_fn(move |ctx, res, req| {
///         res.set_header("x-tag", "1");
///         next.call(ctx, res, req);
///     })
/// }
/// ```
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut Context, &mut Response, &Request) + Send + Sync + 'static,
{
    Arc::new(HandlerFunc(f))
}

/// Wraps a context-oblivious closure as an [`HttpHandler`].
pub fn http_fn<F>(f: F) -> HttpFunc<F>
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
    HttpFunc(f)
}

/// Adapter for [`HttpHandler`]s: drops the context on the floor.
struct HttpAdapter(Arc<dyn HttpHandler>);

impl Handler for HttpAdapter {
    fn call(&self, _ctx: &mut Context, res: &mut Response, req: &Request) {
        self.0.serve_http(res, req);
    }
}

// ── HandlerLike ───────────────────────────────────────────────────────────────

/// Every handler shape the router accepts.
#[derive(Clone)]
pub enum HandlerLike {
    /// Already satisfies [`Handler`]; normalizing returns it unchanged.
    Handler(BoxedHandler),
    /// Context-oblivious handler.
    Http(Arc<dyn HttpHandler>),
    /// `Fn(&mut Context, &mut Response, &Request)`.
    ContextFn(Arc<ContextFn>),
    /// `Fn(&mut Response, &Request)`.
    Fn(Arc<PlainFn>),
}

impl HandlerLike {
    /// Selects the [`Handler`] arm. Use this for types that implement both
    /// [`Handler`] and [`HttpHandler`]; the context-aware interface wins.
    pub fn handler(h: impl Handler) -> Self {
        Self::Handler(Arc::new(h))
    }

    pub fn http(h: impl HttpHandler) -> Self {
        Self::Http(Arc::new(h))
    }

    /// Reduces any accepted shape to the single handler contract.
    pub fn normalize(self) -> BoxedHandler {
        match self {
            Self::Handler(h) => h,
            Self::Http(h) => Arc::new(HttpAdapter(h)),
            Self::ContextFn(f) => handler_fn(move |ctx, res, req| f(ctx, res, req)),
            Self::Fn(f) => handler_fn(move |_ctx, res, req| f(res, req)),
        }
    }

    /// Recovers a handler shape from a dynamically typed value.
    ///
    /// Accepts a boxed [`HandlerLike`], [`BoxedHandler`],
    /// `Arc<dyn HttpHandler>`, `Arc<ContextFn>` or `Arc<PlainFn>`.
    ///
    /// # Panics
    ///
    /// Any other type is a configuration error: it is logged and registration
    /// aborts.
    pub fn from_any(value: Box<dyn Any + Send + Sync>) -> Self {
        let value = match value.downcast::<HandlerLike>() {
            Ok(h) => return *h,
            Err(v) => v,
        };
        let value = match value.downcast::<BoxedHandler>() {
            Ok(h) => return Self::Handler(*h),
            Err(v) => v,
        };
        let value = match value.downcast::<Arc<dyn HttpHandler>>() {
            Ok(h) => return Self::Http(*h),
            Err(v) => v,
        };
        let value = match value.downcast::<Arc<ContextFn>>() {
            Ok(f) => return Self::ContextFn(*f),
            Err(v) => v,
        };
        match value.downcast::<Arc<PlainFn>>() {
            Ok(f) => Self::Fn(*f),
            Err(v) => {
                error!(type_id = ?(*v).type_id(), "unknown handler type");
                panic!(
                    "unknown handler type; expected a Handler, an HttpHandler, \
                     or a function Fn(&mut Context, &mut Response, &Request) \
                     or Fn(&mut Response, &Request)"
                );
            }
        }
    }
}

impl From<BoxedHandler> for HandlerLike {
    fn from(h: BoxedHandler) -> Self { Self::Handler(h) }
}

impl From<Arc<dyn HttpHandler>> for HandlerLike {
    fn from(h: Arc<dyn HttpHandler>) -> Self { Self::Http(h) }
}

/// Normalizes any accepted handler shape. Already-normalized handlers come
/// back pointer-identical.
pub fn normalize<M>(h: impl IntoHandler<M>) -> BoxedHandler {
    h.into_handler_like().normalize()
}

// ── IntoHandler ───────────────────────────────────────────────────────────────

/// Implemented for every accepted handler shape.
///
/// You never implement this yourself. The `M` parameter only exists to keep
/// the blanket impls for the different function arities apart; it is always
/// inferred.
pub trait IntoHandler<M>: private::Sealed<M> {
    fn into_handler_like(self) -> HandlerLike;
}

/// Inference markers for [`IntoHandler`].
#[doc(hidden)]
pub mod marker {
    pub struct Like;
    pub struct Boxed;
    pub struct SharedHttp;
    pub struct IsHandler;
    pub struct IsHttpHandler;
    pub struct WithContext;
    pub struct WithoutContext;
}

mod private {
    pub trait Sealed<M> {}
}

macro_rules! into_handler {
    ($marker:ty, $ty:ty, |$this:ident| $body:expr) => {
        impl private::Sealed<$marker> for $ty {}
        impl IntoHandler<$marker> for $ty {
            fn into_handler_like(self) -> HandlerLike {
                let $this = self;
                $body
            }
        }
    };
}

into_handler!(marker::Like, HandlerLike, |h| h);
into_handler!(marker::Boxed, BoxedHandler, |h| HandlerLike::Handler(h));
into_handler!(marker::SharedHttp, Arc<dyn HttpHandler>, |h| HandlerLike::Http(h));

impl<H: Handler> private::Sealed<marker::IsHandler> for H {}
impl<H: Handler> IntoHandler<marker::IsHandler> for H {
    fn into_handler_like(self) -> HandlerLike {
        HandlerLike::Handler(Arc::new(self))
    }
}

impl<H: HttpHandler> private::Sealed<marker::IsHttpHandler> for H {}
impl<H: HttpHandler> IntoHandler<marker::IsHttpHandler> for H {
    fn into_handler_like(self) -> HandlerLike {
        HandlerLike::Http(Arc::new(self))
    }
}

impl<F> private::Sealed<marker::WithContext> for F
where
    F: Fn(&mut Context, &mut Response, &Request) + Send + Sync + 'static,
{
}
impl<F> IntoHandler<marker::WithContext> for F
where
    F: Fn(&mut Context, &mut Response, &Request) + Send + Sync + 'static,
{
    fn into_handler_like(self) -> HandlerLike {
        HandlerLike::ContextFn(Arc::new(self))
    }
}

impl<F> private::Sealed<marker::WithoutContext> for F
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
}
impl<F> IntoHandler<marker::WithoutContext> for F
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
    fn into_handler_like(self) -> HandlerLike {
        HandlerLike::Fn(Arc::new(self))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn invoke(h: &BoxedHandler) -> Response {
        let mut ctx = Context::new();
        let mut res = Response::new();
        h.call(&mut ctx, &mut res, &Request::new("GET", "/"));
        res
    }

    struct Counter(Arc<AtomicUsize>);

    impl Handler for Counter {
        fn call(&self, _ctx: &mut Context, res: &mut Response, _req: &Request) {
            self.0.fetch_add(1, Ordering::SeqCst);
            res.write_str("counter");
        }
    }

    #[test]
    fn normalizing_a_handler_is_identity() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h: BoxedHandler = Arc::new(Counter(Arc::clone(&hits)));

        let once = normalize(Arc::clone(&h));
        let twice = normalize(Arc::clone(&once));
        assert!(Arc::ptr_eq(&h, &once));
        assert!(Arc::ptr_eq(&h, &twice));

        invoke(&twice);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn context_fn_sees_context() {
        let h = normalize(|ctx: &mut Context, res: &mut Response, _req: &Request| {
            ctx.insert("seen", true);
            res.write_str(if ctx.get::<bool>("seen").is_some() { "ctx" } else { "none" });
        });
        assert_eq!(invoke(&h).body(), b"ctx");
    }

    #[test]
    fn plain_fn_gets_response_and_request() {
        let h = normalize(|res: &mut Response, req: &Request| res.write_str(req.method()));
        assert_eq!(invoke(&h).body(), b"GET");
    }

    #[test]
    fn http_handler_is_wrapped() {
        let h = normalize(http_fn(|res, _req| res.write_str("http")));
        assert_eq!(invoke(&h).body(), b"http");
    }

    struct Both;

    impl Handler for Both {
        fn call(&self, _ctx: &mut Context, res: &mut Response, _req: &Request) {
            res.write_str("httpc");
        }
    }

    impl HttpHandler for Both {
        fn serve_http(&self, res: &mut Response, _req: &Request) {
            res.write_str("http");
        }
    }

    #[test]
    fn context_aware_interface_wins() {
        let h = HandlerLike::handler(Both).normalize();
        assert_eq!(invoke(&h).body(), b"httpc");
    }

    #[test]
    fn from_any_accepts_known_shapes() {
        let f: Arc<PlainFn> = Arc::new(|res: &mut Response, _req: &Request| res.write_str("any"));
        let h = HandlerLike::from_any(Box::new(f)).normalize();
        assert_eq!(invoke(&h).body(), b"any");

        let boxed = handler_fn(|_ctx, res, _req| res.write_str("boxed"));
        let h = HandlerLike::from_any(Box::new(Arc::clone(&boxed))).normalize();
        assert!(Arc::ptr_eq(&h, &boxed));

        let http: Arc<dyn HttpHandler> = Arc::new(http_fn(|res, _req| res.write_str("http")));
        let like = HandlerLike::from_any(Box::new(http));
        assert!(matches!(like, HandlerLike::Http(_)));
        assert_eq!(invoke(&like.normalize()).body(), b"http");

        let f: Arc<ContextFn> = Arc::new(|ctx: &mut Context, res: &mut Response, _req: &Request| {
            res.write_str(if ctx.is_empty() { "ctx fn" } else { "dirty" });
        });
        let like = HandlerLike::from_any(Box::new(f));
        assert!(matches!(like, HandlerLike::ContextFn(_)));
        assert_eq!(invoke(&like.normalize()).body(), b"ctx fn");
    }

    #[test]
    #[should_panic(expected = "unknown handler type")]
    fn from_any_rejects_unknown_shapes() {
        HandlerLike::from_any(Box::new("not a handler"));
    }
}
