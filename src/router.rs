//! Request router.
//!
//! Registration normalizes whatever handler shape it is given, composes it
//! with the route's middleware and stores the single resulting handler in the
//! route table. Dispatch then runs, per request:
//!
//! ```text
//! received → path canonical? ── no ──→ 301 to clean_path (query kept), done
//!                  │ yes
//!            route table lookup ── miss ──→ not-found handler
//!                  │ hit                          │
//!                  └──────→ app hook (optional) ←─┘
//!                                 ↓
//!                  handler(ctx, res, req), ctx dropped after
//! ```
//!
//! Registration takes `&mut self` and is meant to happen once at startup;
//! after that the router is only read and can be shared across threads.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, error, trace};

use crate::context::Context;
use crate::handler::{handler_fn, BoxedHandler, IntoHandler};
use crate::method::Method;
use crate::middleware::{compose, Middleware};
use crate::path::clean_path;
use crate::request::Request;
use crate::response::Response;
use crate::route::{Route, RouteMatch, RouteTable};
use crate::service::RouterService;

type AppHandler = Box<dyn Fn(BoxedHandler, &RouteMatch) -> BoxedHandler + Send + Sync>;

/// The application router.
///
/// Build it once at startup, then hand it to [`Router::into_service`] or call
/// [`Router::serve`] directly.
///
/// ```rust
/// use switchyard::{Context, Request, Response, Router};
///
/// let mut app = Router::new();
/// app.get("/users/{id}", |ctx: &mut Context, res: &mut Response, _req: &Request| {
///     res.write_str(ctx.param("id").unwrap_or("unknown"));
/// });
///
/// let res = app.serve(&Request::new("GET", "/users/42"));
/// assert_eq!(res.body(), b"42");
/// ```
pub struct Router {
    routes: RouteTable,
    not_found: BoxedHandler,
    app_handler: Option<AppHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::default(),
            not_found: default_not_found(),
            app_handler: None,
        }
    }

    /// Registers a handler for `pattern`, any method.
    ///
    /// Path parameters use matchit's `{name}` / `{*rest}` syntax and are read
    /// back with [`Context::param`]. The returned [`Route`] takes method
    /// constraints.
    ///
    /// Several registrations may share a pattern; the first whose methods
    /// accept the request wins. The matcher picks one pattern per path, so a
    /// path whose pattern has no registration for the request method goes to
    /// the not-found handler even if another pattern would also match and
    /// accept it: with `/users/new` taking only `GET`, a `POST /users/new`
    /// is not found although `/users/{id}` takes `POST`.
    ///
    /// # Panics
    ///
    /// Panics if the matcher rejects `pattern`.
    pub fn handle<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle_with(pattern, handler, std::iter::empty())
    }

    /// Registers a handler wrapped in `middleware`, first element outermost.
    ///
    /// # Panics
    ///
    /// Panics if the matcher rejects `pattern`.
    pub fn handle_with<M>(
        &mut self,
        pattern: &str,
        handler: impl IntoHandler<M>,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Route<'_> {
        let handler = compose(handler, middleware);
        debug!(pattern, "route registered");
        self.routes
            .insert(pattern, handler)
            .unwrap_or_else(|e| {
                error!("{e}");
                panic!("{e}")
            })
    }

    pub fn get<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Get)
    }

    pub fn post<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Post)
    }

    pub fn put<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Put)
    }

    pub fn patch<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Patch)
    }

    pub fn delete<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Delete)
    }

    pub fn head<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Head)
    }

    pub fn options<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Options)
    }

    pub fn trace<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Trace)
    }

    pub fn connect<M>(&mut self, pattern: &str, handler: impl IntoHandler<M>) -> Route<'_> {
        self.handle(pattern, handler).method(Method::Connect)
    }

    /// Replaces the handler used when no route accepts a request.
    /// The default answers `404` with an empty body.
    pub fn not_found<M>(&mut self, handler: impl IntoHandler<M>) -> &mut Self {
        self.not_found = handler.into_handler_like().normalize();
        self
    }

    /// Installs a hook that may wrap or replace the resolved handler, matched
    /// or not, right before it runs.
    pub fn app_handler<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(BoxedHandler, &RouteMatch) -> BoxedHandler + Send + Sync + 'static,
    {
        self.app_handler = Some(Box::new(hook));
        self
    }

    /// Number of registrations across all patterns.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Dispatches one request with a fresh [`Context`] that is dropped as
    /// soon as the handler returns.
    pub fn serve(&self, req: &Request) -> Response {
        let mut ctx = Context::new();
        let res = self.serve_in(&mut ctx, req);
        drop(ctx);
        trace!(path = req.path(), "request context cleared");
        res
    }

    /// Dispatches one request with a caller-owned context.
    ///
    /// For callers that manage the context lifecycle themselves: matched path
    /// parameters and whatever the chain stored are still in `ctx` afterwards.
    pub fn serve_in(&self, ctx: &mut Context, req: &Request) -> Response {
        let mut res = Response::new();

        let canonical = clean_path(req.path());
        if canonical != req.path() {
            let location = req.target_with_path(&canonical);
            debug!(from = req.path(), to = %location, "redirecting to canonical path");
            res.redirect(&location, StatusCode::MOVED_PERMANENTLY);
            return res;
        }

        let (mut handler, matched) = match self.routes.lookup(req.method(), req.path()) {
            Some(hit) => hit,
            None => {
                trace!(method = req.method(), path = req.path(), "no route matched");
                (Arc::clone(&self.not_found), RouteMatch::unmatched())
            }
        };

        if let Some(hook) = &self.app_handler {
            handler = hook(handler, &matched);
        }
        ctx.extend_params(matched.params().clone());

        trace!(method = req.method(), pattern = matched.pattern(), "dispatching");
        handler.call(ctx, &mut res, req);
        res
    }

    /// Wraps the router in a hyper [`Service`](hyper::service::Service).
    pub fn into_service(self) -> RouterService {
        RouterService::new(self)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn default_not_found() -> BoxedHandler {
    handler_fn(|_ctx, res, _req| res.set_status(StatusCode::NOT_FOUND))
}
