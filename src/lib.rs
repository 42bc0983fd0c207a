//! # switchyard
//!
//! Glue between your handlers and a radix-tree matcher. Nothing more.
//!
//! ## The contract
//!
//! matchit owns pattern syntax and lookup. hyper owns sockets and protocol.
//! switchyard owns the part in between:
//!
//! - **One handler contract** — every route is an [`Arc<dyn Handler>`](Handler)
//!   called with `(&mut Context, &mut Response, &Request)`, whatever shape
//!   you registered ([`HandlerLike`])
//! - **Middleware chains** — [`compose`] wraps a handler in [`Middleware`],
//!   first listed outermost, with no state shared between chains
//! - **Dispatch** — canonical-path redirects, not-found fallback, an optional
//!   application hook, and a fresh [`Context`] per request
//!
//! ## Quick start
//!
//! ```rust
//! use switchyard::{middleware, Context, Request, Response, Router, StatusCode};
//!
//! let mut app = Router::new();
//! app.get("/users/{id}", |ctx: &mut Context, res: &mut Response, _req: &Request| {
//!     res.write_str(ctx.param("id").unwrap_or("unknown"));
//! });
//! app.handle_with("/admin", |res: &mut Response, _req: &Request| {
//!     res.set_status(StatusCode::FORBIDDEN);
//! }, [middleware::trace()]);
//!
//! let res = app.serve(&Request::new("GET", "/users/../users/7?x=1"));
//! assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
//! assert_eq!(res.header("location"), Some("/users/7?x=1"));
//! ```
//!
//! Serve it with hyper through [`Router::into_service`].

mod context;
mod error;
mod handler;
mod method;
mod path;
mod request;
mod response;
mod route;
mod router;
mod service;

pub mod middleware;

pub use context::Context;
pub use error::{BoxError, Error};
pub use handler::{
    handler_fn, http_fn, normalize, BoxedHandler, ContextFn, Handler, HandlerFunc,
    HandlerLike, HttpFunc, HttpHandler, IntoHandler, PlainFn,
};
pub use http::StatusCode;
pub use method::Method;
pub use middleware::{compose, Middleware, MiddlewareFn};
pub use path::clean_path;
pub use request::Request;
pub use response::Response;
pub use route::{Route, RouteMatch};
pub use router::Router;
pub use service::{BoxFuture, RouterService};
