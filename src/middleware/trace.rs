//! Request tracing middleware.

use std::time::Instant;

use tracing::{info, info_span};

use crate::handler::{handler_fn, BoxedHandler};
use crate::middleware::Middleware;

/// Opens an `info` span per request carrying method and path, and logs the
/// final status and latency when the wrapped handler returns.
///
/// ```rust
/// use switchyard::{middleware, Router};
///
/// let mut app = Router::new();
/// app.handle_with("/", |res: &mut switchyard::Response, _req: &switchyard::Request| {
///     res.write_str("hi");
/// }, [middleware::trace()]);
/// ```
pub fn trace() -> Middleware {
    Middleware::plain(|next: BoxedHandler| {
        handler_fn(move |ctx, res, req| {
            let span = info_span!("request", method = %req.method(), path = %req.path());
            let _guard = span.enter();
            let started = Instant::now();

            next.call(ctx, res, req);

            info!(
                status = res.status().as_u16(),
                latency_us = started.elapsed().as_micros() as u64,
                "request completed",
            );
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::middleware::compose;
    use crate::request::Request;
    use crate::response::Response;

    #[test]
    fn passes_through() {
        let h = compose(
            |res: &mut Response, _req: &Request| res.set_status(http::StatusCode::ACCEPTED),
            [trace()],
        );
        let mut res = Response::new();
        h.call(&mut Context::new(), &mut res, &Request::new("POST", "/jobs"));
        assert_eq!(res.status(), http::StatusCode::ACCEPTED);
    }
}
