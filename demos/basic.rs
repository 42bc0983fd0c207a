//! Minimal switchyard example: handler shapes, middleware, and a hyper
//! accept loop.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i http://localhost:3000/users/../users/7
//!   curl -i http://localhost:3000/healthz

use std::net::SocketAddr;

use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use switchyard::{
    handler_fn, middleware, BoxedHandler, Context, Middleware, Request, Response, Router, StatusCode,
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut app = Router::new();
    app.handle_with("/users/{id}", get_user, [middleware::trace(), require_json()])
        .method(switchyard::Method::Get);
    app.post("/users", create_user);
    app.get("/healthz", |res: &mut Response, _req: &Request| res.write_str("ok"));
    app.not_found(|res: &mut Response, req: &Request| {
        res.error(&format!("no route for {} {}", req.method(), req.path()), StatusCode::NOT_FOUND);
    });

    let svc = app.into_service();
    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let svc = svc.clone();
        tokio::spawn(async move {
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!(%peer, "connection error: {e}");
            }
        });
    }
}

// GET /users/{id}
fn get_user(ctx: &mut Context, res: &mut Response, _req: &Request) {
    let id = ctx.param("id").unwrap_or("unknown");
    res.set_header("content-type", "application/json");
    res.write_str(&format!(r#"{{"id":"{id}","name":"alice"}}"#));
}

// POST /users
fn create_user(res: &mut Response, req: &Request) {
    if req.body().is_empty() {
        res.set_status(StatusCode::BAD_REQUEST);
        return;
    }
    res.set_status(StatusCode::CREATED);
    res.set_header("location", "/users/99");
}

// Tags the response as JSON unless the handler already chose a type.
fn require_json() -> Middleware {
    Middleware::plain(|next: BoxedHandler| {
        handler_fn(move |ctx, res, req| {
            next.call(ctx, res, req);
            if res.header("content-type").is_none() {
                res.set_header("content-type", "application/json");
            }
        })
    })
}
