//! hyper integration.
//!
//! [`RouterService`] is the transport boundary: hyper hands it an
//! `http::Request` with a streaming body, it collects the body, runs the
//! router synchronously and hands back a fully buffered response. Accepting
//! connections is left to the caller; see `demos/basic.rs` for a tokio +
//! hyper-util accept loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::Service;

use crate::error::{BoxError, Error};
use crate::request::Request;
use crate::router::Router;

/// A heap-allocated, type-erased future, as required by `Service::Future`.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A cloneable hyper service over a shared [`Router`].
///
/// Cloning is one `Arc` increment; every connection task can own a copy.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Router) -> Self {
        Self { router: Arc::new(router) }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

impl<B> Service<http::Request<B>> for RouterService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await.map_err(|e| Error::Body(e.into()))?.to_bytes();
            let req = Request::from_parts(parts, body);
            Ok(router.serve(&req).into_http())
        })
    }
}
