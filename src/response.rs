//! The response sink handed to every handler.
//!
//! Handlers do not return responses; they write into a [`Response`] the
//! router owns for the duration of the request. The router converts it into
//! an `http::Response` once the chain returns.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use tracing::error;

/// A mutable, in-memory HTTP response.
///
/// Defaults to `200 OK` with no headers and an empty body.
#[derive(Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: Vec::new(), body: Vec::new() }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Appends a header without touching existing values.
    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Appends bytes to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Replies with a plain-text error message and `status`.
    pub fn error(&mut self, message: &str, status: StatusCode) {
        self.set_header("content-type", "text/plain; charset=utf-8");
        self.set_header("x-content-type-options", "nosniff");
        self.status = status;
        self.body.clear();
        self.write_str(message);
        self.write(b"\n");
    }

    /// Replies with a redirect to `location`.
    pub fn redirect(&mut self, location: &str, status: StatusCode) {
        self.set_header("location", location);
        self.status = status;
    }

    /// Converts into the `http` response handed back to hyper.
    ///
    /// A header that is not representable on the wire turns the whole
    /// response into an empty `500`.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(Bytes::from(self.body))).unwrap_or_else(|e| {
            error!("unrepresentable response: {e}");
            let mut res = http::Response::new(Full::new(Bytes::new()));
            *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            res
        })
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_replaces_body_and_sets_status() {
        let mut res = Response::new();
        res.write_str("partial");
        res.error("I'm a teapot!", StatusCode::IM_A_TEAPOT);
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(res.body(), b"I'm a teapot!\n");
        assert_eq!(res.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn set_header_replaces() {
        let mut res = Response::new();
        res.set_header("X-Tag", "a");
        res.set_header("x-tag", "b");
        res.append_header("x-tag", "c");
        assert_eq!(res.headers().len(), 2);
        assert_eq!(res.header("X-TAG"), Some("b"));
    }

    #[test]
    fn invalid_header_becomes_500() {
        let mut res = Response::new();
        res.set_header("bad header", "x");
        let res = res.into_http();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn into_http_keeps_headers() {
        let mut res = Response::new();
        res.redirect("/b?q=1", StatusCode::MOVED_PERMANENTLY);
        let res = res.into_http();
        assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(res.headers()["location"], "/b?q=1");
    }
}
