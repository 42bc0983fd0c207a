use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::Service;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use switchyard::{Context, Request, Response, Router, RouterService, StatusCode};

fn app() -> RouterService {
    let mut app = Router::new();
    app.post("/echo/{name}", |ctx: &mut Context, res: &mut Response, req: &Request| {
        res.set_header("x-name", ctx.param("name").unwrap_or("-"));
        res.write(req.body());
    });
    app.into_service()
}

async fn body_of(res: http::Response<Full<Bytes>>) -> Bytes {
    res.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn collects_body_and_dispatches() {
    let req = http::Request::builder()
        .method("POST")
        .uri("/echo/alice")
        .body(Full::new(Bytes::from_static(b"hello")))
        .unwrap();

    let res = app().call(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-name"], "alice");
    assert_eq!(body_of(res).await, "hello");
}

#[tokio::test]
async fn unmatched_is_404_with_empty_body() {
    let req = http::Request::builder()
        .method("GET")
        .uri("/echo/alice")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let res = app().call(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_of(res).await.is_empty());
}

#[tokio::test]
async fn redirect_keeps_query() {
    let req = http::Request::builder()
        .method("POST")
        .uri("/x/../echo/bob?loud=1")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let res = app().call(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()["location"], "/echo/bob?loud=1");
}

#[tokio::test]
async fn encoded_paths_are_decoded_before_routing() {
    let req = http::Request::builder()
        .method("POST")
        .uri("/x/%2e%2e/echo/bob?loud=1")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let res = app().call(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()["location"], "/echo/bob?loud=1");

    let req = http::Request::builder()
        .method("POST")
        .uri("/x/../echo/al%20ice")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let res = app().call(req).await.unwrap();
    assert_eq!(res.headers()["location"], "/echo/al%20ice");

    let req = http::Request::builder()
        .method("POST")
        .uri("/echo/al%20ice")
        .body(Full::new(Bytes::from_static(b"hi")))
        .unwrap();
    let res = app().call(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-name"], "al ice");
}

#[tokio::test]
async fn serves_over_a_real_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let svc = app();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        ConnBuilder::new(TokioExecutor::new())
            .serve_connection(TokioIo::new(stream), svc)
            .await
            .unwrap();
    });

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(
            b"POST /echo/carol HTTP/1.1\r\nhost: localhost\r\ncontent-length: 2\r\nconnection: close\r\n\r\nhi",
        )
        .await
        .unwrap();
    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "{raw}");
    assert!(raw.contains("x-name: carol\r\n"), "{raw}");
    assert!(raw.ends_with("\r\n\r\nhi"), "{raw}");

    server.await.unwrap();
}
