//! Request-level and wire-level tests of the lint service.

use std::io;
use std::io::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use bytes::Bytes;
use futures::stream;
use hyper::{Body, Method, Request, Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use crate::http::{LintService, bind_listener, serve};
use crate::lint::{AnalysisOptions, Analyzer, Diagnostic, TextLinter};
use crate::utils::sync::Mutex;


//------------ Helpers -------------------------------------------------------

const BOUNDARY: &str = "----lintd0123";

/// An analyzer that remembers what it was asked to analyse.
#[derive(Clone, Default)]
struct Spy {
    calls: Arc<AtomicUsize>,
    sources: Arc<Mutex<Vec<String>>>,
}

impl Spy {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_source(&self) -> Option<String> {
        self.sources.lock().last().cloned()
    }
}

impl Analyzer for Spy {
    fn analyze(
        &self, source: &str, _options: &AnalysisOptions
    ) -> Vec<Diagnostic> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().push(source.into());
        if source.is_empty() {
            Vec::new()
        }
        else {
            vec![
                Diagnostic::new(3, 10, "Missing semicolon."),
                Diagnostic::new(7, 1, "Unexpected token."),
            ]
        }
    }
}

const SPY_REPORT: &str = "3:10:Missing semicolon.\n7:1:Unexpected token.\n";

/// An analyzer that always panics.
struct Panicking;

impl Analyzer for Panicking {
    fn analyze(&self, _: &str, _: &AnalysisOptions) -> Vec<Diagnostic> {
        panic!("analysis engine failure")
    }
}

fn service(analyzer: impl Analyzer) -> LintService {
    LintService::new(analyzer, AnalysisOptions::default(), 1024, 1024)
}

/// Creates a multipart body with the given parts.
fn multipart(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut res = Vec::new();
    for (name, content) in parts {
        write!(
            res,
            "--{}\r\n\
             Content-Disposition: form-data; name=\"{}\"\r\n\
             \r\n\
             {}\r\n",
            BOUNDARY, name, content
        ).unwrap();
    }
    write!(res, "--{}--\r\n", BOUNDARY).unwrap();
    res
}

fn content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

fn post(content_type: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("Content-Type", content_type)
        .body(body)
        .unwrap()
}

/// Creates a body that arrives in chunks split at the given positions.
fn chunked(data: &[u8], splits: &[usize]) -> Body {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &end in splits.iter().chain(Some(&data.len())) {
        chunks.push(
            Ok::<_, io::Error>(Bytes::copy_from_slice(&data[start..end]))
        );
        start = end;
    }
    Body::wrap_stream(stream::iter(chunks))
}

async fn body_text(response: Response<Body>) -> String {
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}


//------------ Request-level Tests -------------------------------------------

#[tokio::test]
async fn lint_request() {
    let spy = Spy::default();
    let service = service(spy.clone());
    let response = service.handle_request(post(
        &content_type(),
        multipart(&[("source", "var a = 1\nfoo(")]).into()
    )).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["Content-Type"], "text/plain");
    assert_eq!(
        response.headers()["Content-Length"],
        SPY_REPORT.len().to_string().as_str()
    );
    assert_eq!(body_text(response).await, SPY_REPORT);
    assert_eq!(spy.calls(), 1);
    assert_eq!(spy.last_source().unwrap(), "var a = 1\nfoo(");
}

#[tokio::test]
async fn chunked_request() {
    let source = "function f(a) {\r\n  return a;\r\n}\r\n";
    let data = multipart(&[("source", source)]);
    let boundary_start = data.len() - BOUNDARY.len() - 6;
    for splits in [
        vec![1, 2, 3],
        vec![boundary_start + 3],
        vec![boundary_start - 1, boundary_start + 1, data.len() - 3],
        (1..data.len()).collect(),
    ] {
        let spy = Spy::default();
        let response = service(spy.clone()).handle_request(post(
            &content_type(), chunked(&data, &splits)
        )).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, SPY_REPORT);
        assert_eq!(spy.last_source().unwrap(), source);
    }
}

#[tokio::test]
async fn empty_source() {
    let spy = Spy::default();
    let response = service(spy.clone()).handle_request(post(
        &content_type(), multipart(&[("source", "")]).into()
    )).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["Content-Length"], "0");
    assert_eq!(body_text(response).await, "");
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let spy = Spy::default();
    let mut data = Vec::new();
    write!(
        data,
        "--{}\r\nContent-Disposition: form-data; name=\"source\"\r\n\r\n",
        BOUNDARY
    ).unwrap();
    data.extend_from_slice(b"a\xffb");
    write!(data, "\r\n--{}--\r\n", BOUNDARY).unwrap();
    let response = service(spy.clone()).handle_request(post(
        &content_type(), data.into()
    )).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(spy.last_source().unwrap(), "a\u{fffd}b");
}

#[tokio::test]
async fn rejected_requests() {
    let too_large = "x".repeat(2000);
    for (content_type, data) in [
        (content_type(), multipart(&[("notes", "hello")])),
        (content_type(), multipart(&[("source", "a"), ("source", "b")])),
        (content_type(), multipart(&[("source", "a"), ("notes", "b")])),
        (content_type(), multipart(&[])),
        (content_type(), multipart(&[("source", too_large.as_str())])),
        (content_type(), b"--nope--\r\n".to_vec()),
        ("multipart/form-data".into(), multipart(&[("source", "a")])),
        ("text/plain".into(), b"var a = 1;".to_vec()),
    ] {
        let spy = Spy::default();
        let response = service(spy.clone()).handle_request(
            post(&content_type, data.into())
        ).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["Content-Type"], "text/plain");
        assert_eq!(body_text(response).await, "");
        assert_eq!(spy.calls(), 0);
    }
}

#[tokio::test]
async fn method_not_allowed() {
    let spy = Spy::default();
    let response = service(spy.clone()).handle_request(
        Request::get("/").body(Body::empty()).unwrap()
    ).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn engine_failure() {
    let response = service(Panicking).handle_request(post(
        &content_type(), multipart(&[("source", "var a;")]).into()
    )).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["Content-Type"], "text/plain");
}

#[tokio::test]
async fn builtin_engine() {
    let response = service(TextLinter).handle_request(post(
        &content_type(),
        multipart(&[("source", "i++;\nif (a == b) {}\n")]).into()
    )).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "1:2:Unexpected '++'.\n\
         2:7:Expected '===' and instead saw '=='.\n"
    );
}


//------------ Wire-level Tests ----------------------------------------------

/// Starts a server on a local port and returns its address.
fn start_server(analyzer: impl Analyzer) -> SocketAddr {
    let listener = bind_listener(
        SocketAddr::from(([127, 0, 0, 1], 0))
    ).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, Arc::new(service(analyzer))));
    addr
}

fn request_head(len: usize, expect: bool, content_type: &str) -> String {
    format!(
        "POST / HTTP/1.1\r\n\
         Host: localhost\r\n\
         Connection: close\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         {}\
         \r\n",
        content_type, len,
        if expect { "Expect: 100-continue\r\n" } else { "" }
    )
}

async fn read_response(stream: &mut TcpStream) -> String {
    let mut res = Vec::new();
    timeout(Duration::from_secs(10), stream.read_to_end(&mut res))
        .await.unwrap().unwrap();
    String::from_utf8(res).unwrap()
}

const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

#[tokio::test]
async fn expect_continue() {
    let spy = Spy::default();
    let addr = start_server(spy.clone());
    let body = multipart(&[("source", "var a;")]);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(
        request_head(body.len(), true, &content_type()).as_bytes()
    ).await.unwrap();
    let mut interim = [0u8; CONTINUE.len()];
    timeout(Duration::from_secs(10), stream.read_exact(&mut interim))
        .await.unwrap().unwrap();
    assert_eq!(&interim[..], CONTINUE);
    assert_eq!(spy.calls(), 0);

    stream.write_all(&body).await.unwrap();
    let response = read_response(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with(SPY_REPORT));
    assert_eq!(spy.last_source().unwrap(), "var a;");
}

#[tokio::test]
async fn no_interim_response_without_expect() {
    let addr = start_server(Spy::default());
    let body = multipart(&[("source", "var a;")]);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(
        request_head(body.len(), false, &content_type()).as_bytes()
    ).await.unwrap();
    stream.write_all(&body).await.unwrap();
    let response = read_response(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(!response.contains("100 Continue"));
}

#[tokio::test]
async fn no_continue_for_invalid_request() {
    let addr = start_server(Spy::default());
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(
        request_head(10, true, "multipart/form-data").as_bytes()
    ).await.unwrap();
    let response = read_response(&mut stream).await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(!response.contains("100 Continue"));
}

#[tokio::test]
async fn truncated_body() {
    let spy = Spy::default();
    let addr = start_server(spy.clone());
    let body = multipart(&[("source", "var a;")]);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(
        request_head(body.len(), false, &content_type()).as_bytes()
    ).await.unwrap();
    stream.write_all(&body[..body.len() - 10]).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut response = Vec::new();
    let res = timeout(
        Duration::from_secs(10), stream.read_to_end(&mut response)
    ).await;
    assert!(res.is_ok());
    assert!(!response.starts_with(b"HTTP/1.1 200"));
    assert_eq!(spy.calls(), 0);
}
