//! Building responses.

use hyper::{Body, StatusCode};
use hyper::http::response::Builder;


//------------ Response ------------------------------------------------------

pub struct Response(hyper::Response<Body>);

impl Response {
    /// Returns a successful response carrying the lint report.
    pub fn report(report: String) -> Self {
        ResponseBuilder::ok()
            .content_type(ContentType::TEXT)
            .content_length(report.len())
            .body(report)
    }

    /// Returns a Bad Request response.
    pub fn bad_request() -> Self {
        Self::error(StatusCode::BAD_REQUEST)
    }

    /// Returns a Method Not Allowed response.
    pub fn method_not_allowed() -> Self {
        Self::error(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// Returns an Internal Server Error response.
    pub fn internal_server_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Creates an error response.
    ///
    /// Error responses have a plain text content type and an empty body.
    pub fn error(status: StatusCode) -> Self {
        ResponseBuilder::new(status).content_type(ContentType::TEXT).empty()
    }

    /// Converts the response into a hyper response.
    pub fn into_hyper(self) -> hyper::Response<Body> {
        self.0
    }
}


//------------ ResponseBuilder ----------------------------------------------

#[derive(Debug)]
pub struct ResponseBuilder {
    builder: Builder,
}

impl ResponseBuilder {
    /// Creates a new builder with the given status.
    pub fn new(status: StatusCode) -> Self {
        ResponseBuilder {
            builder: Builder::new().status(status)
        }
    }

    /// Creates a new builder for a 200 OK response.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Adds the content type header.
    pub fn content_type(self, content_type: ContentType) -> Self {
        ResponseBuilder {
            builder: self.builder.header("Content-Type", content_type.0)
        }
    }

    /// Adds the content length header.
    pub fn content_length(self, len: usize) -> Self {
        ResponseBuilder {
            builder: self.builder.header("Content-Length", len)
        }
    }

    fn finalize(self, body: Body) -> Response {
        Response(
            self.builder.body(body).expect("broken HTTP response builder")
        )
    }

    /// Finalizes the response by adding a body.
    pub fn body(self, body: impl Into<Body>) -> Response {
        self.finalize(body.into())
    }

    /// Finalizes the response by adding an empty body.
    pub fn empty(self) -> Response {
        self.finalize(Body::empty())
    }
}


//------------ ContentType ---------------------------------------------------

#[derive(Clone, Debug)]
pub struct ContentType(&'static [u8]);

impl ContentType {
    pub const TEXT: ContentType = ContentType(b"text/plain");
}


//============ Tests =========================================================
