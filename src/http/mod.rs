//! The HTTP server.
//!
//! The server accepts POST requests with a `multipart/form-data` body that
//! contains exactly one part named `source`. The part’s content is analysed
//! and the diagnostics are returned as a plain text report.
//!
//! Each request is handled by its own [`RequestAdapter`] that feeds the
//! body into a multipart decoder and a [`ServiceHandler`] that decides
//! what to make of the decoder’s events. Only the [`LintService`] with the
//! analysis engine and its options is shared between requests.

pub use self::handler::{Rejection, ServiceHandler};
pub use self::listener::{bind_listener, http_listener, serve};
pub use self::request::RequestAdapter;

mod handler;
mod listener;
mod request;
mod response;


//------------ LintService ---------------------------------------------------

use std::sync::Arc;
use hyper::{Body, Method, Request};
use log::{debug, error};
use tokio::task::spawn_blocking;
use crate::config::Config;
use crate::lint::{AnalysisOptions, Analyzer, format_report};
use self::response::Response;


/// Everything needed to answer a request.
pub struct LintService {
    /// The analysis engine.
    analyzer: Arc<dyn Analyzer>,

    /// The options for the analysis engine.
    options: Arc<AnalysisOptions>,

    /// The maximum size of a part’s header section.
    max_header_size: usize,

    /// The maximum size of the source part.
    max_source_size: usize,
}

impl LintService {
    /// Creates a new service.
    pub fn new(
        analyzer: impl Analyzer,
        options: AnalysisOptions,
        max_header_size: usize,
        max_source_size: usize,
    ) -> Self {
        LintService {
            analyzer: Arc::new(analyzer),
            options: Arc::new(options),
            max_header_size,
            max_source_size,
        }
    }

    /// Creates a new service using the given config.
    pub fn from_config(analyzer: impl Analyzer, config: &Config) -> Self {
        Self::new(
            analyzer, config.lint.clone(),
            config.max_header_size, config.max_source_size
        )
    }

    /// Returns the options handed to the analysis engine.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Produces the response for a request.
    pub async fn handle_request(
        &self, req: Request<Body>
    ) -> hyper::Response<Body> {
        if *req.method() != Method::POST {
            return Response::method_not_allowed().into_hyper()
        }
        let (parts, body) = req.into_parts();

        let adapter = match RequestAdapter::from_headers(
            &parts.headers, self.max_header_size
        ) {
            Ok(adapter) => adapter,
            Err(err) => {
                debug!("Rejecting request: {}.", err);
                return Response::bad_request().into_hyper()
            }
        };
        let mut handler = ServiceHandler::new(self.max_source_size);
        adapter.drive(body, &mut handler).await;
        let part = match handler.finish() {
            Ok(part) => part,
            Err(err) => {
                debug!("Rejecting request: {}.", err);
                return Response::bad_request().into_hyper()
            }
        };

        let source = String::from_utf8_lossy(&part.into_body()).into_owned();
        let analyzer = self.analyzer.clone();
        let options = self.options.clone();
        let report = spawn_blocking(move || {
            format_report(&analyzer.analyze(&source, &options))
        }).await;
        match report {
            Ok(report) => Response::report(report).into_hyper(),
            Err(err) => {
                error!("Analysis failed: {}", err);
                Response::internal_server_error().into_hyper()
            }
        }
    }
}
