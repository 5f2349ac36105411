//! Feeding a request body into the multipart decoder.

use std::fmt;
use bytes::Bytes;
use futures::pin_mut;
use futures::stream::{Stream, StreamExt};
use hyper::header::{CONTENT_TYPE, EXPECT, HeaderMap};
use log::debug;
use crate::multipart::{Boundary, DecodeError, MultipartDecoder};
use super::handler::ServiceHandler;


//------------ RequestAdapter ------------------------------------------------

/// Connects the body of a request with a decoder and a handler.
///
/// The adapter is created from the request headers alone. Only if these
/// describe a usable multipart body will the body be read at all. Since
/// hyper sends the interim `100 Continue` response when the body is first
/// polled, a request that fails here never gets one.
#[derive(Debug)]
pub struct RequestAdapter {
    decoder: MultipartDecoder,

    /// Did the client ask for `100 Continue`?
    expects_continue: bool,
}

impl RequestAdapter {
    /// Creates an adapter from the request headers.
    pub fn from_headers(
        headers: &HeaderMap, max_header_size: usize
    ) -> Result<Self, DecodeError> {
        let content_type = headers.get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or(DecodeError::NotMultipart)?;
        let boundary = Boundary::from_content_type(content_type)?;
        Ok(RequestAdapter {
            decoder: MultipartDecoder::new(&boundary, max_header_size),
            expects_continue: expects_continue(headers),
        })
    }

    pub fn expects_continue(&self) -> bool {
        self.expects_continue
    }

    /// Reads the body and hands all decoder events to the handler.
    ///
    /// Chunks are fed to the decoder in order. When the body ends or
    /// fails, the decoder is finished. Reading stops as soon as the decoder
    /// or the handler are done, so the rest of the body may stay unread.
    pub async fn drive<S, E>(mut self, body: S, handler: &mut ServiceHandler)
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: fmt::Display,
    {
        pin_mut!(body);
        if self.expects_continue {
            debug!("Reading request body after 100 Continue.");
        }
        while !self.decoder.is_finished() && !handler.is_decided() {
            let events = match body.next().await {
                Some(Ok(chunk)) => self.decoder.feed(&chunk),
                Some(Err(err)) => {
                    debug!("Failed to read request body: {}", err);
                    self.decoder.finish()
                }
                None => self.decoder.finish(),
            };
            for event in events {
                handler.process(event)
            }
        }
    }
}


//------------ Helpers -------------------------------------------------------

/// Returns whether the headers contain `Expect: 100-continue`.
fn expects_continue(headers: &HeaderMap) -> bool {
    headers.get_all(EXPECT).iter().any(|value| {
        value.as_bytes().eq_ignore_ascii_case(b"100-continue")
    })
}


//============ Tests =========================================================
