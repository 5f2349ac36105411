//! Incremental decoding of `multipart/form-data` bodies.
//!
//! The decoder in this module never sees the whole request body at once.
//! Instead, body chunks are fed into a [`MultipartDecoder`] as they arrive
//! and the decoder produces a sequence of [`Event`]s describing the parts
//! of the body. Only a small tail of the data that may still turn out to be
//! the start of a boundary is kept between chunks.
//!
//! The boundary token is taken from the request’s Content-Type header via
//! [`Boundary::from_content_type`].

pub use self::buffer::ChunkBuffer;
pub use self::decoder::{DecoderState, MultipartDecoder};
pub use self::scanner::{BoundaryScanner, Scan};

mod buffer;
mod decoder;
mod scanner;

use std::{error, fmt};
use bytes::Bytes;
use hyper::header::HeaderMap;


//------------ Constants -----------------------------------------------------

/// The maximum length of a boundary token as given in RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// The media type we accept.
const FORM_DATA: &str = "multipart/form-data";


//------------ Boundary ------------------------------------------------------

/// The boundary token separating the parts of a multipart body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Boundary(String);

impl Boundary {
    /// Extracts the boundary from the value of a Content-Type header.
    ///
    /// The media type must be `multipart/form-data` and the `boundary`
    /// parameter needs to be present and valid.
    pub fn from_content_type(value: &str) -> Result<Self, DecodeError> {
        let mut params = value.split(';');
        let media_type = params.next().unwrap_or("").trim();
        if !media_type.eq_ignore_ascii_case(FORM_DATA) {
            return Err(DecodeError::NotMultipart)
        }
        for param in params {
            let Some((key, value)) = param.split_once('=') else {
                continue
            };
            if key.trim().eq_ignore_ascii_case("boundary") {
                return Self::from_token(unquote(value.trim()))
            }
        }
        Err(DecodeError::NoBoundary)
    }

    /// Creates a boundary from the bare token.
    ///
    /// The token must be between 1 and 70 characters long, consist of the
    /// characters allowed by RFC 2046, and must not end in a space.
    pub fn from_token(token: &str) -> Result<Self, DecodeError> {
        if token.is_empty()
            || token.len() > MAX_BOUNDARY_LEN
            || token.ends_with(' ')
            || !token.bytes().all(is_bchar)
        {
            return Err(DecodeError::NoBoundary)
        }
        Ok(Boundary(token.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns whether `ch` is allowed in a boundary token.
fn is_bchar(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || b"'()+_,-./:=? ".contains(&ch)
}

/// Removes surrounding double quotes from a parameter value.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    }
    else {
        value
    }
}


//------------ Part ----------------------------------------------------------

/// A single part of a multipart body.
///
/// The decoder creates the part once its header section has been read.
/// Its body is collected by whoever consumes the decoder’s events.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part {
    /// The field name from the Content-Disposition header.
    name: String,

    /// All headers of the part.
    headers: HeaderMap,

    /// The body data received so far in order of arrival.
    body_chunks: Vec<Bytes>,

    /// The combined length of all body chunks.
    len: usize,
}

impl Part {
    pub fn new(name: String, headers: HeaderMap) -> Self {
        Part { name, headers, body_chunks: Vec::new(), len: 0 }
    }

    /// Returns the field name of the part.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_chunks(&self) -> &[Bytes] {
        &self.body_chunks
    }

    /// Returns the length of the body received so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a chunk of body data.
    pub fn push(&mut self, chunk: Bytes) {
        self.len += chunk.len();
        self.body_chunks.push(chunk)
    }

    /// Converts the part into its complete body.
    pub fn into_body(self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.len);
        for chunk in self.body_chunks {
            res.extend_from_slice(&chunk)
        }
        res
    }
}


//------------ Event ---------------------------------------------------------

/// Something that happened while decoding a multipart body.
///
/// For each part, the decoder emits a `PartBegin`, any number of `Data`,
/// and a `PartEnd` event, in that order. After the last part, `End` is
/// emitted. If the body is broken, `Error` is emitted instead and nothing
/// else follows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A new part starts.
    ///
    /// The part contains the name and headers but no body data yet.
    PartBegin(Part),

    /// Body data for the current part.
    Data(Bytes),

    /// The current part is complete.
    PartEnd,

    /// The final boundary has been found.
    End,

    /// The body is malformed.
    Error(DecodeError),
}


//------------ DecodeError ---------------------------------------------------

/// A multipart body could not be decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The request is not of type `multipart/form-data`.
    NotMultipart,

    /// The Content-Type lacks a valid boundary parameter.
    NoBoundary,

    /// A part has no name in its Content-Disposition header.
    UnnamedPart,

    /// A part header line is broken.
    MalformedHeader,

    /// The header section of a part exceeds the size limit.
    HeaderTooLarge,

    /// The body ended before the final boundary.
    Truncated,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            DecodeError::NotMultipart => {
                "not a multipart/form-data request"
            }
            DecodeError::NoBoundary => "no boundary",
            DecodeError::UnnamedPart => "unnamed part",
            DecodeError::MalformedHeader => "malformed part header",
            DecodeError::HeaderTooLarge => "part header section too large",
            DecodeError::Truncated => "truncated multipart body",
        })
    }
}

impl error::Error for DecodeError { }


//============ Tests =========================================================
