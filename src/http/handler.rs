//! Deciding on the outcome of a request.

use std::{error, fmt, mem};
use crate::multipart::{DecodeError, Event, Part};


//------------ ServiceHandler ------------------------------------------------

/// Consumes the decoder events of a single request.
///
/// The handler expects exactly one part named `source` and collects its
/// body. Anything else leads to the request being rejected. Once the
/// handler has decided, either way, further events are ignored.
#[derive(Debug)]
pub struct ServiceHandler {
    /// The maximum size of the source part’s body.
    max_source_size: usize,

    state: HandlerState,
}

#[derive(Debug)]
enum HandlerState {
    /// No part has started yet.
    Waiting,

    /// Collecting the body of the source part.
    Reading(Part),

    /// The source part is complete, waiting for the end of the body.
    Read(Part),

    /// The request has been accepted.
    Complete(Part),

    /// The request has been rejected.
    Rejected(Rejection),
}

impl ServiceHandler {
    pub fn new(max_source_size: usize) -> Self {
        ServiceHandler {
            max_source_size,
            state: HandlerState::Waiting,
        }
    }

    /// Returns whether the outcome of the request has been decided.
    pub fn is_decided(&self) -> bool {
        matches!(
            self.state,
            HandlerState::Complete(_) | HandlerState::Rejected(_)
        )
    }

    /// Processes the next event.
    pub fn process(&mut self, event: Event) {
        let state = mem::replace(&mut self.state, HandlerState::Waiting);
        self.state = match (state, event) {
            (state @ HandlerState::Complete(_), _)
            | (state @ HandlerState::Rejected(_), _) => state,
            (_, Event::Error(err)) => {
                HandlerState::Rejected(Rejection::Decode(err))
            }
            (HandlerState::Waiting, Event::PartBegin(part)) => {
                if part.name() == "source" {
                    HandlerState::Reading(part)
                }
                else {
                    HandlerState::Rejected(
                        Rejection::UnexpectedPart(part.name().into())
                    )
                }
            }
            (HandlerState::Waiting, Event::End) => {
                HandlerState::Rejected(Rejection::MissingSource)
            }
            (HandlerState::Reading(mut part), Event::Data(data)) => {
                if part.len() + data.len() > self.max_source_size {
                    HandlerState::Rejected(Rejection::SourceTooLarge)
                }
                else {
                    part.push(data);
                    HandlerState::Reading(part)
                }
            }
            (HandlerState::Reading(part), Event::PartEnd) => {
                HandlerState::Read(part)
            }
            (HandlerState::Read(_), Event::PartBegin(part)) => {
                HandlerState::Rejected(
                    if part.name() == "source" {
                        Rejection::DuplicateSource
                    }
                    else {
                        Rejection::UnexpectedPart(part.name().into())
                    }
                )
            }
            (HandlerState::Read(part), Event::End) => {
                HandlerState::Complete(part)
            }
            // The decoder never emits events out of order.
            (state, _) => state,
        }
    }

    /// Returns the outcome of the request.
    ///
    /// If the handler hasn’t decided yet, the body ended prematurely.
    pub fn finish(self) -> Result<Part, Rejection> {
        match self.state {
            HandlerState::Complete(part) => Ok(part),
            HandlerState::Rejected(rejection) => Err(rejection),
            _ => Err(Rejection::Decode(DecodeError::Truncated))
        }
    }
}


//------------ Rejection -----------------------------------------------------

/// The reason a request was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    /// A part with a name other than `source`.
    UnexpectedPart(String),

    /// More than one part named `source`.
    DuplicateSource,

    /// The body had no parts.
    MissingSource,

    /// The source part exceeds the size limit.
    SourceTooLarge,

    /// The multipart body was broken.
    Decode(DecodeError),
}

impl From<DecodeError> for Rejection {
    fn from(err: DecodeError) -> Self {
        Rejection::Decode(err)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rejection::UnexpectedPart(ref name) => {
                write!(f, "unexpected part '{}'", name)
            }
            Rejection::DuplicateSource => f.write_str("duplicate source part"),
            Rejection::MissingSource => f.write_str("missing source part"),
            Rejection::SourceTooLarge => f.write_str("source part too large"),
            Rejection::Decode(err) => err.fmt(f),
        }
    }
}

impl error::Error for Rejection { }


//============ Tests =========================================================
