//! The multipart state machine.

use std::str;
use hyper::header::{
    CONTENT_DISPOSITION, HeaderMap, HeaderName, HeaderValue
};
use super::{Boundary, DecodeError, Event, Part};
use super::buffer::ChunkBuffer;
use super::scanner::{BoundaryScanner, Scan};


//------------ DecoderState --------------------------------------------------

/// The state of a [`MultipartDecoder`].
///
/// States only ever move forward: from awaiting the first boundary to
/// reading the headers of a part, its body, and then either the headers
/// of the next part or the terminated state. The errored state can be
/// reached from every state other than terminated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecoderState {
    /// Skipping the preamble before the first boundary.
    AwaitingBoundary,

    /// Reading the header section of a part.
    ReadingHeaders,

    /// Reading the body of a part.
    ReadingBody,

    /// The final boundary has been seen.
    Terminated,

    /// The body was malformed.
    Errored,
}


//------------ MultipartDecoder ----------------------------------------------

/// An incremental decoder for a `multipart/form-data` body.
///
/// Feed body chunks in order via [`feed`] and call [`finish`] once the
/// transport reports the end of the body. Both return the events that have
/// become available. Body data is handed out as soon as it is clear that
/// it cannot be part of a boundary.
///
/// [`feed`]: #method.feed
/// [`finish`]: #method.finish
#[derive(Debug)]
pub struct MultipartDecoder {
    scanner: BoundaryScanner,

    /// Data received but not yet processed.
    ///
    /// This starts out with a CRLF so that a boundary at the very start of
    /// the body is found by the same delimiter search as all others.
    buffer: ChunkBuffer,

    state: DecoderState,

    /// The maximum size of a part’s header section in bytes.
    max_header_size: usize,
}

impl MultipartDecoder {
    /// Creates a new decoder for the given boundary.
    pub fn new(boundary: &Boundary, max_header_size: usize) -> Self {
        MultipartDecoder {
            scanner: BoundaryScanner::new(boundary),
            buffer: ChunkBuffer::with_prefix(b"\r\n"),
            state: DecoderState::AwaitingBoundary,
            max_header_size,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Returns whether the decoder has reached a final state.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state, DecoderState::Terminated | DecoderState::Errored
        )
    }

    /// Processes the next chunk of the body.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_finished() {
            return events
        }
        self.buffer.extend(chunk);
        if let Err(err) = self.run(false, &mut events) {
            self.fail(err, &mut events)
        }
        events
    }

    /// Processes the end of the body.
    ///
    /// If the final boundary hasn’t been seen by now, the body is
    /// truncated and an error event is produced.
    pub fn finish(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_finished() {
            return events
        }
        match self.run(true, &mut events) {
            Ok(()) => {
                if !self.is_finished() {
                    self.fail(DecodeError::Truncated, &mut events)
                }
            }
            Err(err) => self.fail(err, &mut events)
        }
        events
    }

    /// Processes buffered data for as long as there is progress.
    fn run(
        &mut self, eof: bool, events: &mut Vec<Event>
    ) -> Result<(), DecodeError> {
        loop {
            let progress = match self.state {
                DecoderState::AwaitingBoundary => {
                    self.skip_preamble(eof, events)
                }
                DecoderState::ReadingHeaders => self.read_headers(events)?,
                DecoderState::ReadingBody => self.read_body(eof, events),
                DecoderState::Terminated | DecoderState::Errored => false,
            };
            if !progress {
                return Ok(())
            }
        }
    }

    fn skip_preamble(&mut self, eof: bool, events: &mut Vec<Event>) -> bool {
        match self.scanner.scan(self.buffer.as_slice(), eof) {
            Scan::Found { end, terminal, .. } => {
                self.buffer.advance(end);
                self.boundary_line(terminal, events);
                true
            }
            Scan::NeedMoreData { from } => {
                self.buffer.advance(from);
                false
            }
            Scan::NotFound => {
                self.buffer.clear();
                false
            }
        }
    }

    fn read_headers(
        &mut self, events: &mut Vec<Event>
    ) -> Result<bool, DecodeError> {
        let (section_len, consumed) = if self.buffer.starts_with(b"\r\n") {
            (0, 2)
        }
        else {
            match self.buffer.find(b"\r\n\r\n", self.max_header_size + 4) {
                Some(pos) => (pos, pos + 4),
                None => {
                    if self.buffer.len() >= self.max_header_size + 4 {
                        return Err(DecodeError::HeaderTooLarge)
                    }
                    return Ok(false)
                }
            }
        };
        let part = parse_part_headers(
            &self.buffer.as_slice()[..section_len]
        )?;
        self.buffer.advance(consumed);
        self.state = DecoderState::ReadingBody;
        events.push(Event::PartBegin(part));
        Ok(true)
    }

    fn read_body(&mut self, eof: bool, events: &mut Vec<Event>) -> bool {
        match self.scanner.scan(self.buffer.as_slice(), eof) {
            Scan::Found { start, end, terminal } => {
                self.emit_data(start, events);
                self.buffer.advance(end - start);
                events.push(Event::PartEnd);
                self.boundary_line(terminal, events);
                true
            }
            Scan::NeedMoreData { from } => {
                self.emit_data(from, events);
                false
            }
            Scan::NotFound => {
                self.emit_data(self.buffer.len(), events);
                false
            }
        }
    }

    /// Hands out the first `len` bytes of the buffer as body data.
    fn emit_data(&mut self, len: usize, events: &mut Vec<Event>) {
        if len > 0 {
            events.push(Event::Data(self.buffer.split_to(len)))
        }
    }

    /// Moves on after a boundary line has been consumed.
    fn boundary_line(&mut self, terminal: bool, events: &mut Vec<Event>) {
        if terminal {
            self.state = DecoderState::Terminated;
            self.buffer.clear();
            events.push(Event::End);
        }
        else {
            self.state = DecoderState::ReadingHeaders;
        }
    }

    fn fail(&mut self, err: DecodeError, events: &mut Vec<Event>) {
        self.state = DecoderState::Errored;
        self.buffer.clear();
        events.push(Event::Error(err));
    }
}


//------------ Header Parsing ------------------------------------------------

/// Parses the header section of a part into a new part.
///
/// The section must not contain the terminating empty line.
fn parse_part_headers(section: &[u8]) -> Result<Part, DecodeError> {
    let mut headers = HeaderMap::new();
    if !section.is_empty() {
        for line in section.split(|&ch| ch == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let colon = line.iter().position(|&ch| ch == b':').ok_or(
                DecodeError::MalformedHeader
            )?;
            let name = HeaderName::from_bytes(&line[..colon]).map_err(|_| {
                DecodeError::MalformedHeader
            })?;
            let value = HeaderValue::from_bytes(
                trim_whitespace(&line[colon + 1..])
            ).map_err(|_| DecodeError::MalformedHeader)?;
            headers.append(name, value);
        }
    }
    let name = headers.get(CONTENT_DISPOSITION).and_then(|value| {
        str::from_utf8(value.as_bytes()).ok()
    }).and_then(disposition_name).ok_or(DecodeError::UnnamedPart)?;
    Ok(Part::new(name, headers))
}

/// Strips leading and trailing spaces and tabs.
fn trim_whitespace(mut value: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = value {
        value = rest
    }
    while let [rest @ .., b' ' | b'\t'] = value {
        value = rest
    }
    value
}

/// Returns the `name` parameter of a Content-Disposition header value.
///
/// Parameter values can be tokens or quoted strings with backslash
/// escapes. The disposition type itself is not checked.
fn disposition_name(value: &str) -> Option<String> {
    let mut rest = value.split_once(';')?.1;
    loop {
        let (key, tail) = rest.split_once('=')?;
        let key = key.trim();
        let tail = tail.trim_start();
        let (param, tail) = if let Some(quoted) = tail.strip_prefix('"') {
            let mut param = String::new();
            let mut chars = quoted.char_indices();
            let end = loop {
                match chars.next()? {
                    (_, '\\') => param.push(chars.next()?.1),
                    (idx, '"') => break idx + 1,
                    (_, ch) => param.push(ch),
                }
            };
            let tail = &quoted[end..];
            match tail.trim_start().strip_prefix(';') {
                Some(tail) => (param, Some(tail)),
                None if tail.trim().is_empty() => (param, None),
                None => return None,
            }
        }
        else {
            match tail.split_once(';') {
                Some((param, tail)) => (param.trim().into(), Some(tail)),
                None => (tail.trim().into(), None),
            }
        };
        if key.eq_ignore_ascii_case("name") {
            return Some(param)
        }
        rest = tail?;
    }
}


//============ Tests =========================================================
