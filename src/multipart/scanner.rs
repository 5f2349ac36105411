//! Finding boundaries in buffered body data.

use super::Boundary;


//------------ Scan ----------------------------------------------------------

/// The outcome of scanning a buffer for the next boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scan {
    /// A complete boundary line was found.
    ///
    /// `start` is the index of the CRLF preceding the dashes, i.e., all
    /// bytes before `start` belong to the current part. `end` is the index
    /// of the first byte after the boundary line.
    Found {
        start: usize,
        end: usize,
        terminal: bool,
    },

    /// There is no boundary and no boundary can start within the data.
    NotFound,

    /// There may be a boundary starting at `from` but the data ends too
    /// early to say for sure.
    ///
    /// All bytes before `from` are free of boundaries.
    NeedMoreData {
        from: usize,
    },
}


//------------ BoundaryScanner -----------------------------------------------

/// Locates delimiter lines for a given boundary token.
///
/// A delimiter is the boundary token prefixed with CRLF and two dashes. It
/// needs to be followed by either CRLF or, for the close delimiter ending
/// the body, two more dashes and then CRLF or the end of the input.
///
/// The scanner itself is stateless. Resuming a scan after more data has
/// arrived is done by scanning the buffer again starting no later than at
/// the `from` position of the last [`Scan::NeedMoreData`].
#[derive(Clone, Debug)]
pub struct BoundaryScanner {
    delimiter: Vec<u8>,
}

impl BoundaryScanner {
    /// Creates a scanner for the given boundary token.
    pub fn new(boundary: &Boundary) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 4);
        delimiter.extend_from_slice(b"\r\n--");
        delimiter.extend_from_slice(boundary.as_bytes());
        BoundaryScanner { delimiter }
    }

    /// Returns the length of the delimiter including the leading CRLF.
    pub fn delimiter_len(&self) -> usize {
        self.delimiter.len()
    }

    /// Scans `data` for the first delimiter line.
    ///
    /// If `eof` is `true`, no more data will follow and incomplete
    /// candidates are treated as mismatches.
    pub fn scan(&self, data: &[u8], eof: bool) -> Scan {
        let mut pos = 0;
        while let Some(offset) = data[pos..].iter().position(|&ch| ch == b'\r') {
            let start = pos + offset;
            match self.match_at(data, start, eof) {
                Candidate::Match { end, terminal } => {
                    return Scan::Found { start, end, terminal }
                }
                Candidate::Partial => return Scan::NeedMoreData { from: start },
                Candidate::Mismatch => pos = start + 1,
            }
        }
        Scan::NotFound
    }

    /// Checks whether a delimiter line starts at `start`.
    fn match_at(&self, data: &[u8], start: usize, eof: bool) -> Candidate {
        let rest = &data[start..];
        if rest.len() < self.delimiter.len() {
            if !eof && self.delimiter.starts_with(rest) {
                return Candidate::Partial
            }
            return Candidate::Mismatch
        }
        if !rest.starts_with(&self.delimiter) {
            return Candidate::Mismatch
        }

        let end = start + self.delimiter.len();
        match &data[end..] {
            [b'\r', b'\n', ..] => {
                Candidate::Match { end: end + 2, terminal: false }
            }
            [b'-', b'-', b'\r', b'\n', ..] => {
                Candidate::Match { end: end + 4, terminal: true }
            }
            [b'-', b'-'] | [b'-', b'-', b'\r'] if eof => {
                Candidate::Match { end: data.len(), terminal: true }
            }
            _ if eof => Candidate::Mismatch,
            [] | [b'\r'] | [b'-'] | [b'-', b'-'] | [b'-', b'-', b'\r'] => {
                Candidate::Partial
            }
            _ => Candidate::Mismatch,
        }
    }
}


//------------ Candidate -----------------------------------------------------

/// The result of checking a single position.
enum Candidate {
    Match { end: usize, terminal: bool },
    Partial,
    Mismatch,
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn scanner() -> BoundaryScanner {
        BoundaryScanner::new(&Boundary::from_token("xyz").unwrap())
    }

    #[test]
    fn found() {
        let scanner = scanner();
        assert_eq!(
            scanner.scan(b"abc\r\n--xyz\r\nContent", false),
            Scan::Found { start: 3, end: 12, terminal: false }
        );
        assert_eq!(
            scanner.scan(b"abc\r\n--xyz--\r\nepilogue", false),
            Scan::Found { start: 3, end: 14, terminal: true }
        );
        assert_eq!(
            scanner.scan(b"\r\n--xyz--", true),
            Scan::Found { start: 0, end: 9, terminal: true }
        );
    }

    #[test]
    fn not_found() {
        let scanner = scanner();
        assert_eq!(scanner.scan(b"", false), Scan::NotFound);
        assert_eq!(scanner.scan(b"plain text", false), Scan::NotFound);
        assert_eq!(scanner.scan(b"a\r\nb\r\n--xy b", false), Scan::NotFound);
        assert_eq!(scanner.scan(b"a\r\n--xyzzy more", false), Scan::NotFound);
        assert_eq!(scanner.scan(b"a\r\n--xyz-x more", false), Scan::NotFound);
    }

    #[test]
    fn need_more_data() {
        let scanner = scanner();
        assert_eq!(
            scanner.scan(b"abc\r", false), Scan::NeedMoreData { from: 3 }
        );
        assert_eq!(
            scanner.scan(b"abc\r\n--x", false), Scan::NeedMoreData { from: 3 }
        );
        assert_eq!(
            scanner.scan(b"abc\r\n--xyz", false), Scan::NeedMoreData { from: 3 }
        );
        assert_eq!(
            scanner.scan(b"abc\r\n--xyz--\r", false),
            Scan::NeedMoreData { from: 3 }
        );
        assert_eq!(scanner.scan(b"abc\r\n--x", true), Scan::NotFound);
        assert_eq!(scanner.scan(b"abc\r\n--xyz", true), Scan::NotFound);
    }

    #[test]
    fn resumes_consistently() {
        let scanner = scanner();
        let data = b"body\r\n--xy\r\nmore\r\n--xyz\r\nnext";
        let expected = scanner.scan(data, false);
        assert_eq!(expected, Scan::Found { start: 16, end: 25, terminal: false });

        for split in 0..data.len() {
            match scanner.scan(&data[..split], false) {
                Scan::NotFound => {
                    // Nothing in the prefix may hold the boundary.
                    assert!(split <= 16);
                }
                Scan::NeedMoreData { from } => {
                    assert!(from <= 16);
                    let res = scanner.scan(&data[from..], false);
                    assert_eq!(
                        res,
                        Scan::Found {
                            start: 16 - from, end: 25 - from, terminal: false
                        }
                    );
                }
                found => {
                    assert!(split >= 25);
                    assert_eq!(found, expected);
                }
            }
        }
    }
}
