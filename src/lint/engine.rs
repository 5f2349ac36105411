//! A simple line-based analysis engine.

use super::{AnalysisOptions, Analyzer, Diagnostic};


//------------ TextLinter ----------------------------------------------------

/// An analysis engine checking JavaScript-like source line by line.
///
/// The engine doesn’t parse the source. It only knows enough about string
/// literals and comments to skip them and checks the remaining code for a
/// handful of problems:
///
/// * with the `white` option, tabs and odd indentation as well as
///   trailing white space,
/// * lines longer than `maxlen`,
/// * `++` and `--` with the `plusplus` option,
/// * `==` and `!=` with the `eqeqeq` option, and
/// * the bitwise operators `&`, `|`, `^`, and `~` with `bitwise`.
///
/// Once `maxerr` problems have been found, a final “Too many errors.” is
/// added and the analysis stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextLinter;

impl Analyzer for TextLinter {
    fn analyze(
        &self, source: &str, options: &AnalysisOptions
    ) -> Vec<Diagnostic> {
        let mut report = Report::new(options.maxerr);
        let mut masker = Masker::default();
        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let in_code = masker.context == Context::Code;
            let code = masker.mask(line);
            let mut found = Vec::new();
            if options.white {
                if in_code {
                    check_indent(line, line_no, options.indent, &mut found);
                }
                check_trailing(line, line_no, &mut found);
            }
            if let Some(maxlen) = options.maxlen {
                if code.len() > maxlen {
                    found.push(
                        Diagnostic::new(line_no, maxlen + 1, "Line too long.")
                    );
                }
            }
            check_operators(&code, line_no, options, &mut found);
            found.sort_by_key(|item| item.character);
            for item in found {
                if !report.add(item) {
                    return report.diagnostics
                }
            }
        }
        report.diagnostics
    }
}


//------------ Checks --------------------------------------------------------

fn check_indent(
    line: &str, line_no: usize, indent: usize, found: &mut Vec<Diagnostic>
) {
    let mut spaces = 0;
    for (idx, ch) in line.chars().enumerate() {
        match ch {
            ' ' => spaces += 1,
            '\t' => {
                found.push(Diagnostic::new(line_no, idx + 1, "Unexpected tab."));
                return
            }
            _ => {
                if indent > 0 && spaces % indent != 0 {
                    found.push(Diagnostic::new(
                        line_no, spaces + 1,
                        format!(
                            "Expected indentation to be a multiple of {} \
                             but found {}.",
                            indent, spaces
                        )
                    ));
                }
                return
            }
        }
    }
}

fn check_trailing(line: &str, line_no: usize, found: &mut Vec<Diagnostic>) {
    let trimmed = line.trim_end();
    if trimmed.len() != line.len() {
        found.push(Diagnostic::new(
            line_no, trimmed.chars().count() + 1, "Unexpected trailing space."
        ));
    }
}

fn check_operators(
    code: &[char],
    line_no: usize,
    options: &AnalysisOptions,
    found: &mut Vec<Diagnostic>
) {
    let mut idx = 0;
    while idx < code.len() {
        let ch = code[idx];
        let next = code.get(idx + 1).copied();
        let (len, reason) = match ch {
            '+' | '-' if next == Some(ch) => {
                (2, options.plusplus.then(|| {
                    format!("Unexpected '{}{}'.", ch, ch)
                }))
            }
            '=' | '!' if next == Some('=') => {
                if code.get(idx + 2) == Some(&'=') {
                    (3, None)
                }
                else {
                    (2, options.eqeqeq.then(|| {
                        format!(
                            "Expected '{}==' and instead saw '{}='.", ch, ch
                        )
                    }))
                }
            }
            '&' | '|' if next == Some(ch) => (2, None),
            '&' | '|' | '^' | '~' => {
                (1, options.bitwise.then(|| format!("Unexpected '{}'.", ch)))
            }
            _ => (1, None)
        };
        if let Some(reason) = reason {
            found.push(Diagnostic::new(line_no, idx + 1, reason));
        }
        idx += len;
    }
}


//------------ Report --------------------------------------------------------

/// The list of diagnostics limited to a maximum number of entries.
struct Report {
    diagnostics: Vec<Diagnostic>,
    maxerr: usize,
}

impl Report {
    fn new(maxerr: usize) -> Self {
        Report { diagnostics: Vec::new(), maxerr }
    }

    /// Adds a diagnostic.
    ///
    /// Returns `false` if the report was already full in which case the
    /// final entry has been added instead.
    fn add(&mut self, item: Diagnostic) -> bool {
        if self.diagnostics.len() >= self.maxerr {
            self.diagnostics.push(Diagnostic::new(
                item.line, item.character, "Too many errors."
            ));
            return false
        }
        self.diagnostics.push(item);
        true
    }
}


//------------ Masker --------------------------------------------------------

/// What kind of text continues from the previous line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Context {
    #[default]
    Code,
    BlockComment,
    Template,
}

/// Replaces comments and literals with spaces.
#[derive(Debug, Default)]
struct Masker {
    context: Context,
}

impl Masker {
    /// Returns the characters of the line with everything but code blanked.
    ///
    /// The result has one entry per character of `line`.
    fn mask(&mut self, line: &str) -> Vec<char> {
        let chars: Vec<char> = line.chars().collect();
        let mut res = Vec::with_capacity(chars.len());
        let mut quote = None;
        let mut idx = 0;
        while idx < chars.len() {
            let ch = chars[idx];
            let next = chars.get(idx + 1).copied();
            let mut len = 1;
            match (self.context, quote) {
                (Context::BlockComment, _) => {
                    if ch == '*' && next == Some('/') {
                        self.context = Context::Code;
                        len = 2;
                    }
                }
                (Context::Template, _) | (Context::Code, Some(_))
                    if ch == '\\' =>
                {
                    len = 2;
                }
                (Context::Template, _) => {
                    if ch == '`' {
                        self.context = Context::Code
                    }
                }
                (Context::Code, Some(q)) => {
                    if ch == q {
                        quote = None
                    }
                }
                (Context::Code, None) => match (ch, next) {
                    ('/', Some('/')) => break,
                    ('/', Some('*')) => {
                        self.context = Context::BlockComment;
                        len = 2;
                    }
                    ('\'' | '"', _) => quote = Some(ch),
                    ('`', _) => self.context = Context::Template,
                    _ => {
                        res.push(ch);
                        idx += 1;
                        continue
                    }
                }
            }
            let len = len.min(chars.len() - idx);
            res.extend(std::iter::repeat(' ').take(len));
            idx += len;
        }
        res.resize(chars.len(), ' ');
        res
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::lint::format_report;

    fn lint(source: &str) -> String {
        format_report(
            &TextLinter.analyze(source, &AnalysisOptions::default())
        )
    }

    #[test]
    fn clean_source() {
        assert_eq!(lint(""), "");
        assert_eq!(
            lint("var a = 1;\nif (a === 1) {\n  a += 1;\n}\n"),
            ""
        );
    }

    #[test]
    fn operators() {
        assert_eq!(lint("i++;"), "1:2:Unexpected '++'.\n");
        assert_eq!(
            lint("if (a == b && c != d) {}"),
            "1:7:Expected '===' and instead saw '=='.\n\
             1:17:Expected '!==' and instead saw '!='.\n"
        );
        assert_eq!(
            lint("x = a & b | c || d;"),
            "1:7:Unexpected '&'.\n1:11:Unexpected '|'.\n"
        );
        assert_eq!(lint("f = (a) => a <= b;"), "");
    }

    #[test]
    fn strings_and_comments() {
        assert_eq!(lint("var s = \"a == b\"; // i++"), "");
        assert_eq!(lint("var s = 'it\\'s ++';"), "");
        assert_eq!(
            lint("/* i++\n * a == b */\nx--;"),
            "3:2:Unexpected '--'.\n"
        );
        assert_eq!(lint("var t = `a\n   i++ ` + 1;"), "");
    }

    #[test]
    fn white() {
        assert_eq!(lint("var a = 1;  "), "1:11:Unexpected trailing space.\n");
        assert_eq!(
            lint("{\n   x = 1;\n}"),
            "2:4:Expected indentation to be a multiple of 2 but found 3.\n"
        );
        assert_eq!(lint("{\n\tx = 1;\n}"), "2:1:Unexpected tab.\n");
    }

    #[test]
    fn maxlen() {
        let options = AnalysisOptions {
            maxlen: Some(8),
            ..Default::default()
        };
        assert_eq!(
            format_report(&TextLinter.analyze("var a = 1;", &options)),
            "1:9:Line too long.\n"
        );
    }

    #[test]
    fn options_switch_checks_off() {
        let options = AnalysisOptions {
            white: false,
            plusplus: false,
            eqeqeq: false,
            bitwise: false,
            ..Default::default()
        };
        assert!(
            TextLinter.analyze("\ti++ == a & b;  ", &options).is_empty()
        );
    }

    #[test]
    fn maxerr() {
        let options = AnalysisOptions {
            maxerr: 2,
            ..Default::default()
        };
        assert_eq!(
            format_report(
                &TextLinter.analyze("a++;\nb++;\nc++;\nd++;", &options)
            ),
            "1:2:Unexpected '++'.\n\
             2:2:Unexpected '++'.\n\
             3:2:Too many errors.\n"
        );
    }
}
