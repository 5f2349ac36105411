//! Formatting diagnostics for the response.

use std::fmt::Write;
use super::Diagnostic;


/// Formats a list of diagnostics into the text report.
///
/// Each diagnostic becomes one line of the form `line:character:reason`.
/// The lines appear in the order of the list and each is terminated by a
/// newline. An empty list results in an empty report.
pub fn format_report(diagnostics: &[Diagnostic]) -> String {
    let mut res = String::new();
    for item in diagnostics {
        // Writing to a string never fails.
        let _ = writeln!(res, "{}:{}:{}", item.line, item.character, item.reason);
    }
    res
}


//============ Tests =========================================================
