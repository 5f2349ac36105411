//! Analysing source code.
//!
//! The service itself doesn’t care how source code is analysed. It hands
//! the source text and the [`AnalysisOptions`] to an [`Analyzer`] and
//! receives a list of [`Diagnostic`]s in return which are turned into the
//! response via [`format_report`].
//!
//! A simple, line-based engine is provided by [`TextLinter`].

pub use self::engine::TextLinter;
pub use self::options::AnalysisOptions;
pub use self::report::format_report;

mod engine;
mod options;
mod report;


//------------ Diagnostic ----------------------------------------------------

/// A single problem found in the source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// The line of the problem, starting at 1.
    pub line: usize,

    /// The column of the problem, starting at 1.
    pub character: usize,

    /// A human readable description of the problem.
    pub reason: String,
}

impl Diagnostic {
    pub fn new(
        line: usize, character: usize, reason: impl Into<String>
    ) -> Self {
        Diagnostic { line, character, reason: reason.into() }
    }
}


//------------ Analyzer ------------------------------------------------------

/// An engine analysing source code.
///
/// The engine is called once for every successful request. Since requests
/// are handled concurrently, it needs to be shareable between threads. It
/// is run on a blocking thread so it may take its time.
pub trait Analyzer: Send + Sync + 'static {
    /// Analyses `source` and returns the problems in reporting order.
    fn analyze(
        &self, source: &str, options: &AnalysisOptions
    ) -> Vec<Diagnostic>;
}
