//! The options for the analysis engine.

use serde::{Deserialize, Serialize};


//------------ AnalysisOptions -----------------------------------------------

/// The options passed to the analysis engine.
///
/// The options follow JSLint’s option names. They are set once when the
/// process starts, either from the defaults or from the `[lint]` table of
/// the config file, and are shared by all requests. Clients cannot
/// change them.
///
/// Not every engine understands every option. Engines ignore what they
/// don’t support.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct AnalysisOptions {
    /// Complain about bitwise operators.
    pub bitwise: bool,

    /// Require `===` and `!==`.
    pub eqeqeq: bool,

    /// Require parens around immediate invocations.
    pub immed: bool,

    /// Require capitalized constructor names.
    pub newcap: bool,

    /// Complain about dangling underscores in names.
    pub nomen: bool,

    /// Allow only one `var` statement per function.
    pub onevar: bool,

    /// Complain about `++` and `--`.
    pub plusplus: bool,

    /// Complain about unsafe regular expressions.
    pub regexp: bool,

    /// Assume the Rhino environment.
    pub rhino: bool,

    /// Complain about undefined variables.
    pub undef: bool,

    /// Enforce strict whitespace rules.
    pub white: bool,

    /// Assume browser globals.
    pub browser: bool,

    /// Allow `console` and friends.
    pub devel: bool,

    /// The maximum number of problems reported.
    pub maxerr: usize,

    /// The number of spaces per indentation level.
    pub indent: usize,

    /// The maximum line length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxlen: Option<usize>,

    /// Additional predefined global names.
    pub predef: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            bitwise: true,
            eqeqeq: true,
            immed: true,
            newcap: true,
            nomen: true,
            onevar: true,
            plusplus: true,
            regexp: true,
            rhino: true,
            undef: true,
            white: true,
            browser: true,
            devel: true,
            maxerr: 500,
            indent: 2,
            maxlen: None,
            predef: vec!["$".into(), "jQuery".into()],
        }
    }
}

impl AnalysisOptions {
    /// Creates options from the `[lint]` table of a config file.
    ///
    /// Missing keys take their default values. Unknown keys are an error.
    pub fn from_toml(value: toml::Value) -> Result<Self, toml::de::Error> {
        value.try_into()
    }

    /// Converts the options into a TOML value.
    pub fn to_toml(&self) -> toml::Value {
        // The options consist of plain values only, so this can’t fail.
        toml::Value::try_from(self).unwrap_or_else(|_| {
            toml::Value::Table(Default::default())
        })
    }
}


//============ Tests =========================================================
