//! Argument lists for the registry tool.
//!
//! An [`Invocation`] is the ordered list of arguments that follows the tool's
//! executable name. Arguments are stored already rendered: names and data
//! containing a space are wrapped in double quotes, key paths are always quoted.
//! No other escaping is done here, so callers must not pass untrusted text
//! containing shell metacharacters or double quotes.

use crate::hive::Arch;
use std::fmt;

/// Value name addressing a key's default (unnamed) value.
pub const DEFAULT_VALUE: &str = "";

/// Verb passed as the tool's first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Read keys and values.
    Query,
    /// Create keys and write values.
    Add,
    /// Delete keys and values.
    Delete,
    /// Load a `.reg` file.
    Import,
    /// Write a key to a `.reg` file.
    Export,
}

impl Verb {
    /// Upper-case verb as the tool expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Query => "QUERY",
            Verb::Add => "ADD",
            Verb::Delete => "DELETE",
            Verb::Import => "IMPORT",
            Verb::Export => "EXPORT",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps `s` in double quotes if it contains a space.
pub fn quote_if_spaced(s: &str) -> String {
    if s.contains(' ') {
        quote(s)
    } else {
        s.to_string()
    }
}

/// Wraps `s` in double quotes.
///
/// Trailing backslashes are doubled so the closing quote is not read as an
/// escaped quote by the tool's argument parser.
pub fn quote(s: &str) -> String {
    let trailing = s.len() - s.trim_end_matches('\\').len();
    format!("\"{}{}\"", s, "\\".repeat(trailing))
}

/// One call of the registry tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub(crate) verb: Verb,
    pub(crate) args: Vec<String>,
}

impl Invocation {
    /// Starts an invocation with `verb` as its first argument.
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            args: vec![verb.as_str().to_string()],
        }
    }

    /// Returns the verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the rendered arguments, verb first.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Appends an argument as is.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends an argument, quoting it if it contains a space.
    pub fn quoted(self, arg: &str) -> Self {
        self.arg(quote_if_spaced(arg))
    }

    /// Appends `/ve` for the default value, `/v <name>` otherwise.
    pub fn value_name(self, name: &str) -> Self {
        if name == DEFAULT_VALUE {
            self.arg("/ve")
        } else {
            self.arg("/v").quoted(name)
        }
    }

    /// Appends the architecture switch when a view is selected.
    pub fn arch(self, arch: Option<Arch>) -> Self {
        match arch {
            Some(arch) => self.arg(arch.flag()),
            None => self,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}
