//! Parsing of the registry tool's standard output.
//!
//! `REG QUERY` prints a blank line, the absolute path of each key it visits,
//! and one indented line per value:
//!
//! ```text
//!
//! HKEY_CURRENT_USER\Software\Vendor
//!     Name    REG_SZ    some text
//!     Count    REG_DWORD    0x10
//!
//! HKEY_CURRENT_USER\Software\Vendor\Child
//! ```
//!
//! Columns are separated by four spaces. Lines that match neither shape are
//! ignored by the callers.

use crate::hive::Hive;
use crate::value::ValueType;
use regex::Regex;
use std::sync::LazyLock;

static ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(.*?) {4}(REG_SZ|REG_MULTI_SZ|REG_EXPAND_SZ|REG_DWORD|REG_QWORD|REG_BINARY|REG_NONE)(?: {4}(.*))?$",
    )
    .expect("value line pattern is valid")
});

static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\\\\([^\\]+)\\)?(HKEY_LOCAL_MACHINE|HKEY_CURRENT_USER|HKEY_CLASSES_ROOT|HKEY_USERS|HKEY_CURRENT_CONFIG)((?:\\.*)?)$",
    )
    .expect("key path pattern is valid")
});

/// A value line split into its three columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    /// Value name.
    pub name: String,
    /// Value type.
    pub value_type: ValueType,
    /// Value text, empty when the tool printed none.
    pub value: String,
}

/// An absolute key path line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// Host from a `\\host\` prefix.
    pub host: Option<String>,
    /// Hive named by the path.
    pub hive: Hive,
    /// Remainder below the hive, empty or starting with a backslash.
    pub key: String,
}

/// Iterates over output lines with line terminators removed.
pub fn lines(output: &str) -> impl Iterator<Item = &str> {
    output.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Parses a value line.
///
/// Leading indentation is skipped; trailing text of the value is kept as is.
pub fn parse_item_line(line: &str) -> Option<ParsedItem> {
    let line = line.trim_start();
    let captures = ITEM_PATTERN.captures(line)?;
    let value_type = captures[2].parse().ok()?;
    Some(ParsedItem {
        name: captures[1].to_string(),
        value_type,
        value: captures
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}

/// Parses an absolute key path line.
///
/// Key lines start in the first column; indented lines are value lines even
/// when the value name looks like a key path.
pub fn parse_key_line(line: &str) -> Option<ParsedKey> {
    let captures = PATH_PATTERN.captures(line.trim_end())?;
    Some(ParsedKey {
        host: captures.get(1).map(|m| m.as_str().to_string()),
        hive: Hive::from_long_name(&captures[2])?,
        key: captures[3].to_string(),
    })
}

/// Parses every value line in `output`, in order.
pub fn parse_items(output: &str) -> Vec<ParsedItem> {
    lines(output).filter_map(parse_item_line).collect()
}

/// Returns the last line that is not blank.
///
/// Older versions of the tool print a version banner before the data, so a
/// single-value query is read from the bottom up.
pub fn last_non_blank_line(output: &str) -> Option<&str> {
    lines(output).filter(|line| !line.trim().is_empty()).last()
}
