//! Configuration for running the tool and for describing keys in config files.

use crate::error::{RegistryError, Result};
use encoding_rs::{Encoding, UTF_8};
use std::env;
use std::path::PathBuf;

/// Windows directory used when neither `SystemRoot` nor `windir` is set.
const FALLBACK_WINDOWS_DIR: &str = "C:\\Windows";

/// How the registry tool is located and how its output is decoded.
///
/// The default runs `%SystemRoot%\System32\reg.exe` under code page 65001
/// and decodes its output as UTF-8. With `utf8` off the tool writes in the
/// console's OEM code page, so set `encoding` to match it (e.g. `ibm866`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryOptions {
    /// Explicit path of the tool executable.
    pub tool_path: Option<PathBuf>,

    /// Explicit path of the command interpreter used in UTF-8 mode.
    pub shell_path: Option<PathBuf>,

    /// Run the tool with the console code page switched to UTF-8. On by
    /// default; only has an effect on Windows.
    pub utf8: bool,

    /// Encoding label (WHATWG) for decoding output, e.g. `windows-1252`.
    /// Ignored in UTF-8 mode.
    pub encoding: Option<String>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            tool_path: None,
            shell_path: None,
            utf8: true,
            encoding: None,
        }
    }
}

impl RegistryOptions {
    /// Returns the tool path, falling back to the platform default.
    pub fn resolve_tool_path(&self) -> PathBuf {
        self.tool_path.clone().unwrap_or_else(default_tool_path)
    }

    /// Returns the command interpreter path, falling back to the platform default.
    pub fn resolve_shell_path(&self) -> PathBuf {
        self.shell_path.clone().unwrap_or_else(default_shell_path)
    }

    /// Resolves the encoding used to decode the tool's output.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidEncoding`] for an unknown label.
    pub fn output_encoding(&self) -> Result<&'static Encoding> {
        if self.utf8 {
            return Ok(UTF_8);
        }
        match &self.encoding {
            None => Ok(UTF_8),
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| RegistryError::InvalidEncoding(label.clone())),
        }
    }
}

fn windows_dir() -> PathBuf {
    env::var_os("SystemRoot")
        .or_else(|| env::var_os("windir"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_WINDOWS_DIR))
}

/// Default location of the registry tool.
pub fn default_tool_path() -> PathBuf {
    if cfg!(windows) {
        windows_dir().join("System32").join("reg.exe")
    } else {
        PathBuf::from("reg")
    }
}

/// Default location of the command interpreter.
pub fn default_shell_path() -> PathBuf {
    if let Some(comspec) = env::var_os("ComSpec") {
        return PathBuf::from(comspec);
    }
    if cfg!(windows) {
        windows_dir().join("System32").join("cmd.exe")
    } else {
        PathBuf::from("cmd")
    }
}

/// String-typed description of a key, as read from a configuration file.
///
/// Converted into a handle by [`crate::RegistryKey::from_spec`], which
/// validates each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySpec {
    /// Remote host name, without leading backslashes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub host: Option<String>,

    /// Hive name, abbreviated (`HKCU`) or full (`HKEY_CURRENT_USER`).
    pub hive: String,

    /// Key path below the hive, e.g. `\Software\Vendor`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: String,

    /// Architecture view, `x86` or `x64`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub arch: Option<String>,
}
