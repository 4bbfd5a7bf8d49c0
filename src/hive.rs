//! Registry root namespaces and architecture views.

use crate::error::RegistryError;
use std::fmt;
use std::str::FromStr;

/// One of the five registry root namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hive {
    /// `HKEY_LOCAL_MACHINE`.
    LocalMachine,

    /// `HKEY_CURRENT_USER`.
    CurrentUser,

    /// `HKEY_CLASSES_ROOT`.
    ClassesRoot,

    /// `HKEY_USERS`.
    Users,

    /// `HKEY_CURRENT_CONFIG`.
    CurrentConfig,
}

impl Hive {
    /// All hives, in the order the tool documents them.
    pub const ALL: [Hive; 5] = [
        Hive::LocalMachine,
        Hive::CurrentUser,
        Hive::ClassesRoot,
        Hive::Users,
        Hive::CurrentConfig,
    ];

    /// Abbreviated name used when building key paths (`HKLM`, `HKCU`, ...).
    pub fn short_name(&self) -> &'static str {
        match self {
            Hive::LocalMachine => "HKLM",
            Hive::CurrentUser => "HKCU",
            Hive::ClassesRoot => "HKCR",
            Hive::Users => "HKU",
            Hive::CurrentConfig => "HKCC",
        }
    }

    /// Full name as printed by the tool in query output.
    pub fn long_name(&self) -> &'static str {
        match self {
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
            Hive::CurrentUser => "HKEY_CURRENT_USER",
            Hive::ClassesRoot => "HKEY_CLASSES_ROOT",
            Hive::Users => "HKEY_USERS",
            Hive::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }

    /// Maps a full hive name from query output back to the hive.
    pub fn from_long_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|hive| hive.long_name().eq_ignore_ascii_case(name))
    }
}

impl FromStr for Hive {
    type Err = RegistryError;

    /// Accepts both the abbreviated and the full spelling, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hive| {
                hive.short_name().eq_ignore_ascii_case(s) || hive.long_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| RegistryError::InvalidHive(s.to_string()))
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Registry view selected on 64-bit systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Arch {
    /// 32-bit view (`/reg:32`).
    X86,

    /// 64-bit view (`/reg:64`).
    X64,
}

impl Arch {
    /// Command-line switch selecting this view.
    pub fn flag(&self) -> &'static str {
        match self {
            Arch::X86 => "/reg:32",
            Arch::X64 => "/reg:64",
        }
    }

    /// Lower-case name (`x86` or `x64`).
    pub fn name(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
        }
    }
}

impl FromStr for Arch {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "32" => Ok(Arch::X86),
            "x64" | "64" => Ok(Arch::X64),
            _ => Err(RegistryError::InvalidArch(s.to_string())),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
