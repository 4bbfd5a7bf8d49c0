//! Registry value types, value snapshots and their typed interpretation.

use crate::error::{RegistryError, Result};
use crate::hive::{Arch, Hive};
use std::fmt;
use std::str::FromStr;

/// Separator the tool prints between the strings of a `REG_MULTI_SZ` value.
pub const MULTI_SZ_SEPARATOR: &str = "\\0";

/// Registry value data types understood by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// String (`REG_SZ`).
    Sz,

    /// Multiple strings (`REG_MULTI_SZ`).
    MultiSz,

    /// String with environment variables (`REG_EXPAND_SZ`).
    ExpandSz,

    /// 32-bit integer (`REG_DWORD`).
    Dword,

    /// 64-bit integer (`REG_QWORD`).
    Qword,

    /// Binary data (`REG_BINARY`).
    Binary,

    /// No value type (`REG_NONE`).
    None,
}

impl ValueType {
    /// All seven types, in the tool's order.
    pub const ALL: [ValueType; 7] = [
        ValueType::Sz,
        ValueType::MultiSz,
        ValueType::ExpandSz,
        ValueType::Dword,
        ValueType::Qword,
        ValueType::Binary,
        ValueType::None,
    ];

    /// Returns the name of this value type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Sz => "REG_SZ",
            ValueType::MultiSz => "REG_MULTI_SZ",
            ValueType::ExpandSz => "REG_EXPAND_SZ",
            ValueType::Dword => "REG_DWORD",
            ValueType::Qword => "REG_QWORD",
            ValueType::Binary => "REG_BINARY",
            ValueType::None => "REG_NONE",
        }
    }
}

impl FromStr for ValueType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|value_type| value_type.name() == s)
            .ok_or_else(|| RegistryError::InvalidValueType(s.to_string()))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of one registry value as returned by a read.
///
/// The value is the text the tool printed. It is not linked to the registry:
/// reading the same value again may return something different.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistryItem {
    /// Remote host, if the key was addressed on another machine.
    pub host: Option<String>,

    /// Hive of the owning key.
    pub hive: Hive,

    /// Path of the owning key below the hive, e.g. `\Software\Vendor`.
    pub key: String,

    /// Value name as printed by the tool.
    pub name: String,

    /// Value type.
    pub value_type: ValueType,

    /// Value text as printed by the tool.
    pub value: String,

    /// Registry view the value was read through.
    pub arch: Option<Arch>,
}

impl RegistryItem {
    /// Interprets the value text according to its type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidData`] if the text does not fit the type.
    pub fn data(&self) -> Result<ValueData> {
        ValueData::parse(self.value_type, &self.value)
    }
}

/// Typed view of a registry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData {
    /// No data.
    None,

    /// String value.
    String(String),

    /// Expandable string value.
    ExpandString(String),

    /// Multiple strings.
    MultiString(Vec<String>),

    /// 32-bit integer.
    Dword(u32),

    /// 64-bit integer.
    Qword(u64),

    /// Binary data.
    Binary(Vec<u8>),
}

impl ValueData {
    /// Parses value text as printed by the tool.
    pub fn parse(value_type: ValueType, text: &str) -> Result<Self> {
        match value_type {
            ValueType::None => Ok(ValueData::None),
            ValueType::Sz => Ok(ValueData::String(text.to_string())),
            ValueType::ExpandSz => Ok(ValueData::ExpandString(text.to_string())),
            ValueType::MultiSz => {
                let strings = if text.is_empty() {
                    Vec::new()
                } else {
                    text.split(MULTI_SZ_SEPARATOR).map(str::to_string).collect()
                };
                Ok(ValueData::MultiString(strings))
            }
            ValueType::Dword => {
                let digits = strip_hex_prefix(text)?;
                u32::from_str_radix(digits, 16)
                    .map(ValueData::Dword)
                    .map_err(|e| RegistryError::InvalidData(format!("REG_DWORD {:?}: {}", text, e)))
            }
            ValueType::Qword => {
                let digits = strip_hex_prefix(text)?;
                u64::from_str_radix(digits, 16)
                    .map(ValueData::Qword)
                    .map_err(|e| RegistryError::InvalidData(format!("REG_QWORD {:?}: {}", text, e)))
            }
            ValueType::Binary => hex::decode(text.trim())
                .map(ValueData::Binary)
                .map_err(|e| RegistryError::InvalidData(format!("REG_BINARY {:?}: {}", text, e))),
        }
    }

    /// Returns the value type this data is stored as.
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueData::None => ValueType::None,
            ValueData::String(_) => ValueType::Sz,
            ValueData::ExpandString(_) => ValueType::ExpandSz,
            ValueData::MultiString(_) => ValueType::MultiSz,
            ValueData::Dword(_) => ValueType::Dword,
            ValueData::Qword(_) => ValueType::Qword,
            ValueData::Binary(_) => ValueType::Binary,
        }
    }

    /// Renders the data in the form the tool accepts after `/d`.
    pub fn to_reg_string(&self) -> String {
        match self {
            ValueData::None => String::new(),
            ValueData::String(s) | ValueData::ExpandString(s) => s.clone(),
            ValueData::MultiString(strings) => strings.join(MULTI_SZ_SEPARATOR),
            ValueData::Dword(d) => format!("0x{:x}", d),
            ValueData::Qword(q) => format!("0x{:x}", q),
            ValueData::Binary(b) => hex::encode_upper(b),
        }
    }
}

fn strip_hex_prefix(text: &str) -> Result<&str> {
    let text = text.trim();
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| RegistryError::InvalidData(format!("expected 0x-prefixed number, got {:?}", text)))
}
