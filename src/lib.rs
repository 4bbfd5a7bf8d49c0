//! # Windows Registry access through REG.exe
//!
//! An asynchronous wrapper around the `REG.exe` command-line tool that ships
//! with Windows. Every operation builds an argument list, runs the tool as a
//! child process, and parses its text output into typed records.
//!
//! ## Features
//!
//! - **Async**: each call awaits the child process without blocking the runtime
//! - **Typed**: hives, architecture views and value types are closed enums
//! - **No caching**: every read runs the tool again and sees the live registry
//! - **Testable**: the process runner is a trait, so tests can return canned output
//!
//! ## Architecture
//!
//! ```text
//! RegistryKey ──builds──▶ Invocation ──runs──▶ CommandRunner ──▶ REG.exe
//!      ▲                                            │
//!      └────────── parser (value / key lines) ◀─────┘ stdout, stderr, exit code
//! ```
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```no_run
//! use reg_exec::{Hive, RegistryKey, ValueType};
//!
//! # async fn demo() -> reg_exec::Result<()> {
//! let key = RegistryKey::new(Hive::CurrentUser, "\\Software\\ProbeTest123")?;
//!
//! if !key.key_exists().await? {
//!     key.create().await?;
//! }
//! key.set("X", ValueType::Sz, "hello world").await?;
//!
//! for item in key.values().await? {
//!     println!("{} {} = {}", item.name, item.value_type, item.value);
//! }
//! for subkey in key.keys().await? {
//!     println!("  Subkey: {}", subkey.path());
//! }
//!
//! key.destroy().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom Tool Location
//!
//! ```no_run
//! use reg_exec::{Hive, ProcessRunner, RegistryKey, RegistryOptions};
//!
//! # fn main() -> reg_exec::Result<()> {
//! let options = RegistryOptions {
//!     tool_path: Some("D:\\tools\\reg.exe".into()),
//!     utf8: false,
//!     encoding: Some("ibm866".to_string()),
//!     ..Default::default()
//! };
//! let _key = RegistryKey::new(Hive::LocalMachine, "\\SOFTWARE\\Vendor")?
//!     .with_runner(ProcessRunner::new(&options)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Caveats
//!
//! Names and data containing a space are quoted. On Windows the tool runs
//! through `cmd /c` so its console uses code page 65001; arguments are escaped
//! for that shell, so `%VAR%` and `&` reach the registry literally. Double
//! quotes inside names or data are not supported.
//! Exit code 1 is read as "not found", although the tool also uses it for
//! other failures such as denied access.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod hive;
pub mod key;
pub mod options;
pub mod parser;
pub mod runner;
pub mod value;

// Re-export main types for convenience
pub use command::{Invocation, Verb, DEFAULT_VALUE};
pub use error::{RegistryError, Result, NOT_FOUND_EXIT_CODE};
pub use hive::{Arch, Hive};
pub use key::RegistryKey;
pub use options::{KeySpec, RegistryOptions};
pub use runner::{CommandRunner, ProcessOutput, ProcessRunner};
pub use value::{RegistryItem, ValueData, ValueType};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
