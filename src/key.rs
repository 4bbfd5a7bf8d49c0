//! Registry key handles and the operations performed on them.

use crate::command::{quote, quote_if_spaced, Invocation, Verb, DEFAULT_VALUE};
use crate::error::{RegistryError, Result};
use crate::hive::{Arch, Hive};
use crate::options::KeySpec;
use crate::parser::{last_non_blank_line, lines, parse_item_line, parse_items, parse_key_line, ParsedItem};
use crate::runner::{CommandRunner, ProcessOutput, ProcessRunner};
use crate::value::{RegistryItem, ValueData, ValueType};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument};

/// Zero or more `\segment` components; segments hold no backslash, quote or control character.
static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:\\[^\\"\x00-\x1f]+)*$"#).expect("key pattern is valid")
});

/// Handle on one registry key.
///
/// A handle only names a key: it caches nothing and never touches the registry
/// on its own. Every method runs the tool once (existence checks included), so
/// two reads may observe different states if the registry changed in between.
/// Concurrent calls on the same key are not ordered with respect to each other.
///
/// # Examples
///
/// ```no_run
/// use reg_exec::{Hive, RegistryKey, ValueType};
///
/// # async fn demo() -> reg_exec::Result<()> {
/// let key = RegistryKey::new(Hive::CurrentUser, "\\Software\\Vendor")?;
/// key.create().await?;
/// key.set("Greeting", ValueType::Sz, "hello world").await?;
/// assert_eq!(key.get("Greeting").await?.value, "hello world");
/// key.destroy().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RegistryKey {
    host: Option<String>,
    hive: Hive,
    key: String,
    arch: Option<Arch>,
    path: String,
    runner: Arc<dyn CommandRunner>,
}

impl RegistryKey {
    /// Creates a handle for `key` under `hive`, run through the real tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidKeyPath`] if `key` is neither empty nor
    /// a sequence of `\segment` components.
    pub fn new(hive: Hive, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self::assemble(
            None,
            hive,
            key,
            None,
            Arc::new(ProcessRunner::default()),
        ))
    }

    /// Creates a handle from string-typed configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown hive or architecture, an
    /// invalid host, or an invalid key path.
    pub fn from_spec(spec: &KeySpec) -> Result<Self> {
        let hive: Hive = spec.hive.parse()?;
        let arch = spec.arch.as_deref().map(str::parse::<Arch>).transpose()?;
        let mut key = Self::new(hive, spec.key.clone())?.with_arch(arch);
        if let Some(host) = &spec.host {
            key = key.with_host(host)?;
        }
        Ok(key)
    }

    /// Addresses the key on a remote machine.
    ///
    /// Leading backslashes are accepted and dropped.
    pub fn with_host(self, host: &str) -> Result<Self> {
        let host = host.trim_start_matches('\\');
        if host.is_empty() || host.contains(['\\', '"']) || host.contains(char::is_whitespace) {
            return Err(RegistryError::InvalidHost(host.to_string()));
        }
        Ok(Self::assemble(
            Some(host.to_string()),
            self.hive,
            self.key,
            self.arch,
            self.runner,
        ))
    }

    /// Selects the 32-bit or 64-bit registry view.
    pub fn with_arch(mut self, arch: Option<Arch>) -> Self {
        self.arch = arch;
        self
    }

    /// Replaces the process runner.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    /// Replaces the process runner with a shared one.
    pub fn with_shared_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    fn assemble(
        host: Option<String>,
        hive: Hive,
        key: String,
        arch: Option<Arch>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let mut path = String::new();
        if let Some(host) = &host {
            path.push_str("\\\\");
            path.push_str(host);
            path.push('\\');
        }
        path.push_str(hive.short_name());
        path.push_str(&key);

        Self {
            host,
            hive,
            key,
            arch,
            path,
            runner,
        }
    }

    /// Derives a handle on another key sharing host, view and runner.
    fn sibling(&self, hive: Hive, key: String) -> Self {
        Self::assemble(
            self.host.clone(),
            hive,
            key,
            self.arch,
            Arc::clone(&self.runner),
        )
    }

    /// Remote host, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Hive of this key.
    pub fn hive(&self) -> Hive {
        self.hive
    }

    /// Key path below the hive; empty for the hive root.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Registry view, if one was selected.
    pub fn arch(&self) -> Option<Arch> {
        self.arch
    }

    /// Fully qualified path, e.g. `\\host\HKCU\Software\Vendor`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Handle on the parent key. The hive root is its own parent.
    pub fn parent(&self) -> Self {
        let parent = match self.key.rfind('\\') {
            Some(index) => self.key[..index].to_string(),
            None => String::new(),
        };
        self.sibling(self.hive, parent)
    }

    /// Handle on the direct subkey `name`.
    pub fn child(&self, name: &str) -> Result<Self> {
        let key = format!("{}\\{}", self.key, name);
        validate_key(&key)?;
        Ok(self.sibling(self.hive, key))
    }

    fn query(&self) -> Invocation {
        Invocation::new(Verb::Query).arg(quote(&self.path))
    }

    /// Runs `invocation` and turns a non-zero exit into an error.
    async fn exec(&self, invocation: Invocation) -> Result<ProcessOutput> {
        let invocation = invocation.arch(self.arch);
        let output = self.runner.run(&invocation).await?;
        if output.success() {
            return Ok(output);
        }

        debug!(code = ?output.code, verb = %invocation.verb(), "Registry tool failed");
        Err(RegistryError::ProcessExit {
            code: output.code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn item(&self, parsed: ParsedItem) -> RegistryItem {
        RegistryItem {
            host: self.host.clone(),
            hive: self.hive,
            key: self.key.clone(),
            name: parsed.name,
            value_type: parsed.value_type,
            value: parsed.value,
            arch: self.arch,
        }
    }

    /// Lists the values stored directly under this key, in output order.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn values(&self) -> Result<Vec<RegistryItem>> {
        let output = self.exec(self.query()).await?;
        let items: Vec<RegistryItem> = parse_items(&output.stdout)
            .into_iter()
            .map(|parsed| self.item(parsed))
            .collect();
        debug!(count = items.len(), "Enumerated values");
        Ok(items)
    }

    /// Lists the direct subkeys of this key, each once, excluding the key itself.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn keys(&self) -> Result<Vec<RegistryKey>> {
        let output = self.exec(self.query()).await?;
        let own = self.key.to_lowercase();
        let mut seen = HashSet::new();

        let keys: Vec<RegistryKey> = lines(&output.stdout)
            .filter_map(parse_key_line)
            .filter(|parsed| {
                let folded = parsed.key.to_lowercase();
                folded != own && seen.insert(folded)
            })
            .map(|parsed| self.sibling(parsed.hive, parsed.key))
            .collect();
        debug!(count = keys.len(), "Enumerated subkeys");
        Ok(keys)
    }

    /// Reads one value; [`DEFAULT_VALUE`] reads the default value.
    ///
    /// # Errors
    ///
    /// Returns a process error if the tool fails (exit code 1 when the value
    /// is missing) or [`RegistryError::NotFound`] if its output holds no value line.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn get(&self, name: &str) -> Result<RegistryItem> {
        let output = self.exec(self.query().value_name(name)).await?;
        let parsed = last_non_blank_line(&output.stdout)
            .and_then(parse_item_line)
            .ok_or_else(|| RegistryError::not_found("value", display_name(name)))?;
        Ok(self.item(parsed))
    }

    /// Writes a value, replacing any existing one.
    #[instrument(skip(self, value), fields(path = %self.path))]
    pub async fn set(&self, name: &str, value_type: ValueType, value: &str) -> Result<()> {
        let data = if value.is_empty() {
            quote(value)
        } else {
            quote_if_spaced(value)
        };
        let invocation = Invocation::new(Verb::Add)
            .arg(quote(&self.path))
            .value_name(name)
            .arg("/t")
            .arg(value_type.name())
            .arg("/d")
            .arg(data)
            .arg("/f");
        self.exec(invocation).await?;
        Ok(())
    }

    /// Writes typed data, choosing the value type from the data.
    pub async fn set_data(&self, name: &str, data: &ValueData) -> Result<()> {
        self.set(name, data.value_type(), &data.to_reg_string()).await
    }

    /// Deletes one value; [`DEFAULT_VALUE`] deletes the default value.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn remove(&self, name: &str) -> Result<()> {
        let invocation = Invocation::new(Verb::Delete)
            .arg(quote(&self.path))
            .value_name(name)
            .arg("/f");
        self.exec(invocation).await?;
        Ok(())
    }

    /// Deletes every value of this key, the default value included. Subkeys stay.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn clear(&self) -> Result<()> {
        let invocation = Invocation::new(Verb::Delete)
            .arg(quote(&self.path))
            .arg("/va")
            .arg("/f");
        self.exec(invocation).await?;
        Ok(())
    }

    /// Deletes this key with all its subkeys and values.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn destroy(&self) -> Result<()> {
        let invocation = Invocation::new(Verb::Delete)
            .arg(quote(&self.path))
            .arg("/f");
        self.exec(invocation).await?;
        Ok(())
    }

    /// Creates this key. Succeeds if it already exists.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn create(&self) -> Result<()> {
        let invocation = Invocation::new(Verb::Add)
            .arg(quote(&self.path))
            .arg("/f");
        self.exec(invocation).await?;
        Ok(())
    }

    /// Returns whether this key exists.
    ///
    /// A not-found answer (exit code 1) becomes `false`; other failures are returned.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn key_exists(&self) -> Result<bool> {
        found(self.values().await)
    }

    /// Returns whether the value `name` exists under this key.
    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn value_exists(&self, name: &str) -> Result<bool> {
        found(self.get(name).await)
    }

    /// Writes this key and its subtree to a `.reg` file, overwriting it.
    #[instrument(skip(self, file), fields(path = %self.path, file = %file.as_ref().display()))]
    pub async fn export_to(&self, file: impl AsRef<Path>) -> Result<()> {
        let invocation = Invocation::new(Verb::Export)
            .arg(quote(&self.path))
            .arg(quote(&file.as_ref().display().to_string()))
            .arg("/y");
        self.exec(invocation).await?;
        Ok(())
    }

    /// Loads a `.reg` file through this handle's view and runner.
    ///
    /// The file names its own keys; this key's path is not used.
    #[instrument(skip(self, file), fields(file = %file.as_ref().display()))]
    pub async fn import_from(&self, file: impl AsRef<Path>) -> Result<()> {
        let invocation =
            Invocation::new(Verb::Import).arg(quote(&file.as_ref().display().to_string()));
        self.exec(invocation).await?;
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if KEY_PATTERN.is_match(key) {
        Ok(())
    } else {
        Err(RegistryError::InvalidKeyPath(key.to_string()))
    }
}

fn display_name(name: &str) -> &str {
    if name == DEFAULT_VALUE {
        "(Default)"
    } else {
        name
    }
}

fn found<T>(result: Result<T>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

impl fmt::Debug for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryKey")
            .field("path", &self.path)
            .field("arch", &self.arch)
            .finish()
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl PartialEq for RegistryKey {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.arch == other.arch
    }
}

impl Eq for RegistryKey {}
