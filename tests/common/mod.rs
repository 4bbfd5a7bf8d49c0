//! In-memory stand-in for REG.exe used by the integration tests.
//!
//! Interprets `QUERY`, `ADD` and `DELETE` against a map of keys and prints
//! output in the tool's format, with exit code 1 for missing keys and values.

#![allow(dead_code)]

use async_trait::async_trait;
use reg_exec::{CommandRunner, Hive, Invocation, ProcessOutput};
use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;

pub const NOT_FOUND: &str =
    "ERROR: The system was unable to find the specified registry key or value.\r\n";

#[derive(Debug, Default)]
struct KeyEntry {
    path: String,
    values: Vec<(String, String, String)>,
}

#[derive(Debug, Default)]
pub struct FakeReg {
    keys: Mutex<BTreeMap<String, KeyEntry>>,
    calls: Mutex<Vec<Vec<String>>>,
}

fn unquote(arg: &str) -> String {
    match arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')) {
        Some(inner) => {
            // Backslashes before the closing quote arrive doubled.
            let body = inner.trim_end_matches('\\');
            let trailing = inner.len() - body.len();
            format!("{}{}", body, "\\".repeat(trailing / 2))
        }
        None => arg.to_string(),
    }
}

/// Turns `HKCU\Software\X` into `HKEY_CURRENT_USER\Software\X`.
fn long_path(arg: &str) -> String {
    let path = unquote(arg);
    let (hive, rest) = match path.find('\\') {
        Some(index) => (&path[..index], &path[index..]),
        None => (path.as_str(), ""),
    };
    let hive: Hive = hive.parse().expect("fake registry got an unknown hive");
    format!("{}{}", hive.long_name(), rest)
}

fn ok(stdout: String) -> ProcessOutput {
    ProcessOutput::new(0, stdout, "")
}

fn not_found() -> ProcessOutput {
    ProcessOutput::new(1, "", NOT_FOUND)
}

fn value_line(name: &str, value_type: &str, value: &str) -> String {
    let name = if name.is_empty() { "(Default)" } else { name };
    format!("    {}    {}    {}\r\n", name, value_type, value)
}

impl FakeReg {
    pub fn new() -> Self {
        let fake = Self::default();
        for hive in Hive::ALL {
            fake.insert_key(hive.long_name());
        }
        fake.insert_key("HKEY_CURRENT_USER\\Software");
        fake
    }

    /// Every argument list received so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn insert_key(&self, path: &str) {
        let mut keys = self.keys.lock().unwrap();
        let mut prefix = String::new();
        for segment in path.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(segment);
            keys.entry(prefix.to_lowercase()).or_insert_with(|| KeyEntry {
                path: prefix.clone(),
                values: Vec::new(),
            });
        }
    }

    fn query(&self, path: &str, value: Option<&str>) -> ProcessOutput {
        let keys = self.keys.lock().unwrap();
        let folded = path.to_lowercase();
        let Some(entry) = keys.get(&folded) else {
            return not_found();
        };

        let mut out = format!("\r\n{}\r\n", entry.path);
        match value {
            Some(name) => {
                match entry.values.iter().find(|(n, _, _)| n.eq_ignore_ascii_case(name)) {
                    Some((n, t, v)) => out.push_str(&value_line(n, t, v)),
                    None if name.is_empty() => {
                        out.push_str(&value_line("", "REG_SZ", "(value not set)"))
                    }
                    None => return not_found(),
                }
                out.push_str("\r\n");
            }
            None => {
                for (n, t, v) in &entry.values {
                    out.push_str(&value_line(n, t, v));
                }
                out.push_str("\r\n");
                let prefix = format!("{}\\", folded);
                for (child, child_entry) in keys.range(prefix.clone()..) {
                    if !child.starts_with(&prefix) {
                        break;
                    }
                    if !child[prefix.len()..].contains('\\') {
                        out.push_str(&child_entry.path);
                        out.push_str("\r\n");
                    }
                }
            }
        }
        ok(out)
    }

    fn add(&self, path: &str, value: Option<(String, String, String)>) -> ProcessOutput {
        self.insert_key(path);
        if let Some((name, value_type, data)) = value {
            let mut keys = self.keys.lock().unwrap();
            let entry = keys.get_mut(&path.to_lowercase()).unwrap();
            entry.values.retain(|(n, _, _)| !n.eq_ignore_ascii_case(&name));
            entry.values.push((name, value_type, data));
        }
        ok("The operation completed successfully.\r\n".to_string())
    }

    fn delete_value(&self, path: &str, name: &str) -> ProcessOutput {
        let mut keys = self.keys.lock().unwrap();
        let Some(entry) = keys.get_mut(&path.to_lowercase()) else {
            return not_found();
        };
        let before = entry.values.len();
        entry.values.retain(|(n, _, _)| !n.eq_ignore_ascii_case(name));
        if entry.values.len() == before {
            return not_found();
        }
        ok("The operation completed successfully.\r\n".to_string())
    }

    fn delete_all_values(&self, path: &str) -> ProcessOutput {
        let mut keys = self.keys.lock().unwrap();
        let Some(entry) = keys.get_mut(&path.to_lowercase()) else {
            return not_found();
        };
        entry.values.clear();
        ok("The operation completed successfully.\r\n".to_string())
    }

    fn delete_key(&self, path: &str) -> ProcessOutput {
        let mut keys = self.keys.lock().unwrap();
        let folded = path.to_lowercase();
        if keys.remove(&folded).is_none() {
            return not_found();
        }
        let prefix = format!("{}\\", folded);
        keys.retain(|k, _| !k.starts_with(&prefix));
        ok("The operation completed successfully.\r\n".to_string())
    }
}

#[async_trait]
impl CommandRunner for FakeReg {
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        let args: Vec<String> = invocation.args().to_vec();
        self.calls.lock().unwrap().push(args.clone());

        let path = long_path(&args[1]);
        let mut name: Option<String> = None;
        let mut value_type = "REG_SZ".to_string();
        let mut data = String::new();
        let mut all_values = false;

        let mut rest = args[2..].iter();
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "/v" => name = rest.next().map(|n| unquote(n)),
                "/ve" => name = Some(String::new()),
                "/va" => all_values = true,
                "/t" => value_type = rest.next().cloned().unwrap_or_default(),
                "/d" => data = rest.next().map(|d| unquote(d)).unwrap_or_default(),
                _ => {}
            }
        }

        let output = match args[0].as_str() {
            "QUERY" => self.query(&path, name.as_deref()),
            "ADD" => self.add(&path, name.map(|n| (n, value_type, data))),
            "DELETE" if all_values => self.delete_all_values(&path),
            "DELETE" => match name {
                Some(name) => self.delete_value(&path, &name),
                None => self.delete_key(&path),
            },
            _ => ok(String::new()),
        };
        Ok(output)
    }
}
