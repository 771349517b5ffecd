//! Secret-reference resolution against a pluggable key-value store.
//!
//! Connection attributes may hold `secret.<NAMESPACE>__<ATTRIBUTE>` or
//! `env.<NAME>` references instead of literals. Resolution happens once at
//! build time; resolved secrets are additionally exported into the process
//! environment so downstream tooling that reads credentials from environment
//! variables sees the same values.

mod dotenv;

pub use dotenv::DotenvStore;

use log::warn;
use std::collections::HashMap;
use std::env;
use std::fmt;

/// Delimiter between the namespace and attribute of a secret name.
const SECRET_DELIMITER: &str = "__";

/// Backing store queried for `secret.*` references.
pub trait SecretStore {
    fn get(&self, namespace: &str, attribute: &str) -> Option<String>;
}

/// In-memory store, used in tests and as the assembly point for stores that
/// load their contents up front.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new(entries: HashMap<String, HashMap<String, String>>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, namespace: &str, attribute: &str, value: &str) {
        self.entries
            .entry(namespace.to_string())
            .or_default()
            .insert(attribute.to_string(), value.to_string());
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, namespace: &str, attribute: &str) -> Option<String> {
        self.entries.get(namespace)?.get(attribute).cloned()
    }
}

// ---------------- Diagnostics ----------------

/// A soft failure recorded during resolution. Missing secrets resolve to an
/// empty string so partial development configurations still build, but every
/// miss is surfaced here and logged instead of disappearing silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretDiagnostic {
    Missing { name: String },
    Malformed { reference: String },
}

impl fmt::Display for SecretDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretDiagnostic::Missing { name } => {
                write!(f, "secret '{}' not found in the backing store", name)
            }
            SecretDiagnostic::Malformed { reference } => write!(
                f,
                "secret reference '{}' is missing the '{}' delimiter",
                reference, SECRET_DELIMITER
            ),
        }
    }
}

// ---------------- Resolver ----------------

pub struct SecretResolver<S> {
    store: S,
    diagnostics: Vec<SecretDiagnostic>,
}

impl<S: SecretStore> SecretResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            diagnostics: Vec::new(),
        }
    }

    /// Resolve one attribute value. `secret.X` queries the store, `env.X`
    /// reads the environment eagerly, anything else passes through unchanged.
    pub fn resolve_reference(&mut self, raw: &str) -> String {
        match raw.split_once('.') {
            Some(("secret", name)) => self.resolve_secret(name),
            Some(("env", name)) => env::var(name).unwrap_or_default(),
            _ => raw.to_string(),
        }
    }

    /// Look up `<NAMESPACE>__<ATTRIBUTE>` in the store and export the value
    /// under the full name as a side effect. A miss resolves to an empty
    /// string and records a diagnostic.
    pub fn resolve_secret(&mut self, name: &str) -> String {
        let Some((namespace, attribute)) = name.split_once(SECRET_DELIMITER) else {
            warn!("malformed secret reference '{}'", name);
            self.diagnostics.push(SecretDiagnostic::Malformed {
                reference: name.to_string(),
            });
            return String::new();
        };

        match self.store.get(namespace, attribute) {
            Some(value) => {
                env::set_var(name, &value);
                value
            }
            None => {
                warn!("secret '{}' not found, resolving to empty string", name);
                self.diagnostics.push(SecretDiagnostic::Missing {
                    name: name.to_string(),
                });
                String::new()
            }
        }
    }

    pub fn diagnostics(&self) -> &[SecretDiagnostic] {
        &self.diagnostics
    }
}
