use crate::error::{BuildError, BuildResult};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Arguments forwarded to a second-order entry point, taken verbatim from the
/// resource's `arguments` / `keyword_arguments` configuration.
#[derive(Debug, Clone, Default)]
pub struct EntryArgs {
    pub arguments: Vec<Value>,
    pub keyword_arguments: HashMap<String, Value>,
}

impl EntryArgs {
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.keyword_arguments.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry point failed: {0}")]
    Failed(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// A registered data generator. Invoked at materialization time by the
/// orchestration boundary; at build time only its registration is checked.
pub type DataGenerator =
    Arc<dyn Fn(&EntryArgs) -> Result<Vec<serde_json::Value>, EntryError> + Send + Sync>;

/// Explicit `name -> generator` registration table. Entry references from
/// YAML (`<subdirectory>.<entry>` after loader rewriting) resolve against
/// this table, so a missing entry is a table miss with a descriptive error
/// instead of a failed dynamic import.
#[derive(Default)]
pub struct EntryRegistry {
    entries: HashMap<String, DataGenerator>,
    fallback: Option<DataGenerator>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that satisfies any lookup with an inert generator. Used by
    /// validation tooling that checks configuration shape without the
    /// embedding service's entry points wired in.
    pub fn with_stub_fallback() -> Self {
        let mut registry = Self::new();
        registry.fallback = Some(Arc::new(|_| Ok(Vec::new())));
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, generator: F)
    where
        F: Fn(&EntryArgs) -> Result<Vec<serde_json::Value>, EntryError> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(generator));
    }

    /// Resolve an entry reference for `resource`, failing with an error that
    /// names both when the table has no such entry.
    pub fn resolve(&self, entry: &str, resource: &str) -> BuildResult<DataGenerator> {
        self.entries
            .get(entry)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| BuildError::unknown_entry(entry, resource))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}

impl fmt::Debug for EntryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRegistry")
            .field("entries", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = EntryRegistry::new();
        registry.register("my_api.data.users", |_args| Ok(vec![json!({"id": 1})]));

        let generator = registry.resolve("my_api.data.users", "my_api.users").unwrap();
        let rows = generator(&EntryArgs::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_entry_names_entry_and_resource() {
        let registry = EntryRegistry::new();
        let err = registry.resolve("nope.data.func", "my_api.users").err().unwrap();
        match err {
            BuildError::UnknownEntry { context } => {
                assert!(context.message().contains("nope.data.func"));
                assert!(context.message().contains("my_api.users"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_second_order_entry_receives_arguments() {
        let mut registry = EntryRegistry::new();
        registry.register("api.data.endpoint", |args| {
            let endpoint = args
                .arguments
                .first()
                .and_then(|v| v.as_str())
                .ok_or_else(|| EntryError::InvalidArguments("endpoint required".into()))?;
            Ok(vec![json!({"endpoint": endpoint})])
        });

        let generator = registry.resolve("api.data.endpoint", "api.users").unwrap();

        let args = EntryArgs {
            arguments: vec![Value::from("users")],
            keyword_arguments: HashMap::new(),
        };
        assert_eq!(generator(&args).unwrap()[0]["endpoint"], "users");

        assert!(generator(&EntryArgs::default()).is_err());
    }
}
