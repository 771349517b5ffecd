use crate::{MemoryStore, SecretStore};
use std::path::Path;

/// Store backed by a `.env` file. Keys of the form `NAMESPACE__ATTRIBUTE`
/// become store entries; anything else is ignored. Stands in for a managed
/// key vault during local development.
#[derive(Debug, Default)]
pub struct DotenvStore {
    inner: MemoryStore,
}

impl DotenvStore {
    /// Load from the nearest `.env` found from the current directory upward.
    /// A missing file yields an empty store, matching how partial dev
    /// environments are expected to behave.
    pub fn discover() -> Self {
        match dotenvy::dotenv_iter() {
            Ok(iter) => Self::from_iter(iter.filter_map(Result::ok)),
            Err(_) => Self::default(),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        match dotenvy::from_path_iter(path) {
            Ok(iter) => Self::from_iter(iter.filter_map(Result::ok)),
            Err(_) => Self::default(),
        }
    }

    fn from_iter(vars: impl Iterator<Item = (String, String)>) -> Self {
        let mut inner = MemoryStore::default();
        for (key, value) in vars {
            if let Some((namespace, attribute)) = key.split_once("__") {
                inner.insert(namespace, attribute, &value);
            }
        }
        Self { inner }
    }
}

impl SecretStore for DotenvStore {
    fn get(&self, namespace: &str, attribute: &str) -> Option<String> {
        self.inner.get(namespace, attribute)
    }
}
