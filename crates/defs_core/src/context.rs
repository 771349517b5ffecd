use crate::bundle::DefinitionsBundle;
use crate::error::BuildResult;
use common::naming::Environment;
use common::utils::paths_with_exts;
use log::debug;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

struct CacheEntry {
    digest: String,
    bundle: Arc<DefinitionsBundle>,
}

/// Explicit per-invocation build state: the captured environment plus a
/// clearable memoization cache keyed by a content hash of each configuration
/// directory. A path whose contents changed never serves a stale bundle.
pub struct BuildContext {
    environment: Environment,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl BuildContext {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(Environment::from_env())
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Return the cached bundle for `(kind, dir)` when the directory contents
    /// are unchanged, otherwise run `build` and cache its result.
    pub fn cached_or_build<F>(
        &self,
        kind: &str,
        dir: &Path,
        build: F,
    ) -> BuildResult<Arc<DefinitionsBundle>>
    where
        F: FnOnce() -> BuildResult<DefinitionsBundle>,
    {
        let key = format!("{}:{}", kind, dir.display());
        let digest = digest_config_tree(dir)?;

        if let Some(entry) = self.cache.read().get(&key) {
            if entry.digest == digest {
                debug!("serving cached {} bundle for {}", kind, dir.display());
                return Ok(Arc::clone(&entry.bundle));
            }
        }

        let bundle = Arc::new(build()?);
        self.cache.write().insert(
            key,
            CacheEntry {
                digest,
                bundle: Arc::clone(&bundle),
            },
        );
        Ok(bundle)
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}

/// Content hash over every configuration document under `dir`, in sorted
/// order. Relative paths participate so renames invalidate too.
fn digest_config_tree(dir: &Path) -> BuildResult<String> {
    let mut hasher = Sha256::new();
    for path in paths_with_exts(dir, &["yaml", "yml"]) {
        let rel = path.strip_prefix(dir).unwrap_or(&path);
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(fs::read(&path)?);
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    Ok(digest.iter().fold(String::new(), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{:02x}", b);
        acc
    }))
}
