use defs_core::context::BuildContext;
use defs_core::entry::EntryRegistry;
use defs_core::error::BuildError;
use defs_core::platform::build_platform_definitions;
use log::{info, warn};
use secrets::{DotenvStore, SecretResolver};
use std::path::PathBuf;

/// Build the whole project with stubbed entry points and report what came
/// out. Configuration errors surface with their offending entry; secret
/// misses are reported as warnings rather than failures.
pub fn handle_check(project_path: Option<PathBuf>) -> Result<(), BuildError> {
    let ctx = BuildContext::from_env();
    let registry = EntryRegistry::with_stub_fallback();
    let mut resolver = SecretResolver::new(DotenvStore::discover());

    let bundle = build_platform_definitions(&ctx, &registry, &mut resolver, project_path)?;

    for diagnostic in resolver.diagnostics() {
        warn!("{}", diagnostic);
    }

    info!(
        "configuration is valid: {} connections, {} groups, {} assets, {} checks, {} sensors",
        bundle.connections.len(),
        bundle.groups.len(),
        bundle.assets.len(),
        bundle.checks.len(),
        bundle.sensors.len()
    );
    Ok(())
}
