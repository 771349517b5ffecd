use common::config::error::ConfigError;
use defs_core::context::BuildContext;
use defs_core::entry::EntryRegistry;
use defs_core::error::BuildError;
use defs_core::platform::build_platform_definitions;
use secrets::{DotenvStore, SecretResolver};
use std::path::PathBuf;

/// Build the definitions bundle and print it as pretty JSON on stdout.
pub fn handle_compile(project_path: Option<PathBuf>) -> Result<(), BuildError> {
    let ctx = BuildContext::from_env();
    let registry = EntryRegistry::with_stub_fallback();
    let mut resolver = SecretResolver::new(DotenvStore::discover());

    let bundle = build_platform_definitions(&ctx, &registry, &mut resolver, project_path)?;

    let rendered = serde_json::to_string_pretty(&bundle)
        .map_err(|e| ConfigError::parse_error(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
