use crate::bundle::DefinitionsBundle;
use crate::context::BuildContext;
use crate::entry::EntryRegistry;
use crate::error::BuildResult;
use crate::{elt, models, replication};
use common::config::components::project::{read_project, ResolvedProjectConfig};
use log::info;
use secrets::{SecretResolver, SecretStore};
use std::path::PathBuf;

/// Run every configured factory for a project layout and merge the results
/// into one bundle for the orchestration boundary. Sections absent from
/// `platform-project.yml` are simply skipped.
pub fn build_platform_definitions<S: SecretStore>(
    ctx: &BuildContext,
    registry: &EntryRegistry,
    resolver: &mut SecretResolver<S>,
    project_root: Option<PathBuf>,
) -> BuildResult<DefinitionsBundle> {
    let project = read_project(project_root)?;
    build_project(ctx, registry, resolver, &project)
}

pub fn build_project<S: SecretStore>(
    ctx: &BuildContext,
    registry: &EntryRegistry,
    resolver: &mut SecretResolver<S>,
    project: &ResolvedProjectConfig,
) -> BuildResult<DefinitionsBundle> {
    info!(
        "building platform definitions for '{}' v{}",
        project.project.name, project.project.version
    );

    let mut bundle = DefinitionsBundle::new();

    if let Some(dir) = &project.elt_dir {
        let part = elt::Factory::build_definitions(ctx, registry, dir)?;
        bundle.extend((*part).clone());
    }

    if let Some(dir) = &project.replication_dir {
        let part = replication::Factory::build_definitions(ctx, resolver, dir)?;
        bundle.extend((*part).clone());
    }

    if let Some(dir) = &project.models_dir {
        let part = models::Factory::build_definitions(ctx, dir)?;
        bundle.extend((*part).clone());
    }

    Ok(bundle)
}
