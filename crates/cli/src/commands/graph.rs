use common::config::components::project::read_project;
use common::config::error::ConfigError;
use common::config::loader::load_elt_configs;
use defs_core::error::BuildError;
use defs_core::lineage::LineageGraph;
use std::path::PathBuf;

/// Print the ELT resource lineage as DOT so it can be rendered with
/// Graphviz: `defc graph | dot -Tpng -o lineage.png`.
pub fn handle_graph(project_path: Option<PathBuf>) -> Result<(), BuildError> {
    let project = read_project(project_path)?;
    let Some(elt_dir) = &project.elt_dir else {
        return Err(ConfigError::not_found(
            "project does not configure an elt section",
        )
        .into());
    };

    let configs = load_elt_configs(elt_dir)?;
    let lineage = LineageGraph::build(&configs.resources)?;
    println!("{}", lineage.to_dot_string());
    Ok(())
}
