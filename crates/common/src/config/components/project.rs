use crate::config::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// ---------------- Platform Project Config ----------------
#[derive(Debug, Deserialize)]
pub struct PlatformProjectConfig {
    pub name: String,
    pub version: String,
    pub paths: PathsConfig,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub elt: Option<String>,
    #[serde(default)]
    pub replication: Option<String>,
    #[serde(default)]
    pub models: Option<String>,
}

/// Project config with every configured section path resolved relative to the
/// directory containing `platform-project.yml`.
#[derive(Debug)]
pub struct ResolvedProjectConfig {
    pub project: PlatformProjectConfig,
    pub root: PathBuf,
    pub elt_dir: Option<PathBuf>,
    pub replication_dir: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
}

pub fn read_project(project_root: Option<PathBuf>) -> Result<ResolvedProjectConfig, ConfigError> {
    let config_file_path = if let Some(root) = project_root {
        root.join("platform-project.yml")
    } else {
        "platform-project.yml".into()
    };

    let file = fs::File::open(&config_file_path)?;
    let project: PlatformProjectConfig = serde_yaml::from_reader(file)?;

    let root = config_file_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let resolve = |section: &Option<String>| -> Result<Option<PathBuf>, ConfigError> {
        match section {
            Some(rel) => {
                let path = resolve_path(&root, Path::new(rel));
                if !path.exists() {
                    return Err(ConfigError::incorrect_path(&path));
                }
                Ok(Some(path))
            }
            None => Ok(None),
        }
    };

    let elt_dir = resolve(&project.paths.elt)?;
    let replication_dir = resolve(&project.paths.replication)?;
    let models_dir = resolve(&project.paths.models)?;

    Ok(ResolvedProjectConfig {
        project,
        root,
        elt_dir,
        replication_dir,
        models_dir,
    })
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
