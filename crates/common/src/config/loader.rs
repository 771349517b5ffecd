use crate::config::components::connections::ConnectionConfig;
use crate::config::components::models::{ModelConfig, ModelConfigs};
use crate::config::components::replication::{ReplicationConfig, ReplicationDefaults, StreamConfig};
use crate::config::components::resources::{
    ResourceConfig, ResourceConfigs, SourceGroupingConfig, SourceGroupingConfigs,
};
use crate::config::error::ConfigError;
use crate::config::traits::FromConfigList;
use crate::utils::paths_with_exts;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_EXTS: [&str; 2] = ["yaml", "yml"];

// ---------------- Document shapes ----------------

#[derive(Debug, Default, Deserialize)]
struct EltDocument {
    #[serde(default)]
    resources: HashMap<String, Option<ResourceConfig>>,
    #[serde(default)]
    sources: HashMap<String, Option<SourceGroupingConfig>>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplicationDocument {
    #[serde(default)]
    connections: HashMap<String, Option<ConnectionConfig>>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    defaults: ReplicationDefaults,
    #[serde(default)]
    streams: HashMap<String, Option<StreamConfig>>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelsDocument {
    #[serde(default)]
    models: HashMap<String, Option<ModelConfig>>,
}

/// Everything the ELT factory needs from one configuration directory.
#[derive(Debug, Default)]
pub struct EltConfigs {
    pub resources: ResourceConfigs,
    pub groupings: SourceGroupingConfigs,
}

/// Everything the replication factory needs from one configuration directory.
#[derive(Debug, Default)]
pub struct ReplicationConfigs {
    pub connections: HashMap<String, ConnectionConfig>,
    pub replications: Vec<ReplicationConfig>,
}

// ---------------- Parsing ----------------

/// Parse one document, skipping blank/null files. Malformed YAML is an error;
/// an empty file is not.
fn parse_document<D>(path: &Path) -> Result<Option<D>, ConfigError>
where
    D: DeserializeOwned,
{
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        debug!("skipping empty config document {}", path.display());
        return Ok(None);
    }
    let value: Value = serde_yaml::from_str(&raw).map_err(|err| {
        ConfigError::parse_error(format!("{}: {}", path.display(), err))
    })?;
    if value.is_null() {
        return Ok(None);
    }
    let doc = serde_yaml::from_value(value).map_err(|err| {
        ConfigError::parse_error(format!("{}: {}", path.display(), err))
    })?;
    Ok(Some(doc))
}

/// Tracks which file first declared each logical name so that a second
/// declaration can be reported as a hard error instead of silently winning.
#[derive(Default)]
struct SeenNames(HashMap<String, PathBuf>);

impl SeenNames {
    fn claim(&mut self, name: &str, path: &Path) -> Result<(), ConfigError> {
        if let Some(first) = self.0.get(name) {
            return Err(ConfigError::duplicate_name(name, first, path));
        }
        self.0.insert(name.to_string(), path.to_path_buf());
        Ok(())
    }
}

/// The subdirectory namespace used to qualify a resource's entry point, so a
/// registry lookup can stay relative to the configuration tree.
fn entry_namespace(config_path: &Path) -> Option<String> {
    config_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

// ---------------- Loaders ----------------

/// Discover and merge every ELT declaration under `root`. Resource entry
/// points are namespaced by their containing subdirectory; duplicate resource
/// or grouping names across files are fatal.
pub fn load_elt_configs(root: &Path) -> Result<EltConfigs, ConfigError> {
    if !root.exists() {
        return Err(ConfigError::incorrect_path(root));
    }

    let mut resources: Vec<ResourceConfig> = Vec::new();
    let mut groupings: Vec<SourceGroupingConfig> = Vec::new();
    let mut seen_resources = SeenNames::default();
    let mut seen_groupings = SeenNames::default();

    for path in paths_with_exts(root, &CONFIG_EXTS) {
        let Some(doc) = parse_document::<EltDocument>(&path)? else {
            continue;
        };

        for (name, config) in doc.resources {
            let Some(mut config) = config else { continue };
            seen_resources.claim(&name, &path)?;
            config.name = name;
            config.config_path = path.clone();
            if let Some(ns) = entry_namespace(&path) {
                config.entry = format!("{}.{}", ns, config.entry);
            }
            resources.push(config);
        }

        for (name, config) in doc.sources {
            let Some(mut config) = config else { continue };
            seen_groupings.claim(&name, &path)?;
            config.name = name;
            groupings.push(config);
        }
    }

    Ok(EltConfigs {
        resources: ResourceConfigs::from_config_list(resources),
        groupings: SourceGroupingConfigs::from_config_list(groupings),
    })
}

/// Discover connection blocks and replication documents under `root`. A
/// document is a replication when it declares both a source connection and at
/// least one stream; connection blocks may live in the same or separate files.
pub fn load_replication_configs(root: &Path) -> Result<ReplicationConfigs, ConfigError> {
    if !root.exists() {
        return Err(ConfigError::incorrect_path(root));
    }

    let mut connections = HashMap::new();
    let mut replications = Vec::new();
    let mut seen_connections = SeenNames::default();

    for path in paths_with_exts(root, &CONFIG_EXTS) {
        let Some(doc) = parse_document::<ReplicationDocument>(&path)? else {
            continue;
        };

        for (name, config) in doc.connections {
            let Some(mut config) = config else { continue };
            seen_connections.claim(&name, &path)?;
            config.name = name.clone();
            connections.insert(name, config);
        }

        match (doc.source, doc.streams.is_empty()) {
            (Some(source), false) => {
                let target = doc.target.ok_or_else(|| {
                    ConfigError::parse_error(format!(
                        "{}: replication declares streams but no target connection",
                        path.display()
                    ))
                })?;
                replications.push(ReplicationConfig {
                    source,
                    target,
                    defaults: doc.defaults,
                    streams: doc.streams,
                });
            }
            (Some(_), true) => {
                return Err(ConfigError::ParseError {
                    context: crate::diag!(
                        "{}: replication declares a source connection but no streams",
                        path.display()
                    ),
                    source: None,
                });
            }
            (None, false) => {
                return Err(ConfigError::ParseError {
                    context: crate::diag!(
                        "{}: streams declared without a source connection",
                        path.display()
                    ),
                    source: None,
                });
            }
            (None, true) => {}
        }
    }

    Ok(ReplicationConfigs {
        connections,
        replications,
    })
}

/// Discover and merge transform-model declarations under `root`.
pub fn load_model_configs(root: &Path) -> Result<ModelConfigs, ConfigError> {
    if !root.exists() {
        return Err(ConfigError::incorrect_path(root));
    }

    let mut models: Vec<ModelConfig> = Vec::new();
    let mut seen = SeenNames::default();

    for path in paths_with_exts(root, &CONFIG_EXTS) {
        let Some(doc) = parse_document::<ModelsDocument>(&path)? else {
            continue;
        };
        for (name, config) in doc.models {
            let Some(mut config) = config else { continue };
            seen.claim(&name, &path)?;
            config.name = name;
            models.push(config);
        }
    }

    Ok(ModelConfigs::from_config_list(models))
}
