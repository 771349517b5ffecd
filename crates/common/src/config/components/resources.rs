use crate::config::traits::ConfigName;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

// ---------------- Resource Config ----------------

/// How loaded rows are written into the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteDisposition {
    Append,
    Replace,
    Merge,
}

/// Positional arguments for a second-order entry point. YAML authors may
/// write a single scalar or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Arguments {
    Single(Value),
    Many(Vec<Value>),
}

impl Arguments {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Arguments::Single(v) => vec![v],
            Arguments::Many(vs) => vs,
        }
    }
}

/// One declared data resource, keyed by its dotted `<namespace>.<leaf>` name.
/// `name` and `config_path` are injected by the loader; `entry` is rewritten
/// at load time to be namespaced by the containing subdirectory.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub name: String,
    pub entry: String,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub keyword_arguments: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub write_disposition: Option<WriteDisposition>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub data_from: Option<String>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl ConfigName for ResourceConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

//  ---------------- Resource Configs ----------------
#[derive(Debug, Default)]
pub struct ResourceConfigs(HashMap<String, ResourceConfig>);

impl ResourceConfigs {
    pub fn new(configs: HashMap<String, ResourceConfig>) -> Self {
        Self(configs)
    }

    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

impl Deref for ResourceConfigs {
    type Target = HashMap<String, ResourceConfig>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ResourceConfigs {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for ResourceConfigs {
    type Item = (String, ResourceConfig);
    type IntoIter = std::collections::hash_map::IntoIter<String, ResourceConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<HashMap<String, ResourceConfig>> for ResourceConfigs {
    fn from(value: HashMap<String, ResourceConfig>) -> Self {
        Self::new(value)
    }
}

// ---------------- Source Grouping Config ----------------

/// A named bundle of resources loaded together. Members are referenced by
/// their dotted resource names and must all resolve to declared resources.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceGroupingConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub parallelized: bool,
    #[serde(default)]
    pub max_table_nesting: Option<u32>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl ConfigName for SourceGroupingConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default)]
pub struct SourceGroupingConfigs(HashMap<String, SourceGroupingConfig>);

impl SourceGroupingConfigs {
    pub fn new(configs: HashMap<String, SourceGroupingConfig>) -> Self {
        Self(configs)
    }

    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

impl Deref for SourceGroupingConfigs {
    type Target = HashMap<String, SourceGroupingConfig>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SourceGroupingConfigs {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for SourceGroupingConfigs {
    type Item = (String, SourceGroupingConfig);
    type IntoIter = std::collections::hash_map::IntoIter<String, SourceGroupingConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<HashMap<String, SourceGroupingConfig>> for SourceGroupingConfigs {
    fn from(value: HashMap<String, SourceGroupingConfig>) -> Self {
        Self::new(value)
    }
}
