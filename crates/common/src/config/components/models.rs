use crate::config::traits::ConfigName;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::ops::Deref;

// ---------------- Transform Model Config ----------------

/// One declared transform model. The alias is the dotted destination name the
/// model materializes into.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl ConfigName for ModelConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default)]
pub struct ModelConfigs(HashMap<String, ModelConfig>);

impl ModelConfigs {
    pub fn new(configs: HashMap<String, ModelConfig>) -> Self {
        Self(configs)
    }

    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

impl Deref for ModelConfigs {
    type Target = HashMap<String, ModelConfig>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for ModelConfigs {
    type Item = (String, ModelConfig);
    type IntoIter = std::collections::hash_map::IntoIter<String, ModelConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<HashMap<String, ModelConfig>> for ModelConfigs {
    fn from(value: HashMap<String, ModelConfig>) -> Self {
        Self::new(value)
    }
}
