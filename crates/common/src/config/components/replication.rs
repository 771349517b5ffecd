use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;

// ---------------- Replication Config ----------------

/// One replication document: a source/target connection pair plus the streams
/// to replicate. Stream keys are dotted `<namespace>.<leaf>` names.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationConfig {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub defaults: ReplicationDefaults,
    #[serde(default)]
    pub streams: HashMap<String, Option<StreamConfig>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplicationDefaults {
    #[serde(default)]
    pub mode: Option<ReplicationMode>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationMode {
    FullRefresh,
    Incremental,
    Snapshot,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub mode: Option<ReplicationMode>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub meta: Option<Value>,
}
