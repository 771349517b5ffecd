use crate::assets::{AssetKey, AssetSpec};
use crate::freshness::FreshnessCheck;
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------- Connection Resource ----------------

/// A connection with every secret/env reference resolved to a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionResource {
    pub name: String,
    pub kind: String,
    pub attributes: BTreeMap<String, String>,
}

// ---------------- Load Group Spec ----------------

/// One load pipeline handed to the orchestration boundary: a named bundle of
/// asset keys materialized together, with its execution pool. Replication
/// groups also carry the environment-qualified destination object per stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadGroupSpec {
    pub name: String,
    pub members: Vec<AssetKey>,
    pub pool: String,
    pub parallelized: bool,
    pub standalone: bool,
    pub destinations: BTreeMap<String, String>,
}

// ---------------- Sensor Spec ----------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorSpec {
    pub name: String,
    pub check_keys: Vec<AssetKey>,
}

// ---------------- Definitions Bundle ----------------

/// The terminal artifact of a build: everything the external orchestrator
/// needs, rebuilt fresh on every invocation. Owns nothing beyond plain data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefinitionsBundle {
    pub connections: BTreeMap<String, ConnectionResource>,
    pub groups: Vec<LoadGroupSpec>,
    pub assets: Vec<AssetSpec>,
    pub checks: Vec<FreshnessCheck>,
    pub sensors: Vec<SensorSpec>,
}

impl DefinitionsBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another bundle into this one. Used by the platform assembler to
    /// combine the per-surface factory outputs.
    pub fn extend(&mut self, other: DefinitionsBundle) {
        self.connections.extend(other.connections);
        self.groups.extend(other.groups);
        self.assets.extend(other.assets);
        self.checks.extend(other.checks);
        self.sensors.extend(other.sensors);
    }

    pub fn asset_keys(&self) -> Vec<&AssetKey> {
        self.assets.iter().map(|a| &a.key).collect()
    }
}
