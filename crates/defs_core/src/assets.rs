use crate::automation::AutomationCondition;
use crate::partitions::PartitionsDefinition;
use common::config::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// `<namespace>.<leaf>` with exactly one separator. All three configuration
/// surfaces (ELT resources, replication streams, transform-model aliases)
/// share this format.
static DOTTED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_-]+)\.([A-Za-z0-9_-]+)$").expect("valid regex"));

// ---------------- Dotted Name ----------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DottedName {
    pub namespace: String,
    pub leaf: String,
}

impl DottedName {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let captures = DOTTED_NAME
            .captures(raw)
            .ok_or_else(|| ConfigError::name_format(raw))?;
        Ok(Self {
            namespace: captures[1].to_string(),
            leaf: captures[2].to_string(),
        })
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.leaf)
    }
}

// ---------------- Stage ----------------

/// Pipeline stage encoded in the middle segment of an asset key. `Raw` marks
/// tables materialized by this system, `Src` marks external upstream
/// placeholders, `Stg` marks transform-model outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Src,
    Raw,
    Stg,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Src => "src",
            Stage::Raw => "raw",
            Stage::Stg => "stg",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "src" => Some(Stage::Src),
            "raw" => Some(Stage::Raw),
            "stg" => Some(Stage::Stg),
            _ => None,
        }
    }
}

// ---------------- Asset Key ----------------

/// Structured three-part key `(namespace, stage, leaf)` identifying one asset
/// at the orchestration boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AssetKey {
    pub namespace: String,
    pub stage: Stage,
    pub leaf: String,
}

impl AssetKey {
    fn from_name(name: &DottedName, stage: Stage) -> Self {
        Self {
            namespace: name.namespace.clone(),
            stage,
            leaf: name.leaf.clone(),
        }
    }

    /// Key for a table materialized by this system.
    pub fn materialized(name: &DottedName) -> Self {
        Self::from_name(name, Stage::Raw)
    }

    /// Key for an external upstream placeholder.
    pub fn external(name: &DottedName) -> Self {
        Self::from_name(name, Stage::Src)
    }

    /// Key for a transform-model output.
    pub fn staged(name: &DottedName) -> Self {
        Self::from_name(name, Stage::Stg)
    }

    /// Parse an explicit `<namespace>.<stage>.<leaf>` override from stream
    /// metadata. The stage segment must be one of the known markers.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.split('.').collect();
        let &[namespace, stage, leaf] = parts.as_slice() else {
            return Err(ConfigError::name_format(raw));
        };
        let stage = Stage::parse(stage).ok_or_else(|| {
            ConfigError::parse_error(format!(
                "'{}' has unknown stage segment '{}', expected src, raw or stg",
                raw, stage
            ))
        })?;
        Ok(Self {
            namespace: namespace.to_string(),
            stage,
            leaf: leaf.to_string(),
        })
    }

    pub fn segments(&self) -> [&str; 3] {
        [&self.namespace, self.stage.as_str(), &self.leaf]
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.stage.as_str(), self.leaf)
    }
}

// ---------------- Asset Spec ----------------

/// Fully derived descriptor for one asset, handed across the orchestration
/// boundary as part of the definitions bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetSpec {
    pub key: AssetKey,
    pub group_name: String,
    pub deps: Vec<AssetKey>,
    pub kinds: BTreeSet<String>,
    pub tags: BTreeMap<String, String>,
    pub automation_condition: Option<AutomationCondition>,
    pub partitions: Option<PartitionsDefinition>,
    pub description: Option<String>,
}

impl AssetSpec {
    pub fn external(key: AssetKey, kinds: BTreeSet<String>) -> Self {
        let group_name = key.namespace.clone();
        Self {
            key,
            group_name,
            deps: Vec::new(),
            kinds,
            tags: BTreeMap::new(),
            automation_condition: None,
            partitions: None,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_name() {
        let name = DottedName::parse("finance.accounts").unwrap();
        assert_eq!(name.namespace, "finance");
        assert_eq!(name.leaf, "accounts");
    }

    #[test]
    fn test_parse_dotted_name_is_deterministic() {
        let a = DottedName::parse("a.b").unwrap();
        let b = DottedName::parse("a.b").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            DottedName::parse("invalidname"),
            Err(ConfigError::NameFormat { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_extra_separator() {
        assert!(matches!(
            DottedName::parse("a.b.c"),
            Err(ConfigError::NameFormat { .. })
        ));
    }

    #[test]
    fn test_derived_keys_fix_the_stage_segment() {
        let name = DottedName::parse("finance.accounts").unwrap();
        assert_eq!(
            AssetKey::materialized(&name).segments(),
            ["finance", "raw", "accounts"]
        );
        assert_eq!(
            AssetKey::external(&name).segments(),
            ["finance", "src", "accounts"]
        );
        assert_eq!(
            AssetKey::staged(&name).segments(),
            ["finance", "stg", "accounts"]
        );
    }

    #[test]
    fn test_asset_key_parse_override() {
        let key = AssetKey::parse("finance.raw.accounts").unwrap();
        assert_eq!(key.stage, Stage::Raw);

        assert!(AssetKey::parse("finance/raw/accounts").is_err());
        assert!(AssetKey::parse("finance.gold.accounts").is_err());
    }
}
