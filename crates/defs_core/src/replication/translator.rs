use crate::assets::{AssetKey, AssetSpec, DottedName};
use crate::automation::condition_from_meta;
use crate::error::BuildResult;
use crate::partitions::partitions_from_meta;
use common::meta::tags_from_meta;
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Maps one replication stream onto its asset descriptor and upstream
/// dependency keys. Stream metadata may override the derived asset key, the
/// dependency keys and the group name; everything else is computed from the
/// dotted stream name.
pub struct ReplicationTranslator;

impl ReplicationTranslator {
    /// Explicit `asset_key` override or the derived `(namespace, raw, leaf)`.
    pub fn asset_key(&self, name: &DottedName, meta: Option<&Value>) -> BuildResult<AssetKey> {
        if let Some(raw) = meta
            .and_then(|m| m.get("asset_key"))
            .and_then(Value::as_str)
        {
            return Ok(AssetKey::parse(raw)?);
        }
        Ok(AssetKey::materialized(name))
    }

    /// Explicit `deps` override (single string or list) or the derived
    /// external placeholder for the stream itself.
    pub fn deps_asset_keys(
        &self,
        name: &DottedName,
        meta: Option<&Value>,
    ) -> BuildResult<Vec<AssetKey>> {
        let Some(deps) = meta.and_then(|m| m.get("deps")) else {
            return Ok(vec![AssetKey::external(name)]);
        };

        let mut keys = Vec::new();
        match deps {
            Value::String(raw) => keys.push(AssetKey::parse(raw)?),
            Value::Sequence(entries) => {
                for entry in entries {
                    if let Some(raw) = entry.as_str() {
                        keys.push(AssetKey::parse(raw)?);
                    }
                }
            }
            _ => {}
        }
        if keys.is_empty() {
            keys.push(AssetKey::external(name));
        }
        Ok(keys)
    }

    pub fn group_name(&self, name: &DottedName, meta: Option<&Value>) -> String {
        meta.and_then(|m| m.get("group"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.namespace.clone())
    }

    pub fn asset_spec(
        &self,
        stream_name: &str,
        meta: Option<&Value>,
        kinds: BTreeSet<String>,
    ) -> BuildResult<AssetSpec> {
        let name = DottedName::parse(stream_name)?;
        let key = self.asset_key(&name, meta)?;
        let deps = self.deps_asset_keys(&name, meta)?;
        let group_name = self.group_name(&name, meta);

        let automation_condition = match meta {
            Some(meta) => condition_from_meta(meta, stream_name)?,
            None => None,
        };
        let partitions = match meta {
            Some(meta) => partitions_from_meta(meta, stream_name)?,
            None => None,
        };
        let tags = meta.map(tags_from_meta).unwrap_or_default();

        Ok(AssetSpec {
            key,
            group_name,
            deps,
            kinds,
            tags,
            automation_condition,
            partitions,
            description: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Stage;
    use crate::automation::AutomationCondition;

    fn meta(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn full_meta() -> Value {
        meta(
            r#"
partition: hourly
partition_start_date: '2025-07-01'
automation_condition: on_schedule
tags:
  pii: ""
automation_condition_config:
  cron_schedule: '@hourly'
  cron_timezone: utc
"#,
        )
    }

    #[test]
    fn test_asset_spec_from_full_meta() {
        let translator = ReplicationTranslator;
        let spec = translator
            .asset_spec("schema.table_1", Some(&full_meta()), BTreeSet::new())
            .unwrap();

        assert_eq!(spec.key.segments(), ["schema", "raw", "table_1"]);
        assert_eq!(spec.deps[0].segments(), ["schema", "src", "table_1"]);
        assert_eq!(spec.group_name, "schema");
        assert_eq!(spec.tags.get("pii"), Some(&String::new()));
        assert!(matches!(
            spec.automation_condition,
            Some(AutomationCondition::OnSchedule { .. })
        ));
        assert!(spec.partitions.is_some());
    }

    #[test]
    fn test_meta_overrides_key_deps_and_group() {
        let translator = ReplicationTranslator;
        let meta = meta(
            "asset_key: other.raw.table\ndeps: [other.src.table]\ngroup: custom\n",
        );
        let spec = translator
            .asset_spec("schema.table_1", Some(&meta), BTreeSet::new())
            .unwrap();

        assert_eq!(spec.key.segments(), ["other", "raw", "table"]);
        assert_eq!(spec.deps[0].stage, Stage::Src);
        assert_eq!(spec.deps[0].namespace, "other");
        assert_eq!(spec.group_name, "custom");
    }

    #[test]
    fn test_string_deps_override() {
        let translator = ReplicationTranslator;
        let meta = meta("deps: schema.src.table\n");
        let deps = translator
            .deps_asset_keys(&DottedName::parse("schema.table_1").unwrap(), Some(&meta))
            .unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].segments(), ["schema", "src", "table"]);
    }

    #[test]
    fn test_bad_override_separator_is_fatal() {
        let translator = ReplicationTranslator;
        let bad = meta("asset_key: schema/raw/table\ndeps: ['schema/src/table']\n");
        let name = DottedName::parse("schema.table_1").unwrap();

        assert!(translator.asset_key(&name, Some(&bad)).is_err());
        assert!(translator.deps_asset_keys(&name, Some(&bad)).is_err());
    }

    #[test]
    fn test_no_meta_derives_everything() {
        let translator = ReplicationTranslator;
        let spec = translator
            .asset_spec("schema.table_1", None, BTreeSet::new())
            .unwrap();
        assert_eq!(spec.key.segments(), ["schema", "raw", "table_1"]);
        assert_eq!(spec.automation_condition, None);
        assert_eq!(spec.tags.len(), 0);
    }
}
