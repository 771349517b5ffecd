use crate::assets::{AssetKey, AssetSpec, DottedName};
use crate::automation::condition_from_meta;
use crate::bundle::{DefinitionsBundle, LoadGroupSpec};
use crate::context::BuildContext;
use crate::elt::translator::EltTranslator;
use crate::entry::EntryRegistry;
use crate::error::{BuildError, BuildResult};
use crate::freshness::{FreshnessCheck, FreshnessCheckKind};
use crate::grouping::resolve_groupings;
use crate::lineage::LineageGraph;
use common::config::components::resources::ResourceConfig;
use common::config::loader::load_elt_configs;
use common::meta::{get_nested, orchestration_meta};
use common::naming::Environment;
use log::info;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Builds the definitions bundle for a directory of ELT resource/source
/// declarations: one asset per resource, one load group per grouping,
/// freshness checks from resource metadata, and external stub assets for
/// resources fed directly by upstream systems.
pub struct Factory;

impl Factory {
    pub fn build_definitions(
        ctx: &BuildContext,
        registry: &EntryRegistry,
        config_dir: &Path,
    ) -> BuildResult<Arc<DefinitionsBundle>> {
        ctx.cached_or_build("elt", config_dir, || {
            Self::build(ctx.environment(), registry, config_dir)
        })
    }

    fn build(
        environment: &Environment,
        registry: &EntryRegistry,
        config_dir: &Path,
    ) -> BuildResult<DefinitionsBundle> {
        let configs = load_elt_configs(config_dir)?;
        info!(
            "building elt definitions from {} ({} resources, {} groupings)",
            config_dir.display(),
            configs.resources.len(),
            configs.groupings.len()
        );

        // Fail fast on malformed names and unregistered entry points before
        // any derivation work happens.
        let mut resource_names: Vec<&String> = configs.resources.keys().collect();
        resource_names.sort();
        for name in &resource_names {
            DottedName::parse(name)?;
            let resource = &configs.resources[*name];
            registry.resolve(&resource.entry, name)?;
        }

        let lineage = LineageGraph::build(&configs.resources)?;
        let groupings = resolve_groupings(&configs.resources, &configs.groupings)?;

        let mut bundle = DefinitionsBundle::new();

        for grouping in &groupings {
            let group_meta = orchestration_meta(grouping.meta.as_ref());
            let group_condition = match group_meta {
                Some(meta) => condition_from_meta(meta, &grouping.name)?,
                None => None,
            };

            let translator = EltTranslator {
                lineage: &lineage,
                group_condition,
            };

            let mut members = Vec::new();
            for member in &grouping.members {
                let resource = &configs.resources[member];
                let spec = translator.asset_spec(resource)?;
                members.push(spec.key.clone());
                bundle.assets.push(spec);
            }

            let namespace = grouping
                .name
                .split('.')
                .next()
                .unwrap_or(grouping.name.as_str())
                .to_string();

            bundle.groups.push(LoadGroupSpec {
                name: grouping.name.clone(),
                members,
                pool: environment.schema_name(&namespace),
                parallelized: grouping.parallelized,
                standalone: grouping.standalone,
                destinations: Default::default(),
            });
        }

        for name in &resource_names {
            let resource = &configs.resources[*name];
            if let Some(check) = Self::freshness_check(resource)? {
                bundle.checks.push(check);
            }
        }

        // Stub external assets so upstream materializations can be triggered
        // outside this system.
        for name in &resource_names {
            let resource = &configs.resources[*name];
            if resource.data_from.is_none() {
                let dotted = DottedName::parse(name)?;
                let kinds: BTreeSet<String> = resource.kinds.iter().cloned().collect();
                bundle
                    .assets
                    .push(AssetSpec::external(AssetKey::external(&dotted), kinds));
            }
        }

        Ok(bundle)
    }

    /// ELT resources declare staleness with a single
    /// `freshness_lower_bound_delta_seconds` key; presence selects the simple
    /// last-update check.
    fn freshness_check(resource: &ResourceConfig) -> BuildResult<Option<FreshnessCheck>> {
        let Some(meta) = orchestration_meta(resource.meta.as_ref()) else {
            return Ok(None);
        };
        let Some(delta) = get_nested(meta, &["freshness_lower_bound_delta_seconds"]) else {
            return Ok(None);
        };

        let seconds = match delta {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
        .filter(|s| *s > 0.0)
        .ok_or_else(|| {
            BuildError::freshness_args(format!(
                "Error creating freshness check for '{}': \
                 freshness_lower_bound_delta_seconds must be a positive number, got {:?}",
                resource.name, delta
            ))
        })?;

        let dotted = DottedName::parse(&resource.name)?;
        Ok(Some(FreshnessCheck {
            asset_key: AssetKey::materialized(&dotted),
            kind: FreshnessCheckKind::LastUpdate,
            lower_bound_delta: Some(Duration::from_secs_f64(seconds)),
            deadline_cron: None,
            timezone: None,
            partition: None,
            severity: None,
        }))
    }
}
