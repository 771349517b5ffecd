use crate::assets::{AssetKey, AssetSpec, DottedName};
use crate::automation::{condition_from_meta, AutomationCondition};
use crate::error::BuildResult;
use crate::lineage::LineageGraph;
use crate::partitions::partitions_from_meta;
use common::config::components::resources::ResourceConfig;
use common::meta::{orchestration_meta, tags_from_meta};
use std::collections::BTreeSet;

/// Maps one ELT resource declaration onto its asset descriptor. Instantiated
/// per grouping so the grouping-level automation condition can act as the
/// fallback for members that declare none of their own.
pub struct EltTranslator<'a> {
    pub lineage: &'a LineageGraph,
    pub group_condition: Option<AutomationCondition>,
}

impl EltTranslator<'_> {
    pub fn asset_spec(&self, resource: &ResourceConfig) -> BuildResult<AssetSpec> {
        let name = DottedName::parse(&resource.name)?;
        let key = AssetKey::materialized(&name);

        // A resource fed by another resource depends on the terminal ancestor
        // of its data_from chain; everything else depends on an external
        // placeholder standing in for the upstream system.
        let dep = match self.lineage.terminal_ancestor(&resource.name) {
            Some(ancestor) => AssetKey::materialized(&DottedName::parse(ancestor)?),
            None => AssetKey::external(&name),
        };

        let meta = orchestration_meta(resource.meta.as_ref());

        let own_condition = match meta {
            Some(meta) => condition_from_meta(meta, &resource.name)?,
            None => None,
        };
        let automation_condition = own_condition.or_else(|| self.group_condition.clone());

        let partitions = match meta {
            Some(meta) => partitions_from_meta(meta, &resource.name)?,
            None => None,
        };

        let mut tags = resource.tags.clone().unwrap_or_default();
        if let Some(meta) = meta {
            tags.extend(tags_from_meta(meta));
        }

        Ok(AssetSpec {
            group_name: name.namespace.clone(),
            deps: vec![dep],
            kinds: resource.kinds.iter().cloned().collect::<BTreeSet<_>>(),
            tags: tags.into_iter().collect(),
            automation_condition,
            partitions,
            description: None,
            key,
        })
    }
}
