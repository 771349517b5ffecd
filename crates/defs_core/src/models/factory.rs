use crate::assets::{AssetKey, AssetSpec, DottedName};
use crate::automation::condition_from_meta;
use crate::bundle::DefinitionsBundle;
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::partitions::partitions_from_meta;
use common::config::loader::load_model_configs;
use common::meta::{orchestration_meta, tags_from_meta};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Builds asset descriptors for the transform-model surface. Each model's
/// dotted alias becomes a `(namespace, stg, leaf)` asset keyed off the tables
/// the loaders materialize.
pub struct Factory;

impl Factory {
    pub fn build_definitions(
        ctx: &BuildContext,
        config_dir: &Path,
    ) -> BuildResult<Arc<DefinitionsBundle>> {
        ctx.cached_or_build("models", config_dir, || Self::build(config_dir))
    }

    fn build(config_dir: &Path) -> BuildResult<DefinitionsBundle> {
        let models = load_model_configs(config_dir)?;
        info!(
            "building model definitions from {} ({} models)",
            config_dir.display(),
            models.len()
        );

        let mut bundle = DefinitionsBundle::new();

        let mut names: Vec<&String> = models.keys().collect();
        names.sort();

        for name in names {
            let model = &models[name];
            let alias = DottedName::parse(&model.alias)?;
            let key = AssetKey::staged(&alias);

            let mut deps = Vec::new();
            for upstream in &model.depends_on {
                let upstream = DottedName::parse(upstream)?;
                deps.push(AssetKey::materialized(&upstream));
            }

            let meta = orchestration_meta(model.meta.as_ref());
            let automation_condition = match meta {
                Some(meta) => condition_from_meta(meta, name)?,
                None => None,
            };
            let partitions = match meta {
                Some(meta) => partitions_from_meta(meta, name)?,
                None => None,
            };

            let mut tags = model.tags.clone().unwrap_or_default();
            if let Some(meta) = meta {
                tags.extend(tags_from_meta(meta));
            }

            bundle.assets.push(AssetSpec {
                group_name: alias.namespace.clone(),
                deps,
                kinds: Default::default(),
                tags: tags.into_iter().collect(),
                automation_condition,
                partitions,
                description: model.description.clone(),
                key,
            });
        }

        Ok(bundle)
    }
}
