use crate::assets::{AssetKey, AssetSpec, DottedName};
use crate::bundle::{ConnectionResource, DefinitionsBundle, LoadGroupSpec, SensorSpec};
use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::freshness::build_freshness_check;
use crate::replication::translator::ReplicationTranslator;
use common::config::components::replication::ReplicationConfig;
use common::config::error::ConfigError;
use common::config::loader::load_replication_configs;
use common::meta::orchestration_meta;
use common::naming::Environment;
use log::{debug, info};
use secrets::{SecretResolver, SecretStore};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

const FRESHNESS_SENSOR_NAME: &str = "replication_freshness_checks_sensor";

/// Builds the definitions bundle for a directory of connection and
/// replication declarations: resolved connection resources, one asset per
/// stream plus external dependency stubs, merged freshness checks, and a
/// sensor watching those checks.
pub struct Factory;

impl Factory {
    pub fn build_definitions<S: SecretStore>(
        ctx: &BuildContext,
        resolver: &mut SecretResolver<S>,
        config_dir: &Path,
    ) -> BuildResult<Arc<DefinitionsBundle>> {
        ctx.cached_or_build("replication", config_dir, || {
            Self::build(ctx.environment(), resolver, config_dir)
        })
    }

    fn build<S: SecretStore>(
        environment: &Environment,
        resolver: &mut SecretResolver<S>,
        config_dir: &Path,
    ) -> BuildResult<DefinitionsBundle> {
        let configs = load_replication_configs(config_dir)?;
        info!(
            "building replication definitions from {} ({} connections, {} replications)",
            config_dir.display(),
            configs.connections.len(),
            configs.replications.len()
        );

        let mut connections: BTreeMap<String, ConnectionResource> = BTreeMap::new();
        for (name, connection) in &configs.connections {
            let attributes = connection
                .attributes
                .iter()
                .map(|(attr, value)| (attr.clone(), resolver.resolve_reference(value)))
                .collect();
            connections.insert(
                name.clone(),
                ConnectionResource {
                    name: name.clone(),
                    kind: connection.kind.clone(),
                    attributes,
                },
            );
        }

        let mut bundle = DefinitionsBundle::new();
        for replication in &configs.replications {
            let part = Self::build_replication(environment, &connections, replication)?;
            bundle.extend(part);
        }
        bundle.connections = connections;

        if !bundle.checks.is_empty() {
            bundle.sensors.push(SensorSpec {
                name: FRESHNESS_SENSOR_NAME.to_string(),
                check_keys: bundle.checks.iter().map(|c| c.asset_key.clone()).collect(),
            });
        }

        Ok(bundle)
    }

    fn build_replication(
        environment: &Environment,
        connections: &BTreeMap<String, ConnectionResource>,
        replication: &ReplicationConfig,
    ) -> BuildResult<DefinitionsBundle> {
        let source = connections
            .get(&replication.source)
            .ok_or_else(|| ConfigError::missing_connection(&replication.source))?;
        if !connections.contains_key(&replication.target) {
            return Err(ConfigError::missing_connection(&replication.target).into());
        }

        let translator = ReplicationTranslator;
        let kinds: BTreeSet<String> = BTreeSet::from([source.kind.clone()]);
        let default_meta = orchestration_meta(replication.defaults.meta.as_ref());

        let mut part = DefinitionsBundle::new();
        let mut members = Vec::new();
        let mut destinations = BTreeMap::new();

        let mut stream_names: Vec<&String> = replication.streams.keys().collect();
        stream_names.sort();

        for stream_name in stream_names {
            let stream = replication.streams[stream_name].clone().unwrap_or_default();
            if stream.disabled {
                debug!("stream '{}' is disabled, skipping", stream_name);
                continue;
            }
            let name = DottedName::parse(stream_name)?;

            // Destination objects are rewritten through the naming normalizer
            // so dev builds land in user-qualified schemas. The per-stream
            // object wins over the replication default.
            if let Some(object) = stream.object.as_ref().or(replication.defaults.object.as_ref())
            {
                destinations.insert(
                    stream_name.clone(),
                    Self::qualified_object(environment, object)?,
                );
            }

            let stream_meta = orchestration_meta(stream.meta.as_ref());
            let spec = translator.asset_spec(stream_name, stream_meta, kinds.clone())?;

            for dep in &spec.deps {
                part.assets
                    .push(AssetSpec::external(dep.clone(), kinds.clone()));
            }

            if let Some(check) =
                build_freshness_check(AssetKey::materialized(&name), stream_meta, default_meta)?
            {
                part.checks.push(check);
            }

            members.push(spec.key.clone());
            part.assets.push(spec);
        }

        part.groups.push(LoadGroupSpec {
            name: format!("{}_assets", replication.source),
            members,
            pool: "replication".to_string(),
            parallelized: false,
            standalone: false,
            destinations,
        });

        Ok(part)
    }

    /// `<schema>.<table>` destination with the schema qualified for the
    /// active environment.
    fn qualified_object(environment: &Environment, object: &str) -> BuildResult<String> {
        let dotted = DottedName::parse(object)?;
        Ok(format!(
            "{}.{}",
            environment.schema_name(&dotted.namespace),
            dotted.leaf
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Stage;
    use crate::freshness::FreshnessCheckKind;
    use common::naming::{Environment, Target};
    use secrets::MemoryStore;
    use std::time::Duration;
    use test_utils::{TempProject, TEST_MUTEX};

    const PROJECT: &[(&str, &str)] = &[
        (
            "connections.yaml",
            r#"
connections:
  MY_PG:
    type: postgres
    host: env.SOURCE__HOST
    user: postgres
    password: secret.SOURCE__PASSWORD
    port: "5432"
  WAREHOUSE:
    type: warehouse
    host: secret.DESTINATION__HOST
    password: secret.DESTINATION__PASSWORD
"#,
        ),
        (
            "finance.yaml",
            r#"
source: MY_PG
target: WAREHOUSE
defaults:
  mode: incremental
  object: finance.accounts
  meta:
    orchestration:
      freshness_check:
        lower_bound_delta_seconds: 7200
streams:
  public.accounts:
    object: finance.accounts
    primary_key: id
    meta:
      orchestration:
        freshness_check:
          lower_bound_delta_seconds: 3600
  public.transfers:
"#,
        ),
    ];

    fn resolver() -> SecretResolver<MemoryStore> {
        let mut store = MemoryStore::default();
        store.insert("SOURCE", "PASSWORD", "sekrit");
        store.insert("DESTINATION", "HOST", "wh.example.com");
        store.insert("DESTINATION", "PASSWORD", "hunter2");
        SecretResolver::new(store)
    }

    fn ctx() -> BuildContext {
        BuildContext::new(Environment::new(Target::Other, None))
    }

    #[test]
    fn test_build_definitions_end_to_end() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let project = TempProject::new(PROJECT);
        let ctx = ctx();
        let mut resolver = resolver();

        let bundle =
            Factory::build_definitions(&ctx, &mut resolver, project.path()).unwrap();

        // Connections resolved, kinds recorded.
        assert_eq!(bundle.connections.len(), 2);
        let pg = &bundle.connections["MY_PG"];
        assert_eq!(pg.kind, "postgres");
        assert_eq!(pg.attributes["password"], "sekrit");
        assert_eq!(pg.attributes["port"], "5432");
        let wh = &bundle.connections["WAREHOUSE"];
        assert_eq!(wh.attributes["host"], "wh.example.com");

        // One raw asset and one src stub per stream.
        let raw: Vec<_> = bundle
            .assets
            .iter()
            .filter(|a| a.key.stage == Stage::Raw)
            .collect();
        assert_eq!(raw.len(), 2);
        let stubs: Vec<_> = bundle
            .assets
            .iter()
            .filter(|a| a.key.stage == Stage::Src)
            .collect();
        assert_eq!(stubs.len(), 2);
        assert!(stubs.iter().all(|s| s.kinds.contains("postgres")));

        // Stream-level freshness overrides the default; the stream without
        // its own config inherits the default.
        assert_eq!(bundle.checks.len(), 2);
        let accounts = bundle
            .checks
            .iter()
            .find(|c| c.asset_key.leaf == "accounts")
            .unwrap();
        assert_eq!(accounts.kind, FreshnessCheckKind::LastUpdate);
        assert_eq!(accounts.lower_bound_delta, Some(Duration::from_secs(3600)));
        let transfers = bundle
            .checks
            .iter()
            .find(|c| c.asset_key.leaf == "transfers")
            .unwrap();
        assert_eq!(transfers.lower_bound_delta, Some(Duration::from_secs(7200)));

        // One sensor watching every check.
        assert_eq!(bundle.sensors.len(), 1);
        assert_eq!(bundle.sensors[0].check_keys.len(), 2);

        // Group carries the qualified destinations.
        assert_eq!(bundle.groups.len(), 1);
        let group = &bundle.groups[0];
        assert_eq!(group.name, "MY_PG_assets");
        assert_eq!(group.destinations["public.accounts"], "FINANCE.accounts");
        assert_eq!(group.destinations["public.transfers"], "FINANCE.accounts");
    }

    #[test]
    fn test_dev_environment_qualifies_destination_schema() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let project = TempProject::new(PROJECT);
        let ctx = BuildContext::new(Environment::new(Target::Dev, Some("alice".into())));
        let mut resolver = resolver();

        let bundle =
            Factory::build_definitions(&ctx, &mut resolver, project.path()).unwrap();
        let group = &bundle.groups[0];
        assert_eq!(
            group.destinations["public.accounts"],
            "FINANCE__ALICE.accounts"
        );
    }

    #[test]
    fn test_missing_connection_reference_is_fatal() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let project = TempProject::new(&[(
            "finance.yaml",
            "source: NOWHERE\ntarget: ALSO_NOWHERE\nstreams:\n  a.b:\n",
        )]);

        let err = Factory::build_definitions(&ctx(), &mut resolver(), project.path())
            .unwrap_err();
        assert!(err.to_string().contains("NOWHERE"));
    }

    #[test]
    fn test_missing_secret_resolves_empty_with_diagnostic() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let project = TempProject::new(&[(
            "connections.yaml",
            "connections:\n  C:\n    type: postgres\n    password: secret.NO__SUCH\n",
        )]);
        let ctx = ctx();
        let mut resolver = SecretResolver::new(MemoryStore::default());

        let bundle =
            Factory::build_definitions(&ctx, &mut resolver, project.path()).unwrap();
        assert_eq!(bundle.connections["C"].attributes["password"], "");
        assert_eq!(resolver.diagnostics().len(), 1);
    }
}
