use common::naming::{Environment, Target};
use defs_core::assets::Stage;
use defs_core::context::BuildContext;
use defs_core::entry::EntryRegistry;
use defs_core::freshness::FreshnessCheckKind;
use defs_core::platform::build_platform_definitions;
use secrets::{MemoryStore, SecretResolver};
use serde_json::json;
use std::time::Duration;
use test_utils::{get_example_project_dir, with_chdir, TEST_MUTEX};

fn registry() -> EntryRegistry {
    let mut registry = EntryRegistry::new();
    registry.register("my_api.data.users", |_| Ok(vec![json!({"id": 1})]));
    registry.register("my_api.data.orders", |_| Ok(vec![json!({"id": 1})]));
    registry.register("my_api.data.order_items", |args| {
        Ok(vec![json!({"scope": args.arguments.first()})])
    });
    registry.register("open_data.data.taxi_trips", |_| Ok(vec![json!({"id": 1})]));
    registry
}

fn resolver() -> SecretResolver<MemoryStore> {
    let mut store = MemoryStore::default();
    store.insert("SOURCE", "PASSWORD", "pg_password");
    store.insert("DESTINATION", "HOST", "wh.example.com");
    store.insert("DESTINATION", "USER", "loader");
    store.insert("DESTINATION", "PASSWORD", "wh_password");
    store.insert("DESTINATION", "DATABASE", "analytics");
    store.insert("DESTINATION", "ROLE", "loader_role");
    SecretResolver::new(store)
}

#[test]
fn test_example_project_builds_complete_bundle() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init()
        .ok();
    let _lock = TEST_MUTEX.lock().unwrap();
    let ctx = BuildContext::new(Environment::new(Target::Other, None));
    let registry = registry();
    let mut resolver = resolver();

    let bundle = build_platform_definitions(
        &ctx,
        &registry,
        &mut resolver,
        Some(get_example_project_dir()),
    )
    .expect("example project should build");

    // Both replication connections resolved with concrete values.
    assert_eq!(bundle.connections.len(), 2);
    assert_eq!(
        bundle.connections["WAREHOUSE"].attributes["host"],
        "wh.example.com"
    );
    assert!(resolver.diagnostics().is_empty());

    // ELT: one named grouping and one standalone.
    let my_api = bundle.groups.iter().find(|g| g.name == "my_api").unwrap();
    assert_eq!(my_api.members.len(), 3);
    assert!(my_api.parallelized);
    assert!(bundle
        .groups
        .iter()
        .any(|g| g.name == "open_data.taxi_trips" && g.standalone));

    // Replication group with qualified destinations.
    let finance = bundle
        .groups
        .iter()
        .find(|g| g.name == "FINANCE_PG_assets")
        .unwrap();
    assert_eq!(finance.destinations["public.accounts"], "FINANCE.accounts");

    // Materialized assets: 4 ELT resources + 2 replication streams.
    let raw = bundle
        .assets
        .iter()
        .filter(|a| a.key.stage == Stage::Raw)
        .count();
    assert_eq!(raw, 6);

    // Transform models become staged assets depending on loaded tables.
    let staged: Vec<_> = bundle
        .assets
        .iter()
        .filter(|a| a.key.stage == Stage::Stg)
        .collect();
    assert_eq!(staged.len(), 2);
    let stg_accounts = staged
        .iter()
        .find(|a| a.key.leaf == "accounts")
        .unwrap();
    assert_eq!(stg_accounts.deps[0].segments(), ["public", "raw", "accounts"]);

    // The data_from chain resolves to the ancestor's materialized key.
    let order_items = bundle
        .assets
        .iter()
        .find(|a| a.key.leaf == "order_items")
        .unwrap();
    assert_eq!(order_items.deps[0].segments(), ["my_api", "raw", "orders"]);

    // Freshness: one ELT check plus one per replication stream, and a sensor
    // watching the replication checks.
    assert_eq!(bundle.checks.len(), 3);
    let accounts_check = bundle
        .checks
        .iter()
        .find(|c| c.asset_key.leaf == "accounts")
        .unwrap();
    assert_eq!(accounts_check.kind, FreshnessCheckKind::LastUpdate);
    assert_eq!(
        accounts_check.lower_bound_delta,
        Some(Duration::from_secs(3600))
    );
    assert_eq!(bundle.sensors.len(), 1);
}

#[test]
fn test_example_project_build_is_idempotent() {
    let _lock = TEST_MUTEX.lock().unwrap();
    let ctx = BuildContext::new(Environment::new(Target::Other, None));
    let registry = registry();
    let mut resolver = resolver();
    let root = get_example_project_dir();

    let first =
        build_platform_definitions(&ctx, &registry, &mut resolver, Some(root.clone()))
            .expect("first build");
    ctx.clear_cache();
    let second = build_platform_definitions(&ctx, &registry, &mut resolver, Some(root))
        .expect("second build");

    assert_eq!(first, second);
}

#[test]
fn test_build_from_working_directory() {
    let ctx = BuildContext::new(Environment::new(Target::Other, None));
    let registry = registry();
    let mut resolver = resolver();

    // `None` resolves platform-project.yml relative to the working directory.
    let bundle = with_chdir(get_example_project_dir(), || {
        build_platform_definitions(&ctx, &registry, &mut resolver, None)
    })
    .expect("chdir")
    .expect("build from working directory");

    assert!(!bundle.assets.is_empty());
}

#[test]
fn test_cached_build_skips_recompute_for_unchanged_input() {
    let _lock = TEST_MUTEX.lock().unwrap();
    let ctx = BuildContext::new(Environment::new(Target::Other, None));
    let registry = registry();
    let mut resolver = resolver();
    let root = get_example_project_dir();

    let first =
        build_platform_definitions(&ctx, &registry, &mut resolver, Some(root.clone()))
            .expect("first build");
    // Second run hits the content-hash cache; results are structurally equal.
    let second = build_platform_definitions(&ctx, &registry, &mut resolver, Some(root))
        .expect("second build");
    assert_eq!(first, second);
}
