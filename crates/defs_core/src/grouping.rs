use crate::error::{BuildError, BuildResult};
use common::config::components::resources::{ResourceConfigs, SourceGroupingConfigs};
use log::debug;
use serde_yaml::Value;
use std::collections::HashMap;

/// One resolved grouping: either a declared source grouping with its members
/// bound, or a standalone grouping synthesized for an unclaimed resource.
#[derive(Debug, Clone)]
pub struct ResolvedGrouping {
    pub name: String,
    pub members: Vec<String>,
    pub parallelized: bool,
    pub standalone: bool,
    pub meta: Option<Value>,
}

/// Assign every resource to exactly one grouping.
///
/// Membership is resolved through a read-only ownership index built in one
/// pass: a member name that is not declared is a fatal lookup error naming
/// both the member and the grouping, and a resource claimed by two groupings
/// is a fatal error naming both claimants. Resources left unclaimed become
/// standalone single-member groupings named after the resource itself.
pub fn resolve_groupings(
    resources: &ResourceConfigs,
    groupings: &SourceGroupingConfigs,
) -> BuildResult<Vec<ResolvedGrouping>> {
    let mut owner: HashMap<&str, &str> = HashMap::new();

    let mut grouping_names: Vec<&String> = groupings.keys().collect();
    grouping_names.sort();

    let mut resolved = Vec::new();
    for grouping_name in grouping_names {
        let grouping = &groupings[grouping_name];
        for member in &grouping.resources {
            if !resources.contains_key(member) {
                return Err(BuildError::unknown_member(member, grouping_name));
            }
            if let Some(previous) = owner.insert(member.as_str(), grouping_name.as_str()) {
                return Err(BuildError::double_claim(member, previous, grouping_name));
            }
        }
        resolved.push(ResolvedGrouping {
            name: grouping_name.clone(),
            members: grouping.resources.clone(),
            parallelized: grouping.parallelized,
            standalone: false,
            meta: grouping.meta.clone(),
        });
    }

    // Sweep: anything unclaimed stands alone.
    let mut unclaimed: Vec<&String> = resources
        .keys()
        .filter(|name| !owner.contains_key(name.as_str()))
        .collect();
    unclaimed.sort();

    for name in unclaimed {
        debug!("resource '{}' not claimed by any grouping, standing alone", name);
        let resource = &resources[name];
        resolved.push(ResolvedGrouping {
            name: name.clone(),
            members: vec![name.clone()],
            parallelized: false,
            standalone: true,
            meta: resource.meta.clone(),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::components::resources::{ResourceConfig, SourceGroupingConfig};
    use std::collections::HashMap;

    fn resource(name: &str) -> ResourceConfig {
        serde_yaml::from_str::<ResourceConfig>(&format!("entry: data.{}\n", name))
            .map(|mut r| {
                r.name = name.to_string();
                r
            })
            .unwrap()
    }

    fn resources(names: &[&str]) -> ResourceConfigs {
        ResourceConfigs::new(
            names
                .iter()
                .map(|n| (n.to_string(), resource(n)))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn grouping(name: &str, members: &[&str]) -> (String, SourceGroupingConfig) {
        let config = SourceGroupingConfig {
            name: name.to_string(),
            resources: members.iter().map(|m| m.to_string()).collect(),
            parallelized: false,
            max_table_nesting: None,
            meta: None,
        };
        (name.to_string(), config)
    }

    #[test]
    fn test_claim_then_sweep() {
        let resources = resources(&["x.1", "x.2", "y.1"]);
        let groupings =
            SourceGroupingConfigs::new(HashMap::from([grouping("g", &["x.1"])]));

        let resolved = resolve_groupings(&resources, &groupings).unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].name, "g");
        assert_eq!(resolved[0].members, vec!["x.1"]);
        assert!(!resolved[0].standalone);

        let standalone: Vec<_> = resolved.iter().filter(|g| g.standalone).collect();
        assert_eq!(standalone.len(), 2);
        assert_eq!(standalone[0].name, "x.2");
        assert_eq!(standalone[0].members, vec!["x.2"]);
        assert_eq!(standalone[1].name, "y.1");
    }

    #[test]
    fn test_unknown_member_names_member_and_grouping() {
        let resources = resources(&["x.1", "x.2"]);
        let groupings =
            SourceGroupingConfigs::new(HashMap::from([grouping("g", &["x.3"])]));

        let err = resolve_groupings(&resources, &groupings).unwrap_err();
        match err {
            BuildError::UnknownMember { context } => {
                assert!(context.message().contains("x.3"));
                assert!(context.message().contains("'g'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_double_claim_names_both_groupings() {
        let resources = resources(&["x.1"]);
        let groupings = SourceGroupingConfigs::new(HashMap::from([
            grouping("a", &["x.1"]),
            grouping("b", &["x.1"]),
        ]));

        let err = resolve_groupings(&resources, &groupings).unwrap_err();
        match err {
            BuildError::DoubleClaim { context } => {
                assert!(context.message().contains("'a'"));
                assert!(context.message().contains("'b'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_every_resource_lands_in_exactly_one_grouping() {
        let resources = resources(&["a.1", "a.2", "b.1", "b.2"]);
        let groupings = SourceGroupingConfigs::new(HashMap::from([
            grouping("first", &["a.1", "a.2"]),
            grouping("second", &["b.1"]),
        ]));

        let resolved = resolve_groupings(&resources, &groupings).unwrap();
        let mut seen: Vec<&String> = resolved.iter().flat_map(|g| &g.members).collect();
        seen.sort();
        assert_eq!(seen, ["a.1", "a.2", "b.1", "b.2"]);
    }
}
