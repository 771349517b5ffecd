use crate::assets::AssetKey;
use crate::error::{BuildError, BuildResult};
use crate::partitions::PartitionCadence;
use common::meta::get_nested;
use log::warn;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::time::Duration;

/// Keys the check constructors understand. Anything else in a merged
/// freshness configuration is dropped before construction so one stray key
/// cannot take down the whole build.
const KNOWN_CHECK_KEYS: [&str; 4] = [
    "lower_bound_delta_seconds",
    "deadline_cron",
    "timezone",
    "severity",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessCheckKind {
    LastUpdate,
    TimePartition,
}

/// Monitoring rule for one asset: how stale its last materialization may be
/// before the orchestrator flags it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreshnessCheck {
    pub asset_key: AssetKey,
    pub kind: FreshnessCheckKind,
    pub lower_bound_delta: Option<Duration>,
    pub deadline_cron: Option<String>,
    pub timezone: Option<String>,
    pub partition: Option<PartitionCadence>,
    pub severity: Option<String>,
}

/// Merge the stream-level freshness configuration over the group-level
/// default (stream keys win, default fills gaps) and build the check for
/// `asset_key`. No configuration at either level means no check, which is
/// valid. A malformed merged configuration is re-raised with the asset key
/// and the full merged argument set so the bad YAML entry can be located
/// without a stack trace.
pub fn build_freshness_check(
    asset_key: AssetKey,
    stream_meta: Option<&Value>,
    default_meta: Option<&Value>,
) -> BuildResult<Option<FreshnessCheck>> {
    let stream_config = check_config(stream_meta);
    let default_config = check_config(default_meta);

    let mut merged = default_config.unwrap_or_default();
    if let Some(stream) = stream_config {
        for (key, value) in stream {
            merged.insert(key, value);
        }
    }

    if merged.is_empty() {
        return Ok(None);
    }

    // Per-stream partition wins over the group default.
    let partition = partition_cadence(stream_meta).or_else(|| partition_cadence(default_meta));

    let sanitized = sanitize(merged, &asset_key);
    construct(asset_key, sanitized, partition).map(Some)
}

fn check_config(meta: Option<&Value>) -> Option<Mapping> {
    get_nested(meta?, &["freshness_check"])?.as_mapping().cloned()
}

fn partition_cadence(meta: Option<&Value>) -> Option<PartitionCadence> {
    get_nested(meta?, &["partition"])?
        .as_str()
        .and_then(PartitionCadence::parse)
}

fn sanitize(merged: Mapping, asset_key: &AssetKey) -> Mapping {
    let mut sanitized = Mapping::new();
    for (key, value) in merged {
        let name = key.as_str().unwrap_or_default().to_string();
        if KNOWN_CHECK_KEYS.contains(&name.as_str()) {
            sanitized.insert(key, value);
        } else {
            warn!(
                "dropping unexpected freshness check key '{}' for '{}'",
                name, asset_key
            );
        }
    }
    sanitized
}

fn construct(
    asset_key: AssetKey,
    args: Mapping,
    partition: Option<PartitionCadence>,
) -> BuildResult<FreshnessCheck> {
    let annotate = |reason: &str| {
        BuildError::freshness_args(format!(
            "Error creating freshness check for '{}': {}. Supplied arguments: {:?}",
            asset_key, reason, args
        ))
    };

    let deadline_cron = string_arg(&args, "deadline_cron");
    let timezone = string_arg(&args, "timezone");
    let severity = string_arg(&args, "severity");

    let lower_bound_delta = match args.get("lower_bound_delta_seconds") {
        None => None,
        Some(value) => {
            let seconds = numeric_seconds(value)
                .ok_or_else(|| annotate("lower_bound_delta_seconds must be a positive number"))?;
            Some(Duration::from_secs_f64(seconds))
        }
    };

    // A configured staleness bound always selects the simple last-update
    // check; only bound-less configurations fall through to partition checks.
    if let Some(lower_bound_delta) = lower_bound_delta {
        return Ok(FreshnessCheck {
            asset_key,
            kind: FreshnessCheckKind::LastUpdate,
            lower_bound_delta: Some(lower_bound_delta),
            deadline_cron,
            timezone,
            partition,
            severity,
        });
    }

    if let Some(partition) = partition {
        if deadline_cron.is_none() {
            return Err(annotate("time-partition checks require a deadline_cron"));
        }
        return Ok(FreshnessCheck {
            asset_key,
            kind: FreshnessCheckKind::TimePartition,
            lower_bound_delta: None,
            deadline_cron,
            timezone,
            partition: Some(partition),
            severity,
        });
    }

    Err(annotate(
        "last-update checks require lower_bound_delta_seconds",
    ))
}

fn string_arg(args: &Mapping, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

fn numeric_seconds(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.parse::<f64>().ok()?,
        _ => return None,
    };
    (seconds > 0.0).then_some(seconds)
}
