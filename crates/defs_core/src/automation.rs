use crate::assets::AssetKey;
use crate::error::{BuildError, BuildResult};
use log::warn;
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

/// Declarative trigger attached to an asset. Compiled from the
/// `automation_condition` / `automation_condition_config` keys of an
/// orchestration metadata block. `manual` is a valid name that compiles to no
/// condition at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutomationCondition {
    Eager,
    EagerWithDepsChecks,
    Lazy,
    LazyOnCron {
        cron_schedule: String,
        cron_timezone: String,
        ignored_assets: Vec<AssetKey>,
    },
    OnCron {
        cron_schedule: String,
        cron_timezone: String,
        ignored_assets: Vec<AssetKey>,
    },
    OnSchedule {
        cron_schedule: String,
        cron_timezone: String,
    },
    MissingOrChanged,
}

impl AutomationCondition {
    /// Human-readable label matching the condition registry naming.
    pub fn label(&self) -> String {
        match self {
            AutomationCondition::Eager => "eager".to_string(),
            AutomationCondition::EagerWithDepsChecks => "eager_with_deps_checks".to_string(),
            AutomationCondition::Lazy => "lazy".to_string(),
            AutomationCondition::LazyOnCron {
                cron_schedule,
                cron_timezone,
                ..
            } => format!("lazy_on_cron({}, {})", cron_schedule, cron_timezone),
            AutomationCondition::OnCron {
                cron_schedule,
                cron_timezone,
                ..
            } => format!("on_cron({}, {})", cron_schedule, cron_timezone),
            AutomationCondition::OnSchedule {
                cron_schedule,
                cron_timezone,
            } => format!("on_schedule({}, {})", cron_schedule, cron_timezone),
            AutomationCondition::MissingOrChanged => "missing_or_changed".to_string(),
        }
    }
}

impl fmt::Display for AutomationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

const KNOWN_CONFIG_KEYS: [&str; 3] = ["cron_schedule", "cron_timezone", "ignored_assets"];

/// Read the automation condition out of an orchestration metadata block.
/// Returns `Ok(None)` when no condition is configured or when the condition
/// is `manual`. An unrecognized name is fatal; a recognized name with a
/// missing required argument is fatal and names the `subject` so the caller
/// can locate the bad configuration entry.
pub fn condition_from_meta(
    meta: &Value,
    subject: &str,
) -> BuildResult<Option<AutomationCondition>> {
    let Some(name) = meta
        .get("automation_condition")
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };

    let config = match meta.get("automation_condition_config") {
        None => Config::default(),
        Some(value) => Config::parse(value, name, subject)?,
    };

    let condition = match name {
        "manual" => return Ok(None),
        "eager" => AutomationCondition::Eager,
        "eager_with_deps_checks" => AutomationCondition::EagerWithDepsChecks,
        "lazy" => AutomationCondition::Lazy,
        "missing_or_changed" => AutomationCondition::MissingOrChanged,
        "lazy_on_cron" => AutomationCondition::LazyOnCron {
            cron_schedule: config.require_cron(name, subject)?,
            cron_timezone: config.timezone(),
            ignored_assets: config.ignored_assets,
        },
        "on_cron" => AutomationCondition::OnCron {
            cron_schedule: config.require_cron(name, subject)?,
            cron_timezone: config.timezone(),
            ignored_assets: config.ignored_assets,
        },
        "on_schedule" => AutomationCondition::OnSchedule {
            cron_schedule: config.require_cron(name, subject)?,
            cron_timezone: config.timezone(),
        },
        other => return Err(BuildError::unknown_condition(other)),
    };

    Ok(Some(condition))
}

#[derive(Default)]
struct Config {
    cron_schedule: Option<String>,
    cron_timezone: Option<String>,
    ignored_assets: Vec<AssetKey>,
}

impl Config {
    fn parse(value: &Value, condition: &str, subject: &str) -> BuildResult<Self> {
        let Some(mapping) = value.as_mapping() else {
            return Err(BuildError::condition_args(format!(
                "automation_condition_config for '{}' on '{}' must be a mapping, got: {:?}",
                condition, subject, value
            )));
        };

        let mut config = Config::default();
        for (key, entry) in mapping {
            let key = key.as_str().unwrap_or_default();
            match key {
                "cron_schedule" => config.cron_schedule = entry.as_str().map(str::to_string),
                "cron_timezone" => config.cron_timezone = entry.as_str().map(str::to_string),
                "ignored_assets" => {
                    let raw = entry.as_sequence().cloned().unwrap_or_default();
                    for item in raw {
                        if let Some(s) = item.as_str() {
                            config.ignored_assets.push(AssetKey::parse(s)?);
                        }
                    }
                }
                unexpected => {
                    // Tolerated for forward compatibility, but surfaced.
                    warn!(
                        "ignoring unexpected automation condition key '{}' on '{}' \
                         (known keys: {:?})",
                        unexpected, subject, KNOWN_CONFIG_KEYS
                    );
                }
            }
        }
        Ok(config)
    }

    fn require_cron(&self, condition: &str, subject: &str) -> BuildResult<String> {
        self.cron_schedule.clone().ok_or_else(|| {
            BuildError::condition_args(format!(
                "'{}' on '{}' requires a cron_schedule in automation_condition_config",
                condition, subject
            ))
        })
    }

    fn timezone(&self) -> String {
        self.cron_timezone.clone().unwrap_or_else(|| "UTC".to_string())
    }
}
