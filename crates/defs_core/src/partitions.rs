use crate::error::{BuildError, BuildResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_yaml::Value;

/// Time-partition cadences the orchestration boundary understands. Anything
/// else in a `partition` field yields no partitions definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionCadence {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl PartitionCadence {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "hourly" => Some(PartitionCadence::Hourly),
            "daily" => Some(PartitionCadence::Daily),
            "weekly" => Some(PartitionCadence::Weekly),
            "monthly" => Some(PartitionCadence::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionCadence::Hourly => "hourly",
            PartitionCadence::Daily => "daily",
            PartitionCadence::Weekly => "weekly",
            PartitionCadence::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionsDefinition {
    pub cadence: PartitionCadence,
    pub start: NaiveDateTime,
}

/// Read `partition` / `partition_start_date` out of an orchestration metadata
/// block. An unrecognized cadence yields `None`; a cadence without a parsable
/// start date is a configuration error naming the `subject`.
pub fn partitions_from_meta(
    meta: &Value,
    subject: &str,
) -> BuildResult<Option<PartitionsDefinition>> {
    let Some(cadence) = meta
        .get("partition")
        .and_then(Value::as_str)
        .and_then(PartitionCadence::parse)
    else {
        return Ok(None);
    };

    let Some(raw_start) = meta.get("partition_start_date").and_then(Value::as_str) else {
        return Err(BuildError::partition_args(format!(
            "'{}' declares a {} partition without a partition_start_date",
            subject,
            cadence.as_str()
        )));
    };

    let start = parse_start_date(raw_start).ok_or_else(|| {
        BuildError::partition_args(format!(
            "'{}' has unparsable partition_start_date '{}'",
            subject, raw_start
        ))
    })?;

    Ok(Some(PartitionsDefinition { cadence, start }))
}

/// Accepts an ISO date or date-time; a bare date starts at midnight.
fn parse_start_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    raw.parse::<NaiveDate>()
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_daily_partition() {
        let meta = meta("partition: daily\npartition_start_date: '2025-01-01'\n");
        let part = partitions_from_meta(&meta, "a.b").unwrap().unwrap();
        assert_eq!(part.cadence, PartitionCadence::Daily);
        assert_eq!(part.start.to_string(), "2025-01-01 00:00:00");
    }

    #[test]
    fn test_hourly_partition_with_time() {
        let meta = meta("partition: hourly\npartition_start_date: '2025-01-01T04:00:00'\n");
        let part = partitions_from_meta(&meta, "a.b").unwrap().unwrap();
        assert_eq!(part.cadence, PartitionCadence::Hourly);
        assert_eq!(part.start.to_string(), "2025-01-01 04:00:00");
    }

    #[test]
    fn test_unknown_cadence_is_none() {
        let meta = meta("partition: yearly\npartition_start_date: '2025-01-01'\n");
        assert_eq!(partitions_from_meta(&meta, "a.b").unwrap(), None);
    }

    #[test]
    fn test_missing_keys_is_none() {
        assert_eq!(partitions_from_meta(&meta("{}"), "a.b").unwrap(), None);
    }

    #[test]
    fn test_missing_start_date_is_fatal() {
        let meta = meta("partition: daily\n");
        assert!(matches!(
            partitions_from_meta(&meta, "a.b"),
            Err(BuildError::PartitionArgs { .. })
        ));
    }

    #[test]
    fn test_bad_start_date_names_subject() {
        let meta = meta("partition: daily\npartition_start_date: 'not a date'\n");
        let err = partitions_from_meta(&meta, "finance.accounts").unwrap_err();
        match err {
            BuildError::PartitionArgs { context } => {
                assert!(context.message().contains("finance.accounts"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
