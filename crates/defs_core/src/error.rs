use common::config::error::ConfigError;
use common::error::diagnostics::DiagnosticMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown grouping member: {context}")]
    UnknownMember { context: DiagnosticMessage },
    #[error("resource claimed twice: {context}")]
    DoubleClaim { context: DiagnosticMessage },
    #[error("unknown upstream: {context}")]
    UnknownUpstream { context: DiagnosticMessage },
    #[error("dependency cycle through: {0:?}")]
    CycleDetected(Vec<String>),
    #[error("unknown entry point: {context}")]
    UnknownEntry { context: DiagnosticMessage },
    #[error("unknown automation condition: {context}")]
    UnknownCondition { context: DiagnosticMessage },
    #[error("invalid automation condition config: {context}")]
    ConditionArgs { context: DiagnosticMessage },
    #[error("invalid freshness check config: {context}")]
    FreshnessArgs { context: DiagnosticMessage },
    #[error("invalid partition config: {context}")]
    PartitionArgs { context: DiagnosticMessage },
}

impl BuildError {
    #[track_caller]
    pub fn unknown_member(member: impl Into<String>, grouping: impl Into<String>) -> Self {
        let message = format!(
            "Resource '{}' could not be assigned to source grouping '{}'. Make sure \
             the resource is declared and not assigned to another grouping.",
            member.into(),
            grouping.into()
        );
        Self::UnknownMember {
            context: DiagnosticMessage::new(message),
        }
    }

    #[track_caller]
    pub fn double_claim(
        member: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        let message = format!(
            "Resource '{}' is claimed by both grouping '{}' and grouping '{}'. A \
             resource can belong to exactly one grouping.",
            member.into(),
            first.into(),
            second.into()
        );
        Self::DoubleClaim {
            context: DiagnosticMessage::new(message),
        }
    }

    #[track_caller]
    pub fn unknown_upstream(resource: impl Into<String>, upstream: impl Into<String>) -> Self {
        let message = format!(
            "Resource '{}' takes data from '{}', which is not declared.",
            resource.into(),
            upstream.into()
        );
        Self::UnknownUpstream {
            context: DiagnosticMessage::new(message),
        }
    }

    #[track_caller]
    pub fn unknown_entry(entry: impl Into<String>, resource: impl Into<String>) -> Self {
        let message = format!(
            "Entry point '{}' for resource '{}' is not registered.",
            entry.into(),
            resource.into()
        );
        Self::UnknownEntry {
            context: DiagnosticMessage::new(message),
        }
    }

    #[track_caller]
    pub fn unknown_condition(name: impl Into<String>) -> Self {
        let message = format!("'{}' is not a recognized automation condition", name.into());
        Self::UnknownCondition {
            context: DiagnosticMessage::new(message),
        }
    }

    #[track_caller]
    pub fn condition_args(message: impl Into<String>) -> Self {
        Self::ConditionArgs {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn freshness_args(message: impl Into<String>) -> Self {
        Self::FreshnessArgs {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn partition_args(message: impl Into<String>) -> Self {
        Self::PartitionArgs {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<std::io::Error> for BuildError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        BuildError::Config(ConfigError::from(err))
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
