use std::env;

/// Deployment target selected by the `TARGET` environment variable. Anything
/// other than `dev` behaves like production for naming purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Dev,
    Other,
}

impl Target {
    pub fn from_raw(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("dev") {
            Target::Dev
        } else {
            Target::Other
        }
    }
}

// ---------------- Environment ----------------
//
// Captured once so that name normalization stays a pure function of
// (name, target, user) and never re-reads process state.
#[derive(Debug, Clone)]
pub struct Environment {
    pub target: Target,
    pub user: Option<String>,
}

impl Environment {
    pub fn new(target: Target, user: Option<String>) -> Self {
        Self { target, user }
    }

    pub fn from_env() -> Self {
        let target = env::var("TARGET")
            .map(|t| Target::from_raw(&t))
            .unwrap_or(Target::Other);
        let user = env::var("DESTINATION__USER").ok().filter(|u| !u.is_empty());
        Self { target, user }
    }

    /// Environment-qualified schema name. In dev the schema is suffixed with
    /// the uppercased user identity so developers write into isolated schemas.
    pub fn schema_name(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();
        match (&self.target, &self.user) {
            (Target::Dev, Some(user)) => format!("{}__{}", upper, user.to_uppercase()),
            _ => upper,
        }
    }

    /// Environment-qualified database name, prefixed with a dev marker when
    /// targeting dev.
    pub fn database_name(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();
        match self.target {
            Target::Dev => format!("_DEV_{}", upper),
            Target::Other => upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_name_dev_environment() {
        let env = Environment::new(Target::Dev, Some("alice".to_string()));
        assert_eq!(env.schema_name("my_schema"), "MY_SCHEMA__ALICE");
    }

    #[test]
    fn test_schema_name_non_dev() {
        let env = Environment::new(Target::Other, Some("alice".to_string()));
        assert_eq!(env.schema_name("my_schema"), "MY_SCHEMA");
    }

    #[test]
    fn test_schema_name_dev_without_user_passes_through() {
        let env = Environment::new(Target::Dev, None);
        assert_eq!(env.schema_name("my_schema"), "MY_SCHEMA");
    }

    #[test]
    fn test_database_name_dev_environment() {
        let env = Environment::new(Target::Dev, None);
        assert_eq!(env.database_name("my_db"), "_DEV_MY_DB");
    }

    #[test]
    fn test_database_name_non_dev() {
        let env = Environment::new(Target::Other, None);
        assert_eq!(env.database_name("my_db"), "MY_DB");
    }

    #[test]
    fn test_target_parsing_is_case_insensitive() {
        assert_eq!(Target::from_raw("DEV"), Target::Dev);
        assert_eq!(Target::from_raw("prod"), Target::Other);
    }
}
