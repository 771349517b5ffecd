use crate::config::traits::ConfigName;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

// ---------------- Connection Config ----------------

/// A raw connection declaration. Attribute values may be literals or
/// `secret.<NAME>` / `env.<NAME>` references; resolution happens at build
/// time, not at parse time. Numeric scalars (ports, timeouts) are accepted
/// alongside strings so authors may write `port: 5432` without quoting.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub name: String,
    pub kind: String,
    pub attributes: BTreeMap<String, String>,
}

impl ConfigName for ConnectionConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<'de> Deserialize<'de> for ConnectionConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut raw: BTreeMap<String, Value> = BTreeMap::deserialize(deserializer)?;

        let kind = match raw.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "connection `type` must be a string, got: {:?}",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("type")),
        };

        let mut attributes = BTreeMap::new();
        for (key, value) in raw {
            let rendered = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(de::Error::custom(format!(
                        "connection attribute '{}' must be a scalar, got: {:?}",
                        key, other
                    )))
                }
            };
            attributes.insert(key, rendered);
        }

        Ok(Self {
            name: String::new(),
            kind,
            attributes,
        })
    }
}
