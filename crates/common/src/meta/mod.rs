use serde_yaml::Value;

/// Walk a nested mapping by string keys, returning `None` as soon as a key is
/// missing or an intermediate value is not a mapping. Mirrors how optional
/// orchestration metadata is read out of resource and stream declarations.
pub fn get_nested<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_mapping()?.get(*key)?;
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// The orchestration block nested under a declaration's `meta` key.
pub fn orchestration_meta(meta: Option<&Value>) -> Option<&Value> {
    get_nested(meta?, &["orchestration"])
}

/// String-to-string tags declared in an orchestration block. Non-string
/// values are skipped rather than failing the build.
pub fn tags_from_meta(meta: &Value) -> std::collections::BTreeMap<String, String> {
    let mut tags = std::collections::BTreeMap::new();
    if let Some(mapping) = get_nested(meta, &["tags"]).and_then(Value::as_mapping) {
        for (key, value) in mapping {
            if let Some(key) = key.as_str() {
                let value = value.as_str().unwrap_or_default();
                tags.insert(key.to_string(), value.to_string());
            }
        }
    }
    tags
}
