use std::collections::HashMap;

///  ---------------- Helper Traits  ----------------
pub trait ConfigName {
    fn name(&self) -> &str;
}

pub trait FromConfigList<T> {
    fn from_config_list(value: impl IntoIterator<Item = T>) -> Self;
}

impl<T, Wrapper> FromConfigList<T> for Wrapper
where
    T: ConfigName,
    Wrapper: From<HashMap<String, T>>,
{
    fn from_config_list(value: impl IntoIterator<Item = T>) -> Self {
        let mapped = value
            .into_iter()
            .map(|m| (m.name().to_string(), m))
            .collect::<HashMap<_, _>>();
        Wrapper::from(mapped)
    }
}
