use serde_json::Value as JsonValue;
use tracing::debug;

/// A filter value as received: one value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::Scalar(value) => vec![value.as_str()],
            FilterValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::List(_))
    }

    fn push(self, value: String) -> Self {
        match self {
            FilterValue::Scalar(first) => FilterValue::List(vec![first, value]),
            FilterValue::List(mut values) => {
                values.push(value);
                FilterValue::List(values)
            }
        }
    }
}

/// Ordered filter key to value map. Keys are unique; order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterMap {
    entries: Vec<(String, FilterValue)>,
}

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from raw query pairs.
    ///
    /// Keys listed in `reserved` (paging, search, route selectors) are skipped.
    /// A comma separated value becomes a list, repeated keys are merged into
    /// one list and blank values are dropped.
    pub fn from_query_pairs<I, K, V>(pairs: I, reserved: &[&str]) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::new();
        for (key, raw) in pairs {
            let key = key.as_ref().trim();
            if key.is_empty() || reserved.contains(&key) {
                continue;
            }

            let raw = raw.as_ref();
            let parts: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect();

            let value = match parts.len() {
                0 => continue,
                1 if !raw.contains(',') => FilterValue::Scalar(parts.into_iter().next().unwrap_or_default()),
                _ => FilterValue::List(parts),
            };
            map.merge(key, value);
        }
        map
    }

    /// Builds a map from a structured filter body.
    ///
    /// `null` entries are skipped, `{"id": n}` objects stand for `n`, arrays
    /// become lists. Nested objects without an id are ignored.
    pub fn from_json(body: &serde_json::Map<String, JsonValue>) -> Self {
        let mut map = Self::new();
        for (key, value) in body {
            match value {
                JsonValue::Null => continue,
                JsonValue::Array(items) => {
                    let values: Vec<String> = items.iter().filter_map(json_scalar).collect();
                    if !values.is_empty() {
                        map.insert(key, FilterValue::List(values));
                    }
                }
                other => match json_scalar(other) {
                    Some(scalar) => map.insert(key, FilterValue::Scalar(scalar)),
                    None => debug!("Ignoring structured filter '{}' without an id", key),
                },
            }
        }
        map
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn merge(&mut self, key: &str, value: FilterValue) {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => {
                let previous = self.entries.remove(index).1;
                let merged = value
                    .values()
                    .into_iter()
                    .fold(previous, |acc, v| acc.push(v.to_string()));
                self.entries.insert(index, (key.to_string(), merged));
            }
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Object(object) => object.get("id").and_then(json_scalar),
        JsonValue::Null | JsonValue::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_split_and_reserved() {
        let pairs = vec![
            ("page", "2"),
            ("limit", "10"),
            ("search", "jean"),
            ("government", "1, 2"),
            ("name", "aspirin"),
            ("region", ""),
        ];
        let map = FilterMap::from_query_pairs(pairs, &["page", "limit", "search"]);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("government"),
            Some(&FilterValue::List(vec!["1".to_string(), "2".to_string()]))
        );
        assert_eq!(map.get("name"), Some(&FilterValue::Scalar("aspirin".to_string())));
        assert!(map.get("region").is_none());
    }

    #[test]
    fn test_repeated_keys_merge_into_list() {
        let pairs = vec![("specialty", "1"), ("specialty", "2,3")];
        let map = FilterMap::from_query_pairs(pairs, &[]);
        assert_eq!(
            map.get("specialty").map(FilterValue::values),
            Some(vec!["1", "2", "3"])
        );
    }

    #[test]
    fn test_trailing_comma_keeps_list_shape() {
        let map = FilterMap::from_query_pairs(vec![("government", "4,")], &[]);
        assert_eq!(map.get("government"), Some(&FilterValue::List(vec!["4".to_string()])));
    }

    #[test]
    fn test_structured_body() {
        let body = json!({
            "government": {"id": 3},
            "region": null,
            "type": 1,
            "specialty": [{"id": 1}, 2],
            "doctor": {"doctorType": 2},
            "lastname": "dupont"
        });
        let map = FilterMap::from_json(body.as_object().unwrap());

        assert_eq!(map.get("government"), Some(&FilterValue::Scalar("3".to_string())));
        assert_eq!(map.get("type"), Some(&FilterValue::Scalar("1".to_string())));
        assert_eq!(
            map.get("specialty"),
            Some(&FilterValue::List(vec!["1".to_string(), "2".to_string()]))
        );
        assert!(map.get("region").is_none());
        assert!(map.get("doctor").is_none());
        assert_eq!(map.get("lastname").map(FilterValue::is_list), Some(false));
    }
}
