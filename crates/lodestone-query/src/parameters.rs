//! Ordered parameter table
//!
//! Names are allocated sequentially (`p0`, `p1`, ...) in the order clauses are
//! added. The table keeps insertion order so the request body lists parameters
//! the same way the query text references them.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{BuildError, BuildResult};
use crate::value::QueryValue;

/// Named parameter values referenced as `$name` from the query text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the next free generated name and return that name.
    pub fn bind(&mut self, value: &QueryValue) -> String {
        self.bind_json(value.to_json())
    }

    /// Bind an already-normalized JSON value.
    pub fn bind_json(&mut self, value: Value) -> String {
        let mut index = self.entries.len();
        let mut name = format!("p{index}");
        // A user-supplied name may already occupy the slot
        while self.contains(&name) {
            index += 1;
            name = format!("p{index}");
        }
        self.entries.push((name.clone(), value));
        name
    }

    /// Add a caller-named parameter. A leading `$` is ignored.
    pub fn insert(&mut self, name: &str, value: &QueryValue) -> BuildResult<()> {
        let name = name.strip_prefix('$').unwrap_or(name);
        if name.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "parameter name cannot be blank".to_string(),
            ));
        }
        if self.contains(name) {
            return Err(BuildError::DuplicateParameter(name.to_string()));
        }
        self.entries.push((name.to_string(), value.to_json()));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries sorted by name, independent of insertion order
    pub fn sorted(&self) -> Vec<(&str, &Value)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequential_names() {
        let mut params = Parameters::new();
        assert_eq!(params.bind(&"a".into()), "p0");
        assert_eq!(params.bind(&1.into()), "p1");
        assert_eq!(params.bind(&true.into()), "p2");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("p1"), Some(&json!(1)));
    }

    #[test]
    fn test_named_parameter_strips_dollar() {
        let mut params = Parameters::new();
        params.insert("$name", &"Ann".into()).unwrap();
        assert_eq!(params.get("name"), Some(&json!("Ann")));
    }

    #[test]
    fn test_duplicate_named_parameter_rejected() {
        let mut params = Parameters::new();
        params.insert("name", &"Ann".into()).unwrap();
        let err = params.insert("$name", &"Bob".into()).unwrap_err();
        assert_eq!(err, BuildError::DuplicateParameter("name".to_string()));
    }

    #[test]
    fn test_bind_skips_taken_name() {
        let mut params = Parameters::new();
        params.insert("p1", &"user".into()).unwrap();
        assert_eq!(params.bind(&"x".into()), "p2");
        assert_eq!(params.bind(&"y".into()), "p3");
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut params = Parameters::new();
        params.insert("zeta", &1.into()).unwrap();
        params.insert("alpha", &2.into()).unwrap();
        let text = serde_json::to_string(&params).unwrap();
        assert_eq!(text, r#"{"zeta":1,"alpha":2}"#);
    }
}
