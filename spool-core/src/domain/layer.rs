//! Layer domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::depend::Dependency;

/// Stable handle of a layer inside its job's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

/// Tags requested by a layer
///
/// Tags arrive either as a single `|`-delimited string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    Delimited(String),
    List(Vec<String>),
}

/// A unit of work inside a job
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub layer_type: String,
    /// Child layers run inside their parent and are never submitted themselves
    pub parent: Option<LayerId>,
    /// Frame expression; falls back to the job range when absent
    pub range: Option<String>,
    pub chunk: u32,
    pub threads: Option<f64>,
    pub memory: Option<String>,
    pub tags: Option<Tags>,
    pub service: Option<String>,
    pub args: HashMap<String, Value>,
    pub depends: Vec<Dependency>,
}

impl Layer {
    pub fn new(name: impl Into<String>, layer_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer_type: layer_type.into(),
            parent: None,
            range: None,
            chunk: 1,
            threads: None,
            memory: None,
            tags: None,
            service: None,
            args: HashMap::new(),
            depends: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_chunk(mut self, chunk: u32) -> Self {
        self.chunk = chunk;
        self
    }

    pub fn with_parent(mut self, parent: LayerId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_depend(mut self, depend: Dependency) -> Self {
        self.depends.push(depend);
        self
    }

    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    pub fn is_arg_set(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// Truthiness of an argument; absent arguments are false
    pub fn arg_truthy(&self, key: &str) -> bool {
        self.arg(key).is_some_and(truthy)
    }

    /// Truthiness of an argument with a default for absent ones
    pub fn arg_or(&self, key: &str, default: bool) -> bool {
        self.arg(key).map_or(default, truthy)
    }

    /// String form of an argument, `None` when absent, null or empty
    pub fn arg_str(&self, key: &str) -> Option<String> {
        match self.arg(key)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whether the layer shows up on the scheduler; defaults to true
    pub fn is_registered(&self) -> bool {
        self.arg_or("register", true)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_truthiness() {
        let layer = Layer::new("beauty", "Render")
            .with_arg("strace", true)
            .with_arg("zero", 0)
            .with_arg("empty", "")
            .with_arg("list", json!([1]))
            .with_arg("null", Value::Null);

        assert!(layer.arg_truthy("strace"));
        assert!(!layer.arg_truthy("zero"));
        assert!(!layer.arg_truthy("empty"));
        assert!(layer.arg_truthy("list"));
        assert!(!layer.arg_truthy("null"));
        assert!(!layer.arg_truthy("missing"));
        assert!(layer.is_arg_set("zero"));
    }

    #[test]
    fn test_register_defaults_to_true() {
        let layer = Layer::new("beauty", "Render");
        assert!(layer.is_registered());

        let hidden = layer.with_arg("register", false);
        assert!(!hidden.is_registered());
    }

    #[test]
    fn test_arg_str() {
        let layer = Layer::new("comp", "Render")
            .with_arg("wrapper", "/bin/wrap")
            .with_arg("blank", "")
            .with_arg("count", 4);

        assert_eq!(layer.arg_str("wrapper"), Some("/bin/wrap".to_string()));
        assert_eq!(layer.arg_str("blank"), None);
        assert_eq!(layer.arg_str("count"), Some("4".to_string()));
    }

    #[test]
    fn test_tags_deserialize_both_shapes() {
        let delimited: Tags = serde_json::from_str("\"general | desktop\"").unwrap();
        assert_eq!(delimited, Tags::Delimited("general | desktop".to_string()));

        let list: Tags = serde_json::from_str("[\"general\", \"desktop\"]").unwrap();
        assert_eq!(
            list,
            Tags::List(vec!["general".to_string(), "desktop".to_string()])
        );
    }
}
