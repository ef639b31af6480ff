//! Execution context threaded through a flow session.
//!
//! Each block, once it completes, stores its output under its own block
//! name. Later blocks (and the flow's return transform) read earlier
//! outputs by name rather than through positional arguments.

use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct FlowContext {
    values: IndexMap<String, Value>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the context with values known before the flow starts, e.g. the
    /// integration config under `"integration"` and the connection config
    /// under `"connection"`.
    pub fn seed(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, block_name: &str, value: Value) {
        self.values.insert(block_name.to_string(), value);
    }

    pub fn get(&self, block_name: &str) -> Option<&Value> {
        self.values.get(block_name)
    }

    pub fn contains(&self, block_name: &str) -> bool {
        self.values.contains_key(block_name)
    }

    /// Renders the whole context as a single JSON object, keyed by block
    /// name. Used as the input to transform blocks and the return
    /// transform, and for templated strings/values.
    pub fn as_value(&self) -> Value {
        Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
