use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ComponentRef;

/// One entry of an incoming `inputs` or `state` list.
///
/// An entry without a `value` field carries JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueUpdate {
    pub id: String,
    pub property: String,
    #[serde(default)]
    pub value: Value,
}

impl ValueUpdate {
    pub fn new(id: impl Into<String>, property: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            property: property.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef {
    pub id: String,
    pub property: String,
}

impl From<OutputRef> for ComponentRef {
    fn from(value: OutputRef) -> Self {
        ComponentRef::new(value.id, value.property)
    }
}

/// Body of a `_dash-update-component` request.
///
/// `output` stays optional here so a missing field can be reported as a
/// malformed request rather than a generic decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateComponentRequest {
    #[serde(default)]
    pub inputs: Vec<ValueUpdate>,
    #[serde(default)]
    pub state: Vec<ValueUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRef>,
}

/// Declared dependencies of one registered callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySummary {
    pub output: ComponentRef,
    pub inputs: Vec<ComponentRef>,
    pub state: Vec<ComponentRef>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
