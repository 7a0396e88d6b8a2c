use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One addressable value slot in the UI: a component id plus one of its properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentRef {
    pub id: String,
    pub property: String,
}

impl ComponentRef {
    pub fn new(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            property: property.into(),
        }
    }

    pub fn matches(&self, id: &str, property: &str) -> bool {
        self.id == id && self.property == property
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.property)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid component reference '{0}', expected 'id.property'")]
pub struct ParseComponentRefError(pub String);

impl FromStr for ComponentRef {
    type Err = ParseComponentRefError;

    /// Splits on the last `.` so ids may themselves contain dots.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (id, property) = raw
            .rsplit_once('.')
            .ok_or_else(|| ParseComponentRefError(raw.to_string()))?;
        if id.is_empty() || property.is_empty() {
            return Err(ParseComponentRefError(raw.to_string()));
        }
        Ok(Self::new(id, property))
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
