use serde_json::Value;
use shared::{
    domain::ComponentRef,
    protocol::{UpdateComponentRequest, ValueUpdate},
};

use crate::{
    error::{DispatchError, Result},
    registry::CallbackRegistration,
};

/// One decoded change notification: which output to recompute and the
/// values currently known on the client.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub target: ComponentRef,
    pub input_updates: Vec<ValueUpdate>,
    pub state_updates: Vec<ValueUpdate>,
}

impl DispatchRequest {
    pub fn new(
        target: ComponentRef,
        input_updates: Vec<ValueUpdate>,
        state_updates: Vec<ValueUpdate>,
    ) -> Self {
        Self {
            target,
            input_updates,
            state_updates,
        }
    }
}

impl TryFrom<UpdateComponentRequest> for DispatchRequest {
    type Error = DispatchError;

    fn try_from(value: UpdateComponentRequest) -> Result<Self> {
        let output = value
            .output
            .ok_or_else(|| DispatchError::MalformedRequest("missing 'output' field".into()))?;
        Ok(Self::new(output.into(), value.inputs, value.state))
    }
}

/// Builds the positional argument list for `registration` from `request`.
///
/// Input values come first in declared order, then state values. When an
/// update list holds several entries for the same component, the first one
/// wins and the rest are ignored.
pub fn resolve(
    request: &DispatchRequest,
    registration: &CallbackRegistration,
) -> Result<Vec<Value>> {
    let mut args = Vec::with_capacity(registration.arity());
    collect(&registration.inputs, &request.input_updates, &mut args)?;
    collect(&registration.state, &request.state_updates, &mut args)?;
    Ok(args)
}

fn collect(
    declared: &[ComponentRef],
    updates: &[ValueUpdate],
    args: &mut Vec<Value>,
) -> Result<()> {
    for dependency in declared {
        let update = updates
            .iter()
            .find(|update| dependency.matches(&update.id, &update.property))
            .ok_or_else(|| DispatchError::MissingValue(dependency.clone()))?;
        args.push(update.value.clone());
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
