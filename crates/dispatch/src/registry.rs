//! Registry of reactive callbacks keyed by the output they update.
//!
//! The registry is filled during application setup and then frozen behind an
//! `Arc` by [`crate::DispatchCore`]. Nothing mutates it while requests are
//! served, so concurrent readers need no locking.

use std::{collections::HashMap, fmt, marker::PhantomData};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{domain::ComponentRef, protocol::DependencySummary};
use tracing::debug;

use crate::error::{CallbackError, DispatchError, Result};

/// A synchronous callback body taking positional arguments.
pub trait Callback: Send + Sync + 'static {
    fn call(&self, args: Vec<Value>) -> std::result::Result<Value, CallbackError>;
}

/// Wraps a closure that works on raw JSON values.
struct RawCallback<F> {
    handler: F,
}

impl<F> Callback for RawCallback<F>
where
    F: Fn(Vec<Value>) -> std::result::Result<Value, CallbackError> + Send + Sync + 'static,
{
    fn call(&self, args: Vec<Value>) -> std::result::Result<Value, CallbackError> {
        (self.handler)(args)
    }
}

/// Wraps a closure whose arguments deserialize from the positional list,
/// usually a tuple such as `(i64, String)`.
pub struct TypedCallback<F, A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(A) -> R>,
}

impl<F, A, R> TypedCallback<F, A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, A, R> Callback for TypedCallback<F, A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: Serialize + 'static,
{
    fn call(&self, args: Vec<Value>) -> std::result::Result<Value, CallbackError> {
        // `()` only decodes from null, so an empty list is tried as both.
        let decoded: serde_json::Result<A> = if args.is_empty() {
            serde_json::from_value(Value::Null)
                .or_else(|_| serde_json::from_value(Value::Array(args)))
        } else {
            serde_json::from_value(Value::Array(args))
        };
        let parsed: A = decoded.map_err(|e| CallbackError::InvalidArguments(e.to_string()))?;
        let output = (self.handler)(parsed);
        serde_json::to_value(output)
            .map_err(|e| CallbackError::failed(format!("result is not serializable: {e}")))
    }
}

/// Binding from one output to its ordered dependencies and callback.
pub struct CallbackRegistration {
    pub target: ComponentRef,
    pub inputs: Vec<ComponentRef>,
    pub state: Vec<ComponentRef>,
    handler: Box<dyn Callback>,
}

impl CallbackRegistration {
    /// Number of positional arguments the callback receives.
    pub fn arity(&self) -> usize {
        self.inputs.len() + self.state.len()
    }

    pub fn invoke(&self, args: Vec<Value>) -> std::result::Result<Value, CallbackError> {
        self.handler.call(args)
    }

    pub fn summary(&self) -> DependencySummary {
        DependencySummary {
            output: self.target.clone(),
            inputs: self.inputs.clone(),
            state: self.state.clone(),
        }
    }
}

impl fmt::Debug for CallbackRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistration")
            .field("target", &self.target)
            .field("inputs", &self.inputs)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<ComponentRef, CallbackRegistration>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback over raw JSON arguments.
    ///
    /// Fails with [`DispatchError::DuplicateTarget`] if `target` already has a
    /// callback; the existing registration is left untouched.
    pub fn register<F>(
        &mut self,
        target: ComponentRef,
        inputs: Vec<ComponentRef>,
        state: Vec<ComponentRef>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(Vec<Value>) -> std::result::Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.insert(target, inputs, state, Box::new(RawCallback { handler }))
    }

    /// Register a callback whose arguments are decoded into `A` before the call
    /// and whose return value is encoded back to JSON.
    pub fn register_typed<F, A, R>(
        &mut self,
        target: ComponentRef,
        inputs: Vec<ComponentRef>,
        state: Vec<ComponentRef>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        self.insert(target, inputs, state, Box::new(TypedCallback::new(handler)))
    }

    /// Register any [`Callback`] implementation.
    pub fn register_callback<C: Callback>(
        &mut self,
        target: ComponentRef,
        inputs: Vec<ComponentRef>,
        state: Vec<ComponentRef>,
        callback: C,
    ) -> Result<()> {
        self.insert(target, inputs, state, Box::new(callback))
    }

    fn insert(
        &mut self,
        target: ComponentRef,
        inputs: Vec<ComponentRef>,
        state: Vec<ComponentRef>,
        handler: Box<dyn Callback>,
    ) -> Result<()> {
        if self.callbacks.contains_key(&target) {
            return Err(DispatchError::DuplicateTarget(target));
        }
        debug!(
            output = %target,
            inputs = inputs.len(),
            state = state.len(),
            "registered callback"
        );
        self.callbacks.insert(
            target.clone(),
            CallbackRegistration {
                target,
                inputs,
                state,
                handler,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, target: &ComponentRef) -> Result<&CallbackRegistration> {
        self.callbacks
            .get(target)
            .ok_or_else(|| DispatchError::UnknownTarget(target.clone()))
    }

    pub fn contains(&self, target: &ComponentRef) -> bool {
        self.callbacks.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Declared dependencies of every callback, ordered by output key.
    pub fn dependencies(&self) -> Vec<DependencySummary> {
        let mut summaries: Vec<_> = self
            .callbacks
            .values()
            .map(CallbackRegistration::summary)
            .collect();
        summaries.sort_by(|a, b| a.output.cmp(&b.output));
        summaries
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
