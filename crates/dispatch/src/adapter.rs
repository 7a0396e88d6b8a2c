use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    codec::{JsonCodec, PayloadCodec},
    error::{DispatchError, Result},
    registry::CallbackRegistry,
    resolver::{resolve, DispatchRequest},
};

/// Request pipeline over a frozen callback registry.
///
/// Cloning is cheap and every clone shares the same registry and codec.
#[derive(Clone)]
pub struct DispatchCore {
    registry: Arc<CallbackRegistry>,
    codec: Arc<dyn PayloadCodec>,
}

impl DispatchCore {
    pub fn new(registry: CallbackRegistry) -> Self {
        Self::with_codec(registry, Arc::new(JsonCodec))
    }

    pub fn with_codec(registry: CallbackRegistry, codec: Arc<dyn PayloadCodec>) -> Self {
        Self {
            registry: Arc::new(registry),
            codec,
        }
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &dyn PayloadCodec {
        self.codec.as_ref()
    }

    /// Decode `body`, run the matching callback and encode its result.
    ///
    /// The callback runs synchronously on the calling thread.
    pub fn handle(&self, body: &[u8]) -> Result<Vec<u8>> {
        let request = DispatchRequest::try_from(self.codec.decode_request(body)?)?;
        let value = self.dispatch(&request)?;
        self.codec.encode_response(&value)
    }

    /// Look up, resolve and invoke for an already-decoded request.
    pub fn dispatch(&self, request: &DispatchRequest) -> Result<Value> {
        let registration = self.registry.lookup(&request.target).inspect_err(|_| {
            warn!(output = %request.target, "no callback registered for output");
        })?;
        let args = resolve(request, registration).inspect_err(|err| {
            warn!(output = %request.target, %err, "could not resolve callback arguments");
        })?;

        debug!(output = %request.target, args = args.len(), "invoking callback");
        registration.invoke(args).map_err(|err| {
            let err = DispatchError::from_callback(&request.target, err);
            warn!(output = %request.target, %err, "callback returned an error");
            err
        })
    }
}

#[cfg(test)]
#[path = "tests/adapter_tests.rs"]
mod tests;
