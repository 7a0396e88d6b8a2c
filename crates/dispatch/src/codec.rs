//! Payload encoding used at the network boundary.
//!
//! [`crate::DispatchCore`] holds a codec behind `Arc<dyn PayloadCodec>` so the
//! wire format can be swapped without touching dispatch logic. [`JsonCodec`]
//! is the default.

use serde_json::Value;
use shared::protocol::UpdateComponentRequest;

use crate::error::{DispatchError, Result};

pub trait PayloadCodec: Send + Sync + 'static {
    /// MIME type written on responses.
    fn content_type(&self) -> &'static str;

    fn decode_request(&self, body: &[u8]) -> Result<UpdateComponentRequest>;

    fn encode_response(&self, value: &Value) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn decode_request(&self, body: &[u8]) -> Result<UpdateComponentRequest> {
        serde_json::from_slice(body).map_err(|e| DispatchError::MalformedRequest(e.to_string()))
    }

    fn encode_response(&self, value: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| DispatchError::Codec(e.to_string()))
    }
}
