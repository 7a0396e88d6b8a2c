//! Callback registration and dispatch resolution.
//!
//! A [`CallbackRegistry`] is filled once at startup, then frozen inside a
//! [`DispatchCore`]. For each change notification the core finds the callback
//! registered for the notified output, builds its positional argument list
//! from the notified values (inputs first, then state, each in declared
//! order) and encodes whatever the callback returns.

pub mod adapter;
pub mod codec;
pub mod error;
pub mod registry;
pub mod resolver;

pub use crate::adapter::DispatchCore;
pub use crate::codec::{JsonCodec, PayloadCodec};
pub use crate::error::{CallbackError, DispatchError};
pub use crate::registry::{Callback, CallbackRegistration, CallbackRegistry, TypedCallback};
pub use crate::resolver::{resolve, DispatchRequest};
