//! IPC message protocol for the node gizmo
//!
//! Defines the input events and messages exchanged between a host
//! application and the gizmo, with JSON helpers for hosts that talk to the
//! gizmo across a process or language boundary.

mod error;
mod input;
mod messages;

pub use error::IpcError;
pub use input::{MouseButton, MouseEvent};
pub use messages::{EditMode, GizmoAxis, GizmoToHost, HostToGizmo, HoveredHandle};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serialize a message to JSON.
pub fn to_json<T: Serialize>(message: &T) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a message from JSON.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}
