//! Inbound request decoding.
//!
//! The script environment posts messages of the shape
//! `{ "correlationId": "<string>", "command": ["<string>", ...] }`.
//! This module validates that shape and extracts a typed request. A rejected
//! message still carries the correlation identifier whenever one was
//! extracted before the failure, so the controller can notify the caller.

use crate::error::DecodeError;
use serde_json::Value;

/// Wire field carrying the correlation identifier.
pub const FIELD_CORRELATION_ID: &str = "correlationId";

/// Wire field carrying the argument vector.
pub const FIELD_COMMAND: &str = "command";

/// A validated command request from the script environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Caller-chosen identifier used to address the response callback.
    pub correlation_id: String,

    /// Argument vector; `argv[0]` is the program, the rest are literal
    /// arguments. Guaranteed non-empty.
    pub argv: Vec<String>,
}

/// A rejected inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRejection {
    /// The correlation identifier, when one was extracted before the failure.
    /// `None` means there is no addressable callback and the request is
    /// dropped without a dispatch.
    pub correlation_id: Option<String>,

    /// Why the message was rejected.
    pub error: DecodeError,
}

/// Decode an opaque inbound message into an [`InboundRequest`].
pub fn decode_request(message: &Value) -> Result<InboundRequest, RequestRejection> {
    let object = message.as_object().ok_or(RequestRejection {
        correlation_id: None,
        error: DecodeError::NotAnObject,
    })?;

    let correlation_id = match object.get(FIELD_CORRELATION_ID) {
        None => {
            return Err(RequestRejection {
                correlation_id: None,
                error: DecodeError::MissingCorrelationId,
            })
        }
        Some(Value::String(id)) => id.clone(),
        Some(_) => {
            return Err(RequestRejection {
                correlation_id: None,
                error: DecodeError::InvalidCorrelationId,
            })
        }
    };

    // From here on the caller is addressable; rejections carry the id.
    let reject = |error: DecodeError| RequestRejection {
        correlation_id: Some(correlation_id.clone()),
        error,
    };

    let elements = match object.get(FIELD_COMMAND) {
        None => return Err(reject(DecodeError::MissingCommand)),
        Some(Value::Array(elements)) => elements,
        Some(_) => return Err(reject(DecodeError::InvalidCommand)),
    };

    if elements.is_empty() {
        return Err(reject(DecodeError::EmptyCommand));
    }

    let mut argv = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        argv.push(coerce_argument(element, index).map_err(&reject)?);
    }

    Ok(InboundRequest {
        correlation_id,
        argv,
    })
}

/// Coerce one `command` element to its string representation.
///
/// Strings pass through; numbers and booleans use their canonical text form.
/// Nulls, arrays, and objects have no sensible argv representation and are
/// rejected.
fn coerce_argument(value: &Value, index: usize) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            Err(DecodeError::UnsupportedArgument { index })
        }
    }
}
