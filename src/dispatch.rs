//! Response payload assembly and delivery.
//!
//! For every addressable request outcome the dispatcher builds one script
//! snippet that looks up the caller's callback in the registry, invokes it
//! with the result object, and deletes the registry entry so the same
//! correlation identifier can never be invoked twice. The snippet is the only
//! place bridge output enters the script environment, and every interpolated
//! string — including the correlation identifier — goes through the escaper
//! and is embedded inside a double-quoted literal.

use crate::error::BridgeError;
use crate::escape::{escape_captured, escape_js_string};
use crate::evaluator::ScriptEvaluator;
use crate::executor::{ExecutionResult, EXIT_CODE_ABNORMAL};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Response delivered to the registered callback.
///
/// The text fields are stored already escaped, ready for embedding inside
/// double-quoted literals in the snippet. Nothing is retained after
/// dispatch; the bridge keeps no history of past responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePayload {
    /// Correlation identifier, copied verbatim from the request.
    pub correlation_id: String,

    /// Escaped standard output text.
    pub stdout: String,

    /// Escaped standard error text.
    pub stderr: String,

    /// The child's exit code, or the abnormal-termination sentinel.
    pub exit_code: i32,

    /// `None` when a process ran (even unsuccessfully); a human-readable
    /// message when the request could not be executed at all.
    pub error: Option<String>,
}

impl ResponsePayload {
    /// Payload for a completed execution.
    pub fn completed(correlation_id: String, result: &ExecutionResult) -> Self {
        Self {
            correlation_id,
            stdout: escape_captured(&result.stdout.bytes),
            stderr: escape_captured(&result.stderr.bytes),
            exit_code: result.exit_code,
            error: None,
        }
    }

    /// Payload for a request that failed before producing a result.
    pub fn failed(correlation_id: String, error: &BridgeError) -> Self {
        Self {
            correlation_id,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: EXIT_CODE_ABNORMAL,
            error: Some(escape_js_string(&error.to_string())),
        }
    }
}

/// Build the callback-invocation snippet for a payload.
///
/// `registry` must be a validated identifier path (see
/// [`BridgeConfig::validate`](crate::config::BridgeConfig::validate)); the
/// payload fields must already be escaped.
pub fn build_callback_snippet(registry: &str, payload: &ResponsePayload) -> String {
    let id = escape_js_string(&payload.correlation_id);
    let error = match &payload.error {
        Some(message) => format!("\"{message}\""),
        None => "null".to_string(),
    };

    format!(
        "if ({registry} && {registry}[\"{id}\"]) {{ \
         {registry}[\"{id}\"]({{ stdout: \"{stdout}\", stderr: \"{stderr}\", \
         exitCode: {exit_code}, error: {error} }}); \
         delete {registry}[\"{id}\"]; }}",
        stdout = payload.stdout,
        stderr = payload.stderr,
        exit_code = payload.exit_code,
    )
}

/// Delivers payloads into the host's evaluation channel, one at a time.
pub struct ResponseDispatcher {
    evaluator: Arc<dyn ScriptEvaluator>,
    registry: String,
    // The evaluation channel is not assumed reentrant; concurrent requests
    // take turns here.
    channel: Mutex<()>,
}

impl ResponseDispatcher {
    /// Create a dispatcher targeting the given callback registry.
    pub fn new(evaluator: Arc<dyn ScriptEvaluator>, registry: String) -> Self {
        Self {
            evaluator,
            registry,
            channel: Mutex::new(()),
        }
    }

    /// Build the snippet for `payload` and hand it to the host.
    pub fn dispatch(&self, payload: &ResponsePayload) {
        let snippet = build_callback_snippet(&self.registry, payload);
        debug!(
            correlation_id = %payload.correlation_id,
            exit_code = payload.exit_code,
            has_error = payload.error.is_some(),
            snippet_bytes = snippet.len(),
            "Dispatching response"
        );

        let _serialized = self.channel.lock();
        self.evaluator.evaluate(&snippet);
    }
}
