//! End-to-end request flow.
//!
//! The bridge owns one pass over each inbound message:
//! decode → execute → escape → dispatch. Each request runs that pipeline
//! sequentially inside its own task, which is what guarantees the
//! per-correlation-identifier ordering; across distinct identifiers no
//! ordering is promised. The bridge holds only the evaluator handle, the
//! executor, and a metrics collector — no request state survives dispatch.

use crate::config::BridgeConfig;
use crate::dispatch::{ResponseDispatcher, ResponsePayload};
use crate::error::{BridgeError, Result};
use crate::evaluator::ScriptEvaluator;
use crate::executor::CommandExecutor;
use crate::metrics::BridgeMetrics;
use crate::request::{decode_request, RequestRejection};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Terminal state of one handled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A command ran and its result reached the evaluator.
    Dispatched,

    /// The request failed before producing a result, but the caller was
    /// addressable and received an error response.
    DispatchedError,

    /// No correlation identifier could be extracted; the request was dropped
    /// without touching the evaluator.
    Dropped,
}

/// The bridge between the script environment and host-side commands.
pub struct Bridge {
    config: BridgeConfig,
    executor: CommandExecutor,
    dispatcher: ResponseDispatcher,
    metrics: Arc<BridgeMetrics>,
}

impl Bridge {
    /// Create a bridge with the given configuration and evaluator handle.
    pub fn new(config: BridgeConfig, evaluator: Arc<dyn ScriptEvaluator>) -> Result<Self> {
        config.validate()?;

        info!(
            capture_limit = config.capture_limit_bytes,
            registry = %config.callback_registry,
            "Initializing bridge"
        );

        let executor = CommandExecutor::new(config.capture_limit_bytes);
        let dispatcher = ResponseDispatcher::new(evaluator, config.callback_registry.clone());

        Ok(Self {
            config,
            executor,
            dispatcher,
            metrics: Arc::new(BridgeMetrics::new()),
        })
    }

    /// Handle one inbound message end to end.
    #[instrument(skip(self, message))]
    pub async fn handle_message(&self, message: &Value) -> HandleOutcome {
        self.metrics.record_request();

        let request = match decode_request(message) {
            Ok(request) => request,
            Err(rejection) => return self.reject(rejection),
        };

        let started = Instant::now();
        match self.executor.execute(&request.argv).await {
            Ok(result) => {
                self.metrics.record_execution(started.elapsed());

                let truncated = result.truncated_streams();
                if truncated > 0 {
                    self.metrics.record_truncation(truncated);
                    warn!(
                        correlation_id = %request.correlation_id,
                        discarded_bytes =
                            result.stdout.discarded_bytes + result.stderr.discarded_bytes,
                        "Child output truncated at capture bound"
                    );
                }

                let payload = ResponsePayload::completed(request.correlation_id, &result);
                self.dispatcher.dispatch(&payload);
                self.metrics.record_dispatched();
                HandleOutcome::Dispatched
            }
            Err(error) => {
                if matches!(error, BridgeError::SpawnFailed { .. }) {
                    self.metrics.record_spawn_failure();
                }
                warn!(
                    correlation_id = %request.correlation_id,
                    %error,
                    "Command execution failed"
                );

                let payload = ResponsePayload::failed(request.correlation_id, &error);
                self.dispatcher.dispatch(&payload);
                self.metrics.record_error_response(error.code());
                HandleOutcome::DispatchedError
            }
        }
    }

    /// Handle a raw message string as delivered by hosts whose channel
    /// carries text rather than structured values.
    pub async fn handle_raw(&self, raw: &str) -> HandleOutcome {
        match serde_json::from_str::<Value>(raw) {
            Ok(message) => self.handle_message(&message).await,
            Err(error) => {
                self.metrics.record_request();
                self.metrics.record_dropped("INVALID_JSON");
                warn!(%error, "Dropping unparseable message");
                HandleOutcome::Dropped
            }
        }
    }

    /// Handle a message on a detached task, leaving the caller's context free.
    ///
    /// Hosts deliver messages on their event-processing context; spawning
    /// keeps that context responsive for the lifetime of the child process.
    pub fn spawn_handle(self: &Arc<Self>, message: Value) -> JoinHandle<HandleOutcome> {
        let bridge = Arc::clone(self);
        tokio::spawn(async move { bridge.handle_message(&message).await })
    }

    fn reject(&self, rejection: RequestRejection) -> HandleOutcome {
        match rejection.correlation_id {
            Some(correlation_id) => {
                warn!(
                    %correlation_id,
                    error = %rejection.error,
                    "Rejecting malformed request"
                );
                let error = BridgeError::MalformedRequest(rejection.error.clone());
                let payload = ResponsePayload::failed(correlation_id, &error);
                self.dispatcher.dispatch(&payload);
                self.metrics.record_error_response(rejection.error.code());
                HandleOutcome::DispatchedError
            }
            None => {
                warn!(error = %rejection.error, "Dropping unaddressable request");
                self.metrics.record_dropped(rejection.error.code());
                HandleOutcome::Dropped
            }
        }
    }

    /// The bridge's metrics collector.
    pub fn metrics(&self) -> &BridgeMetrics {
        &self.metrics
    }

    /// The active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}
