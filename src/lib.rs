//! # WebShell Bridge
//!
//! This library lets content running inside an embedded WebView invoke
//! host-side operating system commands and receive their results
//! asynchronously, addressed by a caller-supplied correlation identifier.
//!
//! ## Architecture
//!
//! ```text
//! Script environment (WebView page)
//!     │
//!     │ script message channel
//!     ▼
//! Rust bridge (this crate)
//!     │
//!     │ spawn + bounded capture
//!     ▼
//! Host operating system
//! ```
//!
//! The windowing host instantiates a [`Bridge`] once, feeds it inbound
//! messages from its script-message channel, and supplies an evaluate-script
//! primitive through the [`ScriptEvaluator`] trait. For each accepted request
//! the bridge spawns the argument vector as a child process, captures up to a
//! bounded number of bytes from each output stream, and delivers the result
//! back into the page by invoking the caller's registered callback.
//!
//! ## Features
//!
//! - **No shell interpretation**: argv is passed to the OS verbatim
//! - **Bounded capture**: a runaway child cannot exhaust host memory
//! - **Escaped embedding**: output and correlation identifiers are escaped
//!   before entering evaluated script source
//! - **Worker execution**: spawning never blocks the host's message context

#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod escape;
pub mod evaluator;
pub mod executor;
pub mod metrics;
pub mod request;

// Re-export commonly used types
pub use bridge::{Bridge, HandleOutcome};
pub use config::BridgeConfig;
pub use dispatch::ResponsePayload;
pub use error::{BridgeError, DecodeError};
pub use evaluator::{NullEvaluator, ScriptEvaluator};
pub use executor::{CommandExecutor, ExecutionResult, EXIT_CODE_ABNORMAL};
pub use metrics::BridgeMetrics;
pub use request::InboundRequest;

/// The embedded caller-side script that sets up the callback registry and
/// the `window.webshell.exec` promise API. Hosts inject this as an
/// initialization script before loading the page.
pub const BOOTSTRAP_SCRIPT: &str = include_str!("bootstrap.js");

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing output for the host process.
///
/// Respects `RUST_LOG`, with bridge debug logging enabled by default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("webshell_bridge=debug".parse().unwrap()),
        )
        .init();
}
