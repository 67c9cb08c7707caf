//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, master secret, derived key or envelope** may appear in any
//!   span attribute or log field. Only key versions and error kinds are logged.
//! - Log level is configurable via `CREDVAULT_LOG_LEVEL` (default: `info`);
//!   `RUST_LOG` takes precedence when set.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
