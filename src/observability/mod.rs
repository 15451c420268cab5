//! Structured tracing for agents, tools and workflows.
//!
//! Library code only emits `tracing` spans and events through the injected
//! [`SpanContext`]. Installing a global subscriber is left to the outermost
//! binary; enable the `subscriber` feature to get [`init_tracing`]:
//!
//! ```toml
//! monia-agent = { version = "0.3", features = ["subscriber"] }
//! ```
//!
//! ```rust,ignore
//! use monia_agent::observability::{LogLevel, init_tracing};
//!
//! init_tracing(LogLevel::Verbose)?;
//! ```

mod spans;
#[cfg(feature = "subscriber")]
mod subscriber;

pub use spans::{GatewayCallSpan, SpanContext};
#[cfg(feature = "subscriber")]
pub use subscriber::{LogLevel, init_tracing};
