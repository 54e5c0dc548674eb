//! Progress log sinks.
//!
//! Every decision the transformer makes is reported as one human-readable
//! line through a [`LogSink`]. Sinks are called synchronously, in event order.
//!
//! - Any `Fn(&str)` closure is a sink, which is how embedding callers capture
//!   or forward lines.
//! - [`TracingSink`] forwards lines to `tracing` at INFO level. `main`
//!   constructs it explicitly and installs the subscriber that writes it out.

/// Receiver for progress lines.
pub trait LogSink {
    fn emit(&self, message: &str);
}

impl<F: Fn(&str)> LogSink for F {
    fn emit(&self, message: &str) {
        self(message)
    }
}

/// Default sink: each line becomes a `tracing` INFO event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Sink that drops every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _message: &str) {}
}
