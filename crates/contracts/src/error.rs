//! Layered error definitions
//!
//! Categorized by source: config / broker / circuit / dispatch

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== Configuration Errors =====
    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Broker Errors =====
    /// Broker connection error
    #[error("broker connection error: {message}")]
    BrokerConnection { message: String },

    /// Consumer-group creation error
    #[error("group create error on stream '{stream}': {message}")]
    GroupCreate { stream: String, message: String },

    /// Stream read error
    #[error("stream read error: {message}")]
    StreamRead { message: String },

    /// Entry acknowledgment error
    #[error("acknowledge error for entry '{entry_id}': {message}")]
    Acknowledge { entry_id: String, message: String },

    // ===== Circuit Breaker =====
    /// Guarded operation rejected while the circuit is open
    #[error("circuit open for broker operations, next attempt in {retry_in_ms}ms")]
    CircuitOpen { retry_in_ms: u64 },

    // ===== Dispatch Errors =====
    /// Downstream dispatch error (transport failure, non-success response)
    #[error("dispatch to '{channel}' failed: {message}")]
    DispatchFailed { channel: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create broker connection error
    pub fn broker_connection(message: impl Into<String>) -> Self {
        Self::BrokerConnection {
            message: message.into(),
        }
    }

    /// Create group creation error
    pub fn group_create(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GroupCreate {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create stream read error
    pub fn stream_read(message: impl Into<String>) -> Self {
        Self::StreamRead {
            message: message.into(),
        }
    }

    /// Create acknowledgment error
    pub fn acknowledge(entry_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Acknowledge {
            entry_id: entry_id.into(),
            message: message.into(),
        }
    }

    /// Create dispatch error
    pub fn dispatch(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DispatchFailed {
            channel: channel.into(),
            message: message.into(),
        }
    }
}
