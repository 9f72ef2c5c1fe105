//! Per-process consumer identity.

use validator::Validate;

use crate::PipelineError;

/// Immutable consumer-group identity, established at startup.
///
/// Multiple processes sharing the same `group` over the same `stream_key`
/// form a competing-consumers group; the broker partitions undelivered
/// entries among them.
#[derive(Debug, Clone, Validate)]
pub struct ConsumerIdentity {
    /// Stream key to drain
    #[validate(length(min = 1, message = "stream key must not be empty"))]
    pub stream_key: String,

    /// Consumer-group name shared by all cooperating processes
    #[validate(length(min = 1, message = "group name must not be empty"))]
    pub group: String,

    /// This process's consumer name, typically host-derived
    #[validate(length(min = 1, message = "consumer name must not be empty"))]
    pub consumer: String,

    /// Maximum entries claimed per poll
    #[validate(range(min = 1, max = 10_000))]
    pub batch_size: usize,

    /// Blocking-read timeout in milliseconds
    #[validate(range(min = 1, max = 600_000))]
    pub block_ms: u64,
}

impl Default for ConsumerIdentity {
    fn default() -> Self {
        Self {
            stream_key: "learning:interactions".to_string(),
            group: "interaction-analyzer".to_string(),
            consumer: "analyzer-worker".to_string(),
            batch_size: 250,
            block_ms: 2_000,
        }
    }
}

impl ConsumerIdentity {
    /// Run field validation, mapping the first violation to a `PipelineError`.
    pub fn validated(self) -> Result<Self, PipelineError> {
        match self.validate() {
            Ok(()) => Ok(self),
            Err(errors) => {
                let (field, message) = errors
                    .field_errors()
                    .into_iter()
                    .next()
                    .map(|(field, kinds)| {
                        let message = kinds
                            .first()
                            .and_then(|e| e.message.as_ref())
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "invalid value".to_string());
                        (field.to_string(), message)
                    })
                    .unwrap_or_else(|| ("identity".to_string(), "invalid value".to_string()));
                Err(PipelineError::config_validation(field, message))
            }
        }
    }
}
