//! AnalysisClient trait - downstream analysis-service abstraction
//!
//! Both calls are unary request/response. A downstream that is absent or not
//! yet initialized yields `Ok(None)`; only genuine RPC failures (transport
//! errors, timeouts, non-success responses) are errors.

use serde::{Deserialize, Serialize};

use crate::{BurnoutAlert, InteractionEvent, PipelineError};

/// Acknowledgment for a bulk-interaction submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionAck {
    pub accepted: u32,
    pub status: String,
}

/// Acknowledgment for a burnout-alert emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertAck {
    pub user_id: String,
    pub status: String,
    pub message: String,
}

/// Unary client for the external analysis service
#[trait_variant::make(AnalysisClient: Send)]
pub trait LocalAnalysisClient: Sync {
    /// Forward a batch of normalized interactions to the bulk channel.
    async fn submit_interactions(
        &self,
        events: &[InteractionEvent],
    ) -> Result<Option<InteractionAck>, PipelineError>;

    /// Emit one burnout alert on the alert channel.
    async fn submit_alert(
        &self,
        alert: &BurnoutAlert,
    ) -> Result<Option<AlertAck>, PipelineError>;
}
