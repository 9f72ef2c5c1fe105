//! Mock analysis client
//!
//! Records every dispatch for assertions; can be scripted to report an
//! absent downstream or to fail outright.

use std::sync::{Arc, Mutex};

use contracts::{
    AlertAck, AnalysisClient, BurnoutAlert, InteractionAck, InteractionEvent, PipelineError,
};

/// One recorded dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchCall {
    Interactions(Vec<InteractionEvent>),
    Alert(BurnoutAlert),
}

/// Recording mock for the analysis service
#[derive(Clone)]
pub struct MockAnalysisClient {
    calls: Arc<Mutex<Vec<DispatchCall>>>,
    absent: bool,
    failure: Option<String>,
}

impl MockAnalysisClient {
    /// Healthy downstream that acknowledges every call
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            absent: false,
            failure: None,
        }
    }

    /// Downstream that is absent/unready: calls yield `Ok(None)`
    pub fn absent(mut self) -> Self {
        self.absent = true;
        self
    }

    /// Downstream whose calls fail with a transport error
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Shared handle to the recorded calls, in dispatch order
    pub fn calls(&self) -> Arc<Mutex<Vec<DispatchCall>>> {
        Arc::clone(&self.calls)
    }

    fn outcome(&self, channel: &'static str) -> Result<bool, PipelineError> {
        if let Some(message) = &self.failure {
            return Err(PipelineError::dispatch(channel, message.clone()));
        }
        Ok(!self.absent)
    }
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisClient for MockAnalysisClient {
    async fn submit_interactions(
        &self,
        events: &[InteractionEvent],
    ) -> Result<Option<InteractionAck>, PipelineError> {
        let delivered = self.outcome("interactions")?;
        self.calls
            .lock()
            .unwrap()
            .push(DispatchCall::Interactions(events.to_vec()));

        Ok(delivered.then(|| InteractionAck {
            accepted: events.len() as u32,
            status: "ok".to_string(),
        }))
    }

    async fn submit_alert(
        &self,
        alert: &BurnoutAlert,
    ) -> Result<Option<AlertAck>, PipelineError> {
        let delivered = self.outcome("alerts")?;
        self.calls
            .lock()
            .unwrap()
            .push(DispatchCall::Alert(alert.clone()));

        Ok(delivered.then(|| AlertAck {
            user_id: alert.user_id.clone(),
            status: "ok".to_string(),
            message: "alert recorded".to_string(),
        }))
    }
}
