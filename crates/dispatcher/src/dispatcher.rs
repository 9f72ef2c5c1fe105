//! AnalysisDispatcher - routes records to the downstream channels

use tracing::{debug, instrument, warn};

use contracts::{
    AlertAck, AnalysisClient, BurnoutAlert, InteractionAck, InteractionEvent, PipelineError,
};

/// Dispatcher over a generic analysis client.
///
/// The two channels mirror the downstream service's unary methods. An
/// unavailable downstream is a tolerated outcome (`Ok(None)`): the caller
/// still acknowledges the entry. Only transport-level failures are errors.
pub struct AnalysisDispatcher<A: AnalysisClient> {
    client: A,
}

impl<A: AnalysisClient> AnalysisDispatcher<A> {
    /// Create a dispatcher over the given client
    pub fn new(client: A) -> Self {
        Self { client }
    }

    /// Forward a batch of interactions to the bulk channel.
    #[instrument(
        name = "dispatch_interactions",
        skip(self, events),
        fields(count = events.len())
    )]
    pub async fn publish_interactions(
        &self,
        events: &[InteractionEvent],
    ) -> Result<Option<InteractionAck>, PipelineError> {
        match self.client.submit_interactions(events).await? {
            Some(ack) => {
                debug!(accepted = ack.accepted, status = %ack.status, "interactions accepted");
                Ok(Some(ack))
            }
            None => {
                debug!("analysis service unavailable, interactions not forwarded");
                Ok(None)
            }
        }
    }

    /// Emit one burnout alert on the alert channel.
    #[instrument(
        name = "dispatch_burnout_alert",
        skip(self, alert),
        fields(user_id = %alert.user_id, risk_level = %alert.risk_level)
    )]
    pub async fn emit_burnout_alert(
        &self,
        alert: &BurnoutAlert,
    ) -> Result<Option<AlertAck>, PipelineError> {
        match self.client.submit_alert(alert).await? {
            Some(ack) => {
                debug!(status = %ack.status, "burnout alert accepted");
                Ok(Some(ack))
            }
            None => {
                warn!(
                    user_id = %alert.user_id,
                    correlation_id = %alert.correlation_id,
                    "analysis service unavailable, burnout alert not forwarded"
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DispatchCall, MockAnalysisClient};
    use contracts::INTERACTION_KIND;

    fn event(id: &str) -> InteractionEvent {
        InteractionEvent {
            id: id.to_string(),
            user_id: "u1".to_string(),
            content: "reviewed flashcards".to_string(),
            timestamp: 1_700_000_000_000,
            kind: INTERACTION_KIND.to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_interactions_returns_ack() {
        let client = MockAnalysisClient::new();
        let calls = client.calls();
        let dispatcher = AnalysisDispatcher::new(client);

        let ack = dispatcher
            .publish_interactions(&[event("e1")])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ack.accepted, 1);
        let calls = calls.lock().unwrap();
        assert!(matches!(&calls[0], DispatchCall::Interactions(events) if events.len() == 1));
    }

    #[tokio::test]
    async fn test_absent_downstream_is_not_an_error() {
        let client = MockAnalysisClient::new().absent();
        let dispatcher = AnalysisDispatcher::new(client);

        let ack = dispatcher.publish_interactions(&[event("e1")]).await.unwrap();
        assert!(ack.is_none());
    }

    #[tokio::test]
    async fn test_alert_failure_propagates() {
        let client = MockAnalysisClient::new().failing("downstream timeout");
        let dispatcher = AnalysisDispatcher::new(client);

        let alert = BurnoutAlert {
            user_id: "u1".to_string(),
            risk_level: "high".to_string(),
            correlation_id: "1-0".to_string(),
            observed_at: 1_700_000_000_000,
        };

        let err = dispatcher.emit_burnout_alert(&alert).await.unwrap_err();
        assert!(matches!(err, PipelineError::DispatchFailed { .. }));
    }
}
