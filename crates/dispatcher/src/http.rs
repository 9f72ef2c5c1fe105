//! HttpAnalysisClient - unary JSON-over-HTTP analysis client

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use contracts::{
    AlertAck, AnalysisClient, BurnoutAlert, InteractionAck, InteractionEvent, PipelineError,
};

/// Bulk-channel request body
#[derive(Serialize)]
struct BulkRequest<'a> {
    events: &'a [InteractionEvent],
}

/// Unary HTTP client for the analysis service.
///
/// `disconnected()` models a downstream that has not finished initializing:
/// every call resolves to `Ok(None)` without touching the network.
pub struct HttpAnalysisClient {
    base_url: Option<String>,
    client: Client,
}

impl HttpAnalysisClient {
    /// Create a connected client with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::dispatch("client", e.to_string()))?;

        Ok(Self {
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
            client,
        })
    }

    /// Create a client with no downstream configured.
    pub fn disconnected() -> Self {
        Self {
            base_url: None,
            client: Client::new(),
        }
    }

    async fn post_unary<Req, Ack>(
        &self,
        channel: &'static str,
        path: &str,
        body: &Req,
    ) -> Result<Option<Ack>, PipelineError>
    where
        Req: Serialize + ?Sized,
        Ack: serde::de::DeserializeOwned,
    {
        let Some(base_url) = &self.base_url else {
            return Ok(None);
        };

        let url = format!("{base_url}{path}");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| PipelineError::dispatch(channel, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::dispatch(
                channel,
                format!("unexpected status {status}"),
            ));
        }

        let ack = response
            .json::<Ack>()
            .await
            .map_err(|e| PipelineError::dispatch(channel, format!("invalid ack: {e}")))?;

        debug!(channel, %url, "unary call acknowledged");
        Ok(Some(ack))
    }
}

impl AnalysisClient for HttpAnalysisClient {
    #[instrument(name = "http_submit_interactions", skip(self, events), fields(count = events.len()))]
    async fn submit_interactions(
        &self,
        events: &[InteractionEvent],
    ) -> Result<Option<InteractionAck>, PipelineError> {
        self.post_unary(
            "interactions",
            "/v1/interactions/bulk",
            &BulkRequest { events },
        )
        .await
    }

    #[instrument(name = "http_submit_alert", skip(self, alert), fields(user_id = %alert.user_id))]
    async fn submit_alert(
        &self,
        alert: &BurnoutAlert,
    ) -> Result<Option<AlertAck>, PipelineError> {
        self.post_unary("alerts", "/v1/alerts/burnout", alert).await
    }
}
