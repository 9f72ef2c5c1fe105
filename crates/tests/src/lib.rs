//! # Integration Tests
//!
//! End-to-end tests over the mock broker and mock analysis client.
//!
//! Covers:
//! - Full drain of a multi-batch stream with in-order acknowledgment
//! - Burnout-alert routing with correlation ids
//! - Circuit-breaker backpressure under repeated broker failures

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use broker::MockStreamBroker;
    use consumer::{CircuitBreakerConfig, StreamConsumer};
    use contracts::{ConsumerIdentity, RawStreamEntry};
    use dispatcher::{AnalysisDispatcher, DispatchCall, MockAnalysisClient};
    use observability::MetricsCollector;
    use tokio_util::sync::CancellationToken;

    fn interaction_entry(id: &str, user: &str, content: &str) -> RawStreamEntry {
        RawStreamEntry::new(
            id,
            vec![
                ("userId".to_string(), user.to_string()),
                ("content".to_string(), content.to_string()),
                ("timestamp".to_string(), "1700000000000".to_string()),
            ],
        )
    }

    fn spawn_consumer(
        broker: MockStreamBroker,
        client: MockAnalysisClient,
        breaker_config: CircuitBreakerConfig,
        cancel: CancellationToken,
    ) -> (tokio::task::JoinHandle<()>, Arc<MetricsCollector>) {
        let collector = Arc::new(MetricsCollector::new());
        let handle = StreamConsumer::new(
            broker,
            ConsumerIdentity::default(),
            breaker_config,
            AnalysisDispatcher::new(client),
            Arc::clone(&collector),
            cancel,
        )
        .spawn();
        (handle, collector)
    }

    async fn wait_until(deadline_ms: u64, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(deadline_ms);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    /// End-to-end: MockStreamBroker -> StreamConsumer -> MockAnalysisClient
    ///
    /// 500 entries over two batches must be dispatched and acknowledged
    /// in broker order, with one latency sample per entry.
    #[tokio::test]
    async fn test_e2e_full_drain_in_order() {
        let first: Vec<_> = (0..250)
            .map(|i| interaction_entry(&format!("1-{i}"), "u1", "studied"))
            .collect();
        let second: Vec<_> = (0..250)
            .map(|i| interaction_entry(&format!("2-{i}"), "u2", "reviewed"))
            .collect();

        let broker = MockStreamBroker::new().with_batch(first).with_batch(second);
        let acks = broker.ack_log();
        let marks = broker.acks_at_read();
        let client = MockAnalysisClient::new();
        let calls = client.calls();

        let cancel = CancellationToken::new();
        let (handle, collector) = spawn_consumer(
            broker,
            client,
            CircuitBreakerConfig::default(),
            cancel.clone(),
        );

        assert!(
            wait_until(5_000, || acks.lock().unwrap().len() == 500).await,
            "stream was not fully drained"
        );
        cancel.cancel();
        handle.await.unwrap();

        let acks = acks.lock().unwrap();
        assert_eq!(acks.len(), 500);
        assert_eq!(acks[0], "1-0");
        assert_eq!(acks[249], "1-249");
        assert_eq!(acks[250], "2-0");
        assert_eq!(acks[499], "2-249");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 500);
        assert!(calls
            .iter()
            .all(|c| matches!(c, DispatchCall::Interactions(events) if events.len() == 1)));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.observed_events, 500);
        assert_eq!(snapshot.latency.count, 500);
        assert!(snapshot.latency.average_ms >= 0.0);

        // Every entry of a batch is acknowledged before the next read
        let marks = marks.lock().unwrap();
        assert_eq!(marks[0], 0);
        assert_eq!(marks[1], 250);
        assert!(marks.iter().skip(2).all(|&m| m == 500));
    }

    /// Burnout-tagged entries take the alert channel, carrying the broker
    /// entry id as the correlation id.
    #[tokio::test]
    async fn test_e2e_burnout_alert_routing() {
        let alert_entry = RawStreamEntry::new(
            "9-0",
            vec![
                ("userId".to_string(), "u1".to_string()),
                ("content".to_string(), "high".to_string()),
                ("type".to_string(), "burnout_alert".to_string()),
            ],
        );
        let broker = MockStreamBroker::new().with_batch(vec![
            interaction_entry("8-0", "u1", "studied"),
            alert_entry,
        ]);
        let acks = broker.ack_log();
        let client = MockAnalysisClient::new();
        let calls = client.calls();

        let cancel = CancellationToken::new();
        let (handle, _collector) = spawn_consumer(
            broker,
            client,
            CircuitBreakerConfig::default(),
            cancel.clone(),
        );

        assert!(wait_until(2_000, || acks.lock().unwrap().len() == 2).await);
        cancel.cancel();
        handle.await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        let DispatchCall::Alert(alert) = &calls[1] else {
            panic!("expected second dispatch on the alert channel");
        };
        assert_eq!(alert.user_id, "u1");
        assert_eq!(alert.risk_level, "high");
        assert_eq!(alert.correlation_id, "9-0");
    }

    /// Five consecutive read failures open the circuit; the broker must see
    /// no further reads while the cooldown holds, and the loop stays alive.
    #[tokio::test]
    async fn test_e2e_circuit_opens_and_sheds_reads() {
        let mut broker = MockStreamBroker::new();
        for _ in 0..5 {
            broker = broker.with_read_error("connection refused");
        }
        let reads = broker.read_calls();
        let client = MockAnalysisClient::new();

        let cancel = CancellationToken::new();
        let (handle, _collector) = spawn_consumer(
            broker,
            client,
            CircuitBreakerConfig {
                failure_threshold: 5,
                cooldown: Duration::from_secs(30),
            },
            cancel.clone(),
        );

        assert!(
            wait_until(5_000, || reads.load(Ordering::SeqCst) == 5).await,
            "breaker never reached the failure threshold"
        );

        // Inside the cooldown the loop backs off without touching the broker
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(reads.load(Ordering::SeqCst), 5);
        assert!(!handle.is_finished());

        cancel.cancel();
        handle.await.unwrap();
    }

    /// A malformed entry in the middle of a batch is skipped and acknowledged
    /// without stalling the entries behind it.
    #[tokio::test]
    async fn test_e2e_malformed_entry_does_not_stall_batch() {
        let broker = MockStreamBroker::new().with_batch(vec![
            interaction_entry("4-0", "u1", "studied"),
            RawStreamEntry::new("4-1", vec![("content".to_string(), "orphan".to_string())]),
            interaction_entry("4-2", "u2", "reviewed"),
        ]);
        let acks = broker.ack_log();
        let client = MockAnalysisClient::new();
        let calls = client.calls();

        let cancel = CancellationToken::new();
        let (handle, _collector) = spawn_consumer(
            broker,
            client,
            CircuitBreakerConfig::default(),
            cancel.clone(),
        );

        assert!(wait_until(2_000, || acks.lock().unwrap().len() == 3).await);
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(*acks.lock().unwrap(), vec!["4-0", "4-1", "4-2"]);
        // Only the two well-formed entries reach the downstream
        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}
