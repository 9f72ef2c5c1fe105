//! Mock stream broker
//!
//! Scripted in-memory implementation for unit and e2e tests, supports
//! injecting read failures and inspecting acknowledged entry ids.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{ConsumerIdentity, GroupStatus, PipelineError, RawStreamEntry, StreamBroker};

/// Scripted outcome for one `read_batch` call
enum ReadOutcome {
    Batch(Vec<RawStreamEntry>),
    Error(String),
}

/// Mock broker with a scripted read sequence
///
/// Outcomes are served in order; once the script is exhausted, reads
/// briefly yield and return empty batches (a quiet stream).
pub struct MockStreamBroker {
    script: VecDeque<ReadOutcome>,
    acked: Arc<Mutex<Vec<String>>>,
    read_calls: Arc<AtomicUsize>,
    acks_at_read: Arc<Mutex<Vec<usize>>>,
    group_error: Option<String>,
    group_exists: bool,
    disconnected: bool,
}

impl MockStreamBroker {
    /// Create a broker with an empty script
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            acked: Arc::new(Mutex::new(Vec::new())),
            read_calls: Arc::new(AtomicUsize::new(0)),
            acks_at_read: Arc::new(Mutex::new(Vec::new())),
            group_error: None,
            group_exists: false,
            disconnected: false,
        }
    }

    /// Queue a successful batch
    pub fn with_batch(mut self, entries: Vec<RawStreamEntry>) -> Self {
        self.script.push_back(ReadOutcome::Batch(entries));
        self
    }

    /// Queue a failed read
    pub fn with_read_error(mut self, message: impl Into<String>) -> Self {
        self.script.push_back(ReadOutcome::Error(message.into()));
        self
    }

    /// Make `ensure_group` fail with the given message
    pub fn with_group_error(mut self, message: impl Into<String>) -> Self {
        self.group_error = Some(message.into());
        self
    }

    /// Pretend the group was created by an earlier process
    pub fn with_existing_group(mut self) -> Self {
        self.group_exists = true;
        self
    }

    /// Shared handle to the acknowledged entry ids, in ack order
    pub fn ack_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.acked)
    }

    /// Shared counter of `read_batch` invocations
    pub fn read_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.read_calls)
    }

    /// Shared log of the acknowledged-entry count observed at each
    /// `read_batch` call, for asserting ack/read interleaving
    pub fn acks_at_read(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.acks_at_read)
    }

    /// Whether `disconnect` has been called
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl Default for MockStreamBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamBroker for MockStreamBroker {
    async fn ensure_group(
        &mut self,
        identity: &ConsumerIdentity,
    ) -> Result<GroupStatus, PipelineError> {
        if let Some(message) = self.group_error.take() {
            return Err(PipelineError::group_create(&identity.stream_key, message));
        }
        if self.group_exists {
            return Ok(GroupStatus::AlreadyExists);
        }
        self.group_exists = true;
        Ok(GroupStatus::Created)
    }

    async fn read_batch(
        &mut self,
        _identity: &ConsumerIdentity,
    ) -> Result<Vec<RawStreamEntry>, PipelineError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let acked_so_far = self.acked.lock().unwrap().len();
        self.acks_at_read.lock().unwrap().push(acked_so_far);

        match self.script.pop_front() {
            Some(ReadOutcome::Batch(entries)) => Ok(entries),
            Some(ReadOutcome::Error(message)) => Err(PipelineError::stream_read(message)),
            None => {
                // Quiet stream: emulate a block timeout without busy-spinning
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn acknowledge(
        &mut self,
        _identity: &ConsumerIdentity,
        entry_id: &str,
    ) -> Result<(), PipelineError> {
        self.acked.lock().unwrap().push(entry_id.to_string());
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PipelineError> {
        self.disconnected = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> RawStreamEntry {
        RawStreamEntry::new(
            id,
            vec![
                ("userId".to_string(), "u1".to_string()),
                ("content".to_string(), "hello".to_string()),
            ],
        )
    }

    #[tokio::test]
    async fn test_scripted_reads_in_order() {
        let mut broker = MockStreamBroker::new()
            .with_batch(vec![entry("1-0")])
            .with_read_error("boom");
        let identity = ConsumerIdentity::default();

        let batch = broker.read_batch(&identity).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert!(broker.read_batch(&identity).await.is_err());

        // Exhausted script yields empty batches
        let batch = broker.read_batch(&identity).await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(broker.read_calls().load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_group_creation_idempotent() {
        let mut broker = MockStreamBroker::new();
        let identity = ConsumerIdentity::default();

        assert_eq!(
            broker.ensure_group(&identity).await.unwrap(),
            GroupStatus::Created
        );
        assert_eq!(
            broker.ensure_group(&identity).await.unwrap(),
            GroupStatus::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_acks_at_read_marks_interleaving() {
        let mut broker = MockStreamBroker::new().with_batch(vec![entry("1-0")]);
        let identity = ConsumerIdentity::default();
        let marks = broker.acks_at_read();

        broker.read_batch(&identity).await.unwrap();
        broker.acknowledge(&identity, "1-0").await.unwrap();
        broker.read_batch(&identity).await.unwrap();

        assert_eq!(*marks.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_ack_log_records_ids() {
        let mut broker = MockStreamBroker::new();
        let identity = ConsumerIdentity::default();
        let acks = broker.ack_log();

        broker.acknowledge(&identity, "1-0").await.unwrap();
        broker.acknowledge(&identity, "1-1").await.unwrap();

        assert_eq!(*acks.lock().unwrap(), vec!["1-0", "1-1"]);
    }
}
