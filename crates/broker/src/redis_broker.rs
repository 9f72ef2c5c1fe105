//! Redis Streams implementation of `StreamBroker`.

use redis::aio::MultiplexedConnection;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use tracing::{debug, instrument, warn};

use contracts::{ConsumerIdentity, GroupStatus, PipelineError, RawStreamEntry, StreamBroker};

/// Broker reply code for "consumer group already exists"
const BUSYGROUP: &str = "BUSYGROUP";

/// Redis Streams broker client
///
/// Owns one multiplexed connection; the connection is released on
/// `disconnect` and the client is unusable afterwards.
pub struct RedisStreamBroker {
    connection: Option<MultiplexedConnection>,
}

impl RedisStreamBroker {
    /// Connect to the broker at the given URL (`redis://host:port`).
    #[instrument(name = "redis_broker_connect", skip(url))]
    pub async fn connect(url: &str) -> Result<Self, PipelineError> {
        let client = redis::Client::open(url)
            .map_err(|e| PipelineError::broker_connection(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| PipelineError::broker_connection(e.to_string()))?;

        debug!("redis broker connected");

        Ok(Self {
            connection: Some(connection),
        })
    }

    fn connection(&mut self) -> Result<&mut MultiplexedConnection, PipelineError> {
        self.connection
            .as_mut()
            .ok_or_else(|| PipelineError::broker_connection("connection released"))
    }

    fn convert_entry(id: String, map: std::collections::HashMap<String, redis::Value>) -> RawStreamEntry {
        let mut fields = Vec::with_capacity(map.len());
        for (name, value) in map {
            match redis::from_redis_value::<String>(&value) {
                Ok(value) => fields.push((name, value)),
                Err(_) => warn!(field = %name, "skipping non-string stream field"),
            }
        }
        RawStreamEntry { id, fields }
    }
}

impl StreamBroker for RedisStreamBroker {
    #[instrument(
        name = "redis_broker_ensure_group",
        skip(self, identity),
        fields(stream = %identity.stream_key, group = %identity.group)
    )]
    async fn ensure_group(
        &mut self,
        identity: &ConsumerIdentity,
    ) -> Result<GroupStatus, PipelineError> {
        let stream = identity.stream_key.clone();
        let connection = self.connection()?;

        // XGROUP CREATE <stream> <group> $ MKSTREAM
        let created: Result<String, redis::RedisError> = connection
            .xgroup_create_mkstream(&identity.stream_key, &identity.group, "$")
            .await;

        match created {
            Ok(_) => Ok(GroupStatus::Created),
            Err(e) if e.code() == Some(BUSYGROUP) => Ok(GroupStatus::AlreadyExists),
            Err(e) => Err(PipelineError::group_create(stream, e.to_string())),
        }
    }

    #[instrument(
        name = "redis_broker_read_batch",
        skip(self, identity),
        fields(stream = %identity.stream_key, consumer = %identity.consumer)
    )]
    async fn read_batch(
        &mut self,
        identity: &ConsumerIdentity,
    ) -> Result<Vec<RawStreamEntry>, PipelineError> {
        let options = StreamReadOptions::default()
            .group(&identity.group, &identity.consumer)
            .count(identity.batch_size)
            .block(identity.block_ms as usize);

        let connection = self.connection()?;

        // XREADGROUP ... STREAMS <stream> > -- only never-delivered entries
        let reply: Option<StreamReadReply> = connection
            .xread_options(&[&identity.stream_key], &[">"], &options)
            .await
            .map_err(|e| PipelineError::stream_read(e.to_string()))?;

        let Some(reply) = reply else {
            // Block timeout with no new entries
            return Ok(Vec::new());
        };

        let entries: Vec<RawStreamEntry> = reply
            .keys
            .into_iter()
            .flat_map(|key| key.ids)
            .map(|entry| Self::convert_entry(entry.id, entry.map))
            .collect();

        debug!(count = entries.len(), "claimed stream entries");
        Ok(entries)
    }

    #[instrument(
        name = "redis_broker_acknowledge",
        skip(self, identity),
        fields(stream = %identity.stream_key, entry_id = %entry_id)
    )]
    async fn acknowledge(
        &mut self,
        identity: &ConsumerIdentity,
        entry_id: &str,
    ) -> Result<(), PipelineError> {
        let connection = self.connection()?;

        let _acked: i64 = connection
            .xack(&identity.stream_key, &identity.group, &[entry_id])
            .await
            .map_err(|e| PipelineError::acknowledge(entry_id, e.to_string()))?;

        Ok(())
    }

    #[instrument(name = "redis_broker_disconnect", skip(self))]
    async fn disconnect(&mut self) -> Result<(), PipelineError> {
        self.connection = None;
        debug!("redis broker connection released");
        Ok(())
    }
}
