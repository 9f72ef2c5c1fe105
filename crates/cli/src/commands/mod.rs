//! CLI command implementations.

mod run;
mod validate;

pub use run::run_pipeline;
pub use validate::run_validate;

use contracts::ConsumerIdentity;

use crate::cli::RunArgs;

/// Build the consumer identity from CLI arguments.
///
/// The consumer name falls back to the `HOSTNAME` environment variable and
/// then to the crate default, so cooperating replicas stay distinguishable
/// in container deployments.
pub(crate) fn identity_from_args(args: &RunArgs) -> ConsumerIdentity {
    let consumer = args
        .consumer
        .clone()
        .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
        .unwrap_or_else(|| ConsumerIdentity::default().consumer);

    ConsumerIdentity {
        stream_key: args.stream_key.clone(),
        group: args.group.clone(),
        consumer,
        batch_size: args.batch_size,
        block_ms: args.block_ms,
    }
}
