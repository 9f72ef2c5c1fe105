//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Event timestamps are epoch milliseconds (`i64`), carried as-is from producers
//! - Entry ids are broker-assigned, opaque, monotonically increasing strings

mod analysis;
mod broker;
mod clock;
mod error;
mod event;
mod identity;

pub use analysis::{AlertAck, AnalysisClient, InteractionAck};
pub use broker::{GroupStatus, StreamBroker};
pub use clock::now_millis;
pub use error::*;
pub use event::*;
pub use identity::ConsumerIdentity;
