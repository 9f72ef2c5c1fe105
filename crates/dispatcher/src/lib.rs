//! # Dispatcher
//!
//! Downstream dispatch to the analysis service.
//!
//! Responsibilities:
//! - Forward normalized `InteractionEvent`s over the bulk channel
//! - Emit `BurnoutAlert`s over the alert channel
//! - Tolerate an absent/unready downstream (`Ok(None)`, never an error)

pub mod dispatcher;
pub mod http;
pub mod mock;

pub use contracts::{AlertAck, AnalysisClient, InteractionAck};
pub use dispatcher::AnalysisDispatcher;
pub use http::HttpAnalysisClient;
pub use mock::{DispatchCall, MockAnalysisClient};
