pub mod context;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod host;
pub mod injection;
pub mod llm_client;
pub mod persistence;
pub mod protocol;
pub mod ranker;
pub mod store;
pub mod transport;
pub mod units;

pub use context::{HostContext, Participant, StatsContext, StatsEvent};
pub use error::{Result, StatsError};
