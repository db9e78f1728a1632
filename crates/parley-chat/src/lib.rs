//! Response resolution for Parley.
//!
//! Tries the remote inference relay first and falls back to a local
//! rule-based responder (greetings, clock/calendar, arithmetic, history
//! search) when the relay is unavailable or returns something unusable.

pub mod dispatcher;
pub mod error;
pub mod evaluator;
pub mod latency;
pub mod pipeline;
pub mod prompt;
pub mod relay;
pub mod search;

pub use dispatcher::{Intent, IntentDispatcher};
pub use error::{ChatError, RelayError};
pub use evaluator::{evaluate, format_number, EvalError};
pub use latency::SimulatedLatency;
pub use pipeline::{Exchange, ReplySource, Resolution, ResponsePipeline};
pub use prompt::build_prompt;
pub use relay::{HttpRelayClient, OfflineRelay, RelayReply, RemoteReplyClient};
pub use search::HistorySearch;
