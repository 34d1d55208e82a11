//! Typed event filters, log decoding and event watching for the
//! PaymentChannel contract.

pub mod filters;
pub mod parser;
pub mod query;
pub mod watcher;

pub use filters::TypedEventFilter;
pub use parser::{decode_logs, parse_log, ContractEvent, DecodedEvent, PaymentChannelEvent};
pub use query::fetch_logs;
pub use watcher::EventWatcher;
