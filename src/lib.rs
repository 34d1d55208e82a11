pub mod abis;
pub mod client;
pub mod config;
pub mod events;
pub mod interface;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use abis::PaymentChannel;
pub use client::{CallOverrides, Overrides, PayableOverrides, PaymentChannelClient, TxOutcome};
pub use config::Settings;
pub use events::{DecodedEvent, EventWatcher, PaymentChannelEvent, TypedEventFilter};
