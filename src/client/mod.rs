//! Typed client for a deployed PaymentChannel contract.
//!
//! - [`provider`] - building the alloy provider, with or without a signer
//! - [`overrides`] - per-call gas, nonce, sender and value overrides
//! - [`contract`] - the client and its transaction methods
//! - [`variants`] - static call, gas estimation and transaction population

pub mod contract;
pub mod overrides;
pub mod provider;
pub mod variants;

pub use contract::{PaymentChannelClient, TxOutcome};
pub use overrides::{CallOverrides, Overrides, PayableOverrides};
pub use provider::{build_provider, load_signer};
pub use variants::{CallStatic, EstimateGas, PopulateTransaction};
