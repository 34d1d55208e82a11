//! Calldata and return-data codec for the PaymentChannel ABI.
//!
//! The heavy lifting is done by the `sol!`-generated types; this module
//! gives them a lookup-by-selector surface for tooling that handles raw
//! transactions and logs.

use alloy::{
    primitives::{Bytes, B256},
    sol_types::{SolCall, SolEvent, SolInterface},
};
use anyhow::{Context, Result};

use crate::{
    abis::PaymentChannel::{
        depositCall, getBalanceCall, testCreateCall, transferCall, transferFibCall, withdrawCall,
        Deposited, PaymentChannelCalls, Transfer, Withdrawn,
    },
    utils::hex_encode,
};

/// A call to any PaymentChannel function.
pub type PaymentChannelCall = PaymentChannelCalls;

/// Name, signature and selector of every function, in ABI order.
pub const FUNCTIONS: [(&str, &str, [u8; 4]); 6] = [
    ("deposit", depositCall::SIGNATURE, depositCall::SELECTOR),
    ("getBalance", getBalanceCall::SIGNATURE, getBalanceCall::SELECTOR),
    ("testCreate", testCreateCall::SIGNATURE, testCreateCall::SELECTOR),
    ("transfer", transferCall::SIGNATURE, transferCall::SELECTOR),
    ("transferFib", transferFibCall::SIGNATURE, transferFibCall::SELECTOR),
    ("withdraw", withdrawCall::SIGNATURE, withdrawCall::SELECTOR),
];

/// Name, signature and topic0 of every event.
pub const EVENTS: [(&str, &str, B256); 3] = [
    ("Deposited", Deposited::SIGNATURE, Deposited::SIGNATURE_HASH),
    ("Transfer", Transfer::SIGNATURE, Transfer::SIGNATURE_HASH),
    ("Withdrawn", Withdrawn::SIGNATURE, Withdrawn::SIGNATURE_HASH),
];

pub fn encode_function_data(call: &PaymentChannelCall) -> Bytes {
    call.abi_encode().into()
}

/// Decode calldata into the call it encodes.
pub fn decode_function_data(data: &[u8]) -> Result<PaymentChannelCall> {
    PaymentChannelCalls::abi_decode(data).with_context(|| {
        let selector = &data[..data.len().min(4)];
        format!("Unrecognised PaymentChannel calldata (selector {})", hex_encode(selector))
    })
}

/// Decode the return data of function `C`.
pub fn decode_function_result<C: SolCall>(data: &[u8]) -> Result<C::Return> {
    C::abi_decode_returns(data)
        .with_context(|| format!("Invalid return data for {}", C::SIGNATURE))
}

/// Look a function up by name, full signature or selector.
pub fn function_signature(name_or_signature_or_selector: &str) -> Option<&'static str> {
    let key = name_or_signature_or_selector.trim();
    FUNCTIONS
        .iter()
        .find(|(name, signature, selector)| {
            key == *name || key == *signature || key.eq_ignore_ascii_case(&hex_encode(selector))
        })
        .map(|(_, signature, _)| *signature)
}

/// Look an event up by name, full signature or topic, the way `getEvent` does.
pub fn event_signature(name_or_signature_or_topic: &str) -> Option<&'static str> {
    let key = name_or_signature_or_topic.trim();
    EVENTS
        .iter()
        .find(|(name, signature, topic)| {
            key == *name
                || key == *signature
                || key.eq_ignore_ascii_case(&hex_encode(topic.as_slice()))
        })
        .map(|(_, signature, _)| *signature)
}
