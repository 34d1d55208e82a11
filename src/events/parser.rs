//! Decoding of raw RPC logs into typed PaymentChannel events.

use std::fmt;

use alloy::{
    primitives::{Address, TxHash},
    rpc::types::Log,
    sol_types::SolEvent,
};
use log::warn;

use crate::abis::PaymentChannel::{Deposited, Transfer, Withdrawn};

/// Any event emitted by the PaymentChannel contract.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentChannelEvent {
    Deposited(Deposited),
    Transfer(Transfer),
    Withdrawn(Withdrawn),
}

impl PaymentChannelEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposited(_) => "Deposited",
            Self::Transfer(_) => "Transfer",
            Self::Withdrawn(_) => "Withdrawn",
        }
    }
}

impl fmt::Display for PaymentChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposited(e) => {
                write!(f, "Deposited(payee={}, weiAmount={})", e.payee, e.weiAmount)
            },
            Self::Transfer(e) => {
                write!(f, "Transfer(from={}, to={}, value={})", e.from, e.to, e.value)
            },
            Self::Withdrawn(e) => {
                write!(f, "Withdrawn(payee={}, weiAmount={})", e.payee, e.weiAmount)
            },
        }
    }
}

/// Something that can be decoded out of a contract log.
///
/// Implemented for every single `sol!` event and for [`PaymentChannelEvent`],
/// so filters and watchers work for one event or for all of them.
pub trait ContractEvent: Sized + Send + 'static {
    fn decode(log: &Log) -> Option<Self>;
}

impl<E: SolEvent + Send + 'static> ContractEvent for E {
    fn decode(log: &Log) -> Option<Self> {
        if log.topic0() != Some(&E::SIGNATURE_HASH) {
            return None;
        }
        E::decode_log_data(log.data()).ok()
    }
}

impl ContractEvent for PaymentChannelEvent {
    fn decode(log: &Log) -> Option<Self> {
        parse_log(log)
    }
}

/// A decoded event together with where it was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent<E> {
    pub event: E,
    pub address: Address,
    pub block_number: Option<u64>,
    pub tx_hash: Option<TxHash>,
    pub log_index: Option<u64>,
    /// Set when the log was removed by a reorg
    pub removed: bool,
}

impl<E> DecodedEvent<E> {
    fn new(event: E, log: &Log) -> Self {
        Self {
            event,
            address: log.address(),
            block_number: log.block_number,
            tx_hash: log.transaction_hash,
            log_index: log.log_index,
            removed: log.removed,
        }
    }
}

/// Decode a single log by its topic0 signature.
///
/// Logs without topics, with an unknown signature, or with a payload that
/// does not match the event layout yield `None`.
pub fn parse_log(log: &Log) -> Option<PaymentChannelEvent> {
    let topic0 = log.topic0()?;
    let log_data = log.data();

    match topic0 {
        t if t == &Deposited::SIGNATURE_HASH => Deposited::decode_log_data(log_data)
            .ok()
            .map(PaymentChannelEvent::Deposited),
        t if t == &Transfer::SIGNATURE_HASH => Transfer::decode_log_data(log_data)
            .ok()
            .map(PaymentChannelEvent::Transfer),
        t if t == &Withdrawn::SIGNATURE_HASH => Withdrawn::decode_log_data(log_data)
            .ok()
            .map(PaymentChannelEvent::Withdrawn),
        _ => None,
    }
}

/// Decode logs in order, skipping the ones that do not decode as `E`.
pub fn decode_logs<E: ContractEvent>(logs: &[Log]) -> Vec<DecodedEvent<E>> {
    logs.iter()
        .filter_map(|log| match E::decode(log) {
            Some(event) => Some(DecodedEvent::new(event, log)),
            None => {
                warn!(
                    "Skipping undecodable log at block {:?} index {:?} in tx {:?}",
                    log.block_number, log.log_index, log.transaction_hash
                );
                None
            },
        })
        .collect()
}
