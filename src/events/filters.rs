//! Typed event filters, one constructor per contract event.
//!
//! Indexed arguments left as `None` match any value.

use std::marker::PhantomData;

use alloy::{
    primitives::{Address, B256},
    rpc::types::{BlockNumberOrTag, Filter},
    sol_types::SolEvent,
};

use crate::{
    abis::PaymentChannel::{Deposited, Transfer, Withdrawn},
    events::parser::{ContractEvent, PaymentChannelEvent},
};

/// An `eth_getLogs` filter that is known to only match logs decoding as `E`.
#[derive(Debug, Clone)]
pub struct TypedEventFilter<E> {
    filter: Filter,
    _event: PhantomData<fn() -> E>,
}

impl<E: ContractEvent> TypedEventFilter<E> {
    fn new(filter: Filter) -> Self {
        Self {
            filter,
            _event: PhantomData,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn into_filter(self) -> Filter {
        self.filter
    }

    /// The filter narrowed to an inclusive block span.
    pub fn between(&self, from: u64, to: u64) -> Filter {
        self.filter
            .clone()
            .from_block(BlockNumberOrTag::Number(from))
            .to_block(BlockNumberOrTag::Number(to))
    }
}

fn topic(address: Address) -> B256 {
    address.into_word()
}

fn event_filter<E: SolEvent>(contract: Address) -> Filter {
    Filter::new()
        .address(contract)
        .event_signature(E::SIGNATURE_HASH)
}

impl TypedEventFilter<Deposited> {
    pub fn deposited(contract: Address, payee: Option<Address>) -> Self {
        let mut filter = event_filter::<Deposited>(contract);
        if let Some(payee) = payee {
            filter = filter.topic1(topic(payee));
        }
        Self::new(filter)
    }
}

impl TypedEventFilter<Transfer> {
    pub fn transfer(contract: Address, from: Option<Address>, to: Option<Address>) -> Self {
        let mut filter = event_filter::<Transfer>(contract);
        if let Some(from) = from {
            filter = filter.topic1(topic(from));
        }
        if let Some(to) = to {
            filter = filter.topic2(topic(to));
        }
        Self::new(filter)
    }
}

impl TypedEventFilter<Withdrawn> {
    pub fn withdrawn(contract: Address, payee: Option<Address>) -> Self {
        let mut filter = event_filter::<Withdrawn>(contract);
        if let Some(payee) = payee {
            filter = filter.topic1(topic(payee));
        }
        Self::new(filter)
    }
}

impl TypedEventFilter<PaymentChannelEvent> {
    /// Every event the contract emits.
    pub fn all(contract: Address) -> Self {
        Self::new(Filter::new().address(contract).event_signature(vec![
            Deposited::SIGNATURE_HASH,
            Transfer::SIGNATURE_HASH,
            Withdrawn::SIGNATURE_HASH,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    #[test]
    fn test_deposited_any_payee() {
        let filter = TypedEventFilter::deposited(CONTRACT, None).into_filter();

        assert!(filter.address.matches(&CONTRACT));
        assert!(filter.topics[0].matches(&Deposited::SIGNATURE_HASH));
        assert!(!filter.topics[0].matches(&Withdrawn::SIGNATURE_HASH));
        assert!(filter.topics[1].is_empty());
    }

    #[test]
    fn test_deposited_specific_payee() {
        let filter = TypedEventFilter::deposited(CONTRACT, Some(ALICE)).into_filter();

        assert!(filter.topics[1].matches(&ALICE.into_word()));
        assert!(!filter.topics[1].matches(&BOB.into_word()));
    }

    #[test]
    fn test_transfer_to_only() {
        let filter = TypedEventFilter::transfer(CONTRACT, None, Some(BOB)).into_filter();

        assert!(filter.topics[0].matches(&Transfer::SIGNATURE_HASH));
        assert!(filter.topics[1].is_empty());
        assert!(filter.topics[2].matches(&BOB.into_word()));
        assert!(!filter.topics[2].matches(&ALICE.into_word()));
    }

    #[test]
    fn test_transfer_from_and_to() {
        let filter = TypedEventFilter::transfer(CONTRACT, Some(ALICE), Some(BOB)).into_filter();

        assert!(filter.topics[1].matches(&ALICE.into_word()));
        assert!(filter.topics[2].matches(&BOB.into_word()));
        assert!(filter.topics[3].is_empty());
    }

    #[test]
    fn test_withdrawn_filter_signature() {
        let filter = TypedEventFilter::withdrawn(CONTRACT, Some(BOB)).into_filter();

        assert!(filter.topics[0].matches(&Withdrawn::SIGNATURE_HASH));
        assert!(filter.topics[1].matches(&BOB.into_word()));
    }

    #[test]
    fn test_all_matches_every_event_signature() {
        let filter = TypedEventFilter::all(CONTRACT).into_filter();

        assert!(filter.topics[0].matches(&Deposited::SIGNATURE_HASH));
        assert!(filter.topics[0].matches(&Transfer::SIGNATURE_HASH));
        assert!(filter.topics[0].matches(&Withdrawn::SIGNATURE_HASH));
        assert!(!filter.topics[0].matches(&B256::repeat_byte(1)));
    }

    #[test]
    fn test_between_sets_block_span() {
        let filter = TypedEventFilter::deposited(CONTRACT, None).between(100, 199);

        assert_eq!(filter.get_from_block(), Some(100));
        assert_eq!(filter.get_to_block(), Some(199));
        // Narrowing does not drop the topic constraints
        assert!(filter.topics[0].matches(&Deposited::SIGNATURE_HASH));
    }
}
