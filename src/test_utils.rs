//! Fixtures shared by tests that talk to a mocked node.

use alloy::{
    primitives::{address, b256, Address, U256},
    providers::{mock::Asserter, DynProvider, ProviderBuilder},
    rpc::types::Log,
    sol_types::SolEvent,
};

use crate::abis::PaymentChannel::Deposited;

pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Provider answering every request with the next response queued on `asserter`.
pub fn mocked_provider(asserter: &Asserter) -> DynProvider {
    DynProvider::new(ProviderBuilder::new().connect_mocked_client(asserter.clone()))
}

pub fn deposited_log(amount: u64, block_number: u64, log_index: u64) -> Log {
    let event = Deposited {
        payee: ALICE,
        weiAmount: U256::from(amount),
    };
    Log {
        inner: alloy::primitives::Log {
            address: CONTRACT,
            data: event.encode_log_data(),
        },
        block_number: Some(block_number),
        transaction_hash: Some(b256!(
            "2222222222222222222222222222222222222222222222222222222222222222"
        )),
        log_index: Some(log_index),
        ..Default::default()
    }
}
