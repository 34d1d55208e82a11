//! Read-only call, gas estimation and transaction population for every
//! contract function.

use alloy::{
    primitives::{Address, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use anyhow::{Context, Result};

use crate::client::{
    contract::PaymentChannelClient,
    overrides::{Builder, CallOverrides, Overrides, PayableOverrides},
};

/// Runs functions as `eth_call` and returns what they would return,
/// without sending a transaction.
pub struct CallStatic<'a> {
    client: &'a PaymentChannelClient,
}

impl<'a> CallStatic<'a> {
    pub(crate) fn new(client: &'a PaymentChannelClient) -> Self {
        Self { client }
    }

    async fn call<C: SolCall>(
        &self,
        builder: Builder<'a, C>,
        overrides: &CallOverrides,
    ) -> Result<C::Return> {
        let builder = overrides.apply(builder);
        let builder = self.client.with_default_sender(builder, overrides.overrides.from);
        builder
            .call()
            .await
            .with_context(|| format!("Static call to {} failed", C::SIGNATURE))
    }

    pub async fn deposit(&self, overrides: &CallOverrides) -> Result<()> {
        self.call(self.client.instance.deposit(), overrides).await?;
        Ok(())
    }

    pub async fn get_balance(&self, addr: Address, overrides: &CallOverrides) -> Result<U256> {
        self.call(self.client.instance.getBalance(addr), overrides).await
    }

    pub async fn test_create(&self, overrides: &CallOverrides) -> Result<U256> {
        self.call(self.client.instance.testCreate(), overrides).await
    }

    pub async fn transfer(
        &self,
        dest: Address,
        amount: U256,
        overrides: &CallOverrides,
    ) -> Result<()> {
        self.call(self.client.instance.transfer(dest, amount), overrides).await?;
        Ok(())
    }

    pub async fn transfer_fib(
        &self,
        dest: Address,
        count: U256,
        overrides: &CallOverrides,
    ) -> Result<()> {
        self.call(self.client.instance.transferFib(dest, count), overrides).await?;
        Ok(())
    }

    pub async fn withdraw(&self, amount: U256, overrides: &CallOverrides) -> Result<()> {
        self.call(self.client.instance.withdraw(amount), overrides).await?;
        Ok(())
    }
}

/// Estimates the gas each function would use.
pub struct EstimateGas<'a> {
    client: &'a PaymentChannelClient,
}

impl<'a> EstimateGas<'a> {
    pub(crate) fn new(client: &'a PaymentChannelClient) -> Self {
        Self { client }
    }

    async fn estimate<C: SolCall>(
        &self,
        builder: Builder<'a, C>,
        from: Option<Address>,
    ) -> Result<u64> {
        let builder = self.client.with_default_sender(builder, from);
        builder
            .estimate_gas()
            .await
            .with_context(|| format!("Gas estimation for {} failed", C::SIGNATURE))
    }

    pub async fn deposit(&self, overrides: &PayableOverrides) -> Result<u64> {
        let builder = overrides.apply(self.client.instance.deposit());
        self.estimate(builder, overrides.overrides.from).await
    }

    pub async fn get_balance(&self, addr: Address, overrides: &CallOverrides) -> Result<u64> {
        let builder = overrides.apply(self.client.instance.getBalance(addr));
        self.estimate(builder, overrides.overrides.from).await
    }

    pub async fn test_create(&self, overrides: &Overrides) -> Result<u64> {
        let builder = overrides.apply(self.client.instance.testCreate());
        self.estimate(builder, overrides.from).await
    }

    pub async fn transfer(
        &self,
        dest: Address,
        amount: U256,
        overrides: &Overrides,
    ) -> Result<u64> {
        let builder = overrides.apply(self.client.instance.transfer(dest, amount));
        self.estimate(builder, overrides.from).await
    }

    pub async fn transfer_fib(
        &self,
        dest: Address,
        count: U256,
        overrides: &Overrides,
    ) -> Result<u64> {
        let builder = overrides.apply(self.client.instance.transferFib(dest, count));
        self.estimate(builder, overrides.from).await
    }

    pub async fn withdraw(&self, amount: U256, overrides: &Overrides) -> Result<u64> {
        let builder = overrides.apply(self.client.instance.withdraw(amount));
        self.estimate(builder, overrides.from).await
    }
}

/// Builds unsigned transaction requests. Nothing is sent and the node is
/// not contacted, so fields not given as overrides stay unset.
pub struct PopulateTransaction<'a> {
    client: &'a PaymentChannelClient,
}

impl<'a> PopulateTransaction<'a> {
    pub(crate) fn new(client: &'a PaymentChannelClient) -> Self {
        Self { client }
    }

    fn populate<C: SolCall>(
        &self,
        builder: Builder<'a, C>,
        from: Option<Address>,
    ) -> TransactionRequest {
        self.client
            .with_default_sender(builder, from)
            .into_transaction_request()
    }

    pub fn deposit(&self, overrides: &PayableOverrides) -> TransactionRequest {
        let builder = overrides.apply(self.client.instance.deposit());
        self.populate(builder, overrides.overrides.from)
    }

    pub fn get_balance(&self, addr: Address, overrides: &CallOverrides) -> TransactionRequest {
        let builder = overrides.apply(self.client.instance.getBalance(addr));
        self.populate(builder, overrides.overrides.from)
    }

    pub fn test_create(&self, overrides: &Overrides) -> TransactionRequest {
        let builder = overrides.apply(self.client.instance.testCreate());
        self.populate(builder, overrides.from)
    }

    pub fn transfer(
        &self,
        dest: Address,
        amount: U256,
        overrides: &Overrides,
    ) -> TransactionRequest {
        let builder = overrides.apply(self.client.instance.transfer(dest, amount));
        self.populate(builder, overrides.from)
    }

    pub fn transfer_fib(
        &self,
        dest: Address,
        count: U256,
        overrides: &Overrides,
    ) -> TransactionRequest {
        let builder = overrides.apply(self.client.instance.transferFib(dest, count));
        self.populate(builder, overrides.from)
    }

    pub fn withdraw(&self, amount: U256, overrides: &Overrides) -> TransactionRequest {
        let builder = overrides.apply(self.client.instance.withdraw(amount));
        self.populate(builder, overrides.from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abis::PaymentChannel::{
            depositCall, getBalanceCall, transferCall, transferFibCall, withdrawCall,
        },
        client::build_provider,
        config::RpcSettings,
    };
    use alloy::primitives::{address, TxKind};

    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn client(sender: Option<Address>) -> PaymentChannelClient {
        // Nothing in these tests reaches the node
        let rpc = RpcSettings {
            url: "http://127.0.0.1:1".to_string(),
        };
        let provider = build_provider(&rpc, None).unwrap();
        PaymentChannelClient::new(CONTRACT, provider).with_sender(sender)
    }

    fn input(request: &TransactionRequest) -> Vec<u8> {
        request.input.input().cloned().unwrap_or_default().to_vec()
    }

    #[tokio::test]
    async fn test_populate_transfer() {
        let client = client(None);
        let request = client
            .populate_transaction()
            .transfer(BOB, U256::from(100u64), &Overrides::default());

        assert_eq!(request.to, Some(TxKind::Call(CONTRACT)));
        assert_eq!(
            input(&request),
            transferCall {
                dest: BOB,
                amount: U256::from(100u64)
            }
            .abi_encode()
        );
        assert_eq!(request.from, None);
        assert_eq!(request.value, None);
        assert_eq!(request.gas, None);
        assert_eq!(request.nonce, None);
    }

    #[tokio::test]
    async fn test_populate_deposit_attaches_value() {
        let client = client(None);
        let value = U256::from(1_000_000_000u64);
        let request = client
            .populate_transaction()
            .deposit(&PayableOverrides::with_value(value));

        assert_eq!(request.value, Some(value));
        assert_eq!(input(&request), depositCall {}.abi_encode());
        assert_eq!(input(&request), depositCall::SELECTOR.to_vec());
    }

    #[tokio::test]
    async fn test_populate_applies_overrides() {
        let client = client(None);
        let overrides = Overrides {
            from: Some(ALICE),
            gas_limit: Some(50_000),
            gas_price: Some(2_000_000_000),
            nonce: Some(7),
        };
        let request = client
            .populate_transaction()
            .withdraw(U256::from(5u64), &overrides);

        assert_eq!(request.from, Some(ALICE));
        assert_eq!(request.gas, Some(50_000));
        assert_eq!(request.gas_price, Some(2_000_000_000));
        assert_eq!(request.nonce, Some(7));
        assert_eq!(
            input(&request),
            withdrawCall {
                amount: U256::from(5u64)
            }
            .abi_encode()
        );
    }

    #[tokio::test]
    async fn test_populate_uses_default_sender() {
        let client = client(Some(ALICE));
        let request = client
            .populate_transaction()
            .transfer_fib(BOB, U256::from(10u64), &Overrides::default());

        assert_eq!(request.from, Some(ALICE));
        assert_eq!(
            input(&request),
            transferFibCall {
                dest: BOB,
                count: U256::from(10u64)
            }
            .abi_encode()
        );
    }

    #[tokio::test]
    async fn test_explicit_from_beats_default_sender() {
        let client = client(Some(ALICE));
        let overrides = Overrides {
            from: Some(BOB),
            ..Default::default()
        };
        let request = client.populate_transaction().test_create(&overrides);

        assert_eq!(request.from, Some(BOB));
    }

    #[tokio::test]
    async fn test_populate_get_balance() {
        let client = client(None);
        let request = client
            .populate_transaction()
            .get_balance(ALICE, &CallOverrides::default());

        assert_eq!(input(&request), getBalanceCall { addr: ALICE }.abi_encode());
    }

    #[tokio::test]
    async fn test_attach_changes_target() {
        let other = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");
        let client = client(None).attach(other);
        let request = client.populate_transaction().test_create(&Overrides::default());

        assert_eq!(client.address(), other);
        assert_eq!(request.to, Some(TxKind::Call(other)));
    }

    #[tokio::test]
    async fn test_send_without_signer_fails_before_network() {
        let client = client(None);
        let err = client
            .withdraw(U256::from(1u64), &Overrides::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no signer configured"));
    }
}
