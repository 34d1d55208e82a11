use std::time::Duration;

use alloy::{
    network::ReceiptResponse,
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider},
    rpc::types::TransactionReceipt,
    sol_types::SolCall,
};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::{
    abis::PaymentChannel::{self, PaymentChannelInstance},
    client::{
        overrides::{Builder, CallOverrides, Overrides, PayableOverrides},
        provider::{build_provider, load_signer},
        variants::{CallStatic, EstimateGas, PopulateTransaction},
    },
    config::{EventSettings, Settings, TransactionSettings},
    events::{decode_logs, fetch_logs, ContractEvent, DecodedEvent, EventWatcher, TypedEventFilter},
};

/// Result of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

impl From<&TransactionReceipt> for TxOutcome {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        }
    }
}

/// Turn a mined receipt into an outcome, failing when the transaction reverted.
fn check_receipt(signature: &str, receipt: &TransactionReceipt) -> Result<TxOutcome> {
    let outcome = TxOutcome::from(receipt);
    if !outcome.success {
        bail!("{} reverted in transaction {}", signature, outcome.tx_hash);
    }
    Ok(outcome)
}

/// Typed handle on a deployed PaymentChannel contract.
///
/// The transaction methods send and wait for the receipt. The
/// [`call_static`](Self::call_static), [`estimate_gas`](Self::estimate_gas)
/// and [`populate_transaction`](Self::populate_transaction) handles expose the
/// same six functions as read-only calls, gas estimates and unsigned requests.
#[derive(Clone)]
pub struct PaymentChannelClient {
    pub(crate) instance: PaymentChannelInstance<DynProvider>,
    sender: Option<Address>,
    transactions: TransactionSettings,
    events: EventSettings,
}

impl PaymentChannelClient {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self {
            instance: PaymentChannel::new(address, provider),
            sender: None,
            transactions: TransactionSettings::default(),
            events: EventSettings::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let signer = load_signer(settings.signer.as_ref())?;
        let provider = build_provider(&settings.rpc, signer.as_ref())?;

        Ok(Self::new(settings.contract.address, provider)
            .with_sender(signer.map(|s| s.address()))
            .with_transaction_settings(settings.transactions.clone())
            .with_event_settings(settings.events.clone()))
    }

    /// Default `from` for populated transactions and the account that signs.
    pub fn with_sender(mut self, sender: Option<Address>) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_transaction_settings(mut self, settings: TransactionSettings) -> Self {
        self.transactions = settings;
        self
    }

    pub fn with_event_settings(mut self, settings: EventSettings) -> Self {
        self.events = settings;
        self
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn provider(&self) -> &DynProvider {
        self.instance.provider()
    }

    /// Same provider and settings, different contract address.
    pub fn attach(&self, address: Address) -> Self {
        let mut client = self.clone();
        client.instance.set_address(address);
        client
    }

    /// Same contract address, different provider.
    pub fn connect(&self, provider: DynProvider, sender: Option<Address>) -> Self {
        Self {
            instance: PaymentChannel::new(self.address(), provider),
            sender,
            transactions: self.transactions.clone(),
            events: self.events.clone(),
        }
    }

    /// Fail unless contract code is deployed at the address.
    pub async fn deployed(&self) -> Result<()> {
        let code = self
            .provider()
            .get_code_at(self.address())
            .await
            .with_context(|| format!("Failed to fetch code at {}", self.address()))?;

        if code.is_empty() {
            bail!("No contract deployed at {}", self.address());
        }
        Ok(())
    }

    // ============================================
    // Contract functions
    // ============================================

    pub async fn deposit(&self, overrides: &PayableOverrides) -> Result<TxOutcome> {
        let builder = overrides.apply(self.instance.deposit());
        self.send(builder, overrides.overrides.from).await
    }

    pub async fn get_balance(&self, addr: Address, overrides: &CallOverrides) -> Result<U256> {
        self.call_static().get_balance(addr, overrides).await
    }

    pub async fn test_create(&self, overrides: &Overrides) -> Result<TxOutcome> {
        let builder = overrides.apply(self.instance.testCreate());
        self.send(builder, overrides.from).await
    }

    pub async fn transfer(
        &self,
        dest: Address,
        amount: U256,
        overrides: &Overrides,
    ) -> Result<TxOutcome> {
        let builder = overrides.apply(self.instance.transfer(dest, amount));
        self.send(builder, overrides.from).await
    }

    pub async fn transfer_fib(
        &self,
        dest: Address,
        count: U256,
        overrides: &Overrides,
    ) -> Result<TxOutcome> {
        let builder = overrides.apply(self.instance.transferFib(dest, count));
        self.send(builder, overrides.from).await
    }

    pub async fn withdraw(&self, amount: U256, overrides: &Overrides) -> Result<TxOutcome> {
        let builder = overrides.apply(self.instance.withdraw(amount));
        self.send(builder, overrides.from).await
    }

    // ============================================
    // Call variants
    // ============================================

    pub fn call_static(&self) -> CallStatic<'_> {
        CallStatic::new(self)
    }

    pub fn estimate_gas(&self) -> EstimateGas<'_> {
        EstimateGas::new(self)
    }

    pub fn populate_transaction(&self) -> PopulateTransaction<'_> {
        PopulateTransaction::new(self)
    }

    // ============================================
    // Events
    // ============================================

    pub fn deposited_filter(
        &self,
        payee: Option<Address>,
    ) -> TypedEventFilter<PaymentChannel::Deposited> {
        TypedEventFilter::deposited(self.address(), payee)
    }

    pub fn transfer_filter(
        &self,
        from: Option<Address>,
        to: Option<Address>,
    ) -> TypedEventFilter<PaymentChannel::Transfer> {
        TypedEventFilter::transfer(self.address(), from, to)
    }

    pub fn withdrawn_filter(
        &self,
        payee: Option<Address>,
    ) -> TypedEventFilter<PaymentChannel::Withdrawn> {
        TypedEventFilter::withdrawn(self.address(), payee)
    }

    pub fn all_events_filter(&self) -> TypedEventFilter<crate::events::PaymentChannelEvent> {
        TypedEventFilter::all(self.address())
    }

    /// Fetch and decode past events. `to_block` defaults to the latest block.
    pub async fn query_filter<E: ContractEvent>(
        &self,
        filter: &TypedEventFilter<E>,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<DecodedEvent<E>>> {
        let to_block = match to_block {
            Some(block) => block,
            None => self
                .provider()
                .get_block_number()
                .await
                .context("Failed to fetch block number")?,
        };

        let logs = fetch_logs(self.provider(), filter, from_block, to_block, &self.events).await?;

        Ok(decode_logs(&logs))
    }

    /// Watcher delivering new events matching `filter`.
    pub fn watch<E: ContractEvent>(&self, filter: TypedEventFilter<E>) -> EventWatcher<E> {
        EventWatcher::new(self.provider().clone(), filter, &self.events)
    }

    // ============================================
    // Internals
    // ============================================

    /// Apply the default sender unless the overrides already set one.
    pub(crate) fn with_default_sender<'a, C: SolCall>(
        &self,
        builder: Builder<'a, C>,
        from: Option<Address>,
    ) -> Builder<'a, C> {
        match (from, self.sender) {
            (None, Some(sender)) => builder.from(sender),
            _ => builder,
        }
    }

    async fn send<C: SolCall>(
        &self,
        builder: Builder<'_, C>,
        from: Option<Address>,
    ) -> Result<TxOutcome> {
        if from.is_none() && self.sender.is_none() {
            bail!("Cannot send {}: no signer configured and no sender given", C::SIGNATURE);
        }
        let builder = self.with_default_sender(builder, from);

        debug!("Sending {} to {}", C::SIGNATURE, self.address());

        let pending = builder
            .send()
            .await
            .with_context(|| format!("Failed to send {}", C::SIGNATURE))?;
        let tx_hash = *pending.tx_hash();

        info!("Sent {} in transaction {}", C::SIGNATURE, tx_hash);

        let receipt = pending
            .with_required_confirmations(self.transactions.required_confirmations)
            .with_timeout(Some(Duration::from_secs(self.transactions.receipt_timeout_secs)))
            .get_receipt()
            .await
            .with_context(|| format!("Failed to get receipt for transaction {tx_hash}"))?;

        let outcome = check_receipt(C::SIGNATURE, &receipt)?;

        info!(
            "{} mined in block {:?}, gas used {}",
            C::SIGNATURE,
            outcome.block_number,
            outcome.gas_used
        );

        Ok(outcome)
    }
}
