use alloy::{
    contract::SolCallBuilder,
    eips::BlockId,
    primitives::{Address, U256},
    providers::DynProvider,
    sol_types::SolCall,
};

pub(crate) type Builder<'a, C> = SolCallBuilder<&'a DynProvider, C>;

/// Per-transaction overrides for non-payable functions.
///
/// Unset fields are left to the provider's fillers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub from: Option<Address>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
}

impl Overrides {
    pub(crate) fn apply<'a, C: SolCall>(&self, mut builder: Builder<'a, C>) -> Builder<'a, C> {
        if let Some(from) = self.from {
            builder = builder.from(from);
        }
        if let Some(gas_limit) = self.gas_limit {
            builder = builder.gas(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            builder = builder.gas_price(gas_price);
        }
        if let Some(nonce) = self.nonce {
            builder = builder.nonce(nonce);
        }
        builder
    }
}

/// Overrides for payable functions; `value` is the wei attached to the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayableOverrides {
    pub overrides: Overrides,
    pub value: Option<U256>,
}

impl PayableOverrides {
    pub fn with_value(value: U256) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub(crate) fn apply<'a, C: SolCall>(&self, builder: Builder<'a, C>) -> Builder<'a, C> {
        let builder = self.overrides.apply(builder);
        match self.value {
            Some(value) => builder.value(value),
            None => builder,
        }
    }
}

impl From<Overrides> for PayableOverrides {
    fn from(overrides: Overrides) -> Self {
        Self {
            overrides,
            value: None,
        }
    }
}

/// Overrides for read-only calls. `block` pins the state the call runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOverrides {
    pub overrides: Overrides,
    pub value: Option<U256>,
    pub block: Option<BlockId>,
}

impl CallOverrides {
    pub fn at_block(block: BlockId) -> Self {
        Self {
            block: Some(block),
            ..Default::default()
        }
    }

    pub(crate) fn apply<'a, C: SolCall>(&self, builder: Builder<'a, C>) -> Builder<'a, C> {
        let mut builder = self.overrides.apply(builder);
        if let Some(value) = self.value {
            builder = builder.value(value);
        }
        if let Some(block) = self.block {
            builder = builder.block(block);
        }
        builder
    }
}

impl From<Overrides> for CallOverrides {
    fn from(overrides: Overrides) -> Self {
        Self {
            overrides,
            ..Default::default()
        }
    }
}

impl From<PayableOverrides> for CallOverrides {
    fn from(payable: PayableOverrides) -> Self {
        Self {
            overrides: payable.overrides,
            value: payable.value,
            block: None,
        }
    }
}
