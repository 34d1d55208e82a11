mod config;

pub use self::config::{
    ContractSettings, EventSettings, RpcSettings, Settings, SignerSettings, TransactionSettings,
};
