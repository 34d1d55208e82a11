use alloy::{json_abi::JsonAbi, sol};
use anyhow::Context;

sol! {
    #[sol(rpc, all_derives)]
    contract PaymentChannel {
        event Deposited(address indexed payee, uint256 weiAmount);
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Withdrawn(address indexed payee, uint256 weiAmount);

        function deposit() external payable;
        function getBalance(address addr) external view returns (uint256);
        function testCreate() external returns (uint256);
        function transfer(address dest, uint256 amount) external;
        function transferFib(address dest, uint256 count) external;
        function withdraw(uint256 amount) external;
    }
}

/// Compiler output ABI of the deployed contract.
pub const PAYMENT_CHANNEL_ABI_JSON: &str = include_str!("../../abi/PaymentChannel.json");

/// Parse the embedded JSON ABI.
pub fn payment_channel_abi() -> anyhow::Result<JsonAbi> {
    serde_json::from_str(PAYMENT_CHANNEL_ABI_JSON).context("Embedded PaymentChannel ABI is invalid")
}
