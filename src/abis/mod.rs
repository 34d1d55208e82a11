pub mod payment_channel;

pub use payment_channel::{
    payment_channel_abi, PaymentChannel, PaymentChannel::PaymentChannelCalls,
    PaymentChannel::PaymentChannelEvents, PAYMENT_CHANNEL_ABI_JSON,
};
