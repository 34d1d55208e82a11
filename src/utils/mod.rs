//! Utility functions for the paychan client.
//!
//! - [`conversion`] - hex encoding and amount parsing
//! - [`block_range`] - splitting block spans for `eth_getLogs`

mod block_range;
mod conversion;

pub use block_range::block_ranges;
pub use conversion::{format_units, hex_encode, parse_amount};
