//! Type conversion and formatting utilities.

use alloy::primitives::{
    hex,
    utils::{format_units as alloy_format_units, parse_units, ParseUnits},
    U256,
};
use anyhow::{bail, Context, Result};

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a user supplied amount.
///
/// Plain integers are taken as base units (wei). A unit suffix such as
/// `1.5ether` or `20gwei` is scaled accordingly.
pub fn parse_amount(input: &str) -> Result<U256> {
    let input = input.trim();
    if input.starts_with('-') {
        bail!("Amount must not be negative: {input}");
    }
    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    if unit.is_empty() {
        return U256::from_str_radix(number, 10)
            .with_context(|| format!("Invalid amount: {input}"));
    }

    match parse_units(number, unit).with_context(|| format!("Invalid amount: {input}"))? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(value) if value.is_negative() => {
            bail!("Amount must not be negative: {input}")
        },
        ParseUnits::I256(value) => Ok(value.into_raw()),
    }
}

/// Format a base-unit amount with the given decimals, e.g. wei as ether with 18.
pub fn format_units(value: U256, decimals: u8) -> String {
    alloy_format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encode_prefixes_and_lowercases() {
        assert_eq!(hex_encode(&[0xAB, 0x01]), "0xab01");
        assert_eq!(hex_encode(&[]), "0x");
    }

    #[test]
    fn test_parse_amount_plain_wei() {
        assert_eq!(parse_amount("12345").unwrap(), U256::from(12345u64));
        assert_eq!(parse_amount(" 7 ").unwrap(), U256::from(7u64));
    }

    #[test]
    fn test_parse_amount_with_units() {
        assert_eq!(
            parse_amount("1ether").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_amount("2gwei").unwrap(), U256::from(2_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("1parsec").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_negative_with_unit() {
        let err = parse_amount("-1ether").unwrap_err();
        assert!(err.to_string().contains("negative"));
        assert!(parse_amount("-0.5gwei").is_err());
        assert!(parse_amount(" -2wei").is_err());
    }

    #[test]
    fn test_format_units_ether() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_units(one_and_half, 18), "1.500000000000000000");
    }
}
