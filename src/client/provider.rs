use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use log::info;
use url::Url;

use crate::config::{RpcSettings, SignerSettings};

/// Parse the configured private key, if any.
pub fn load_signer(settings: Option<&SignerSettings>) -> Result<Option<PrivateKeySigner>> {
    settings
        .map(|s| {
            s.private_key
                .trim()
                .parse::<PrivateKeySigner>()
                .context("Invalid signer private key")
        })
        .transpose()
}

/// Build an HTTP provider for the configured node.
///
/// With a signer the provider fills nonce, gas and chain id and signs
/// locally. Without one it is read-only.
pub fn build_provider(rpc: &RpcSettings, signer: Option<&PrivateKeySigner>) -> Result<DynProvider> {
    let url = Url::parse(&rpc.url).with_context(|| format!("Invalid RPC URL: {}", rpc.url))?;

    let provider = match signer {
        Some(signer) => {
            info!("Connecting to {} as {}", url, signer.address());
            let wallet = EthereumWallet::from(signer.clone());
            DynProvider::new(ProviderBuilder::new().wallet(wallet).connect_http(url))
        },
        None => {
            info!("Connecting to {} (read-only)", url);
            DynProvider::new(ProviderBuilder::new().connect_http(url))
        },
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    // Well-known first development account of anvil/hardhat
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_load_signer_none() {
        assert!(load_signer(None).unwrap().is_none());
    }

    #[test]
    fn test_load_signer_derives_address() {
        let settings = SignerSettings {
            private_key: DEV_KEY.to_string(),
        };
        let signer = load_signer(Some(&settings)).unwrap().unwrap();

        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_load_signer_rejects_bad_key() {
        let settings = SignerSettings {
            private_key: "0x1234".to_string(),
        };
        assert!(load_signer(Some(&settings)).is_err());
    }

    #[test]
    fn test_build_provider_rejects_bad_url() {
        let rpc = RpcSettings {
            url: "not a url".to_string(),
        };
        assert!(build_provider(&rpc, None).is_err());
    }

    #[tokio::test]
    async fn test_build_provider_does_not_connect_eagerly() {
        let rpc = RpcSettings {
            url: "http://127.0.0.1:1".to_string(),
        };
        assert!(build_provider(&rpc, None).is_ok());
    }
}
