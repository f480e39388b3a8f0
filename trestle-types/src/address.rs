// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use ethers::types::H160;
use ethers::utils::to_checksum;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::chain::ChainContext;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid address hex: {0}")]
    InvalidHex(String),
    #[error("address must be 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("no native address rendering for {0} context")]
    UnsupportedContext(ChainContext),
}

/// 32-byte chain-agnostic address as carried by attestations. EVM addresses
/// occupy the low 20 bytes, zero-padded on the left.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct UniversalAddress([u8; 32]);

impl UniversalAddress {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_evm(bytes: [u8; 20]) -> Self {
        let mut buf = [0u8; 32];
        buf[12..].copy_from_slice(&bytes);
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Render in the given context's native format.
    ///
    /// Cosmos rendering needs a per-chain bech32 prefix table the core does
    /// not own, so it is refused rather than guessed.
    pub fn to_native(&self, context: ChainContext) -> Result<String, AddressError> {
        match context {
            ChainContext::Evm => Ok(to_checksum(&H160::from_slice(&self.0[12..]), None)),
            ChainContext::Solana => Ok(bs58::encode(&self.0).into_string()),
            ChainContext::Sui | ChainContext::Aptos => Ok(format!("0x{}", hex::encode(self.0))),
            ChainContext::Cosmos => Err(AddressError::UnsupportedContext(context)),
        }
    }
}

impl fmt::Display for UniversalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for UniversalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniversalAddress({self})")
    }
}

impl FromStr for UniversalAddress {
    type Err = AddressError;

    /// Accepts 32-byte hex, or 20-byte hex which is padded as an EVM address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| AddressError::InvalidHex(s.to_string()))?;
        match bytes.len() {
            32 => {
                let mut buf = [0u8; 32];
                buf.copy_from_slice(&bytes);
                Ok(Self(buf))
            }
            20 => {
                let mut evm = [0u8; 20];
                evm.copy_from_slice(&bytes);
                Ok(Self::from_evm(evm))
            }
            n => Err(AddressError::InvalidLength(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_rendering_is_checksummed() {
        let addr: UniversalAddress = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
            .parse()
            .unwrap();
        assert_eq!(
            addr.to_native(ChainContext::Evm).unwrap(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_twenty_byte_hex_is_left_padded() {
        let addr: UniversalAddress = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
            .parse()
            .unwrap();
        assert_eq!(&addr.as_bytes()[..12], &[0u8; 12]);
        assert_eq!(
            addr.to_string(),
            "0x0000000000000000000000005aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        );
    }

    #[test]
    fn test_solana_rendering_is_base58() {
        let zero = UniversalAddress::new([0u8; 32]);
        assert_eq!(
            zero.to_native(ChainContext::Solana).unwrap(),
            "1".repeat(32)
        );
    }

    #[test]
    fn test_sui_and_aptos_rendering_is_full_hex() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0x2a;
        let addr = UniversalAddress::new(bytes);
        let expected = format!("0x{}2a", "00".repeat(31));
        assert_eq!(addr.to_native(ChainContext::Sui).unwrap(), expected);
        assert_eq!(addr.to_native(ChainContext::Aptos).unwrap(), expected);
    }

    #[test]
    fn test_cosmos_rendering_is_refused() {
        let addr = UniversalAddress::new([1u8; 32]);
        assert!(matches!(
            addr.to_native(ChainContext::Cosmos).unwrap_err(),
            AddressError::UnsupportedContext(ChainContext::Cosmos)
        ));
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let addr = UniversalAddress::new([7u8; 32]);
        let back: UniversalAddress = addr.to_string().parse().unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_bad_lengths_rejected() {
        assert!(matches!(
            "0x1234".parse::<UniversalAddress>().unwrap_err(),
            AddressError::InvalidLength(2)
        ));
        assert!(matches!(
            "zzzz".parse::<UniversalAddress>().unwrap_err(),
            AddressError::InvalidHex(_)
        ));
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let addr = UniversalAddress::new([7u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: UniversalAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
