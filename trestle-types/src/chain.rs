// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Canonical chain numbering shared with the attestation layer.
/// Discriminants are wire-stable; never renumber.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Clone,
    Copy,
    TryFromPrimitive,
    Hash,
    Display,
)]
#[repr(u16)]
pub enum ChainId {
    Solana = 1,
    Ethereum = 2,
    Bsc = 4,
    Polygon = 5,
    Avalanche = 6,
    Fantom = 10,
    Klaytn = 13,
    Celo = 14,
    Moonbeam = 16,
    Injective = 19,
    Osmosis = 20,
    Sui = 21,
    Aptos = 22,
    Arbitrum = 23,
    Optimism = 24,
    Base = 30,
    Sei = 32,
    Scroll = 34,
    Cosmoshub = 4000,
    Evmos = 4001,
    Kujira = 4002,
}

/// Chain family an adapter is written against.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Clone,
    Copy,
    TryFromPrimitive,
    Hash,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum ChainContext {
    Evm = 0,
    Solana = 1,
    Sui = 2,
    Aptos = 3,
    Cosmos = 4,
}

impl ChainId {
    /// Family the chain belongs to. Total over all variants.
    pub fn context(&self) -> ChainContext {
        match self {
            ChainId::Ethereum
            | ChainId::Bsc
            | ChainId::Polygon
            | ChainId::Avalanche
            | ChainId::Fantom
            | ChainId::Klaytn
            | ChainId::Celo
            | ChainId::Moonbeam
            | ChainId::Arbitrum
            | ChainId::Optimism
            | ChainId::Base
            | ChainId::Scroll => ChainContext::Evm,
            ChainId::Solana => ChainContext::Solana,
            ChainId::Sui => ChainContext::Sui,
            ChainId::Aptos => ChainContext::Aptos,
            ChainId::Injective
            | ChainId::Osmosis
            | ChainId::Sei
            | ChainId::Cosmoshub
            | ChainId::Evmos
            | ChainId::Kujira => ChainContext::Cosmos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CHAINS: [ChainId; 21] = [
        ChainId::Solana,
        ChainId::Ethereum,
        ChainId::Bsc,
        ChainId::Polygon,
        ChainId::Avalanche,
        ChainId::Fantom,
        ChainId::Klaytn,
        ChainId::Celo,
        ChainId::Moonbeam,
        ChainId::Injective,
        ChainId::Osmosis,
        ChainId::Sui,
        ChainId::Aptos,
        ChainId::Arbitrum,
        ChainId::Optimism,
        ChainId::Base,
        ChainId::Sei,
        ChainId::Scroll,
        ChainId::Cosmoshub,
        ChainId::Evmos,
        ChainId::Kujira,
    ];

    #[test]
    fn test_chain_id_roundtrip_from_primitive() {
        for chain in ALL_CHAINS {
            let id = chain as u16;
            assert_eq!(ChainId::try_from(id).unwrap(), chain);
        }
    }

    #[test]
    fn test_unknown_chain_id_rejected() {
        assert!(ChainId::try_from(0u16).is_err());
        assert!(ChainId::try_from(3u16).is_err());
        assert!(ChainId::try_from(9999u16).is_err());
    }

    #[test]
    fn test_every_chain_has_a_context() {
        for chain in ALL_CHAINS {
            // context() is total; just exercise each arm
            let _ = chain.context();
        }
        assert_eq!(ChainId::Ethereum.context(), ChainContext::Evm);
        assert_eq!(ChainId::Base.context(), ChainContext::Evm);
        assert_eq!(ChainId::Solana.context(), ChainContext::Solana);
        assert_eq!(ChainId::Sui.context(), ChainContext::Sui);
        assert_eq!(ChainId::Aptos.context(), ChainContext::Aptos);
        assert_eq!(ChainId::Osmosis.context(), ChainContext::Cosmos);
        assert_eq!(ChainId::Cosmoshub.context(), ChainContext::Cosmos);
    }

    #[test]
    fn test_context_display_is_lowercase() {
        assert_eq!(ChainContext::Evm.to_string(), "evm");
        assert_eq!(ChainContext::Solana.to_string(), "solana");
        assert_eq!(ChainContext::Sui.to_string(), "sui");
        assert_eq!(ChainContext::Aptos.to_string(), "aptos");
        assert_eq!(ChainContext::Cosmos.to_string(), "cosmos");
    }

    #[test]
    fn test_chain_id_serde_uses_variant_names() {
        let json = serde_json::to_string(&ChainId::Arbitrum).unwrap();
        assert_eq!(json, "\"Arbitrum\"");
        let back: ChainId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChainId::Arbitrum);
    }
}
