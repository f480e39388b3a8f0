// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::warn;

use crate::chain::{ChainContext, ChainId};

/// Registry key of a token entry, e.g. "USDCeth".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenKey(String);

impl TokenKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Canonical on-chain identity: home chain plus native-format address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId {
    pub chain: ChainId,
    pub address: String,
}

/// Circle-issued stablecoin classes, matched across chains by class rather
/// than by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CircleAsset {
    Usdc,
    Eurc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub key: TokenKey,
    pub symbol: String,
    pub chain: ChainId,
    /// Native-format address on the home chain. None for chain-native gas
    /// coins, which have no contract address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_asset: Option<CircleAsset>,
    /// Statically known wrapped deployments, keyed by foreign chain.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub foreign_addresses: BTreeMap<ChainId, String>,
}

impl TokenRecord {
    pub fn token_id(&self) -> Option<TokenId> {
        self.address.as_ref().map(|address| TokenId {
            chain: self.chain,
            address: address.clone(),
        })
    }

    pub fn foreign_address(&self, chain: ChainId) -> Option<&str> {
        self.foreign_addresses.get(&chain).map(String::as_str)
    }
}

/// Token table with key and address lookups. Duplicate keys keep the last
/// entry.
#[derive(Debug)]
pub struct TokenRegistry {
    tokens: Vec<TokenRecord>,
    by_key: HashMap<TokenKey, usize>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<TokenRecord>) -> Self {
        let mut by_key = HashMap::with_capacity(tokens.len());
        for (idx, record) in tokens.iter().enumerate() {
            if by_key.insert(record.key.clone(), idx).is_some() {
                warn!(
                    "[TokenRegistry] Duplicate token key, last entry wins: key={}",
                    record.key
                );
            }
        }
        Self { tokens, by_key }
    }

    pub fn get(&self, key: &TokenKey) -> Option<&TokenRecord> {
        self.by_key.get(key).map(|idx| &self.tokens[*idx])
    }

    /// Record homed at (chain, address). EVM addresses compare
    /// case-insensitively since checksummed and lowercase forms coexist.
    pub fn by_chain_address(&self, chain: ChainId, address: &str) -> Option<&TokenRecord> {
        let evm = chain.context() == ChainContext::Evm;
        self.tokens.iter().find(|record| {
            record.chain == chain
                && record.address.as_deref().map_or(false, |candidate| {
                    if evm {
                        candidate.eq_ignore_ascii_case(address)
                    } else {
                        candidate == address
                    }
                })
        })
    }

    pub fn by_token_id(&self, token: &TokenId) -> Option<&TokenRecord> {
        self.by_chain_address(token.chain, &token.address)
    }

    /// Record on `chain` carrying the given Circle asset class.
    pub fn circle_counterpart(&self, asset: CircleAsset, chain: ChainId) -> Option<&TokenRecord> {
        self.tokens
            .iter()
            .find(|record| record.chain == chain && record.circle_asset == Some(asset))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenRecord> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
