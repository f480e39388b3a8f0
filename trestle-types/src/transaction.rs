// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// Transaction bytes prepared upstream, tagged with the chain to send on.
/// The settlement core never builds or inspects the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain: ChainId,
    pub payload: Vec<u8>,
}

impl UnsignedTransaction {
    pub fn new(chain: ChainId, payload: Vec<u8>) -> Self {
        Self { chain, payload }
    }
}

/// Per-send knobs a caller may thread through to the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Confirmation level for chains that take one, e.g. "finalized".
    pub commitment: Option<String>,
    pub gas_limit: Option<u64>,
}

/// Token suggestion for wallets that keep a visible asset list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchAsset {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}
