// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use trestle_types::chain::ChainContext;
use trestle_types::transaction::{SendOptions, UnsignedTransaction};

use crate::dispatch::ChainAdapter;
use crate::error::{SettleError, SettleResult};
use crate::wallet::WalletConnection;

/// Solana sends confirm at a commitment level. Callers that pass none get
/// the adapter's default.
pub struct SolanaAdapter {
    default_commitment: String,
}

impl SolanaAdapter {
    pub fn new() -> Self {
        Self::with_commitment("finalized")
    }

    pub fn with_commitment(commitment: impl Into<String>) -> Self {
        Self {
            default_commitment: commitment.into(),
        }
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn context(&self) -> ChainContext {
        ChainContext::Solana
    }

    async fn sign_and_send(
        &self,
        wallet: Arc<dyn WalletConnection>,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> SettleResult<String> {
        let mut options = options.clone();
        if options.commitment.is_none() {
            options.commitment = Some(self.default_commitment.clone());
        }
        debug!(
            "[SolanaAdapter] Sending transaction: commitment={}, bytes={}",
            options.commitment.as_deref().unwrap_or_default(),
            tx.payload.len()
        );
        wallet
            .sign_and_send(tx, &options)
            .await
            .map_err(|e| SettleError::AdapterError(format!("{e:?}")))
    }
}
