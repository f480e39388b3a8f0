// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use trestle_types::chain::{ChainContext, ChainId};
use trestle_types::transaction::{SendOptions, UnsignedTransaction, WatchAsset};

use crate::dispatch::ChainAdapter;
use crate::error::{SettleError, SettleResult};
use crate::wallet::WalletConnection;

/// Adapter for every EVM network. One instance serves all of them; the
/// transaction's chain tag and the wallet's reported network decide where a
/// send lands.
pub struct EvmAdapter;

impl EvmAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn context(&self) -> ChainContext {
        ChainContext::Evm
    }

    async fn sign_and_send(
        &self,
        wallet: Arc<dyn WalletConnection>,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> SettleResult<String> {
        // EVM wallets sign for whatever network they are on; a mismatch
        // would land the transaction on the wrong chain.
        if let Some(network) = wallet.network_chain_id() {
            if network != tx.chain {
                return Err(SettleError::AdapterError(format!(
                    "wallet is on {network}, transaction targets {}",
                    tx.chain
                )));
            }
        }
        debug!(
            "[EvmAdapter] Sending transaction: chain={}, bytes={}",
            tx.chain,
            tx.payload.len()
        );
        wallet
            .sign_and_send(tx, options)
            .await
            .map_err(|e| SettleError::AdapterError(format!("{e:?}")))
    }

    async fn switch_chain(
        &self,
        wallet: Arc<dyn WalletConnection>,
        target: ChainId,
    ) -> SettleResult<()> {
        if target.context() != ChainContext::Evm {
            return Err(SettleError::AdapterError(format!(
                "{target} is not an EVM chain"
            )));
        }
        if !wallet.supports_network_switch() {
            debug!(
                "[EvmAdapter] Wallet has no switch surface: wallet={}",
                wallet.name()
            );
            return Err(SettleError::SwitchUnsupported);
        }
        debug!("[EvmAdapter] Switching network: target={}", target);
        wallet
            .switch_network(target)
            .await
            .map_err(|e| SettleError::AdapterError(format!("{e:?}")))
    }

    async fn watch_asset(
        &self,
        wallet: Arc<dyn WalletConnection>,
        asset: &WatchAsset,
    ) -> SettleResult<()> {
        debug!(
            "[EvmAdapter] Suggesting asset: symbol={}, address={}",
            asset.symbol, asset.address
        );
        wallet
            .watch_asset(asset)
            .await
            .map_err(|e| SettleError::AdapterError(format!("{e:?}")))
    }
}
