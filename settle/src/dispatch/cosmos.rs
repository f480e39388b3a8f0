// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use trestle_types::chain::{ChainContext, ChainId};
use trestle_types::transaction::{SendOptions, UnsignedTransaction};

use crate::dispatch::ChainAdapter;
use crate::error::{SettleError, SettleResult};
use crate::wallet::WalletConnection;

/// Cosmos wallets hold receiving addresses and hop between networks; no
/// signing flow is wired up for them.
pub struct CosmosAdapter;

impl CosmosAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainAdapter for CosmosAdapter {
    fn context(&self) -> ChainContext {
        ChainContext::Cosmos
    }

    async fn sign_and_send(
        &self,
        _wallet: Arc<dyn WalletConnection>,
        _tx: &UnsignedTransaction,
        _options: &SendOptions,
    ) -> SettleResult<String> {
        Err(SettleError::UnimplementedContext(ChainContext::Cosmos))
    }

    async fn switch_chain(
        &self,
        wallet: Arc<dyn WalletConnection>,
        target: ChainId,
    ) -> SettleResult<()> {
        if target.context() != ChainContext::Cosmos {
            return Err(SettleError::AdapterError(format!(
                "{target} is not a Cosmos chain"
            )));
        }
        if !wallet.supports_network_switch() {
            debug!(
                "[CosmosAdapter] Wallet has no switch surface: wallet={}",
                wallet.name()
            );
            return Err(SettleError::SwitchUnsupported);
        }
        debug!("[CosmosAdapter] Switching network: target={}", target);
        wallet
            .switch_network(target)
            .await
            .map_err(|e| SettleError::AdapterError(format!("{e:?}")))
    }
}
