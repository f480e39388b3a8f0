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

pub struct SuiAdapter;

impl SuiAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainAdapter for SuiAdapter {
    fn context(&self) -> ChainContext {
        ChainContext::Sui
    }

    async fn sign_and_send(
        &self,
        wallet: Arc<dyn WalletConnection>,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> SettleResult<String> {
        debug!("[SuiAdapter] Sending transaction: bytes={}", tx.payload.len());
        wallet
            .sign_and_send(tx, options)
            .await
            .map_err(|e| SettleError::AdapterError(format!("{e:?}")))
    }
}
