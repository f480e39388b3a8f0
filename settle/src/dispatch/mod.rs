// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chain dispatch: one adapter per chain context, loaded lazily on first
//! use and memoized. The dispatcher resolves the acting wallet from the
//! session registry and routes operations through the right adapter.

mod aptos;
mod cosmos;
mod evm;
mod solana;
mod sui;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use trestle_types::chain::{ChainContext, ChainId};
use trestle_types::transaction::{SendOptions, UnsignedTransaction, WatchAsset};

use crate::error::{SettleError, SettleResult};
use crate::metrics::SettleMetrics;
use crate::wallet::{TransferRole, WalletConnection, WalletSessionRegistry};

pub use aptos::AptosAdapter;
pub use cosmos::CosmosAdapter;
pub use evm::EvmAdapter;
pub use solana::SolanaAdapter;
pub use sui::SuiAdapter;

/// Contexts with a signing flow. Cosmos wallets only hold receiving
/// addresses and switch networks.
const SIGNING_CONTEXTS: [ChainContext; 4] = [
    ChainContext::Evm,
    ChainContext::Solana,
    ChainContext::Sui,
    ChainContext::Aptos,
];

/// Per-context chain operations. Adapters are stateless translators between
/// the dispatcher and a wallet handle; anything chain-specific (commitment
/// levels, network guards) lives here.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn context(&self) -> ChainContext;

    async fn sign_and_send(
        &self,
        wallet: Arc<dyn WalletConnection>,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> SettleResult<String>;

    /// Ask the wallet to move to `target`. The default refusal is
    /// reclassified as success by the dispatcher, since many wallets track
    /// the dapp's network on their own.
    async fn switch_chain(
        &self,
        _wallet: Arc<dyn WalletConnection>,
        _target: ChainId,
    ) -> SettleResult<()> {
        Err(SettleError::SwitchUnsupported)
    }

    async fn watch_asset(
        &self,
        _wallet: Arc<dyn WalletConnection>,
        _asset: &WatchAsset,
    ) -> SettleResult<()> {
        Err(SettleError::UnimplementedContext(self.context()))
    }
}

pub type AdapterFactory =
    Arc<dyn Fn() -> BoxFuture<'static, SettleResult<Arc<dyn ChainAdapter>>> + Send + Sync>;

/// Wrap a plain constructor as an [`AdapterFactory`].
pub fn adapter_factory<F, A>(build: F) -> AdapterFactory
where
    F: Fn() -> A + Send + Sync + 'static,
    A: ChainAdapter + 'static,
{
    Arc::new(move || {
        let adapter: Arc<dyn ChainAdapter> = Arc::new(build());
        async move { Ok(adapter) }.boxed()
    })
}

/// Adapter factories keyed by context. Nothing is constructed until a
/// context is first used; the built adapter is then reused for the life of
/// the registry.
pub struct AdapterRegistry {
    factories: HashMap<ChainContext, AdapterFactory>,
    loaded: RwLock<HashMap<ChainContext, Arc<dyn ChainAdapter>>>,
    metrics: Arc<SettleMetrics>,
}

impl AdapterRegistry {
    pub fn new(metrics: Arc<SettleMetrics>) -> Self {
        Self {
            factories: HashMap::new(),
            loaded: RwLock::new(HashMap::new()),
            metrics,
        }
    }

    /// Registry with the in-tree adapter for every context.
    pub fn with_defaults(metrics: Arc<SettleMetrics>) -> Self {
        let mut registry = Self::new(metrics);
        registry.register(ChainContext::Evm, adapter_factory(EvmAdapter::new));
        registry.register(ChainContext::Solana, adapter_factory(SolanaAdapter::new));
        registry.register(ChainContext::Sui, adapter_factory(SuiAdapter::new));
        registry.register(ChainContext::Aptos, adapter_factory(AptosAdapter::new));
        registry.register(ChainContext::Cosmos, adapter_factory(CosmosAdapter::new));
        registry
    }

    pub fn register(&mut self, context: ChainContext, factory: AdapterFactory) {
        self.factories.insert(context, factory);
    }

    pub fn is_registered(&self, context: ChainContext) -> bool {
        self.factories.contains_key(&context)
    }

    pub async fn get(&self, context: ChainContext) -> SettleResult<Arc<dyn ChainAdapter>> {
        {
            let loaded = self.loaded.read().await;
            if let Some(adapter) = loaded.get(&context) {
                return Ok(adapter.clone());
            }
        }
        let mut loaded = self.loaded.write().await;
        if let Some(adapter) = loaded.get(&context) {
            return Ok(adapter.clone());
        }
        let factory = self
            .factories
            .get(&context)
            .ok_or(SettleError::UnimplementedContext(context))?;
        // The factory runs under the write lock, so concurrent first users
        // build the adapter at most once.
        let adapter = factory().await?;
        self.metrics
            .adapter_loads
            .with_label_values(&[&context.to_string()])
            .inc();
        info!("[AdapterRegistry] Loaded chain adapter: context={}", context);
        loaded.insert(context, adapter.clone());
        Ok(adapter)
    }
}

pub struct ChainDispatcher {
    adapters: AdapterRegistry,
    sessions: Arc<WalletSessionRegistry>,
    metrics: Arc<SettleMetrics>,
}

impl ChainDispatcher {
    pub fn new(
        adapters: AdapterRegistry,
        sessions: Arc<WalletSessionRegistry>,
        metrics: Arc<SettleMetrics>,
    ) -> Self {
        Self {
            adapters,
            sessions,
            metrics,
        }
    }

    fn track(&self, op: &str, context: ChainContext) {
        self.metrics
            .dispatch_requests
            .with_label_values(&[op, &context.to_string()])
            .inc();
    }

    fn fail<T>(&self, err: SettleError) -> SettleResult<T> {
        warn!(
            "[ChainDispatcher] Operation failed: error_type={}, error={:?}",
            err.error_type(),
            err
        );
        self.metrics
            .dispatch_errors
            .with_label_values(&[err.error_type()])
            .inc();
        Err(err)
    }

    /// Sign `tx` with the wallet bound to `role` and broadcast it.
    /// Contexts without a signing flow are refused before any adapter is
    /// constructed.
    pub async fn sign_and_send(
        &self,
        role: TransferRole,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> SettleResult<String> {
        let Some(bound) = self.sessions.binding(role) else {
            return self.fail(SettleError::WalletNotConnected(role));
        };
        self.track("sign_and_send", bound.context);
        if !SIGNING_CONTEXTS.contains(&bound.context) {
            return self.fail(SettleError::UnimplementedContext(bound.context));
        }
        let adapter = match self.adapters.get(bound.context).await {
            Ok(adapter) => adapter,
            Err(e) => return self.fail(e),
        };
        match adapter.sign_and_send(bound.wallet.clone(), tx, options).await {
            Ok(tx_hash) => {
                info!(
                    "[ChainDispatcher] Transaction sent: context={}, chain={}, tx={}",
                    bound.context, tx.chain, tx_hash
                );
                Ok(tx_hash)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Move the wallet bound to `role` onto `target`'s network. Returns the
    /// bound address on success. Wallets already reporting the target
    /// network are left alone, and wallets that cannot switch
    /// programmatically count as success.
    pub async fn switch_chain(
        &self,
        role: TransferRole,
        target: ChainId,
    ) -> SettleResult<Option<String>> {
        let Some(bound) = self.sessions.binding(role) else {
            return self.fail(SettleError::WalletNotConnected(role));
        };
        self.track("switch_chain", bound.context);
        if bound.wallet.network_chain_id() == Some(target) {
            debug!(
                "[ChainDispatcher] Wallet already on target network: chain={}",
                target
            );
            return Ok(Some(bound.address));
        }
        match bound.context {
            ChainContext::Evm | ChainContext::Cosmos => {
                let adapter = match self.adapters.get(bound.context).await {
                    Ok(adapter) => adapter,
                    Err(e) => return self.fail(e),
                };
                match adapter.switch_chain(bound.wallet.clone(), target).await {
                    Ok(()) => Ok(Some(bound.address)),
                    Err(SettleError::SwitchUnsupported) => {
                        debug!(
                            "[ChainDispatcher] Wallet cannot switch programmatically, treating as success: context={}",
                            bound.context
                        );
                        Ok(Some(bound.address))
                    }
                    Err(e) => self.fail(e),
                }
            }
            _ => {
                debug!(
                    "[ChainDispatcher] No switch flow for context: context={}",
                    bound.context
                );
                Ok(Some(bound.address))
            }
        }
    }

    /// Suggest a token to the bound wallet's asset list. Only EVM wallets
    /// expose such a surface.
    pub async fn watch_asset(&self, role: TransferRole, asset: &WatchAsset) -> SettleResult<()> {
        let Some(bound) = self.sessions.binding(role) else {
            return self.fail(SettleError::WalletNotConnected(role));
        };
        self.track("watch_asset", bound.context);
        if bound.context != ChainContext::Evm {
            return self.fail(SettleError::UnimplementedContext(bound.context));
        }
        let adapter = match self.adapters.get(bound.context).await {
            Ok(adapter) => adapter,
            Err(e) => return self.fail(e),
        };
        match adapter.watch_asset(bound.wallet.clone(), asset).await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    /// Disconnect the wallet bound to `role`, if any. The binding itself is
    /// cleared by the wallet's disconnect event, not here.
    pub async fn disconnect(&self, role: TransferRole) -> SettleResult<()> {
        let Some(bound) = self.sessions.binding(role) else {
            debug!("[ChainDispatcher] Disconnect with nothing bound: role={}", role);
            return Ok(());
        };
        self.track("disconnect", bound.context);
        match bound.wallet.disconnect().await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(SettleError::AdapterError(format!("wallet disconnect: {e:?}"))),
        }
    }
}
