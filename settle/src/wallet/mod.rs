// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wallet session tracking. One binding per transfer role; provider events
//! arrive through [`WalletSessionRegistry::handle_event`] and are processed
//! inline in caller order.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tap::TapFallible;
use tracing::{debug, info, warn};

use trestle_types::chain::{ChainContext, ChainId};
use trestle_types::transaction::{SendOptions, UnsignedTransaction, WatchAsset};

use crate::error::{SettleError, SettleResult};
use crate::metrics::SettleMetrics;

pub mod store;
pub use store::{FileMarkerStore, MarkerStore, MemoryMarkerStore};

/// Which side of a transfer a wallet acts for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum TransferRole {
    Sending,
    Receiving,
}

/// Events a wallet provider can push at us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Disconnect,
    AccountsChanged(Vec<String>),
}

impl WalletEvent {
    fn label(&self) -> &'static str {
        match self {
            WalletEvent::Disconnect => "disconnect",
            WalletEvent::AccountsChanged(_) => "accounts_changed",
        }
    }
}

/// Detach handle for a wallet's event feed. Dropping it without calling
/// [`unsubscribe`](Self::unsubscribe) leaves the listener attached; the
/// registry always detaches displaced bindings itself.
pub struct WalletSubscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl WalletSubscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Subscription that detaches nothing, for wallets without event feeds.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for WalletSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSubscription")
            .field("armed", &self.detach.is_some())
            .finish()
    }
}

/// A connected wallet handle. Integrations adapt concrete wallets (browser
/// extensions, hardware bridges, key files) to this surface and report
/// networks in canonical [`ChainId`] numbering.
#[async_trait]
pub trait WalletConnection: Send + Sync {
    fn name(&self) -> &str;
    fn address(&self) -> Option<String>;
    fn network_chain_id(&self) -> Option<ChainId>;

    async fn sign_and_send(
        &self,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> anyhow::Result<String>;

    async fn disconnect(&self) -> anyhow::Result<()>;

    /// Start delivering provider events for this wallet; the returned handle
    /// detaches the listener.
    fn subscribe(&self) -> WalletSubscription;

    /// Whether [`switch_network`](Self::switch_network) is actually wired to
    /// the wallet. Adapters treat `false` as the wallet declining to switch,
    /// which the dispatcher counts as success.
    fn supports_network_switch(&self) -> bool {
        false
    }

    async fn switch_network(&self, _target: ChainId) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "network switch not supported by wallet {}",
            self.name()
        ))
    }

    async fn watch_asset(&self, _asset: &WatchAsset) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "asset watch not supported by wallet {}",
            self.name()
        ))
    }
}

/// A named way of obtaining wallet connections, e.g. one per browser
/// extension.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether connecting prompts the user. Silent restore skips these.
    fn requires_handshake(&self) -> bool;

    async fn connect(&self) -> anyhow::Result<Arc<dyn WalletConnection>>;
}

struct WalletBinding {
    wallet: Arc<dyn WalletConnection>,
    address: String,
    context: ChainContext,
    subscription: Option<WalletSubscription>,
}

/// Snapshot of a live binding handed to the dispatcher.
#[derive(Clone)]
pub struct BoundWallet {
    pub wallet: Arc<dyn WalletConnection>,
    pub address: String,
    pub context: ChainContext,
}

#[derive(Default)]
struct BindingPair {
    sending: Option<WalletBinding>,
    receiving: Option<WalletBinding>,
}

impl BindingPair {
    fn slot(&self, role: TransferRole) -> &Option<WalletBinding> {
        match role {
            TransferRole::Sending => &self.sending,
            TransferRole::Receiving => &self.receiving,
        }
    }

    fn slot_mut(&mut self, role: TransferRole) -> &mut Option<WalletBinding> {
        match role {
            TransferRole::Sending => &mut self.sending,
            TransferRole::Receiving => &mut self.receiving,
        }
    }
}

/// Storage key of a role marker. Keyed by context, not role: both roles on
/// the same family share the restore hint, as an either-side reconnect is
/// what users expect.
pub fn wallet_marker_key(prefix: &str, context: ChainContext) -> String {
    format!("{prefix}:wallet:{context}")
}

pub struct WalletSessionRegistry {
    bindings: Mutex<BindingPair>,
    providers: HashMap<String, Arc<dyn WalletProvider>>,
    store: Arc<dyn MarkerStore>,
    app_prefix: String,
    metrics: Arc<SettleMetrics>,
}

impl WalletSessionRegistry {
    pub fn new(
        providers: Vec<Arc<dyn WalletProvider>>,
        store: Arc<dyn MarkerStore>,
        app_prefix: impl Into<String>,
        metrics: Arc<SettleMetrics>,
    ) -> Self {
        let app_prefix = app_prefix.into();
        let providers: HashMap<_, _> = providers
            .into_iter()
            .map(|provider| (provider.name().to_string(), provider))
            .collect();
        info!(
            "[WalletRegistry] Initialized: providers={}, prefix={}",
            providers.len(),
            app_prefix
        );
        Self {
            bindings: Mutex::new(BindingPair::default()),
            providers,
            store,
            app_prefix,
            metrics,
        }
    }

    /// Bind `wallet` to `role` for `chain`'s context. Any previous binding
    /// for the role is detached first, so rapid reconnects never accumulate
    /// listeners. Returns the wallet's reported address.
    pub fn connect(
        &self,
        role: TransferRole,
        wallet: Arc<dyn WalletConnection>,
        chain: ChainId,
    ) -> SettleResult<String> {
        let context = chain.context();
        let address = wallet.address().ok_or_else(|| {
            SettleError::Generic(format!("wallet {} reported no address", wallet.name()))
        })?;

        let displaced = {
            let mut bindings = self.bindings.lock().unwrap();
            bindings.slot_mut(role).take()
        };
        if let Some(mut old) = displaced {
            if let Some(subscription) = old.subscription.take() {
                subscription.unsubscribe();
            }
            debug!(
                "[WalletRegistry] Displaced previous binding: role={}, wallet={}",
                role,
                old.wallet.name()
            );
        }

        let subscription = wallet.subscribe();
        {
            let mut bindings = self.bindings.lock().unwrap();
            *bindings.slot_mut(role) = Some(WalletBinding {
                wallet: wallet.clone(),
                address: address.clone(),
                context,
                subscription: Some(subscription),
            });
        }

        self.store
            .set(&wallet_marker_key(&self.app_prefix, context), wallet.name());
        self.metrics
            .wallet_connects
            .with_label_values(&[&role.to_string()])
            .inc();
        info!(
            "[WalletRegistry] Connected wallet: role={}, context={}, wallet={}, address={}",
            role,
            context,
            wallet.name(),
            address
        );
        Ok(address)
    }

    /// Process one provider event for `role`.
    ///
    /// Disconnect clears the binding, detaches the listener and removes the
    /// persisted marker. An account change away from the bound address
    /// triggers exactly one `disconnect()` on the handle; the provider's
    /// follow-up disconnect event does the cleanup.
    pub async fn handle_event(&self, role: TransferRole, event: WalletEvent) {
        self.metrics
            .wallet_events
            .with_label_values(&[event.label()])
            .inc();
        match event {
            WalletEvent::Disconnect => {
                let removed = {
                    let mut bindings = self.bindings.lock().unwrap();
                    bindings.slot_mut(role).take()
                };
                match removed {
                    Some(mut binding) => {
                        if let Some(subscription) = binding.subscription.take() {
                            subscription.unsubscribe();
                        }
                        self.store
                            .remove(&wallet_marker_key(&self.app_prefix, binding.context));
                        info!(
                            "[WalletRegistry] Wallet disconnected: role={}, wallet={}, context={}",
                            role,
                            binding.wallet.name(),
                            binding.context
                        );
                    }
                    None => {
                        debug!(
                            "[WalletRegistry] Disconnect event for unbound role: role={}",
                            role
                        );
                    }
                }
            }
            WalletEvent::AccountsChanged(accounts) => {
                let snapshot = {
                    let bindings = self.bindings.lock().unwrap();
                    bindings
                        .slot(role)
                        .as_ref()
                        .map(|binding| (binding.wallet.clone(), binding.address.clone()))
                };
                let Some((wallet, address)) = snapshot else {
                    debug!(
                        "[WalletRegistry] Accounts changed for unbound role: role={}",
                        role
                    );
                    return;
                };
                let still_current = accounts.first().map_or(false, |first| *first == address);
                if still_current {
                    debug!(
                        "[WalletRegistry] Active account unchanged: role={}, address={}",
                        role, address
                    );
                    return;
                }
                info!(
                    "[WalletRegistry] Active account changed, disconnecting wallet: role={}, wallet={}",
                    role,
                    wallet.name()
                );
                wallet
                    .disconnect()
                    .await
                    .tap_err(|e| {
                        warn!(
                            "[WalletRegistry] Wallet disconnect failed: wallet={}, error={:?}",
                            wallet.name(),
                            e
                        )
                    })
                    .ok();
            }
        }
    }

    /// Exchange the two role bindings. Subscriptions travel with their
    /// bindings; markers are context-keyed and untouched.
    pub fn swap(&self) {
        let mut bindings = self.bindings.lock().unwrap();
        let pair = &mut *bindings;
        std::mem::swap(&mut pair.sending, &mut pair.receiving);
        debug!("[WalletRegistry] Swapped role bindings");
    }

    /// Reconnect the wallet last used for `chain`'s context, if its provider
    /// can restore without a handshake. Failures are swallowed; this is a
    /// best-effort convenience. Returns the restored provider name.
    pub async fn restore_last_used(&self, role: TransferRole, chain: ChainId) -> Option<String> {
        let key = wallet_marker_key(&self.app_prefix, chain.context());
        let name = self.store.get(&key)?;
        let Some(provider) = self.providers.get(&name) else {
            debug!(
                "[WalletRegistry] No provider registered for persisted marker: name={}",
                name
            );
            return None;
        };
        if provider.requires_handshake() {
            debug!(
                "[WalletRegistry] Skipping restore, provider needs a handshake: name={}",
                name
            );
            return None;
        }
        let wallet = provider
            .connect()
            .await
            .tap_err(|e| {
                debug!(
                    "[WalletRegistry] Silent reconnect failed: name={}, error={:?}",
                    name, e
                )
            })
            .ok()?;
        self.connect(role, wallet, chain)
            .tap_err(|e| {
                debug!(
                    "[WalletRegistry] Restored wallet rejected: name={}, error={:?}",
                    name, e
                )
            })
            .ok()?;
        info!(
            "[WalletRegistry] Restored last used wallet: role={}, name={}",
            role, name
        );
        Some(name)
    }

    pub fn binding(&self, role: TransferRole) -> Option<BoundWallet> {
        let bindings = self.bindings.lock().unwrap();
        bindings.slot(role).as_ref().map(|binding| BoundWallet {
            wallet: binding.wallet.clone(),
            address: binding.address.clone(),
            context: binding.context,
        })
    }

    pub fn address(&self, role: TransferRole) -> Option<String> {
        self.binding(role).map(|bound| bound.address)
    }

    pub fn context(&self, role: TransferRole) -> Option<ChainContext> {
        self.binding(role).map(|bound| bound.context)
    }

    pub fn is_connected(&self, role: TransferRole) -> bool {
        self.binding(role).is_some()
    }
}
