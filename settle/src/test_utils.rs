// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test fixtures: a small token table, metric sinks, and hand mocks
//! for the injected lookup and wallet traits. Mocks panic on lookups no
//! test primed; a missing preset is a test bug, not a soft miss.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;

use trestle_types::attestation::WireToken;
use trestle_types::chain::ChainId;
use trestle_types::token::{CircleAsset, TokenId, TokenRecord, TokenRegistry};
use trestle_types::transaction::{SendOptions, UnsignedTransaction, WatchAsset};

use crate::config::DEFAULT_AUTOMATIC_NTT_ETA_MILLIS;
use crate::metrics::SettleMetrics;
use crate::receipt::{ChainQueryApi, ReceiptNormalizer};
use crate::resolver::{BridgeQueryApi, WrappedTokenResolver};
use crate::wallet::{
    TransferRole, WalletConnection, WalletEvent, WalletProvider, WalletSessionRegistry,
    WalletSubscription,
};

pub fn test_metrics() -> SettleMetrics {
    SettleMetrics::new_for_testing()
}

fn record(
    key: &str,
    symbol: &str,
    chain: ChainId,
    address: &str,
    decimals: u8,
    circle_asset: Option<CircleAsset>,
) -> TokenRecord {
    TokenRecord {
        key: key.into(),
        symbol: symbol.to_string(),
        chain,
        address: Some(address.to_string()),
        decimals,
        circle_asset,
        foreign_addresses: BTreeMap::new(),
    }
}

/// Mainnet-shaped token table: a Circle pair, a deep-decimal token with a
/// registered Solana wrap, an NTT pair, and a Cosmos entry.
pub fn test_tokens() -> Vec<TokenRecord> {
    let mut weth = record(
        "WETH",
        "WETH",
        ChainId::Ethereum,
        "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        18,
        None,
    );
    weth.foreign_addresses.insert(
        ChainId::Solana,
        "4Hx6Bj56eGyw8EJrrheM6LBQAvVYRikYCWsALeTrwyRU".to_string(),
    );
    weth.foreign_addresses.insert(
        ChainId::Sui,
        "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN"
            .to_string(),
    );
    vec![
        record(
            "USDCeth",
            "USDC",
            ChainId::Ethereum,
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            6,
            Some(CircleAsset::Usdc),
        ),
        record(
            "USDCsol",
            "USDC",
            ChainId::Solana,
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            6,
            Some(CircleAsset::Usdc),
        ),
        weth,
        record(
            "WETHsol",
            "WETH",
            ChainId::Solana,
            "4Hx6Bj56eGyw8EJrrheM6LBQAvVYRikYCWsALeTrwyRU",
            8,
            None,
        ),
        record(
            "NTTUSD",
            "NTTUSD",
            ChainId::Ethereum,
            "0xBe03e58CcEd223A1B03B1eFD2Ec07a0a35d7AAcc",
            18,
            None,
        ),
        record(
            "NTTUSDbase",
            "NTTUSD",
            ChainId::Base,
            "0x7D2d03C4E91dF06f5A76a17b8F2C4aD07b6d1f2B",
            6,
            None,
        ),
        record("ATOM", "ATOM", ChainId::Cosmoshub, "uatom", 6, None),
    ]
}

pub fn test_registry() -> Arc<TokenRegistry> {
    Arc::new(TokenRegistry::new(test_tokens()))
}

pub fn random_tx_hash() -> String {
    format!("0x{:032x}", rand::random::<u128>())
}

#[derive(Default)]
pub struct MockBridgeQuery {
    wrapped: Mutex<HashMap<(TokenId, ChainId), Result<Option<String>, String>>>,
    native: Mutex<HashMap<WireToken, Result<String, String>>>,
    wrapped_calls: AtomicUsize,
}

impl MockBridgeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_wrapped_asset(&self, token: &TokenId, chain: ChainId, address: Option<&str>) {
        self.wrapped
            .lock()
            .unwrap()
            .insert((token.clone(), chain), Ok(address.map(str::to_string)));
    }

    pub fn set_wrapped_asset_error(&self, token: &TokenId, chain: ChainId, message: &str) {
        self.wrapped
            .lock()
            .unwrap()
            .insert((token.clone(), chain), Err(message.to_string()));
    }

    pub fn set_native_asset(&self, token: &WireToken, address: &str) {
        self.native
            .lock()
            .unwrap()
            .insert(token.clone(), Ok(address.to_string()));
    }

    pub fn set_native_asset_error(&self, token: &WireToken, message: &str) {
        self.native
            .lock()
            .unwrap()
            .insert(token.clone(), Err(message.to_string()));
    }

    pub fn wrapped_calls(&self) -> usize {
        self.wrapped_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BridgeQueryApi for MockBridgeQuery {
    async fn wrapped_asset(
        &self,
        token: &TokenId,
        chain: ChainId,
    ) -> anyhow::Result<Option<String>> {
        self.wrapped_calls.fetch_add(1, Ordering::SeqCst);
        let preset = self
            .wrapped
            .lock()
            .unwrap()
            .get(&(token.clone(), chain))
            .cloned();
        match preset {
            Some(Ok(address)) => Ok(address),
            Some(Err(message)) => Err(anyhow!(message)),
            None => panic!(
                "No preset wrapped asset for {} {} -> {}",
                token.chain, token.address, chain
            ),
        }
    }

    async fn native_asset(&self, token: &WireToken) -> anyhow::Result<String> {
        let preset = self.native.lock().unwrap().get(token).cloned();
        match preset {
            Some(Ok(address)) => Ok(address),
            Some(Err(message)) => Err(anyhow!(message)),
            None => panic!(
                "No preset native asset for {} {}",
                token.chain, token.address
            ),
        }
    }
}

#[derive(Default)]
pub struct MockChainQuery {
    owners: Mutex<HashMap<(ChainId, String), Result<Option<String>, String>>>,
}

impl MockChainQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_owner(&self, chain: ChainId, account: &str, owner: Option<&str>) {
        self.owners
            .lock()
            .unwrap()
            .insert((chain, account.to_string()), Ok(owner.map(str::to_string)));
    }

    pub fn set_owner_error(&self, chain: ChainId, account: &str, message: &str) {
        self.owners
            .lock()
            .unwrap()
            .insert((chain, account.to_string()), Err(message.to_string()));
    }
}

#[async_trait]
impl ChainQueryApi for MockChainQuery {
    async fn token_account_owner(
        &self,
        chain: ChainId,
        account: &str,
    ) -> anyhow::Result<Option<String>> {
        let preset = self
            .owners
            .lock()
            .unwrap()
            .get(&(chain, account.to_string()))
            .cloned();
        match preset {
            Some(Ok(owner)) => Ok(owner),
            Some(Err(message)) => Err(anyhow!(message)),
            None => panic!("No preset token account owner for {} {}", chain, account),
        }
    }
}

pub struct NormalizerHarness {
    pub bridge: Arc<MockBridgeQuery>,
    pub chain_query: Arc<MockChainQuery>,
    pub metrics: Arc<SettleMetrics>,
    pub normalizer: ReceiptNormalizer<MockBridgeQuery, MockChainQuery>,
}

pub fn normalizer_with_registry(registry: Arc<TokenRegistry>) -> NormalizerHarness {
    let bridge = Arc::new(MockBridgeQuery::new());
    let chain_query = Arc::new(MockChainQuery::new());
    let metrics = Arc::new(test_metrics());
    let resolver = Arc::new(WrappedTokenResolver::new(
        registry.clone(),
        bridge.clone(),
        metrics.clone(),
    ));
    let normalizer = ReceiptNormalizer::new(
        registry,
        resolver,
        bridge.clone(),
        chain_query.clone(),
        DEFAULT_AUTOMATIC_NTT_ETA_MILLIS,
        metrics.clone(),
    );
    NormalizerHarness {
        bridge,
        chain_query,
        metrics,
        normalizer,
    }
}

pub fn test_normalizer() -> NormalizerHarness {
    normalizer_with_registry(test_registry())
}

/// Wallet double that records every interaction. Optionally linked to a
/// session registry so its disconnects feed the provider event back, the
/// way real wallet bridges do.
pub struct MockWallet {
    name: String,
    address: Mutex<Option<String>>,
    network: Mutex<Option<ChainId>>,
    sent: Mutex<Vec<UnsignedTransaction>>,
    sent_options: Mutex<Vec<SendOptions>>,
    disconnect_calls: AtomicUsize,
    subscribe_calls: AtomicUsize,
    active_subscriptions: Arc<AtomicUsize>,
    switch_calls: AtomicUsize,
    switch_supported: AtomicBool,
    watch_calls: AtomicUsize,
    registry_link: Mutex<Option<(Arc<WalletSessionRegistry>, TransferRole)>>,
}

impl MockWallet {
    pub fn new(name: &str, address: &str, network: ChainId) -> Arc<Self> {
        Self::build(name, Some(address), network)
    }

    pub fn without_address(name: &str, network: ChainId) -> Arc<Self> {
        Self::build(name, None, network)
    }

    fn build(name: &str, address: Option<&str>, network: ChainId) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            address: Mutex::new(address.map(str::to_string)),
            network: Mutex::new(Some(network)),
            sent: Mutex::new(Vec::new()),
            sent_options: Mutex::new(Vec::new()),
            disconnect_calls: AtomicUsize::new(0),
            subscribe_calls: AtomicUsize::new(0),
            active_subscriptions: Arc::new(AtomicUsize::new(0)),
            switch_calls: AtomicUsize::new(0),
            switch_supported: AtomicBool::new(true),
            watch_calls: AtomicUsize::new(0),
            registry_link: Mutex::new(None),
        })
    }

    /// Route this wallet's disconnects through `registry` as provider
    /// events, like a browser extension would.
    pub fn attach_registry(&self, registry: Arc<WalletSessionRegistry>, role: TransferRole) {
        *self.registry_link.lock().unwrap() = Some((registry, role));
    }

    pub fn set_network(&self, network: Option<ChainId>) {
        *self.network.lock().unwrap() = network;
    }

    /// Model a wallet whose integration never wired up network switching.
    pub fn set_switch_supported(&self, supported: bool) {
        self.switch_supported.store(supported, Ordering::SeqCst);
    }

    pub fn network(&self) -> Option<ChainId> {
        *self.network.lock().unwrap()
    }

    pub fn sent(&self) -> Vec<UnsignedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_options(&self) -> Vec<SendOptions> {
        self.sent_options.lock().unwrap().clone()
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active_subscriptions.load(Ordering::SeqCst)
    }

    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnection for MockWallet {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Option<String> {
        self.address.lock().unwrap().clone()
    }

    fn network_chain_id(&self) -> Option<ChainId> {
        *self.network.lock().unwrap()
    }

    async fn sign_and_send(
        &self,
        tx: &UnsignedTransaction,
        options: &SendOptions,
    ) -> anyhow::Result<String> {
        self.sent.lock().unwrap().push(tx.clone());
        self.sent_options.lock().unwrap().push(options.clone());
        Ok(random_tx_hash())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        let link = self.registry_link.lock().unwrap().clone();
        if let Some((registry, role)) = link {
            registry.handle_event(role, WalletEvent::Disconnect).await;
        }
        Ok(())
    }

    fn subscribe(&self) -> WalletSubscription {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.active_subscriptions.fetch_add(1, Ordering::SeqCst);
        let active = self.active_subscriptions.clone();
        WalletSubscription::new(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }

    fn supports_network_switch(&self) -> bool {
        self.switch_supported.load(Ordering::SeqCst)
    }

    async fn switch_network(&self, target: ChainId) -> anyhow::Result<()> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);
        *self.network.lock().unwrap() = Some(target);
        Ok(())
    }

    async fn watch_asset(&self, _asset: &WatchAsset) -> anyhow::Result<()> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockWalletProvider {
    name: String,
    requires_handshake: bool,
    wallet: Mutex<Option<Arc<MockWallet>>>,
    connect_calls: AtomicUsize,
}

impl MockWalletProvider {
    pub fn new(name: &str, requires_handshake: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            requires_handshake,
            wallet: Mutex::new(None),
            connect_calls: AtomicUsize::new(0),
        })
    }

    pub fn with_wallet(self: Arc<Self>, wallet: Arc<MockWallet>) -> Arc<Self> {
        *self.wallet.lock().unwrap() = Some(wallet);
        self
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_handshake(&self) -> bool {
        self.requires_handshake
    }

    async fn connect(&self) -> anyhow::Result<Arc<dyn WalletConnection>> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let primed = self.wallet.lock().unwrap().clone();
        match primed {
            Some(wallet) => Ok(wallet as Arc<dyn WalletConnection>),
            None => Err(anyhow!("no wallet available from {}", self.name)),
        }
    }
}
