// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use trestle_types::attestation::WireToken;
use trestle_types::chain::ChainId;
use trestle_types::token::{TokenId, TokenKey, TokenRegistry};

use crate::metrics::SettleMetrics;
use crate::wrapped_cache::{CacheStats, WrappedAddressCache};

/// Bridge lookups the settlement core needs. Transport lives with the
/// caller; implementations wrap whatever RPC stack the host app runs.
#[async_trait]
pub trait BridgeQueryApi: Send + Sync {
    /// Wrapped-asset address of `token` on `chain`. `Ok(None)` means the
    /// bridge knows no deployment there.
    async fn wrapped_asset(
        &self,
        token: &TokenId,
        chain: ChainId,
    ) -> anyhow::Result<Option<String>>;

    /// Home-chain native address for a wire token descriptor. This is the
    /// inverse direction of `wrapped_asset`.
    async fn native_asset(&self, token: &WireToken) -> anyhow::Result<String>;
}

/// Resolves a token's wrapped address on a foreign chain. Static token
/// config is consulted first, then the write-once cache, then a live bridge
/// query whose result is cached. Misses and query failures are soft.
pub struct WrappedTokenResolver<B> {
    registry: Arc<TokenRegistry>,
    bridge: Arc<B>,
    cache: WrappedAddressCache<TokenKey>,
    /// Unregistered tokens have no registry key to file under, so their
    /// resolutions are kept separately by on-chain identity.
    overflow: WrappedAddressCache<TokenId>,
    metrics: Arc<SettleMetrics>,
}

impl<B> WrappedTokenResolver<B>
where
    B: BridgeQueryApi,
{
    pub fn new(registry: Arc<TokenRegistry>, bridge: Arc<B>, metrics: Arc<SettleMetrics>) -> Self {
        info!(
            "[WrappedTokenResolver] Initialized: known_tokens={}",
            registry.len()
        );
        Self {
            registry,
            bridge,
            cache: WrappedAddressCache::new(),
            overflow: WrappedAddressCache::new(),
            metrics,
        }
    }

    pub async fn resolve(&self, token: &TokenId, chain: ChainId) -> Option<String> {
        let Some(record) = self.registry.by_token_id(token) else {
            if let Some(address) = self.overflow.get(token, chain) {
                self.metrics.wrapped_cache_hits.inc();
                return Some(address);
            }
            self.metrics.wrapped_cache_misses.inc();
            debug!(
                "[WrappedTokenResolver] Token not in registry, querying live: chain={}, address={}",
                token.chain, token.address
            );
            let resolved = self.query_live(token, chain).await;
            if let Some(address) = &resolved {
                self.overflow.insert(token.clone(), chain, address.clone());
            }
            return resolved;
        };

        if let Some(address) = record.foreign_address(chain) {
            self.metrics.resolver_static_hits.inc();
            return Some(address.to_string());
        }

        if let Some(address) = self.cache.get(&record.key, chain) {
            self.metrics.wrapped_cache_hits.inc();
            return Some(address);
        }
        self.metrics.wrapped_cache_misses.inc();

        let resolved = self.query_live(token, chain).await;
        if let Some(address) = &resolved {
            self.cache
                .insert(record.key.clone(), chain, address.clone());
        }
        resolved
    }

    /// Static and cache tiers only, for call sites that must not suspend.
    pub fn resolve_sync(&self, token: &TokenId, chain: ChainId) -> Option<String> {
        let cached = match self.registry.by_token_id(token) {
            Some(record) => {
                if let Some(address) = record.foreign_address(chain) {
                    self.metrics.resolver_static_hits.inc();
                    return Some(address.to_string());
                }
                self.cache.get(&record.key, chain)
            }
            None => self.overflow.get(token, chain),
        };
        match cached {
            Some(address) => {
                self.metrics.wrapped_cache_hits.inc();
                Some(address)
            }
            None => {
                self.metrics.wrapped_cache_misses.inc();
                None
            }
        }
    }

    async fn query_live(&self, token: &TokenId, chain: ChainId) -> Option<String> {
        match self.bridge.wrapped_asset(token, chain).await {
            Ok(Some(address)) => {
                self.metrics
                    .resolver_live_lookups
                    .with_label_values(&["ok"])
                    .inc();
                debug!(
                    "[WrappedTokenResolver] Resolved wrapped asset: chain={}, address={}, wrapped={}",
                    token.chain, token.address, address
                );
                Some(address)
            }
            Ok(None) => {
                self.metrics
                    .resolver_live_lookups
                    .with_label_values(&["none"])
                    .inc();
                debug!(
                    "[WrappedTokenResolver] No wrapped deployment: chain={}, address={}, target={}",
                    token.chain, token.address, chain
                );
                None
            }
            Err(e) => {
                self.metrics
                    .resolver_live_lookups
                    .with_label_values(&["error"])
                    .inc();
                debug!(
                    "[WrappedTokenResolver] Wrapped asset query failed: chain={}, address={}, target={}, error={:?}",
                    token.chain, token.address, chain, e
                );
                None
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        let keyed = self.cache.stats();
        let overflow = self.overflow.stats();
        CacheStats {
            hits: keyed.hits + overflow.hits,
            misses: keyed.misses + overflow.misses,
        }
    }
}
