// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Attestation receipts in, canonical [`TransferInfo`] out. One parser per
//! route family; what they share lives here.

mod circle;
mod ntt;
mod token_bridge;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use trestle_types::attestation::{AttestationReceipt, OriginInfo};
use trestle_types::chain::{ChainContext, ChainId};
use trestle_types::route::RouteKind;
use trestle_types::token::{TokenKey, TokenRegistry};

use crate::error::{SettleError, SettleResult};
use crate::metrics::SettleMetrics;
use crate::resolver::{BridgeQueryApi, WrappedTokenResolver};

/// Chain state the normalizer reads. Solana recipients may be token
/// accounts; the query resolves them to their owning wallet.
#[async_trait]
pub trait ChainQueryApi: Send + Sync {
    /// `Ok(None)` means the account does not exist or is not a token
    /// account.
    async fn token_account_owner(
        &self,
        chain: ChainId,
        account: &str,
    ) -> anyhow::Result<Option<String>>;
}

/// Fee the relayer takes on delivery, in display units of the fee token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerFee {
    pub amount: String,
    pub token_key: TokenKey,
}

/// Canonical description of one transfer. Amounts are decimal display
/// strings; addresses are native-format for their chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    /// The transaction that started the transfer, the last of the
    /// receipt's origin transactions.
    pub send_tx: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub recipient: String,
    /// Amount sent, at the precision that actually crossed the wire.
    pub amount: String,
    pub from_chain: ChainId,
    pub to_chain: ChainId,
    /// Source token, native format on the source chain.
    pub token_address: String,
    pub token_key: TokenKey,
    pub token_decimals: u8,
    pub receive_token_key: TokenKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_amount: Option<String>,
    /// Portion delivered as destination gas, when the relay converts some.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_native_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer_fee: Option<RelayerFee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_millis: Option<u64>,
}

/// Turns route-specific attestation receipts into [`TransferInfo`]. Holds
/// the token table plus the lookups parsing needs; receipts themselves are
/// trusted, signature checks happened upstream.
pub struct ReceiptNormalizer<B, Q> {
    registry: Arc<TokenRegistry>,
    resolver: Arc<WrappedTokenResolver<B>>,
    bridge: Arc<B>,
    chain_query: Arc<Q>,
    automatic_ntt_eta_millis: u64,
    metrics: Arc<SettleMetrics>,
}

impl<B, Q> ReceiptNormalizer<B, Q>
where
    B: BridgeQueryApi,
    Q: ChainQueryApi,
{
    pub fn new(
        registry: Arc<TokenRegistry>,
        resolver: Arc<WrappedTokenResolver<B>>,
        bridge: Arc<B>,
        chain_query: Arc<Q>,
        automatic_ntt_eta_millis: u64,
        metrics: Arc<SettleMetrics>,
    ) -> Self {
        info!(
            "[ReceiptNormalizer] Initialized: known_tokens={}, automatic_ntt_eta_millis={}",
            registry.len(),
            automatic_ntt_eta_millis
        );
        Self {
            registry,
            resolver,
            bridge,
            chain_query,
            automatic_ntt_eta_millis,
            metrics,
        }
    }

    /// Normalize a receipt delivered under a route discriminator string.
    pub async fn normalize(
        &self,
        route: &str,
        receipt: &AttestationReceipt,
    ) -> SettleResult<TransferInfo> {
        let kind: RouteKind = match route.parse() {
            Ok(kind) => kind,
            Err(_) => {
                let err = SettleError::UnknownRouteType(route.to_string());
                self.metrics
                    .receipt_parse_errors
                    .with_label_values(&[err.error_type()])
                    .inc();
                warn!("[ReceiptNormalizer] Unknown route type: route={}", route);
                return Err(err);
            }
        };
        self.normalize_route(kind, receipt).await
    }

    pub async fn normalize_route(
        &self,
        route: RouteKind,
        receipt: &AttestationReceipt,
    ) -> SettleResult<TransferInfo> {
        match self.normalize_inner(route, receipt).await {
            Ok(info) => {
                self.metrics
                    .receipts_parsed
                    .with_label_values(&[route.label()])
                    .inc();
                info!(
                    "[ReceiptNormalizer] Normalized receipt: route={}, send_tx={}, from_chain={}, to_chain={}, token={}, amount={}",
                    route, info.send_tx, info.from_chain, info.to_chain, info.token_key, info.amount
                );
                Ok(info)
            }
            Err(e) => {
                self.metrics
                    .receipt_parse_errors
                    .with_label_values(&[e.error_type()])
                    .inc();
                warn!(
                    "[ReceiptNormalizer] Failed to normalize receipt: route={}, variant={}, error={:?}",
                    route,
                    receipt.variant_name(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn normalize_inner(
        &self,
        route: RouteKind,
        receipt: &AttestationReceipt,
    ) -> SettleResult<TransferInfo> {
        let send_tx = last_origin_tx(receipt)?;
        match (route, receipt) {
            (RouteKind::ManualTokenBridge, AttestationReceipt::TokenBridge(receipt)) => {
                self.normalize_token_bridge(send_tx, receipt).await
            }
            (RouteKind::ManualCctp, AttestationReceipt::Circle(receipt)) => {
                self.normalize_circle(send_tx, receipt).await
            }
            (RouteKind::ManualNtt, AttestationReceipt::NttManual(receipt))
            | (RouteKind::AutomaticNtt, AttestationReceipt::NttAutomatic(receipt)) => {
                self.normalize_ntt(send_tx, receipt, route).await
            }
            _ => Err(SettleError::MismatchedReceipt(route)),
        }
    }

    /// Swap a Solana token account for its owning wallet. Lookups are soft:
    /// any miss or failure keeps the attested recipient.
    pub(super) async fn reconcile_recipient(&self, to_chain: ChainId, attested: String) -> String {
        if to_chain.context() != ChainContext::Solana {
            return attested;
        }
        match self
            .chain_query
            .token_account_owner(to_chain, &attested)
            .await
        {
            Ok(Some(owner)) => {
                debug!(
                    "[ReceiptNormalizer] Resolved token account owner: account={}, owner={}",
                    attested, owner
                );
                owner
            }
            Ok(None) => {
                warn!(
                    "[ReceiptNormalizer] Token account owner not found, keeping attested recipient: account={}",
                    attested
                );
                attested
            }
            Err(e) => {
                self.metrics.owner_lookup_fallbacks.inc();
                warn!(
                    "[ReceiptNormalizer] Owner lookup failed, keeping attested recipient: account={}, error={:?}",
                    attested, e
                );
                attested
            }
        }
    }
}

fn last_origin_tx(receipt: &AttestationReceipt) -> SettleResult<String> {
    receipt
        .origin_txs()
        .last()
        .cloned()
        .ok_or(SettleError::MissingSourceTransaction)
}
