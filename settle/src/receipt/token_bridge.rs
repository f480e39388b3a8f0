// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Token-bridge receipts: lock-and-mint transfers, with an optional relay
//! extension that pays the relayer and converts part into destination gas.

use tap::TapFallible;
use tracing::debug;

use trestle_types::attestation::TokenBridgeReceipt;
use trestle_types::chain::ChainId;
use trestle_types::token::{TokenKey, TokenRecord};

use crate::amount::{format_units, truncated_decimals};
use crate::error::{SettleError, SettleResult};
use crate::receipt::{ChainQueryApi, ReceiptNormalizer, RelayerFee, TransferInfo};
use crate::resolver::BridgeQueryApi;

impl<B, Q> ReceiptNormalizer<B, Q>
where
    B: BridgeQueryApi,
    Q: ChainQueryApi,
{
    pub(super) async fn normalize_token_bridge(
        &self,
        send_tx: String,
        receipt: &TokenBridgeReceipt,
    ) -> SettleResult<TransferInfo> {
        let transfer = &receipt.transfer;
        let wire_token = transfer
            .token
            .as_ref()
            .ok_or(SettleError::MissingAttestationField("token"))?;

        let native_address = self
            .bridge
            .native_asset(wire_token)
            .await
            .map_err(|e| SettleError::ProviderError(format!("native asset lookup: {e:?}")))?;
        let record = self
            .registry
            .by_chain_address(wire_token.chain, &native_address)
            .ok_or_else(|| SettleError::UnknownToken {
                chain: wire_token.chain,
                address: native_address.clone(),
            })?;

        // Wire amounts are truncated to 8 decimals; render at the precision
        // that actually crossed, not the token's own.
        let wire_decimals = truncated_decimals(record.decimals);
        let amount = format_units(u128::from(transfer.amount), wire_decimals);

        let receive_token_key = self
            .destination_token_key(record, receipt.dest_chain)
            .await;

        let attested = transfer
            .recipient
            .to_native(receipt.dest_chain.context())
            .map_err(|e| SettleError::Generic(format!("recipient rendering: {e}")))?;
        let recipient = self.reconcile_recipient(receipt.dest_chain, attested).await;

        let sender = transfer.sender.as_ref().and_then(|sender| {
            sender
                .to_native(receipt.source_chain.context())
                .tap_err(|e| debug!("[ReceiptNormalizer] Sender rendering failed: error={:?}", e))
                .ok()
        });

        let (receive_amount, receive_native_amount, relayer_fee) = match &transfer.relay {
            Some(relay) => {
                let delivered = transfer
                    .amount
                    .saturating_sub(relay.relayer_fee)
                    .saturating_sub(relay.to_native_amount);
                (
                    Some(format_units(u128::from(delivered), wire_decimals)),
                    Some(format_units(u128::from(relay.to_native_amount), wire_decimals)),
                    Some(RelayerFee {
                        amount: format_units(u128::from(relay.relayer_fee), wire_decimals),
                        token_key: record.key.clone(),
                    }),
                )
            }
            None => (Some(amount.clone()), None, None),
        };

        Ok(TransferInfo {
            send_tx,
            sender,
            recipient,
            amount,
            from_chain: receipt.source_chain,
            to_chain: receipt.dest_chain,
            token_address: native_address,
            token_key: record.key.clone(),
            token_decimals: record.decimals,
            receive_token_key,
            receive_amount,
            receive_native_amount,
            relayer_fee,
            eta_millis: None,
        })
    }

    /// Registry key of the token the recipient ends up holding. Falls back
    /// to the source key when the wrapped deployment is unknown; the row
    /// stays renderable either way.
    async fn destination_token_key(&self, record: &TokenRecord, dest_chain: ChainId) -> TokenKey {
        if record.chain == dest_chain {
            return record.key.clone();
        }
        let Some(token_id) = record.token_id() else {
            return record.key.clone();
        };
        let Some(wrapped) = self.resolver.resolve(&token_id, dest_chain).await else {
            debug!(
                "[ReceiptNormalizer] No wrapped deployment known, keeping source key: key={}, dest_chain={}",
                record.key, dest_chain
            );
            return record.key.clone();
        };
        match self.registry.by_chain_address(dest_chain, &wrapped) {
            Some(dest_record) => dest_record.key.clone(),
            None => {
                debug!(
                    "[ReceiptNormalizer] Wrapped address not in registry, keeping source key: key={}, dest_chain={}, wrapped={}",
                    record.key, dest_chain, wrapped
                );
                record.key.clone()
            }
        }
    }
}
