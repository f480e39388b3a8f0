// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circle burn-and-mint receipts. The destination token is the registry
//! entry of the same asset class on the destination chain; there is no
//! wrapped-asset indirection.

use tap::TapFallible;
use tracing::debug;

use trestle_types::attestation::CircleReceipt;

use crate::amount::format_units;
use crate::error::{SettleError, SettleResult};
use crate::receipt::{ChainQueryApi, ReceiptNormalizer, TransferInfo};
use crate::resolver::BridgeQueryApi;

impl<B, Q> ReceiptNormalizer<B, Q>
where
    B: BridgeQueryApi,
    Q: ChainQueryApi,
{
    pub(super) async fn normalize_circle(
        &self,
        send_tx: String,
        receipt: &CircleReceipt,
    ) -> SettleResult<TransferInfo> {
        let message = receipt
            .message
            .as_ref()
            .ok_or(SettleError::MissingAttestationField("message"))?;

        let source_context = receipt.source_chain.context();
        let burn_address = message
            .burn_token
            .to_native(source_context)
            .map_err(|e| SettleError::Generic(format!("burn token rendering: {e}")))?;
        let record = self
            .registry
            .by_chain_address(receipt.source_chain, &burn_address)
            .ok_or_else(|| SettleError::UnknownToken {
                chain: receipt.source_chain,
                address: burn_address.clone(),
            })?;
        let counterpart = record
            .circle_asset
            .and_then(|asset| self.registry.circle_counterpart(asset, receipt.dest_chain))
            .ok_or_else(|| SettleError::UnknownDestinationToken {
                chain: receipt.dest_chain,
                address: burn_address.clone(),
            })?;

        // Minting reproduces the burned amount exactly; no wire truncation
        // applies, so the record's own decimals are authoritative.
        let amount = format_units(message.amount, record.decimals);

        let attested = message
            .mint_recipient
            .to_native(receipt.dest_chain.context())
            .map_err(|e| SettleError::Generic(format!("recipient rendering: {e}")))?;
        let recipient = self.reconcile_recipient(receipt.dest_chain, attested).await;

        let sender = message.sender.as_ref().and_then(|sender| {
            sender
                .to_native(source_context)
                .tap_err(|e| debug!("[ReceiptNormalizer] Sender rendering failed: error={:?}", e))
                .ok()
        });

        Ok(TransferInfo {
            send_tx,
            sender,
            recipient,
            amount: amount.clone(),
            from_chain: receipt.source_chain,
            to_chain: receipt.dest_chain,
            token_address: burn_address,
            token_key: record.key.clone(),
            token_decimals: record.decimals,
            receive_token_key: counterpart.key.clone(),
            receive_amount: Some(amount),
            receive_native_amount: None,
            relayer_fee: None,
            eta_millis: None,
        })
    }
}
