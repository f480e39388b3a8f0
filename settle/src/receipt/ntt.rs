// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Native token transfer receipts. Manual and automatic delivery share one
//! wire shape; the route tag decides whether an ETA applies.

use tap::TapFallible;
use tracing::debug;

use trestle_types::attestation::NttReceipt;
use trestle_types::route::RouteKind;

use crate::amount::format_units;
use crate::error::{SettleError, SettleResult};
use crate::receipt::{ChainQueryApi, ReceiptNormalizer, TransferInfo};
use crate::resolver::BridgeQueryApi;

impl<B, Q> ReceiptNormalizer<B, Q>
where
    B: BridgeQueryApi,
    Q: ChainQueryApi,
{
    pub(super) async fn normalize_ntt(
        &self,
        send_tx: String,
        receipt: &NttReceipt,
        route: RouteKind,
    ) -> SettleResult<TransferInfo> {
        let payload = receipt.envelope.manager_payload();
        if payload.amount.decimals > 38 {
            return Err(SettleError::Generic(format!(
                "trimmed amount decimals out of range: {}",
                payload.amount.decimals
            )));
        }

        let source_record = self
            .registry
            .by_chain_address(receipt.source_chain, &receipt.params.source_token)
            .ok_or_else(|| SettleError::UnknownToken {
                chain: receipt.source_chain,
                address: receipt.params.source_token.clone(),
            })?;
        let dest_record = self
            .registry
            .by_chain_address(receipt.dest_chain, &receipt.params.dest_token)
            .ok_or_else(|| SettleError::UnknownDestinationToken {
                chain: receipt.dest_chain,
                address: receipt.params.dest_token.clone(),
            })?;

        // The transceiver trims to its own precision and says so; registry
        // decimals describe the full-precision deployments, not the wire.
        let amount = format_units(u128::from(payload.amount.amount), payload.amount.decimals);

        let attested = payload
            .recipient
            .to_native(receipt.dest_chain.context())
            .map_err(|e| SettleError::Generic(format!("recipient rendering: {e}")))?;
        let recipient = self.reconcile_recipient(receipt.dest_chain, attested).await;

        let sender = payload.sender.as_ref().and_then(|sender| {
            sender
                .to_native(receipt.source_chain.context())
                .tap_err(|e| debug!("[ReceiptNormalizer] Sender rendering failed: error={:?}", e))
                .ok()
        });

        let eta_millis = match route {
            RouteKind::AutomaticNtt => Some(self.automatic_ntt_eta_millis),
            _ => None,
        };

        Ok(TransferInfo {
            send_tx,
            sender,
            recipient,
            amount: amount.clone(),
            from_chain: receipt.source_chain,
            to_chain: receipt.dest_chain,
            token_address: receipt.params.source_token.clone(),
            token_key: source_record.key.clone(),
            token_decimals: source_record.decimals,
            receive_token_key: dest_record.key.clone(),
            receive_amount: Some(amount),
            receive_native_amount: None,
            // The envelope's fee field is transceiver-specific; it is not
            // normalized here.
            relayer_fee: None,
            eta_millis,
        })
    }
}
