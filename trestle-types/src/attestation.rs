// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire shapes of the attestations the normalizer accepts. These mirror what
//! the attestation layer emits after signature checking; nothing here is
//! verified again.

use serde::{Deserialize, Serialize};

use crate::address::UniversalAddress;
use crate::chain::ChainId;

/// Fields every attestation variant exposes.
pub trait OriginInfo {
    fn origin_txs(&self) -> &[String];
    fn source_chain(&self) -> ChainId;
    fn dest_chain(&self) -> ChainId;
}

macro_rules! impl_origin_info {
    ($($receipt:ty),+ $(,)?) => {
        $(impl OriginInfo for $receipt {
            fn origin_txs(&self) -> &[String] {
                &self.origin_txs
            }
            fn source_chain(&self) -> ChainId {
                self.source_chain
            }
            fn dest_chain(&self) -> ChainId {
                self.dest_chain
            }
        })+
    };
}

/// Token descriptor as attested: the chain it was minted on plus its
/// universal address there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireToken {
    pub chain: ChainId,
    pub address: UniversalAddress,
}

/// Relay extension of a token-bridge payload, base units at wire precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayDetails {
    pub relayer_fee: u64,
    pub to_native_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferPayload {
    /// Absent when the attestation was produced without its token section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<WireToken>,
    /// Base units, already truncated to at most 8 decimals on the wire.
    pub amount: u64,
    pub recipient: UniversalAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UniversalAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay: Option<RelayDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBridgeReceipt {
    pub origin_txs: Vec<String>,
    pub source_chain: ChainId,
    pub dest_chain: ChainId,
    pub transfer: TokenTransferPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMessage {
    pub burn_token: UniversalAddress,
    pub amount: u128,
    pub mint_recipient: UniversalAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UniversalAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleReceipt {
    pub origin_txs: Vec<String>,
    pub source_chain: ChainId,
    pub dest_chain: ChainId,
    /// Absent when the attestation service returned no message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<CircleMessage>,
}

/// Amount at the precision the transceiver trimmed it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimmedAmount {
    pub amount: u64,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NttManagerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UniversalAddress>,
    pub amount: TrimmedAmount,
    pub recipient: UniversalAddress,
}

/// Transceiver envelope. Plain transfers carry the manager payload at the
/// top level; relayed ones nest it beside relay metadata. Both shapes are
/// read through [`NttEnvelope::manager_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NttEnvelope {
    Transfer(NttManagerPayload),
    Relayed {
        recipient_relayer: UniversalAddress,
        payload: NttManagerPayload,
    },
}

impl NttEnvelope {
    pub fn manager_payload(&self) -> &NttManagerPayload {
        match self {
            NttEnvelope::Transfer(payload) => payload,
            NttEnvelope::Relayed { payload, .. } => payload,
        }
    }
}

/// Token pair the NTT route validated for this transfer, native-format
/// addresses on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NttParams {
    pub source_token: String,
    pub dest_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NttReceipt {
    pub origin_txs: Vec<String>,
    pub source_chain: ChainId,
    pub dest_chain: ChainId,
    pub envelope: NttEnvelope,
    pub params: NttParams,
}

impl_origin_info!(TokenBridgeReceipt, CircleReceipt, NttReceipt);

/// Union over everything the attestation layer can hand us. The two NTT
/// variants share one wire shape; the tag records how the transfer is
/// relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationReceipt {
    TokenBridge(TokenBridgeReceipt),
    Circle(CircleReceipt),
    NttManual(NttReceipt),
    NttAutomatic(NttReceipt),
}

impl AttestationReceipt {
    /// Stable lowercase label for metrics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            AttestationReceipt::TokenBridge(_) => "token_bridge",
            AttestationReceipt::Circle(_) => "circle",
            AttestationReceipt::NttManual(_) => "ntt_manual",
            AttestationReceipt::NttAutomatic(_) => "ntt_automatic",
        }
    }
}

impl OriginInfo for AttestationReceipt {
    fn origin_txs(&self) -> &[String] {
        match self {
            AttestationReceipt::TokenBridge(receipt) => receipt.origin_txs(),
            AttestationReceipt::Circle(receipt) => receipt.origin_txs(),
            AttestationReceipt::NttManual(receipt)
            | AttestationReceipt::NttAutomatic(receipt) => receipt.origin_txs(),
        }
    }

    fn source_chain(&self) -> ChainId {
        match self {
            AttestationReceipt::TokenBridge(receipt) => receipt.source_chain(),
            AttestationReceipt::Circle(receipt) => receipt.source_chain(),
            AttestationReceipt::NttManual(receipt)
            | AttestationReceipt::NttAutomatic(receipt) => receipt.source_chain(),
        }
    }

    fn dest_chain(&self) -> ChainId {
        match self {
            AttestationReceipt::TokenBridge(receipt) => receipt.dest_chain(),
            AttestationReceipt::Circle(receipt) => receipt.dest_chain(),
            AttestationReceipt::NttManual(receipt)
            | AttestationReceipt::NttAutomatic(receipt) => receipt.dest_chain(),
        }
    }
}
