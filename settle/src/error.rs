// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use trestle_types::chain::{ChainContext, ChainId};
use trestle_types::route::RouteKind;

use crate::wallet::TransferRole;

pub type SettleResult<T> = Result<T, SettleError>;

/// All the ways settlement can fail. Parse kinds are fatal for their
/// receipt; resolution misses never surface here, they stay `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    MissingSourceTransaction,
    MissingAttestationField(&'static str),
    UnknownToken {
        chain: ChainId,
        address: String,
    },
    UnknownDestinationToken {
        chain: ChainId,
        address: String,
    },
    UnknownRouteType(String),
    /// Receipt shape does not belong to the named route.
    MismatchedReceipt(RouteKind),
    UnimplementedContext(ChainContext),
    WalletNotConnected(TransferRole),
    SwitchUnsupported,
    AdapterError(String),
    ProviderError(String),
    Generic(String),
}

impl SettleError {
    /// Stable snake_case label for metrics. Changing a label breaks
    /// dashboards; add, never rename.
    pub fn error_type(&self) -> &'static str {
        match self {
            SettleError::MissingSourceTransaction => "missing_source_transaction",
            SettleError::MissingAttestationField(_) => "missing_attestation_field",
            SettleError::UnknownToken { .. } => "unknown_token",
            SettleError::UnknownDestinationToken { .. } => "unknown_destination_token",
            SettleError::UnknownRouteType(_) => "unknown_route_type",
            SettleError::MismatchedReceipt(_) => "mismatched_receipt",
            SettleError::UnimplementedContext(_) => "unimplemented_context",
            SettleError::WalletNotConnected(_) => "wallet_not_connected",
            SettleError::SwitchUnsupported => "switch_unsupported",
            SettleError::AdapterError(_) => "adapter_error",
            SettleError::ProviderError(_) => "provider_error",
            SettleError::Generic(_) => "generic",
        }
    }
}
