// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown route type: {0}")]
pub struct UnknownRoute(pub String);

/// Route discriminators, spelled exactly as the attestation layer sends
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteKind {
    ManualTokenBridge,
    #[serde(rename = "ManualCCTP")]
    ManualCctp,
    ManualNtt,
    AutomaticNtt,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::ManualTokenBridge => "ManualTokenBridge",
            RouteKind::ManualCctp => "ManualCCTP",
            RouteKind::ManualNtt => "ManualNtt",
            RouteKind::AutomaticNtt => "AutomaticNtt",
        }
    }

    /// Stable snake_case label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteKind::ManualTokenBridge => "manual_token_bridge",
            RouteKind::ManualCctp => "manual_cctp",
            RouteKind::ManualNtt => "manual_ntt",
            RouteKind::AutomaticNtt => "automatic_ntt",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteKind {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ManualTokenBridge" => Ok(RouteKind::ManualTokenBridge),
            "ManualCCTP" => Ok(RouteKind::ManualCctp),
            "ManualNtt" => Ok(RouteKind::ManualNtt),
            "AutomaticNtt" => Ok(RouteKind::AutomaticNtt),
            other => Err(UnknownRoute(other.to_string())),
        }
    }
}
