// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::warn;

use trestle_config::Config;
use trestle_types::token::{TokenRecord, TokenRegistry};

pub const DEFAULT_AUTOMATIC_NTT_ETA_MILLIS: u64 = 30_000;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettleConfig {
    /// Key prefix for persisted wallet markers.
    pub app_prefix: String,
    /// Token table. Duplicate keys keep the last entry.
    pub tokens: Vec<TokenRecord>,
    /// Expected delivery time reported for automatically relayed NTT
    /// transfers.
    #[serde(default = "default_automatic_ntt_eta_millis")]
    pub automatic_ntt_eta_millis: u64,
    /// When set, wallet markers persist to this JSON file instead of
    /// process memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_marker_store_path: Option<PathBuf>,
}

fn default_automatic_ntt_eta_millis() -> u64 {
    DEFAULT_AUTOMATIC_NTT_ETA_MILLIS
}

impl Config for SettleConfig {}

impl SettleConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.app_prefix.is_empty() {
            return Err(anyhow!("app-prefix must not be empty"));
        }
        let mut seen = HashSet::new();
        for token in &self.tokens {
            if !seen.insert(&token.key) {
                warn!(
                    "[SettleConfig] Duplicate token key, last entry wins: key={}",
                    token.key
                );
            }
            if token.decimals > 38 {
                return Err(anyhow!(
                    "token {} decimals out of range: {}",
                    token.key,
                    token.decimals
                ));
            }
        }
        Ok(())
    }

    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.clone())
    }
}
