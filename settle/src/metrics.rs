// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, IntCounter,
    IntCounterVec, Registry,
};

#[derive(Clone, Debug)]
pub struct SettleMetrics {
    pub receipts_parsed: IntCounterVec,
    pub receipt_parse_errors: IntCounterVec,
    pub resolver_static_hits: IntCounter,
    pub wrapped_cache_hits: IntCounter,
    pub wrapped_cache_misses: IntCounter,
    pub resolver_live_lookups: IntCounterVec,
    pub adapter_loads: IntCounterVec,
    pub dispatch_requests: IntCounterVec,
    pub dispatch_errors: IntCounterVec,
    pub wallet_connects: IntCounterVec,
    pub wallet_events: IntCounterVec,
    pub owner_lookup_fallbacks: IntCounter,
}

impl SettleMetrics {
    pub fn new(registry: &Registry) -> Self {
        Self {
            receipts_parsed: register_int_counter_vec_with_registry!(
                "settle_receipts_parsed",
                "Receipts normalized successfully, by route kind",
                &["route"],
                registry,
            )
            .unwrap(),
            receipt_parse_errors: register_int_counter_vec_with_registry!(
                "settle_receipt_parse_errors",
                "Receipt normalization failures, by error type",
                &["error_type"],
                registry,
            )
            .unwrap(),
            resolver_static_hits: register_int_counter_with_registry!(
                "settle_resolver_static_hits",
                "Wrapped-asset resolutions served from static token config",
                registry,
            )
            .unwrap(),
            wrapped_cache_hits: register_int_counter_with_registry!(
                "settle_wrapped_cache_hits",
                "Wrapped-asset resolutions served from the cache",
                registry,
            )
            .unwrap(),
            wrapped_cache_misses: register_int_counter_with_registry!(
                "settle_wrapped_cache_misses",
                "Wrapped-asset cache lookups that missed",
                registry,
            )
            .unwrap(),
            resolver_live_lookups: register_int_counter_vec_with_registry!(
                "settle_resolver_live_lookups",
                "Live wrapped-asset queries, by result",
                &["result"],
                registry,
            )
            .unwrap(),
            adapter_loads: register_int_counter_vec_with_registry!(
                "settle_adapter_loads",
                "Chain adapter factory invocations, by context",
                &["context"],
                registry,
            )
            .unwrap(),
            dispatch_requests: register_int_counter_vec_with_registry!(
                "settle_dispatch_requests",
                "Dispatcher requests, by operation and context",
                &["op", "context"],
                registry,
            )
            .unwrap(),
            dispatch_errors: register_int_counter_vec_with_registry!(
                "settle_dispatch_errors",
                "Dispatcher failures, by error type",
                &["error_type"],
                registry,
            )
            .unwrap(),
            wallet_connects: register_int_counter_vec_with_registry!(
                "settle_wallet_connects",
                "Wallet bindings installed, by role",
                &["role"],
                registry,
            )
            .unwrap(),
            wallet_events: register_int_counter_vec_with_registry!(
                "settle_wallet_events",
                "Provider events processed, by kind",
                &["kind"],
                registry,
            )
            .unwrap(),
            owner_lookup_fallbacks: register_int_counter_with_registry!(
                "settle_owner_lookup_fallbacks",
                "Token-account owner lookups that failed and fell back to the attested recipient",
                registry,
            )
            .unwrap(),
        }
    }

    pub fn new_for_testing() -> Self {
        let registry = Registry::new();
        Self::new(&registry)
    }
}
