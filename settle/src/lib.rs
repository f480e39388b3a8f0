// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::new_without_default, clippy::too_many_arguments)]

pub mod amount;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod receipt;
pub mod resolver;
pub mod wallet;
pub mod wrapped_cache;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{SettleError, SettleResult};
