// Trestle Types
// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared vocabulary of the settlement core: chain identities, universal
//! addresses, token records, attestation wire shapes and route kinds.
//! This crate does no I/O.

pub mod address;
pub mod attestation;
pub mod chain;
pub mod route;
pub mod token;
pub mod transaction;

pub use address::{AddressError, UniversalAddress};
pub use chain::{ChainContext, ChainId};
pub use route::RouteKind;
pub use token::{CircleAsset, TokenId, TokenKey, TokenRecord, TokenRegistry};
