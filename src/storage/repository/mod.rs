// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the key-value store.
//!
//! Each repository provides raw CRUD for one record type, serialized as JSON
//! under the keys from [`super::keys`]. Repositories do not verify
//! signatures; the identity layer wraps them for that.

pub mod attestations;
pub mod bindings;

pub use attestations::{AttestationRepository, LoginAttestation};
pub use bindings::{BindingRepository, SignedBinding};
