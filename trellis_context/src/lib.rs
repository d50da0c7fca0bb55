// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Context: addressing primitives for multi-valued property paths.
//!
//! A property that addresses one element of a container (a list slot, a map
//! entry, a set member, or a node inside a recursive tree) is ambiguous on
//! its own: reading or writing it needs to know *which* element is meant.
//! This crate provides the vocabulary that removes the ambiguity:
//!
//! - [`PropertyId`] — the identity of one constructed property.
//! - [`Reference`] — the address of one element of a multi-valued property:
//!   an [`Ordinal`] position, an erased [`KeyValue`], or a [`Route`] through
//!   a recursive tree.
//! - [`Context`] — an immutable collection of references, one per ambiguous
//!   property in a path, with union/merge semantics.
//!
//! The resolution engine that consumes these lives in `trellis_property`;
//! this crate is deliberately free of any knowledge about containers or
//! object graphs.
//!
//! # Example
//!
//! ```rust
//! use trellis_context::{Context, Ordinal, PropertyId, Reference};
//!
//! let rows = PropertyId::fresh();
//! let cells = PropertyId::fresh();
//!
//! // Address row 1, cell 0.
//! let cx = Context::default()
//!     .with(Reference::index(rows, Ordinal::At(1)))
//!     .with(Reference::index(cells, Ordinal::At(0)));
//!
//! assert_eq!(cx.len(), 2);
//! assert!(cx.contains(rows));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod context;
mod id;
mod key;
mod reference;
mod route;

pub use context::Context;
pub use id::PropertyId;
pub use key::KeyValue;
pub use reference::{Ordinal, Reference, ReferenceKind, ReferenceValue};
pub use route::Route;
