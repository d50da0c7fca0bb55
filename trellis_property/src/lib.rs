// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Property: typed paths into nested, heterogeneous object graphs.
//!
//! A [`Property<O, V>`] describes how to reach a value of type `V` starting
//! from an object of type `O` — through plain fields, list elements, map
//! entries, set members, and recursive node trees — without reflection.
//! Properties compose into longer paths, report whether they are reachable
//! in a given object, and enumerate every address at which they currently
//! hold a value.
//!
//! ## Core Concepts
//!
//! ### Properties and the schema
//!
//! Properties are built once, at startup, through a [`Schema`]. The schema
//! validates identifiers and rejects duplicate registrations; the properties
//! it hands out are immutable, cheaply cloneable handles that compare by
//! identity only (two independently built properties are never equal, even
//! when they would behave identically).
//!
//! ### Contexts
//!
//! A multi-valued property — a list element, a map entry, a set member, a
//! tree node — is ambiguous without an address. Each operation takes a
//! [`Context`] supplying one [`Reference`] per ambiguous property in the
//! path; [`Property::contextualize`] runs the other way and enumerates every
//! context at which the property currently has a value.
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis_property::{Context, Schema};
//!
//! struct Order {
//!     lines: Vec<String>,
//! }
//!
//! let mut schema = Schema::new();
//! let order = schema.root::<Order>("order");
//! let lines = schema.field_mut(
//!     &order,
//!     "lines",
//!     |o: &Order| Some(&o.lines),
//!     |o: &mut Order| Some(&mut o.lines),
//!     |o: &mut Order, v| o.lines = v.unwrap_or_default(),
//! );
//! let line = schema.elements(&lines, "line");
//!
//! let mut obj = Order {
//!     lines: vec!["ex-widget".into(), "ex-gadget".into()],
//! };
//!
//! // Read one element through an explicit address.
//! let cx = Context::of(line.at(1));
//! assert_eq!(
//!     line.get(&obj, &cx).unwrap().map(String::as_str),
//!     Some("ex-gadget"),
//! );
//!
//! // Enumerate all live addresses.
//! assert_eq!(line.occurrences(&obj).unwrap(), 2);
//! assert_eq!(line.contextualize(&obj).unwrap().len(), 2);
//!
//! // Write through the same address.
//! line.set(&mut obj, "ex-sprocket".into(), &cx).unwrap();
//! assert_eq!(obj.lines[1], "ex-sprocket");
//! ```
//!
//! ## Failure vocabulary
//!
//! Resolution failures are ordinary values of [`PathError`]: a null
//! ancestor ([`PathError::Interrupted`]), a missing reference
//! ([`PathError::Unreferenced`]), an address that does not match the live
//! container ([`PathError::OutOfBounds`]), a write through a read-only
//! property ([`PathError::Readonly`]), or a drop-by-value miss
//! ([`PathError::UnknownElement`]). [`Property::exists`] and
//! [`Property::is_null`] are the sanctioned way to probe a path without
//! triggering the first three.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod compose;
mod error;
mod field;
mod identity;
mod list;
mod map;
mod meta;
mod node;
mod property;
mod resolve;
mod schema;
mod set;

pub use error::PathError;
pub use list::ListProperty;
pub use map::MapProperty;
pub use meta::{PropertyMeta, is_valid_identifier};
pub use node::{NodeProperty, NodeScope};
pub use property::Property;
pub use schema::Schema;
pub use set::SetProperty;

// The addressing vocabulary is defined in `trellis_context`; re-exported
// here so downstream code needs a single dependency.
pub use trellis_context::{
    Context, KeyValue, Ordinal, PropertyId, Reference, ReferenceKind, ReferenceValue, Route,
};
