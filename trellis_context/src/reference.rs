// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! References: the address of one element of a multi-valued property.
//!
//! This module provides [`Ordinal`] positions, the [`Reference`] value
//! object, and [`ReferenceKind`] for kind-filtered lookup.

use core::fmt;

use crate::id::PropertyId;
use crate::key::KeyValue;
use crate::route::Route;

/// A position inside a sequence.
///
/// Besides explicit positions, an ordinal can be produced "automatically"
/// at the natural append or strip position, without knowing the live length
/// of the sequence:
///
/// - [`Ordinal::Next`] is one past the current end — where an insertion
///   appends.
/// - [`Ordinal::Last`] is the current last element — what a strip removes.
///
/// Explicit positions are signed so that out-of-range addressing (including
/// negative positions) is representable; it is rejected with an
/// out-of-bounds error at resolution time, not at construction time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ordinal {
    /// An explicit position, validated against the live sequence length.
    At(isize),
    /// One past the current end of the sequence.
    Next,
    /// The current last element of the sequence.
    Last,
}

impl Ordinal {
    /// Resolves this ordinal against a live sequence of length `len` for
    /// element access.
    ///
    /// Returns `None` when the ordinal addresses no live element: an
    /// explicit position outside `0..len`, [`Ordinal::Next`] (which is
    /// never a live element), or [`Ordinal::Last`] of an empty sequence.
    #[must_use]
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Self::At(i) => usize::try_from(i).ok().filter(|&i| i < len),
            Self::Next => None,
            Self::Last => len.checked_sub(1),
        }
    }

    /// Resolves this ordinal against a live sequence of length `len` for
    /// insertion, where positions `0..=len` are valid.
    ///
    /// [`Ordinal::Next`] appends; [`Ordinal::Last`] inserts just before the
    /// current last element (or at the front of an empty sequence).
    #[must_use]
    pub fn resolve_for_insert(self, len: usize) -> Option<usize> {
        match self {
            Self::At(i) => usize::try_from(i).ok().filter(|&i| i <= len),
            Self::Next => Some(len),
            Self::Last => Some(len.saturating_sub(1)),
        }
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(i) => write!(f, "[{i}]"),
            Self::Next => f.write_str("[next]"),
            Self::Last => f.write_str("[last]"),
        }
    }
}

/// The kind of a [`Reference`], for kind-filtered context lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// An ordinal position in a list-shaped property.
    Index,
    /// A key in a map-shaped property, or a member of a set-shaped one.
    Key,
    /// A descent route through a recursive node-shaped property.
    Route,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index"),
            Self::Key => f.write_str("key"),
            Self::Route => f.write_str("route"),
        }
    }
}

/// The payload of a [`Reference`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceValue {
    /// A position in a sequence.
    Index(Ordinal),
    /// An erased map key or set member.
    Key(KeyValue),
    /// A descent route through a recursive tree.
    Route(Route),
}

impl ReferenceValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Index(_) => ReferenceKind::Index,
            Self::Key(_) => ReferenceKind::Key,
            Self::Route(_) => ReferenceKind::Route,
        }
    }
}

/// The address of one element of a multi-valued property.
///
/// A reference is bound to exactly the property it was created for; the
/// binding is part of its equality and hash. Resolving a different property
/// with it finds nothing — kind- and identity-filtered lookup makes the
/// mismatch surface as a missing reference, never as a silent misread.
///
/// # Example
///
/// ```rust
/// use trellis_context::{Ordinal, PropertyId, Reference, ReferenceKind};
///
/// let items = PropertyId::fresh();
/// let reference = Reference::index(items, Ordinal::At(2));
///
/// assert_eq!(reference.property(), items);
/// assert_eq!(reference.kind(), ReferenceKind::Index);
/// assert_eq!(reference.ordinal(), Some(Ordinal::At(2)));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    property: PropertyId,
    value: ReferenceValue,
}

impl Reference {
    /// Creates an index reference for `property`.
    #[must_use]
    pub fn index(property: PropertyId, ordinal: Ordinal) -> Self {
        Self {
            property,
            value: ReferenceValue::Index(ordinal),
        }
    }

    /// Creates a key reference for `property`.
    #[must_use]
    pub fn key<K>(property: PropertyId, key: K) -> Self
    where
        K: Eq + core::hash::Hash + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            property,
            value: ReferenceValue::Key(KeyValue::new(key)),
        }
    }

    /// Creates a route reference for `property`.
    #[must_use]
    pub fn route(property: PropertyId, route: Route) -> Self {
        Self {
            property,
            value: ReferenceValue::Route(route),
        }
    }

    /// Returns the property this reference is bound to.
    #[must_use]
    #[inline]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    /// Returns the kind of this reference.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> ReferenceKind {
        self.value.kind()
    }

    /// Returns the payload of this reference.
    #[must_use]
    #[inline]
    pub fn value(&self) -> &ReferenceValue {
        &self.value
    }

    /// Returns the ordinal if this is an index reference.
    #[must_use]
    pub fn ordinal(&self) -> Option<Ordinal> {
        match &self.value {
            ReferenceValue::Index(ordinal) => Some(*ordinal),
            _ => None,
        }
    }

    /// Returns the key, downcast to `K`, if this is a key reference of that
    /// type.
    #[must_use]
    pub fn key_of<K: 'static>(&self) -> Option<&K> {
        match &self.value {
            ReferenceValue::Key(key) => key.downcast_ref(),
            _ => None,
        }
    }

    /// Returns the route if this is a route reference.
    #[must_use]
    pub fn route_ref(&self) -> Option<&Route> {
        match &self.value {
            ReferenceValue::Route(route) => Some(route),
            _ => None,
        }
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("property", &self.property)
            .field("value", &self.value)
            .finish()
    }
}
