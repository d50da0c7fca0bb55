// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contexts: the address book used to resolve a property path.
//!
//! This module provides [`Context`], an immutable collection of
//! [`Reference`]s keyed by property identity, with union/merge semantics.

use alloc::sync::Arc;
use core::fmt;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::id::PropertyId;
use crate::reference::{Reference, ReferenceKind};

/// An immutable collection of references, one per ambiguous property.
///
/// A context is supplied once per operation and resolves every
/// multi-valued property along a path: each entry maps a property to the
/// [`Reference`] addressing the element that is meant. Contexts never
/// change in place; [`Context::with`] and [`Context::union`] build new
/// ones. The entry table sits behind an [`Arc`], so cloning a context is
/// cheap and the empty context allocates no table.
///
/// Two contexts are equal iff their reference sets are equal, and the
/// `Hash` implementation is order-independent, so enumerated address sets
/// can be deduplicated into a `HashSet<Context>`.
///
/// # Example
///
/// ```rust
/// use trellis_context::{Context, Ordinal, PropertyId, Reference};
///
/// let rows = PropertyId::fresh();
///
/// let first = Context::of(Reference::index(rows, Ordinal::At(0)));
/// let last = Context::of(Reference::index(rows, Ordinal::Last));
///
/// // Union is last-write-wins per property.
/// let merged = first.union(&last);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(
///     merged.reference(rows).and_then(|r| r.ordinal()),
///     Some(Ordinal::Last),
/// );
/// ```
#[derive(Clone, Default)]
pub struct Context {
    entries: Arc<HashMap<PropertyId, Reference>>,
}

impl Context {
    /// Creates a context holding a single reference.
    #[must_use]
    pub fn of(reference: Reference) -> Self {
        let mut entries = HashMap::with_capacity(1);
        entries.insert(reference.property(), reference);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Creates a context from a collection of references.
    ///
    /// Later references override earlier ones for the same property.
    #[must_use]
    pub fn from_refs(references: impl IntoIterator<Item = Reference>) -> Self {
        references.into_iter().collect()
    }

    /// Returns `true` if this context holds a reference for `property`.
    #[must_use]
    pub fn contains(&self, property: PropertyId) -> bool {
        self.entries.contains_key(&property)
    }

    /// Returns `true` if this context holds a reference of the given kind
    /// for `property`.
    #[must_use]
    pub fn contains_kind(&self, property: PropertyId, kind: ReferenceKind) -> bool {
        self.reference_of_kind(property, kind).is_some()
    }

    /// Looks up the reference for `property`, if any.
    #[must_use]
    pub fn reference(&self, property: PropertyId) -> Option<&Reference> {
        self.entries.get(&property)
    }

    /// Looks up the reference for `property`, filtered by kind.
    ///
    /// A reference of a different kind is treated as absent; this is what
    /// keeps a reference created for one property shape from being
    /// misread by another.
    #[must_use]
    pub fn reference_of_kind(
        &self,
        property: PropertyId,
        kind: ReferenceKind,
    ) -> Option<&Reference> {
        self.entries
            .get(&property)
            .filter(|reference| reference.kind() == kind)
    }

    /// Returns a new context with `reference` added, overriding any
    /// existing reference for the same property.
    #[must_use]
    pub fn with(&self, reference: Reference) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(reference.property(), reference);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns the union of this context and `other`.
    ///
    /// Where both contexts hold a reference for the same property, the one
    /// from `other` wins.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut entries = (*self.entries).clone();
        for reference in other.iter() {
            entries.insert(reference.property(), reference.clone());
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns the number of references in this context.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this context holds no references.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the references in this context.
    ///
    /// The order is unspecified; contexts are unordered collections.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.values()
    }
}

impl FromIterator<Reference> for Context {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        let mut entries = HashMap::new();
        for reference in iter {
            entries.insert(reference.property(), reference);
        }
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        *self.entries == *other.entries
    }
}

impl Eq for Context {}

// Entry order is unspecified, so each entry is hashed on its own (with a
// fixed-key hasher) and the per-entry hashes are combined with addition,
// which is order-independent.
impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut combined = 0_u64;
        for (property, reference) in self.entries.iter() {
            let mut entry_hasher = Fnv1a::default();
            property.hash(&mut entry_hasher);
            reference.hash(&mut entry_hasher);
            combined = combined.wrapping_add(entry_hasher.finish());
        }
        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.values()).finish()
    }
}

/// FNV-1a, used where a deterministic hasher is required (per-entry hashes
/// in [`Context`]'s order-independent `Hash`).
pub(crate) struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
}
