// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routes through recursive node trees.
//!
//! This module provides [`Route`], the ordered list of per-hop contexts
//! that addresses one node inside a self-similar tree.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::context::Context;

/// An ordered descent through a recursive node tree.
///
/// Each hop is a [`Context`] that addresses which child of the current node
/// to descend into; the route's length equals the tree depth reached. The
/// empty route addresses the root occurrence itself.
///
/// Routes are persistent: [`Route::append`] produces a structurally new,
/// longer route and leaves the original untouched, so a route captured
/// during a traversal stays valid after the traversal moves on.
///
/// # Example
///
/// ```rust
/// use trellis_context::{Context, Route};
///
/// let root = Route::default();
/// let child = root.append(Context::default());
///
/// assert!(root.is_empty());
/// assert_eq!(child.len(), 1);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Route {
    hops: Arc<[Context]>,
}

impl Route {
    /// Creates the empty route, addressing the root node itself.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new route extended by one hop.
    #[must_use]
    pub fn append(&self, hop: Context) -> Self {
        let mut hops = Vec::with_capacity(self.hops.len() + 1);
        hops.extend(self.hops.iter().cloned());
        hops.push(hop);
        Self { hops: hops.into() }
    }

    /// Returns the number of hops, which equals the depth reached.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Returns `true` if this route addresses the root node itself.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Returns the hop at `depth`, if the route is that deep.
    #[must_use]
    pub fn hop(&self, depth: usize) -> Option<&Context> {
        self.hops.get(depth)
    }

    /// Returns the hops in descent order.
    #[must_use]
    #[inline]
    pub fn hops(&self) -> &[Context] {
        &self.hops
    }

    /// Returns an iterator over the hops in descent order.
    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.hops.iter()
    }
}

// Hop order is significant, so routes hash in order (unlike `Context`,
// whose entries are unordered).
impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.hops.len());
        for hop in self.hops.iter() {
            hop.hash(state);
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hops.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ordinal, PropertyId, Reference};

    #[test]
    fn empty_route_is_root() {
        let route = Route::new();
        assert!(route.is_empty());
        assert_eq!(route.len(), 0);
        assert_eq!(route.hop(0), None);
    }

    #[test]
    fn append_is_persistent() {
        let p = PropertyId::fresh();
        let root = Route::new();
        let one = root.append(Context::of(Reference::index(p, Ordinal::At(1))));
        let two = one.append(Context::of(Reference::index(p, Ordinal::At(0))));

        assert!(root.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(two.hop(0), one.hop(0));
    }

    #[test]
    fn route_equality_respects_hop_order() {
        let p = PropertyId::fresh();
        let a = Context::of(Reference::index(p, Ordinal::At(0)));
        let b = Context::of(Reference::index(p, Ordinal::At(1)));

        let ab = Route::new().append(a.clone()).append(b.clone());
        let ba = Route::new().append(b).append(a);
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }
}
