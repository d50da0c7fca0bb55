// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identity.
//!
//! This module provides [`PropertyId`], the process-unique identity of one
//! constructed property.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh property ids. Never reused within a process.
static NEXT_PROPERTY_ID: AtomicU64 = AtomicU64::new(0);

/// The identity of one constructed property.
///
/// Two independently constructed properties are never the same, even when
/// they would behave identically: their accessor closures cannot be compared
/// for semantic equivalence, so identity is the only sound notion of
/// property equality. `PropertyId` makes that identity a small, copyable
/// token that contexts and references can be keyed by.
///
/// Ids are allocated from a process-wide counter and are unique for the
/// lifetime of the process.
///
/// # Example
///
/// ```rust
/// use trellis_context::PropertyId;
///
/// let a = PropertyId::fresh();
/// let b = PropertyId::fresh();
/// assert_ne!(a, b);
/// assert_eq!(a, a);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u64);

impl PropertyId {
    /// Allocates a new, never-before-seen property id.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_PROPERTY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying numeric value of this id.
    ///
    /// Only useful for diagnostics; the value carries no meaning beyond
    /// uniqueness.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}
