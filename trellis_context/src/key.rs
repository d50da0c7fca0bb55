// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased key values.
//!
//! This module provides [`KeyValue`] for storing a map key or set member of
//! any type inside a [`Reference`](crate::Reference), while remaining
//! equatable and hashable so that contexts themselves can be compared and
//! deduplicated.

use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

/// A type-erased, hashable key.
///
/// This wraps a value of any `Eq + Hash + 'static` type. It is the payload
/// of a key-kind [`Reference`](crate::Reference): for a map-shaped property
/// it is the map key, for a set-shaped property it is the member itself
/// (sets have no separate key).
///
/// Equality requires both the erased type and the value to match; a
/// `KeyValue` holding `1_i32` is never equal to one holding `1_u64`.
///
/// # Example
///
/// ```rust
/// use trellis_context::KeyValue;
///
/// let key = KeyValue::new("sku-1".to_string());
/// assert!(key.is::<String>());
/// assert_eq!(key.downcast_ref::<String>().map(|s| s.as_str()), Some("sku-1"));
/// assert_eq!(key, KeyValue::new("sku-1".to_string()));
/// assert_ne!(key, KeyValue::new("sku-2".to_string()));
/// ```
#[derive(Clone)]
pub struct KeyValue {
    inner: Arc<dyn ErasedKey>,
    type_id: TypeId,
}

impl KeyValue {
    /// Creates a new erased key from a concrete value.
    #[must_use]
    pub fn new<T>(key: T) -> Self
    where
        T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Arc::new(key),
        }
    }

    /// Returns the [`TypeId`] of the contained key.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained key is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    ///
    /// Returns `None` if the contained key is not of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.erased_eq(other.inner.as_ref())
    }
}

impl Eq for KeyValue {}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.inner.erased_hash(state);
    }
}

impl fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyValue").field(&self.inner).finish()
    }
}

/// Trait object for erased keys: `Any` plus erased `Eq`, `Hash`, `Debug`.
trait ErasedKey: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn erased_eq(&self, other: &dyn ErasedKey) -> bool;
    fn erased_hash(&self, state: &mut dyn Hasher);
}

impl<T> ErasedKey for T
where
    T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn erased_eq(&self, other: &dyn ErasedKey) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| self == o)
    }

    fn erased_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}
