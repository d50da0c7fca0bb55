// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The list-by-index strategy.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Deref;

use trellis_context::{Context, Ordinal, Reference, ReferenceKind};

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::resolve::{ContextBuffer, Resolve, each_parent};

/// An in-bounds position as an [`Ordinal`]. Live list and leaf positions
/// never overflow `isize`, so the saturation here is unreachable.
pub(crate) fn ordinal_at(index: usize) -> Ordinal {
    Ordinal::At(isize::try_from(index).unwrap_or(isize::MAX))
}

/// Resolves one element of a `Vec`-valued parent by index.
///
/// Indices are always re-derived from the live list: nothing is persisted,
/// so insertions and removals shift later addresses implicitly.
pub(crate) struct ListResolve<O, V> {
    parent: Property<O, Vec<V>>,
    meta: Arc<PropertyMeta>,
}

impl<O: 'static, V: 'static> ListResolve<O, V> {
    pub(crate) fn new(parent: &Property<O, Vec<V>>, name: &str) -> Self {
        let meta = PropertyMeta::new(
            name,
            Some(parent.meta().clone()),
            true,
            Some(ReferenceKind::Index),
        );
        Self {
            parent: parent.clone(),
            meta,
        }
    }

    fn index_for(&self, cx: &Context, len: usize) -> Result<usize, PathError> {
        let ordinal = cx
            .reference_of_kind(self.meta.id(), ReferenceKind::Index)
            .and_then(Reference::ordinal)
            .ok_or_else(|| PathError::unreferenced(&self.meta, ReferenceKind::Index))?;
        ordinal
            .resolve(len)
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn list_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<&'a mut Vec<V>, PathError> {
        self.parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))
    }
}

impl<O: 'static, V: 'static> Resolve<O, V> for ListResolve<O, V> {
    fn meta(&self) -> &Arc<PropertyMeta> {
        &self.meta
    }

    fn get<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a V>, PathError> {
        let Some(list) = self.parent.resolver().get(obj, cx, absent_ok)? else {
            return if absent_ok {
                Ok(None)
            } else {
                Err(PathError::interrupted(self.parent.meta()))
            };
        };
        let index = self.index_for(cx, list.len())?;
        Ok(list.get(index))
    }

    fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut V>, PathError> {
        let list = self.list_mut(obj, cx)?;
        let index = self.index_for(cx, list.len())?;
        Ok(list.get_mut(index))
    }

    fn set(&self, obj: &mut O, value: Option<V>, cx: &Context) -> Result<(), PathError> {
        let list = self.list_mut(obj, cx)?;
        let index = self.index_for(cx, list.len())?;
        match value {
            Some(value) => {
                if let Some(slot) = list.get_mut(index) {
                    *slot = value;
                }
            }
            None => {
                list.remove(index);
            }
        }
        Ok(())
    }

    fn contextualize(
        &self,
        obj: &O,
        base: &Context,
        _include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError> {
        each_parent(&self.parent, obj, base, |list, parent_cx| {
            if let Some(ordinal) = parent_cx
                .reference_of_kind(self.meta.id(), ReferenceKind::Index)
                .and_then(Reference::ordinal)
            {
                if ordinal.resolve(list.len()).is_some() {
                    out.push(parent_cx.clone());
                }
            } else {
                for index in 0..list.len() {
                    out.push(parent_cx.with(Reference::index(self.meta.id(), ordinal_at(index))));
                }
            }
            Ok(())
        })
    }
}

/// A [`Property`] addressing the elements of a `Vec`-valued parent, with
/// the list-specific operations.
pub struct ListProperty<O, V> {
    inner: Property<O, V>,
    parent: Property<O, Vec<V>>,
}

impl<O, V> Clone for ListProperty<O, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<O, V> Deref for ListProperty<O, V> {
    type Target = Property<O, V>;

    fn deref(&self) -> &Property<O, V> {
        &self.inner
    }
}

impl<O: 'static, V: 'static> ListProperty<O, V> {
    pub(crate) fn new(parent: &Property<O, Vec<V>>, name: &str) -> Self {
        let inner = Property::from_resolver(Arc::new(ListResolve::new(parent, name)));
        Self {
            inner,
            parent: parent.clone(),
        }
    }

    /// A reference addressing the element at `index`.
    #[must_use]
    pub fn at(&self, index: isize) -> Reference {
        Reference::index(self.inner.id(), Ordinal::At(index))
    }

    /// A reference addressing the position one past the current end.
    #[must_use]
    pub fn next(&self) -> Reference {
        Reference::index(self.inner.id(), Ordinal::Next)
    }

    /// A reference addressing the current last element.
    #[must_use]
    pub fn last(&self) -> Reference {
        Reference::index(self.inner.id(), Ordinal::Last)
    }

    fn ordinal_in(&self, cx: &Context) -> Option<Ordinal> {
        cx.reference_of_kind(self.inner.id(), ReferenceKind::Index)
            .and_then(Reference::ordinal)
    }

    fn list_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<&'a mut Vec<V>, PathError> {
        self.parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))
    }

    /// Inserts `value` at the position `cx` addresses, shifting later
    /// elements; without an index reference the value is appended.
    ///
    /// # Errors
    ///
    /// The resolution errors of [`Property::get_mut`], and
    /// [`PathError::OutOfBounds`] for a position past `len`.
    pub fn insert(&self, obj: &mut O, value: V, cx: &Context) -> Result<(), PathError> {
        let list = self.list_mut(obj, cx)?;
        let position = self
            .ordinal_in(cx)
            .unwrap_or(Ordinal::Next)
            .resolve_for_insert(list.len())
            .ok_or_else(|| PathError::out_of_bounds(self.inner.meta()))?;
        list.insert(position, value);
        Ok(())
    }

    /// Removes and returns the element `cx` addresses; without an index
    /// reference the current last element is stripped.
    ///
    /// # Errors
    ///
    /// The resolution errors of [`Property::get_mut`], and
    /// [`PathError::OutOfBounds`] when the position addresses no live
    /// element.
    pub fn extract(&self, obj: &mut O, cx: &Context) -> Result<V, PathError> {
        let list = self.list_mut(obj, cx)?;
        let position = self
            .ordinal_in(cx)
            .unwrap_or(Ordinal::Last)
            .resolve(list.len())
            .ok_or_else(|| PathError::out_of_bounds(self.inner.meta()))?;
        Ok(list.remove(position))
    }

    /// Removes the first element equal to `value` from the addressed list.
    ///
    /// # Errors
    ///
    /// [`PathError::UnknownElement`] when no element equals `value`, plus
    /// the resolution errors of [`Property::get_mut`].
    pub fn remove_value(&self, obj: &mut O, value: &V, cx: &Context) -> Result<V, PathError>
    where
        V: PartialEq,
    {
        let list = self.list_mut(obj, cx)?;
        let position = list
            .iter()
            .position(|element| element == value)
            .ok_or_else(|| PathError::unknown_element(self.inner.meta()))?;
        Ok(list.remove(position))
    }
}

impl<O, V> fmt::Debug for ListProperty<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListProperty").field(&self.inner).finish()
    }
}
