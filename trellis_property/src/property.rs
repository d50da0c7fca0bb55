// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The typed property handle.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use trellis_context::{Context, PropertyId};

use crate::compose::ComposedResolve;
use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::resolve::{ContextBuffer, Resolve};

/// A typed path from an object of type `O` to a value of type `V`.
///
/// Properties are built through a [`Schema`](crate::Schema) (or by
/// composing existing properties with [`Property::append`]), are immutable
/// afterwards, and clone cheaply: the handle is an [`Arc`] over the
/// resolution strategy. Equality is identity only — two independently
/// constructed properties are never equal, even when they would behave
/// identically, because their accessor closures cannot be compared.
///
/// Every operation takes the object the path starts from and a
/// [`Context`] supplying one reference per multi-valued property in the
/// path. Single-valued paths use `Context::default()`.
pub struct Property<O, V> {
    resolver: Arc<dyn Resolve<O, V>>,
}

impl<O, V> Clone for Property<O, V> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<O: 'static, V: 'static> Property<O, V> {
    pub(crate) fn from_resolver(resolver: Arc<dyn Resolve<O, V>>) -> Self {
        Self { resolver }
    }

    pub(crate) fn resolver(&self) -> &Arc<dyn Resolve<O, V>> {
        &self.resolver
    }

    /// Returns the metadata shared by every clone of this property.
    #[must_use]
    #[inline]
    pub fn meta(&self) -> &Arc<PropertyMeta> {
        self.resolver.meta()
    }

    /// Returns the identity of this property.
    #[must_use]
    #[inline]
    pub fn id(&self) -> PropertyId {
        self.meta().id()
    }

    /// Returns the short local identifier of this property.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        self.resolver.meta().name()
    }

    /// Returns the dotted path of this property from its root.
    #[must_use]
    pub fn path(&self) -> String {
        self.meta().path()
    }

    /// Returns the property this one was registered under, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<PropertyMeta>> {
        self.resolver.meta().parent()
    }

    /// Returns all properties from the tree root through this one.
    #[must_use]
    pub fn hierarchy(&self) -> Vec<Arc<PropertyMeta>> {
        self.meta().hierarchy()
    }

    /// Returns `true` if a mutation strategy was supplied at construction.
    #[must_use]
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.meta().is_writable()
    }

    /// Resolves this property in `obj` and returns its value.
    ///
    /// `Ok(None)` means the address is live but the value itself is
    /// absent. An absent *ancestor* is [`PathError::Interrupted`] instead;
    /// use [`Property::exists`] or [`Property::is_null`] to probe without
    /// erroring.
    ///
    /// # Errors
    ///
    /// [`PathError::Interrupted`] on an absent ancestor,
    /// [`PathError::Unreferenced`] when `cx` lacks a needed reference, and
    /// [`PathError::OutOfBounds`] when a supplied reference does not match
    /// the live container.
    pub fn get<'a>(&self, obj: &'a O, cx: &Context) -> Result<Option<&'a V>, PathError> {
        self.resolver.get(obj, cx, false)
    }

    /// Resolves this property in `obj` and returns a mutable borrow of its
    /// value.
    ///
    /// # Errors
    ///
    /// As [`Property::get`], plus [`PathError::Readonly`] when the shape
    /// admits no in-place projection (unwritable fields, set members).
    pub fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut V>, PathError> {
        self.resolver.get_mut(obj, cx)
    }

    /// Writes `value` at the address `cx` resolves to.
    ///
    /// # Errors
    ///
    /// As [`Property::get`], plus [`PathError::Readonly`] when no mutation
    /// strategy was supplied at construction.
    pub fn set(&self, obj: &mut O, value: V, cx: &Context) -> Result<(), PathError> {
        self.resolver.set(obj, Some(value), cx)
    }

    /// Removes the value at the address `cx` resolves to.
    ///
    /// For a field this assigns the absent value; for a list, map, or set
    /// element it removes the element; for a routed node it detaches the
    /// subtree.
    ///
    /// # Errors
    ///
    /// As [`Property::set`].
    pub fn clear(&self, obj: &mut O, cx: &Context) -> Result<(), PathError> {
        self.resolver.set(obj, None, cx)
    }

    /// Returns `true` if this property currently holds a value at the
    /// address `cx` resolves to.
    ///
    /// Absent ancestors and mismatched references answer `false` rather
    /// than erroring.
    ///
    /// # Errors
    ///
    /// [`PathError::Unreferenced`] when `cx` lacks a needed reference;
    /// that is a caller error, not a state of the object graph.
    pub fn exists(&self, obj: &O, cx: &Context) -> Result<bool, PathError> {
        match self.resolver.get(obj, cx, true) {
            Ok(value) => Ok(value.is_some()),
            Err(PathError::Interrupted { .. } | PathError::OutOfBounds { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Returns `true` if the value at the resolved address is absent.
    ///
    /// Unlike [`Property::get`], an absent ancestor answers `true` instead
    /// of erroring.
    ///
    /// # Errors
    ///
    /// [`PathError::Unreferenced`] and [`PathError::OutOfBounds`].
    pub fn is_null(&self, obj: &O, cx: &Context) -> Result<bool, PathError> {
        Ok(self.resolver.get(obj, cx, true)?.is_none())
    }

    /// Counts the addresses at which this property currently holds a
    /// value in `obj`.
    ///
    /// Always equals `self.contextualize(obj)?.len()`.
    ///
    /// # Errors
    ///
    /// [`PathError::Unreferenced`] when an ancestor needs a reference that
    /// enumeration cannot derive.
    pub fn occurrences(&self, obj: &O) -> Result<usize, PathError> {
        self.resolver.occurrences(obj, &Context::default())
    }

    /// Counts the addresses at which this property currently holds
    /// `value`.
    ///
    /// # Errors
    ///
    /// As [`Property::occurrences`].
    pub fn occurrences_of(&self, obj: &O, value: &V) -> Result<usize, PathError>
    where
        V: PartialEq,
    {
        Ok(self.contextualize_value(obj, value)?.len())
    }

    /// Enumerates every context at which this property currently holds a
    /// value in `obj`.
    ///
    /// # Errors
    ///
    /// As [`Property::occurrences`].
    pub fn contextualize(&self, obj: &O) -> Result<Vec<Context>, PathError> {
        self.contextualize_with(obj, &Context::default(), false)
    }

    /// Enumerates contexts extending `base` at which this property holds a
    /// value (or, with `include_null`, merely a live address).
    ///
    /// References already pinned in `base` are honored: only the addresses
    /// they select are considered.
    ///
    /// # Errors
    ///
    /// As [`Property::occurrences`].
    pub fn contextualize_with(
        &self,
        obj: &O,
        base: &Context,
        include_null: bool,
    ) -> Result<Vec<Context>, PathError> {
        let mut out = ContextBuffer::new();
        self.resolver
            .contextualize(obj, base, include_null, &mut out)?;
        Ok(out.into_vec())
    }

    /// Enumerates the contexts at which this property's current value
    /// equals `value`.
    ///
    /// # Errors
    ///
    /// As [`Property::occurrences`].
    pub fn contextualize_value(&self, obj: &O, value: &V) -> Result<Vec<Context>, PathError>
    where
        V: PartialEq,
    {
        self.contextualize_value_with(obj, &Context::default(), value)
    }

    /// Enumerates the contexts extending `base` at which this property's
    /// current value equals `value`.
    ///
    /// References already pinned in `base` are honored, as in
    /// [`Property::contextualize_with`].
    ///
    /// # Errors
    ///
    /// As [`Property::occurrences`].
    pub fn contextualize_value_with(
        &self,
        obj: &O,
        base: &Context,
        value: &V,
    ) -> Result<Vec<Context>, PathError>
    where
        V: PartialEq,
    {
        let mut out = Vec::new();
        for cx in self.contextualize_with(obj, base, false)? {
            if self.resolver.get(obj, &cx, true)? == Some(value) {
                out.push(cx);
            }
        }
        Ok(out)
    }

    /// Returns every current value of this property, in enumeration order.
    ///
    /// The order follows the container: positional for lists, the
    /// container's own iteration order for maps and sets, pre-order for
    /// node trees.
    ///
    /// # Errors
    ///
    /// As [`Property::occurrences`].
    pub fn iterate<'a>(&self, obj: &'a O) -> Result<Vec<&'a V>, PathError> {
        let mut values = Vec::new();
        for cx in self.contextualize(obj)? {
            if let Some(value) = self.resolver.get(obj, &cx, true)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Returns the value preceding `value` in enumeration order.
    ///
    /// `value` is matched by address, not by equality; `Ok(None)` means
    /// `value` is the first element.
    ///
    /// # Errors
    ///
    /// [`PathError::UnknownElement`] if `value` is never met during the
    /// scan, plus the errors of [`Property::iterate`].
    pub fn predecessor<'a>(&self, obj: &'a O, value: &V) -> Result<Option<&'a V>, PathError> {
        let values = self.iterate(obj)?;
        match values.iter().position(|v| core::ptr::eq(*v, value)) {
            Some(0) => Ok(None),
            Some(i) => Ok(Some(values[i - 1])),
            None => Err(PathError::unknown_element(self.meta())),
        }
    }

    /// Returns the value following `value` in enumeration order.
    ///
    /// `value` is matched by address, not by equality; `Ok(None)` means
    /// `value` is the last element.
    ///
    /// # Errors
    ///
    /// As [`Property::predecessor`].
    pub fn successor<'a>(&self, obj: &'a O, value: &V) -> Result<Option<&'a V>, PathError> {
        let values = self.iterate(obj)?;
        match values.iter().position(|v| core::ptr::eq(*v, value)) {
            Some(i) if i + 1 == values.len() => Ok(None),
            Some(i) => Ok(Some(values[i + 1])),
            None => Err(PathError::unknown_element(self.meta())),
        }
    }

    /// Chains `child` after this property, producing a path whose object
    /// type is this property's object type and whose value type is the
    /// child's.
    ///
    /// One context serves the whole chain: references for every
    /// multi-valued property of both operands go into it together.
    #[must_use]
    pub fn append<W: 'static>(&self, child: &Property<V, W>) -> Property<O, W> {
        Property::from_resolver(Arc::new(ComposedResolve::new(self.clone(), child.clone())))
    }

    /// Chains this property after `parent`; `a.prepend(b)` is
    /// `b.append(a)`.
    #[must_use]
    pub fn prepend<P: 'static>(&self, parent: &Property<P, O>) -> Property<P, V> {
        parent.append(self)
    }
}

impl<O, V> PartialEq for Property<O, V> {
    fn eq(&self, other: &Self) -> bool {
        self.resolver.meta().id() == other.resolver.meta().id()
    }
}

impl<O, V> Eq for Property<O, V> {}

impl<O, V> fmt::Debug for Property<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(self.resolver.meta()).finish()
    }
}

impl<O, V> fmt::Display for Property<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolver.meta().path())
    }
}

#[cfg(test)]
mod tests {
    use crate::Schema;

    struct Unit;

    #[test]
    fn equality_is_identity_only() {
        let mut schema = Schema::new();
        let a = schema.root::<Unit>("a");
        let b = schema.root::<Unit>("b");

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn display_renders_the_path() {
        use alloc::string::ToString;

        let mut schema = Schema::new();
        let root = schema.root::<Unit>("thing");
        assert_eq!(root.to_string(), "thing");
    }
}
