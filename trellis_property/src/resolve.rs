// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The access-strategy seam.
//!
//! Every property shape (identity, field, list, map, set, node, composed)
//! implements [`Resolve`]: given the object a path starts from and a
//! context, produce, mutate, count, or enumerate the addressed values.
//! Strategies are stateless over the (property, object, context) triple and
//! never mutate the context.

use alloc::sync::Arc;

use smallvec::SmallVec;

use trellis_context::Context;

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::property::Property;

/// Enumeration buffer; most containers hold a handful of elements, so the
/// first few contexts stay inline.
pub(crate) type ContextBuffer = SmallVec<[Context; 4]>;

/// The per-shape resolution strategy behind a [`Property`].
///
/// `get` resolves the whole chain from the root object; `absent_ok = true`
/// turns an absent ancestor into `Ok(None)` instead of
/// [`PathError::Interrupted`]. `Ok(None)` from a non-tolerant `get` means
/// the property's *own* value is absent at a live address, which is legal.
///
/// `set` with `Some` writes a value; with `None` it clears the addressed
/// element (assigns an absent field value, or removes the addressed
/// list/map/set element or routed node).
///
/// `contextualize` appends to `out` one context per address at which the
/// property currently holds a value, each an extension of `base`; when
/// `base` already pins this property's reference, only that address is
/// considered. `occurrences` counts exactly what `contextualize` with
/// `include_null = false` would produce.
pub(crate) trait Resolve<O, V>: Send + Sync {
    fn meta(&self) -> &Arc<PropertyMeta>;

    fn get<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a V>, PathError>;

    fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut V>, PathError>;

    fn set(&self, obj: &mut O, value: Option<V>, cx: &Context) -> Result<(), PathError>;

    // Counting defers to enumeration so the two can never disagree.
    fn occurrences(&self, obj: &O, base: &Context) -> Result<usize, PathError> {
        let mut out = ContextBuffer::new();
        self.contextualize(obj, base, false, &mut out)?;
        Ok(out.len())
    }

    fn contextualize(
        &self,
        obj: &O,
        base: &Context,
        include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError>;
}

/// Runs `f` once per live occurrence of `parent` in `obj`, passing the
/// occurrence's value and its (base-extending) context.
///
/// This is the recursion every multi-level strategy shares: enumeration and
/// counting at one level fan out across all addresses of the level above.
pub(crate) fn each_parent<'a, O, P, F>(
    parent: &Property<O, P>,
    obj: &'a O,
    base: &Context,
    mut f: F,
) -> Result<(), PathError>
where
    O: 'static,
    P: 'static,
    F: FnMut(&'a P, &Context) -> Result<(), PathError>,
{
    let mut parent_contexts = ContextBuffer::new();
    parent
        .resolver()
        .contextualize(obj, base, false, &mut parent_contexts)?;
    for parent_cx in &parent_contexts {
        if let Some(value) = parent.resolver().get(obj, parent_cx, true)? {
            f(value, parent_cx)?;
        }
    }
    Ok(())
}
