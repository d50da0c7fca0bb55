// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path composition: chaining two properties into one.

use alloc::sync::Arc;

use trellis_context::Context;

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::resolve::{ContextBuffer, Resolve, each_parent};

/// Resolves `parent` in the object, then resolves `child` inside the
/// intermediate value, under one shared context.
///
/// An absent intermediate value interrupts at the parent's path, not at
/// the composite's, so the failure names the level where resolution
/// actually stopped.
pub(crate) struct ComposedResolve<O, M, V> {
    parent: Property<O, M>,
    child: Property<M, V>,
    meta: Arc<PropertyMeta>,
}

impl<O: 'static, M: 'static, V: 'static> ComposedResolve<O, M, V> {
    pub(crate) fn new(parent: Property<O, M>, child: Property<M, V>) -> Self {
        let meta = PropertyMeta::composed(parent.meta().clone(), child.meta().clone());
        Self {
            parent,
            child,
            meta,
        }
    }
}

impl<O: 'static, M: 'static, V: 'static> Resolve<O, V> for ComposedResolve<O, M, V> {
    fn meta(&self) -> &Arc<PropertyMeta> {
        &self.meta
    }

    fn get<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a V>, PathError> {
        let Some(mid) = self.parent.resolver().get(obj, cx, absent_ok)? else {
            return if absent_ok {
                Ok(None)
            } else {
                Err(PathError::interrupted(self.parent.meta()))
            };
        };
        self.child.resolver().get(mid, cx, absent_ok)
    }

    fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut V>, PathError> {
        let Some(mid) = self.parent.resolver().get_mut(obj, cx)? else {
            return Err(PathError::interrupted(self.parent.meta()));
        };
        self.child.resolver().get_mut(mid, cx)
    }

    fn set(&self, obj: &mut O, value: Option<V>, cx: &Context) -> Result<(), PathError> {
        let Some(mid) = self.parent.resolver().get_mut(obj, cx)? else {
            return Err(PathError::interrupted(self.parent.meta()));
        };
        self.child.resolver().set(mid, value, cx)
    }

    fn contextualize(
        &self,
        obj: &O,
        base: &Context,
        include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError> {
        each_parent(&self.parent, obj, base, |mid, parent_cx| {
            self.child
                .resolver()
                .contextualize(mid, parent_cx, include_null, out)
        })
    }
}
