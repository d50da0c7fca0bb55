// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The root strategy: the object itself.

use alloc::sync::Arc;

use trellis_context::Context;

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::resolve::{ContextBuffer, Resolve};

/// Resolves a root property to the object resolution starts from.
///
/// The root is always present, at exactly one address, and is never
/// writable: replacing the whole object is the caller's move, not a path
/// operation.
pub(crate) struct IdentityResolve {
    meta: Arc<PropertyMeta>,
}

impl IdentityResolve {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            meta: PropertyMeta::new(name, None, false, None),
        }
    }
}

impl<O: 'static> Resolve<O, O> for IdentityResolve {
    fn meta(&self) -> &Arc<PropertyMeta> {
        &self.meta
    }

    fn get<'a>(
        &self,
        obj: &'a O,
        _cx: &Context,
        _absent_ok: bool,
    ) -> Result<Option<&'a O>, PathError> {
        Ok(Some(obj))
    }

    fn get_mut<'a>(&self, obj: &'a mut O, _cx: &Context) -> Result<Option<&'a mut O>, PathError> {
        Ok(Some(obj))
    }

    fn set(&self, _obj: &mut O, _value: Option<O>, _cx: &Context) -> Result<(), PathError> {
        Err(PathError::readonly(&self.meta))
    }

    fn occurrences(&self, _obj: &O, _base: &Context) -> Result<usize, PathError> {
        Ok(1)
    }

    fn contextualize(
        &self,
        _obj: &O,
        base: &Context,
        _include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError> {
        out.push(base.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_always_present_once() {
        let resolve = IdentityResolve::new("order");
        let obj = 7_u32;
        let cx = Context::default();

        assert_eq!(resolve.get(&obj, &cx, false).unwrap(), Some(&7));
        assert_eq!(resolve.occurrences(&obj, &cx).unwrap(), 1);

        let mut out = ContextBuffer::new();
        resolve.contextualize(&obj, &cx, false, &mut out).unwrap();
        assert_eq!(out.as_slice(), [cx]);
    }

    #[test]
    fn root_rejects_writes() {
        let resolve = IdentityResolve::new("order");
        let mut obj = 7_u32;
        let err = resolve
            .set(&mut obj, Some(9), &Context::default())
            .unwrap_err();
        assert!(matches!(err, PathError::Readonly { .. }));
    }
}
