// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The plain-field strategy.

use alloc::boxed::Box;
use alloc::sync::Arc;

use trellis_context::Context;

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::resolve::{ContextBuffer, Resolve, each_parent};

pub(crate) type Getter<P, V> = Box<dyn for<'a> Fn(&'a P) -> Option<&'a V> + Send + Sync>;
pub(crate) type Projector<P, V> = Box<dyn for<'a> Fn(&'a mut P) -> Option<&'a mut V> + Send + Sync>;
pub(crate) type Assigner<P, V> = Box<dyn Fn(&mut P, Option<V>) + Send + Sync>;

/// Resolves a field through caller-supplied accessors.
///
/// The getter reports the field's own value as `Option`: `None` is a live
/// address with an absent value, never an error. Writable fields carry a
/// mutable projection and an assign closure as well; without them every
/// mutation is [`PathError::Readonly`].
pub(crate) struct FieldResolve<O, P, V> {
    parent: Property<O, P>,
    meta: Arc<PropertyMeta>,
    getter: Getter<P, V>,
    projector: Option<Projector<P, V>>,
    assigner: Option<Assigner<P, V>>,
}

impl<O: 'static, P: 'static, V: 'static> FieldResolve<O, P, V> {
    pub(crate) fn new(
        parent: &Property<O, P>,
        name: &str,
        getter: Getter<P, V>,
        projector: Option<Projector<P, V>>,
        assigner: Option<Assigner<P, V>>,
    ) -> Self {
        let meta = PropertyMeta::new(
            name,
            Some(parent.meta().clone()),
            assigner.is_some(),
            None,
        );
        Self {
            parent: parent.clone(),
            meta,
            getter,
            projector,
            assigner,
        }
    }

    fn parent_value<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a P>, PathError> {
        let value = self.parent.resolver().get(obj, cx, absent_ok)?;
        if value.is_none() && !absent_ok {
            return Err(PathError::interrupted(self.parent.meta()));
        }
        Ok(value)
    }

    fn parent_value_mut<'a>(
        &self,
        obj: &'a mut O,
        cx: &Context,
    ) -> Result<&'a mut P, PathError> {
        self.parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))
    }
}

impl<O: 'static, P: 'static, V: 'static> Resolve<O, V> for FieldResolve<O, P, V> {
    fn meta(&self) -> &Arc<PropertyMeta> {
        &self.meta
    }

    fn get<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a V>, PathError> {
        match self.parent_value(obj, cx, absent_ok)? {
            Some(parent) => Ok((self.getter)(parent)),
            None => Ok(None),
        }
    }

    fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut V>, PathError> {
        let projector = self
            .projector
            .as_ref()
            .ok_or_else(|| PathError::readonly(&self.meta))?;
        let parent = self.parent_value_mut(obj, cx)?;
        Ok(projector(parent))
    }

    fn set(&self, obj: &mut O, value: Option<V>, cx: &Context) -> Result<(), PathError> {
        let assigner = self
            .assigner
            .as_ref()
            .ok_or_else(|| PathError::readonly(&self.meta))?;
        let parent = self.parent_value_mut(obj, cx)?;
        assigner(parent, value);
        Ok(())
    }

    fn contextualize(
        &self,
        obj: &O,
        base: &Context,
        include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError> {
        each_parent(&self.parent, obj, base, |parent, parent_cx| {
            if include_null || (self.getter)(parent).is_some() {
                out.push(parent_cx.clone());
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Context, PathError, Schema};

    struct Person {
        nickname: Option<u8>,
    }

    #[test]
    fn readonly_fields_reject_mutation() {
        let mut schema = Schema::new();
        let person = schema.root::<Person>("person");
        let nickname = schema.field(&person, "nickname", |p: &Person| p.nickname.as_ref());

        assert!(!nickname.is_writable());
        let mut obj = Person { nickname: Some(1) };
        let err = nickname.set(&mut obj, 2, &Context::default()).unwrap_err();
        assert_eq!(
            err,
            PathError::Readonly {
                at: nickname.path(),
            }
        );
    }

    #[test]
    fn null_fields_have_zero_occurrences() {
        let mut schema = Schema::new();
        let person = schema.root::<Person>("person");
        let nickname = schema.field(&person, "nickname", |p: &Person| p.nickname.as_ref());

        let absent = Person { nickname: None };
        assert_eq!(nickname.occurrences(&absent).unwrap(), 0);
        assert!(nickname.is_null(&absent, &Context::default()).unwrap());
        assert!(!nickname.exists(&absent, &Context::default()).unwrap());

        // include_null still reports the live address.
        let contexts = nickname
            .contextualize_with(&absent, &Context::default(), true)
            .unwrap();
        assert_eq!(contexts.len(), 1);
    }

    #[test]
    fn mutable_projection_writes_in_place() {
        let mut schema = Schema::new();
        let person = schema.root::<Person>("person");
        let nickname = schema.field_mut(
            &person,
            "nickname",
            |p: &Person| p.nickname.as_ref(),
            |p: &mut Person| p.nickname.as_mut(),
            |p: &mut Person, v| p.nickname = v,
        );

        let mut obj = Person { nickname: Some(3) };
        let cx = Context::default();
        if let Some(slot) = nickname.get_mut(&mut obj, &cx).unwrap() {
            *slot = 4;
        }
        assert_eq!(obj.nickname, Some(4));
    }
}
