// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The set-by-member strategy.

use alloc::sync::Arc;
use core::fmt;
use core::hash::Hash;
use core::ops::Deref;

use hashbrown::HashSet;

use trellis_context::{Context, Reference, ReferenceKind};

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::resolve::{ContextBuffer, Resolve, each_parent};

/// Resolves one member of a `HashSet`-valued parent.
///
/// The member is its own key: a key reference carries the member value and
/// membership is decided by the set's own equality. Members cannot be
/// projected mutably (that would let the hash change under the set), so
/// `get_mut` is refused; replacement goes through `set`, which removes the
/// old member before inserting the new one.
pub(crate) struct SetResolve<O, V> {
    parent: Property<O, HashSet<V>>,
    meta: Arc<PropertyMeta>,
}

impl<O, V> SetResolve<O, V>
where
    O: 'static,
    V: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub(crate) fn new(parent: &Property<O, HashSet<V>>, name: &str) -> Self {
        let meta = PropertyMeta::new(
            name,
            Some(parent.meta().clone()),
            true,
            Some(ReferenceKind::Key),
        );
        Self {
            parent: parent.clone(),
            meta,
        }
    }

    fn member_for<'c>(&self, cx: &'c Context) -> Result<&'c V, PathError> {
        let reference = cx
            .reference_of_kind(self.meta.id(), ReferenceKind::Key)
            .ok_or_else(|| PathError::unreferenced(&self.meta, ReferenceKind::Key))?;
        reference
            .key_of::<V>()
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn set_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<&'a mut HashSet<V>, PathError> {
        self.parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))
    }
}

impl<O, V> Resolve<O, V> for SetResolve<O, V>
where
    O: 'static,
    V: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn meta(&self) -> &Arc<PropertyMeta> {
        &self.meta
    }

    fn get<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a V>, PathError> {
        let Some(set) = self.parent.resolver().get(obj, cx, absent_ok)? else {
            return if absent_ok {
                Ok(None)
            } else {
                Err(PathError::interrupted(self.parent.meta()))
            };
        };
        let member = self.member_for(cx)?;
        set.get(member)
            .map(Some)
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn get_mut<'a>(&self, _obj: &'a mut O, _cx: &Context) -> Result<Option<&'a mut V>, PathError> {
        Err(PathError::readonly(&self.meta))
    }

    fn set(&self, obj: &mut O, value: Option<V>, cx: &Context) -> Result<(), PathError> {
        let member = self.member_for(cx)?.clone();
        let set = self.set_mut(obj, cx)?;
        // Remove before insert, so replacing a member with an equal one
        // behaves on capacity-one sets.
        set.take(&member)
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))?;
        if let Some(value) = value {
            set.insert(value);
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
        each_parent(&self.parent, obj, base, |set, parent_cx| {
            if let Some(reference) = parent_cx.reference_of_kind(self.meta.id(), ReferenceKind::Key)
            {
                if reference.key_of::<V>().is_some_and(|member| set.contains(member)) {
                    out.push(parent_cx.clone());
                }
            } else {
                for member in set {
                    out.push(parent_cx.with(Reference::key(self.meta.id(), member.clone())));
                }
            }
            Ok(())
        })
    }
}

/// A [`Property`] addressing the members of a `HashSet`-valued parent,
/// with the set-specific operations.
pub struct SetProperty<O, V> {
    inner: Property<O, V>,
    parent: Property<O, HashSet<V>>,
}

impl<O, V> Clone for SetProperty<O, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<O, V> Deref for SetProperty<O, V> {
    type Target = Property<O, V>;

    fn deref(&self) -> &Property<O, V> {
        &self.inner
    }
}

impl<O, V> SetProperty<O, V>
where
    O: 'static,
    V: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub(crate) fn new(parent: &Property<O, HashSet<V>>, name: &str) -> Self {
        let inner = Property::from_resolver(Arc::new(SetResolve::new(parent, name)));
        Self {
            inner,
            parent: parent.clone(),
        }
    }

    /// A reference addressing `value` as a member of the set.
    #[must_use]
    pub fn member(&self, value: &V) -> Reference {
        Reference::key(self.inner.id(), value.clone())
    }

    /// Adds `value` to the addressed set; returns `false` if an equal
    /// member was already present.
    ///
    /// # Errors
    ///
    /// The resolution errors of [`Property::get_mut`].
    pub fn insert(&self, obj: &mut O, value: V, cx: &Context) -> Result<bool, PathError> {
        let set = self
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))?;
        Ok(set.insert(value))
    }

    /// Removes and returns the member equal to `value`.
    ///
    /// # Errors
    ///
    /// [`PathError::UnknownElement`] when no member equals `value`, plus
    /// the resolution errors of [`Property::get_mut`].
    pub fn remove_value(&self, obj: &mut O, value: &V, cx: &Context) -> Result<V, PathError> {
        let set = self
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))?;
        set.take(value)
            .ok_or_else(|| PathError::unknown_element(self.inner.meta()))
    }
}

impl<O, V> fmt::Debug for SetProperty<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetProperty").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use hashbrown::HashSet;

    use crate::{Context, PathError, Schema};

    struct Crew {
        tags: HashSet<String>,
    }

    fn crew() -> (crate::SetProperty<Crew, String>, Crew) {
        let mut schema = Schema::new();
        let crew = schema.root::<Crew>("crew");
        let tags = schema.field_mut(
            &crew,
            "tags",
            |c: &Crew| Some(&c.tags),
            |c: &mut Crew| Some(&mut c.tags),
            |c: &mut Crew, v| c.tags = v.unwrap_or_default(),
        );
        let tag = schema.members(&tags, "tag");

        let mut set = HashSet::new();
        set.insert(String::from("pilot"));
        set.insert(String::from("medic"));
        (tag, Crew { tags: set })
    }

    #[test]
    fn membership_is_the_address() {
        let (tag, obj) = crew();
        let pilot = String::from("pilot");
        let cx = Context::of(tag.member(&pilot));
        assert_eq!(tag.get(&obj, &cx).unwrap().map(String::as_str), Some("pilot"));

        let cx = Context::of(tag.member(&String::from("captain")));
        assert!(matches!(
            tag.get(&obj, &cx).unwrap_err(),
            PathError::OutOfBounds { .. }
        ));
        assert!(!tag.exists(&obj, &cx).unwrap());
    }

    #[test]
    fn members_cannot_be_projected_mutably() {
        let (tag, mut obj) = crew();
        let cx = Context::of(tag.member(&String::from("pilot")));
        assert!(matches!(
            tag.get_mut(&mut obj, &cx).unwrap_err(),
            PathError::Readonly { .. }
        ));
    }

    #[test]
    fn set_replaces_the_addressed_member() {
        let (tag, mut obj) = crew();
        let cx = Context::of(tag.member(&String::from("pilot")));
        tag.set(&mut obj, String::from("captain"), &cx).unwrap();
        assert!(!obj.tags.contains("pilot"));
        assert!(obj.tags.contains("captain"));
        assert_eq!(obj.tags.len(), 2);
    }

    #[test]
    fn clear_and_remove_value() {
        let (tag, mut obj) = crew();
        tag.clear(&mut obj, &Context::of(tag.member(&String::from("medic"))))
            .unwrap();
        assert_eq!(obj.tags.len(), 1);

        let removed = tag
            .remove_value(&mut obj, &String::from("pilot"), &Context::default())
            .unwrap();
        assert_eq!(removed, "pilot");

        let err = tag
            .remove_value(&mut obj, &String::from("pilot"), &Context::default())
            .unwrap_err();
        assert!(matches!(err, PathError::UnknownElement { .. }));
    }

    #[test]
    fn contextualize_covers_every_member() {
        let (tag, obj) = crew();
        assert_eq!(tag.occurrences(&obj).unwrap(), 2);
        assert_eq!(tag.contextualize(&obj).unwrap().len(), 2);

        let pinned = tag
            .contextualize_with(
                &obj,
                &Context::of(tag.member(&String::from("medic"))),
                false,
            )
            .unwrap();
        assert_eq!(pinned.len(), 1);
    }
}
