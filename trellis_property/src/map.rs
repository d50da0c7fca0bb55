// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The map-by-key strategy.

use alloc::sync::Arc;
use core::fmt;
use core::hash::Hash;
use core::ops::Deref;

use hashbrown::HashMap;

use trellis_context::{Context, Reference, ReferenceKind};

use crate::error::PathError;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::resolve::{ContextBuffer, Resolve, each_parent};

/// Resolves one entry of a `HashMap`-valued parent by key.
///
/// An absent key is an address that does not exist — `OutOfBounds` — and
/// is never conflated with a present entry holding an absent value.
pub(crate) struct MapResolve<O, K, V> {
    parent: Property<O, HashMap<K, V>>,
    meta: Arc<PropertyMeta>,
}

impl<O, K, V> MapResolve<O, K, V>
where
    O: 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: 'static,
{
    pub(crate) fn new(parent: &Property<O, HashMap<K, V>>, name: &str) -> Self {
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

    fn key_for<'c>(&self, cx: &'c Context) -> Result<&'c K, PathError> {
        let reference = cx
            .reference_of_kind(self.meta.id(), ReferenceKind::Key)
            .ok_or_else(|| PathError::unreferenced(&self.meta, ReferenceKind::Key))?;
        // A key of the wrong type addresses nothing in this map.
        reference
            .key_of::<K>()
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn map_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<&'a mut HashMap<K, V>, PathError> {
        self.parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))
    }
}

impl<O, K, V> Resolve<O, V> for MapResolve<O, K, V>
where
    O: 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: 'static,
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
        let Some(map) = self.parent.resolver().get(obj, cx, absent_ok)? else {
            return if absent_ok {
                Ok(None)
            } else {
                Err(PathError::interrupted(self.parent.meta()))
            };
        };
        let key = self.key_for(cx)?;
        map.get(key)
            .map(Some)
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut V>, PathError> {
        let map = self.map_mut(obj, cx)?;
        let key = self.key_for(cx)?;
        map.get_mut(key)
            .map(Some)
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn set(&self, obj: &mut O, value: Option<V>, cx: &Context) -> Result<(), PathError> {
        let map = self.map_mut(obj, cx)?;
        let key = self.key_for(cx)?;
        match value {
            // Overwrite only: growing the map is `MapProperty::insert`.
            Some(value) => match map.get_mut(key) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(PathError::out_of_bounds(&self.meta)),
            },
            None => map
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| PathError::out_of_bounds(&self.meta)),
        }
    }

    fn contextualize(
        &self,
        obj: &O,
        base: &Context,
        _include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError> {
        each_parent(&self.parent, obj, base, |map, parent_cx| {
            if let Some(reference) = parent_cx.reference_of_kind(self.meta.id(), ReferenceKind::Key)
            {
                if reference.key_of::<K>().is_some_and(|key| map.contains_key(key)) {
                    out.push(parent_cx.clone());
                }
            } else {
                for key in map.keys() {
                    out.push(parent_cx.with(Reference::key(self.meta.id(), key.clone())));
                }
            }
            Ok(())
        })
    }
}

/// A [`Property`] addressing the entries of a `HashMap`-valued parent,
/// with the map-specific operations.
pub struct MapProperty<O, K, V> {
    inner: Property<O, V>,
    parent: Property<O, HashMap<K, V>>,
}

impl<O, K, V> Clone for MapProperty<O, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<O, K, V> Deref for MapProperty<O, K, V> {
    type Target = Property<O, V>;

    fn deref(&self) -> &Property<O, V> {
        &self.inner
    }
}

impl<O, K, V> MapProperty<O, K, V>
where
    O: 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: 'static,
{
    pub(crate) fn new(parent: &Property<O, HashMap<K, V>>, name: &str) -> Self {
        let inner = Property::from_resolver(Arc::new(MapResolve::new(parent, name)));
        Self {
            inner,
            parent: parent.clone(),
        }
    }

    /// A reference addressing the entry under `key`.
    #[must_use]
    pub fn key(&self, key: K) -> Reference {
        Reference::key(self.inner.id(), key)
    }

    /// Inserts `value` under `key` in the addressed map, returning the
    /// previous value if the key was already present.
    ///
    /// Unlike [`Property::set`], this grows the map when the key is new.
    ///
    /// # Errors
    ///
    /// The resolution errors of [`Property::get_mut`].
    pub fn insert(
        &self,
        obj: &mut O,
        key: K,
        value: V,
        cx: &Context,
    ) -> Result<Option<V>, PathError> {
        let map = self
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))?;
        Ok(map.insert(key, value))
    }

    /// Removes and returns the entry `cx` addresses.
    ///
    /// # Errors
    ///
    /// [`PathError::Unreferenced`] without a key reference,
    /// [`PathError::OutOfBounds`] when the key is absent, plus the
    /// resolution errors of [`Property::get_mut`].
    pub fn extract(&self, obj: &mut O, cx: &Context) -> Result<V, PathError> {
        let map = self
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))?;
        let key = cx
            .reference_of_kind(self.inner.id(), ReferenceKind::Key)
            .ok_or_else(|| PathError::unreferenced(self.inner.meta(), ReferenceKind::Key))?
            .key_of::<K>()
            .ok_or_else(|| PathError::out_of_bounds(self.inner.meta()))?;
        map.remove(key)
            .ok_or_else(|| PathError::out_of_bounds(self.inner.meta()))
    }
}

impl<O, K, V> fmt::Debug for MapProperty<O, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MapProperty").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use hashbrown::HashMap;

    use crate::{Context, PathError, Schema};

    struct Directory {
        numbers: HashMap<String, u32>,
    }

    fn directory() -> (crate::MapProperty<Directory, String, u32>, Directory) {
        let mut schema = Schema::new();
        let directory = schema.root::<Directory>("directory");
        let numbers = schema.field_mut(
            &directory,
            "numbers",
            |d: &Directory| Some(&d.numbers),
            |d: &mut Directory| Some(&mut d.numbers),
            |d: &mut Directory, v| d.numbers = v.unwrap_or_default(),
        );
        let number = schema.entries(&numbers, "number");

        let mut map = HashMap::new();
        map.insert(String::from("ada"), 1_u32);
        map.insert(String::from("grace"), 2);
        (number, Directory { numbers: map })
    }

    #[test]
    fn get_by_key() {
        let (number, obj) = directory();
        let cx = Context::of(number.key(String::from("ada")));
        assert_eq!(number.get(&obj, &cx).unwrap(), Some(&1));
    }

    #[test]
    fn absent_keys_are_out_of_bounds_not_null() {
        let (number, obj) = directory();
        let cx = Context::of(number.key(String::from("alan")));
        let err = number.get(&obj, &cx).unwrap_err();
        assert!(matches!(err, PathError::OutOfBounds { .. }));

        // exists treats the bad address as plain absence.
        assert!(!number.exists(&obj, &cx).unwrap());
    }

    #[test]
    fn set_overwrites_but_never_grows() {
        let (number, mut obj) = directory();
        let live = Context::of(number.key(String::from("ada")));
        number.set(&mut obj, 11, &live).unwrap();
        assert_eq!(obj.numbers["ada"], 11);

        let dead = Context::of(number.key(String::from("alan")));
        let err = number.set(&mut obj, 3, &dead).unwrap_err();
        assert!(matches!(err, PathError::OutOfBounds { .. }));

        number
            .insert(&mut obj, String::from("alan"), 3, &Context::default())
            .unwrap();
        assert_eq!(number.get(&obj, &dead).unwrap(), Some(&3));
    }

    #[test]
    fn clear_and_extract_remove_entries() {
        let (number, mut obj) = directory();
        number
            .clear(&mut obj, &Context::of(number.key(String::from("ada"))))
            .unwrap();
        assert!(!obj.numbers.contains_key("ada"));

        let extracted = number
            .extract(&mut obj, &Context::of(number.key(String::from("grace"))))
            .unwrap();
        assert_eq!(extracted, 2);
        assert_eq!(number.occurrences(&obj).unwrap(), 0);
    }

    #[test]
    fn contextualize_covers_every_entry() {
        let (number, obj) = directory();
        let contexts = number.contextualize(&obj).unwrap();
        assert_eq!(contexts.len(), 2);
        assert_eq!(number.occurrences(&obj).unwrap(), 2);

        let mut values: alloc::vec::Vec<u32> = contexts
            .iter()
            .map(|cx| *number.get(&obj, cx).unwrap().unwrap())
            .collect();
        values.sort_unstable();
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn wrong_key_type_addresses_nothing() {
        let (number, obj) = directory();
        let cx = Context::of(trellis_context::Reference::key(number.id(), 7_u8));
        let err = number.get(&obj, &cx).unwrap_err();
        assert!(matches!(err, PathError::OutOfBounds { .. }));
    }
}
