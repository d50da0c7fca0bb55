// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema: the construction registry for properties.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use trellis_context::PropertyId;

use crate::field::FieldResolve;
use crate::identity::IdentityResolve;
use crate::list::ListProperty;
use crate::map::MapProperty;
use crate::meta::is_valid_identifier;
use crate::node::NodeProperty;
use crate::property::Property;
use crate::set::SetProperty;

/// Builds properties, validating names as it goes.
///
/// A schema is constructed once at startup and dropped once every property
/// is built; the properties it hands out are self-contained handles and
/// keep no link back to it. Misuse — a malformed identifier, or two
/// registrations under the same parent with one name — is a construction
/// bug and panics, unlike resolution failures, which are `Result` values.
///
/// # Example
///
/// ```rust
/// use trellis_property::Schema;
///
/// struct Account {
///     balance: Option<i64>,
/// }
///
/// let mut schema = Schema::new();
/// let account = schema.root::<Account>("account");
/// let balance = schema.field(&account, "balance", |a: &Account| a.balance.as_ref());
///
/// assert_eq!(balance.path(), "account.balance");
/// assert!(!balance.is_writable());
/// ```
#[derive(Default)]
pub struct Schema {
    claimed: HashSet<(Option<PropertyId>, String)>,
    // Parents whose elements (or tree nodes) are already addressed; a
    // container gets at most one element property regardless of name.
    addressed: HashSet<PropertyId>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, parent: Option<PropertyId>, name: &str) {
        assert!(
            is_valid_identifier(name),
            "Invalid property identifier '{name}' (identifiers match [a-zA-Z0-9_-]+)"
        );
        assert!(
            self.claimed.insert((parent, name.to_string())),
            "Property '{name}' is already registered under this parent"
        );
    }

    fn claim_elements(&mut self, parent: PropertyId, name: &str) {
        assert!(
            self.addressed.insert(parent),
            "Container already has an element property; '{name}' would be a second"
        );
    }

    /// Builds a root property: the object resolves to itself.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid identifier or a root with this name
    /// was already built.
    pub fn root<O: 'static>(&mut self, name: &str) -> Property<O, O> {
        self.claim(None, name);
        Property::from_resolver(Arc::new(IdentityResolve::new(name)))
    }

    /// Builds a read-only field property under `parent`.
    ///
    /// The getter reports the field's own value; `None` is a live address
    /// with an absent value.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid identifier or is already taken
    /// under `parent`.
    pub fn field<O, P, V>(
        &mut self,
        parent: &Property<O, P>,
        name: &str,
        getter: impl for<'a> Fn(&'a P) -> Option<&'a V> + Send + Sync + 'static,
    ) -> Property<O, V>
    where
        O: 'static,
        P: 'static,
        V: 'static,
    {
        self.claim(Some(parent.id()), name);
        Property::from_resolver(Arc::new(FieldResolve::new(
            parent,
            name,
            Box::new(getter),
            None,
            None,
        )))
    }

    /// Builds a writable field property under `parent`.
    ///
    /// `projector` is the mutable twin of `getter`; `assigner` replaces
    /// the field's value outright (with `None` meaning "make it absent").
    ///
    /// # Panics
    ///
    /// As [`Schema::field`].
    pub fn field_mut<O, P, V>(
        &mut self,
        parent: &Property<O, P>,
        name: &str,
        getter: impl for<'a> Fn(&'a P) -> Option<&'a V> + Send + Sync + 'static,
        projector: impl for<'a> Fn(&'a mut P) -> Option<&'a mut V> + Send + Sync + 'static,
        assigner: impl Fn(&mut P, Option<V>) + Send + Sync + 'static,
    ) -> Property<O, V>
    where
        O: 'static,
        P: 'static,
        V: 'static,
    {
        self.claim(Some(parent.id()), name);
        Property::from_resolver(Arc::new(FieldResolve::new(
            parent,
            name,
            Box::new(getter),
            Some(Box::new(projector)),
            Some(Box::new(assigner)),
        )))
    }

    /// Builds a property addressing the elements of a `Vec`-valued parent.
    ///
    /// # Panics
    ///
    /// As [`Schema::field`]; defining the elements of one list twice is a
    /// duplicate.
    pub fn elements<O, V>(&mut self, parent: &Property<O, Vec<V>>, name: &str) -> ListProperty<O, V>
    where
        O: 'static,
        V: 'static,
    {
        self.claim(Some(parent.id()), name);
        self.claim_elements(parent.id(), name);
        ListProperty::new(parent, name)
    }

    /// Builds a property addressing the entries of a map-valued parent.
    ///
    /// # Panics
    ///
    /// As [`Schema::field`].
    pub fn entries<O, K, V>(
        &mut self,
        parent: &Property<O, HashMap<K, V>>,
        name: &str,
    ) -> MapProperty<O, K, V>
    where
        O: 'static,
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: 'static,
    {
        self.claim(Some(parent.id()), name);
        MapProperty::new(parent, name)
    }

    /// Builds a property addressing the members of a set-valued parent.
    ///
    /// # Panics
    ///
    /// As [`Schema::field`].
    pub fn members<O, V>(&mut self, parent: &Property<O, HashSet<V>>, name: &str) -> SetProperty<O, V>
    where
        O: 'static,
        V: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    {
        self.claim(Some(parent.id()), name);
        SetProperty::new(parent, name)
    }

    /// Builds a property addressing the nodes of a recursive tree rooted
    /// at `parent`'s value.
    ///
    /// `leaves` maps a node to its ordered child list and `leaves_mut` is
    /// its mutable twin. Enumeration is pre-order;
    /// [`NodeScope`](crate::NodeScope) narrows it per call.
    ///
    /// # Panics
    ///
    /// As [`Schema::field`]; defining the nodes of one tree twice is a
    /// duplicate.
    pub fn nodes<O, N>(
        &mut self,
        parent: &Property<O, N>,
        name: &str,
        leaves: impl for<'a> Fn(&'a N) -> &'a Vec<N> + Send + Sync + 'static,
        leaves_mut: impl for<'a> Fn(&'a mut N) -> &'a mut Vec<N> + Send + Sync + 'static,
    ) -> NodeProperty<O, N>
    where
        O: 'static,
        N: 'static,
    {
        self.claim(Some(parent.id()), name);
        self.claim_elements(parent.id(), name);
        NodeProperty::new(parent, name, Box::new(leaves), Box::new(leaves_mut))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("count", &self.claimed.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unit;

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_names_under_one_parent_panic() {
        let mut schema = Schema::new();
        let root = schema.root::<Unit>("unit");
        let _ = schema.field(&root, "twin", |_: &Unit| None::<&u8>);
        let _ = schema.field(&root, "twin", |_: &Unit| None::<&u8>);
    }

    #[test]
    #[should_panic(expected = "Invalid property identifier")]
    fn malformed_identifiers_panic() {
        let mut schema = Schema::new();
        let _ = schema.root::<Unit>("not a name");
    }

    #[test]
    #[should_panic(expected = "already has an element property")]
    fn one_list_gets_one_element_property() {
        let mut schema = Schema::new();
        let items = schema.root::<Vec<u8>>("items");
        let _ = schema.elements(&items, "item");
        let _ = schema.elements(&items, "item-again");
    }

    #[test]
    #[should_panic(expected = "already has an element property")]
    fn one_tree_gets_one_node_property() {
        struct Twig {
            kids: Vec<Twig>,
        }

        let mut schema = Schema::new();
        let twig = schema.root::<Twig>("twig");
        let _ = schema.nodes(&twig, "branch", |t: &Twig| &t.kids, |t: &mut Twig| {
            &mut t.kids
        });
        let _ = schema.nodes(&twig, "limb", |t: &Twig| &t.kids, |t: &mut Twig| {
            &mut t.kids
        });
    }

    #[test]
    fn one_name_may_serve_different_parents() {
        let mut schema = Schema::new();
        let a = schema.root::<Unit>("a");
        let b = schema.root::<Unit>("b");
        let under_a = schema.field(&a, "value", |_: &Unit| None::<&u8>);
        let under_b = schema.field(&b, "value", |_: &Unit| None::<&u8>);

        assert_eq!(under_a.path(), "a.value");
        assert_eq!(under_b.path(), "b.value");
        assert_ne!(under_a.id(), under_b.id());
    }
}
