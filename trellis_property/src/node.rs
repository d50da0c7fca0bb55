// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recursive node strategy.
//!
//! A node property addresses the nodes of a self-similar tree: the value
//! type equals the type the property resolves inside. Construction supplies
//! a leaf accessor from a node to its ordered child list; a [`Route`]
//! reference then drives descent hop by hop, each hop context carrying an
//! index that selects the child to enter. The empty (or absent) route
//! addresses the starting node itself.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Deref;

use trellis_context::{Context, Ordinal, Reference, ReferenceKind, Route};

use crate::error::PathError;
use crate::list::ordinal_at;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::resolve::{ContextBuffer, Resolve, each_parent};

pub(crate) type Leaves<N> = Box<dyn for<'a> Fn(&'a N) -> &'a Vec<N> + Send + Sync>;
pub(crate) type LeavesMut<N> = Box<dyn for<'a> Fn(&'a mut N) -> &'a mut Vec<N> + Send + Sync>;

/// How far a scoped node enumeration reaches from its starting node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeScope {
    /// The starting node only.
    Node,
    /// The direct children of the starting node.
    Children,
    /// The starting node and every descendant, pre-order.
    Subtree,
}

pub(crate) struct NodeResolve<O, N> {
    parent: Property<O, N>,
    meta: Arc<PropertyMeta>,
    leaves: Leaves<N>,
    leaves_mut: LeavesMut<N>,
}

impl<O: 'static, N: 'static> NodeResolve<O, N> {
    pub(crate) fn new(
        parent: &Property<O, N>,
        name: &str,
        leaves: Leaves<N>,
        leaves_mut: LeavesMut<N>,
    ) -> Self {
        let meta = PropertyMeta::new(
            name,
            Some(parent.meta().clone()),
            true,
            Some(ReferenceKind::Route),
        );
        Self {
            parent: parent.clone(),
            meta,
            leaves,
            leaves_mut,
        }
    }

    fn route_in<'c>(&self, cx: &'c Context) -> Option<&'c Route> {
        cx.reference_of_kind(self.meta.id(), ReferenceKind::Route)
            .and_then(Reference::route_ref)
    }

    fn hop_index(&self, hop: &Context, len: usize) -> Result<usize, PathError> {
        let ordinal = hop
            .reference_of_kind(self.meta.id(), ReferenceKind::Index)
            .and_then(Reference::ordinal)
            .ok_or_else(|| PathError::unreferenced(&self.meta, ReferenceKind::Index))?;
        ordinal
            .resolve(len)
            .ok_or_else(|| PathError::out_of_bounds(&self.meta))
    }

    fn descend<'a>(&self, mut node: &'a N, hops: &[Context]) -> Result<&'a N, PathError> {
        for hop in hops {
            let kids = (self.leaves)(node);
            let index = self.hop_index(hop, kids.len())?;
            node = kids
                .get(index)
                .ok_or_else(|| PathError::out_of_bounds(&self.meta))?;
        }
        Ok(node)
    }

    fn descend_mut<'a>(&self, mut node: &'a mut N, hops: &[Context]) -> Result<&'a mut N, PathError> {
        for hop in hops {
            let kids = (self.leaves_mut)(node);
            let index = self.hop_index(hop, kids.len())?;
            node = kids
                .get_mut(index)
                .ok_or_else(|| PathError::out_of_bounds(&self.meta))?;
        }
        Ok(node)
    }

    /// Pre-order walk pushing one context per node under `node`, itself
    /// included.
    fn walk(&self, node: &N, route: &Route, parent_cx: &Context, out: &mut ContextBuffer) {
        out.push(parent_cx.with(Reference::route(self.meta.id(), route.clone())));
        for (index, kid) in (self.leaves)(node).iter().enumerate() {
            let hop = Context::of(Reference::index(self.meta.id(), ordinal_at(index)));
            self.walk(kid, &route.append(hop), parent_cx, out);
        }
    }
}

impl<O: 'static, N: 'static> Resolve<O, N> for NodeResolve<O, N> {
    fn meta(&self) -> &Arc<PropertyMeta> {
        &self.meta
    }

    fn get<'a>(
        &self,
        obj: &'a O,
        cx: &Context,
        absent_ok: bool,
    ) -> Result<Option<&'a N>, PathError> {
        let Some(root) = self.parent.resolver().get(obj, cx, absent_ok)? else {
            return if absent_ok {
                Ok(None)
            } else {
                Err(PathError::interrupted(self.parent.meta()))
            };
        };
        let hops = self.route_in(cx).map(Route::hops).unwrap_or_default();
        Ok(Some(self.descend(root, hops)?))
    }

    fn get_mut<'a>(&self, obj: &'a mut O, cx: &Context) -> Result<Option<&'a mut N>, PathError> {
        let root = self
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))?;
        let hops = self.route_in(cx).map(Route::hops).unwrap_or_default();
        Ok(Some(self.descend_mut(root, hops)?))
    }

    fn set(&self, obj: &mut O, value: Option<N>, cx: &Context) -> Result<(), PathError> {
        let root = self
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.parent.meta()))?;
        let hops = self.route_in(cx).map(Route::hops).unwrap_or_default();
        match (value, hops.split_last()) {
            (Some(value), None) => {
                *root = value;
                Ok(())
            }
            (Some(value), Some((last, ancestors))) => {
                let above = self.descend_mut(root, ancestors)?;
                let kids = (self.leaves_mut)(above);
                let index = self.hop_index(last, kids.len())?;
                if let Some(slot) = kids.get_mut(index) {
                    *slot = value;
                }
                Ok(())
            }
            // The starting occurrence cannot detach itself.
            (None, None) => Err(PathError::readonly(&self.meta)),
            (None, Some((last, ancestors))) => {
                let above = self.descend_mut(root, ancestors)?;
                let kids = (self.leaves_mut)(above);
                let index = self.hop_index(last, kids.len())?;
                kids.remove(index);
                Ok(())
            }
        }
    }

    fn contextualize(
        &self,
        obj: &O,
        base: &Context,
        _include_null: bool,
        out: &mut ContextBuffer,
    ) -> Result<(), PathError> {
        each_parent(&self.parent, obj, base, |root, parent_cx| {
            if let Some(route) = self.route_in(parent_cx) {
                match self.descend(root, route.hops()) {
                    Ok(_) => out.push(parent_cx.clone()),
                    Err(PathError::OutOfBounds { .. }) => {}
                    Err(err) => return Err(err),
                }
            } else {
                self.walk(root, &Route::new(), parent_cx, out);
            }
            Ok(())
        })
    }
}

/// A [`Property`] addressing the nodes of a recursive tree, with the
/// route-building and structural operations.
pub struct NodeProperty<O, N> {
    inner: Property<O, N>,
    resolve: Arc<NodeResolve<O, N>>,
}

impl<O, N> Clone for NodeProperty<O, N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            resolve: self.resolve.clone(),
        }
    }
}

impl<O, N> Deref for NodeProperty<O, N> {
    type Target = Property<O, N>;

    fn deref(&self) -> &Property<O, N> {
        &self.inner
    }
}

impl<O: 'static, N: 'static> NodeProperty<O, N> {
    pub(crate) fn new(
        parent: &Property<O, N>,
        name: &str,
        leaves: Leaves<N>,
        leaves_mut: LeavesMut<N>,
    ) -> Self {
        let resolve = Arc::new(NodeResolve::new(parent, name, leaves, leaves_mut));
        Self {
            inner: Property::from_resolver(resolve.clone()),
            resolve,
        }
    }

    /// One descent hop: enter the child at `index`.
    #[must_use]
    pub fn hop(&self, index: isize) -> Context {
        Context::of(Reference::index(self.inner.id(), Ordinal::At(index)))
    }

    /// A route reference built from descent hops; no hops addresses the
    /// starting node itself.
    #[must_use]
    pub fn route_to(&self, hops: impl IntoIterator<Item = Context>) -> Reference {
        let route = hops
            .into_iter()
            .fold(Route::new(), |route, hop| route.append(hop));
        Reference::route(self.inner.id(), route)
    }

    /// A route reference from plain child indices, one per hop.
    #[must_use]
    pub fn route(&self, indices: impl IntoIterator<Item = isize>) -> Reference {
        self.route_to(indices.into_iter().map(|index| self.hop(index)))
    }

    /// Appends `value` as the last child of the node `cx` addresses.
    ///
    /// # Errors
    ///
    /// The resolution errors of [`Property::get_mut`].
    pub fn insert(&self, obj: &mut O, value: N, cx: &Context) -> Result<(), PathError> {
        let node = self
            .inner
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.inner.meta()))?;
        (self.resolve.leaves_mut)(node).push(value);
        Ok(())
    }

    /// Removes and returns the node `cx` addresses, along with the subtree
    /// under it.
    ///
    /// # Errors
    ///
    /// [`PathError::Readonly`] for the empty route (the starting
    /// occurrence cannot detach itself), plus the resolution errors of
    /// [`Property::get_mut`].
    pub fn extract(&self, obj: &mut O, cx: &Context) -> Result<N, PathError> {
        let root = self
            .resolve
            .parent
            .resolver()
            .get_mut(obj, cx)?
            .ok_or_else(|| PathError::interrupted(self.resolve.parent.meta()))?;
        let hops = self.resolve.route_in(cx).map(Route::hops).unwrap_or_default();
        let Some((last, ancestors)) = hops.split_last() else {
            return Err(PathError::readonly(self.inner.meta()));
        };
        let above = self.resolve.descend_mut(root, ancestors)?;
        let kids = (self.resolve.leaves_mut)(above);
        let index = self.resolve.hop_index(last, kids.len())?;
        Ok(kids.remove(index))
    }

    /// Enumerates node contexts from the node `base` addresses, reaching
    /// as far as `scope` allows.
    ///
    /// # Errors
    ///
    /// The resolution errors of [`Property::contextualize_with`], plus
    /// [`PathError::OutOfBounds`] when the route in `base` misses.
    pub fn contextualize_scope(
        &self,
        obj: &O,
        base: &Context,
        scope: NodeScope,
    ) -> Result<Vec<Context>, PathError> {
        let start = self
            .resolve
            .route_in(base)
            .cloned()
            .unwrap_or_default();
        let mut out = ContextBuffer::new();
        each_parent(&self.resolve.parent, obj, base, |root, parent_cx| {
            let node = self.resolve.descend(root, start.hops())?;
            match scope {
                NodeScope::Node => {
                    out.push(parent_cx.with(Reference::route(self.inner.id(), start.clone())));
                }
                NodeScope::Children => {
                    for index in 0..(self.resolve.leaves)(node).len() {
                        let hop =
                            Context::of(Reference::index(self.inner.id(), ordinal_at(index)));
                        out.push(parent_cx.with(Reference::route(
                            self.inner.id(),
                            start.append(hop),
                        )));
                    }
                }
                NodeScope::Subtree => {
                    self.resolve.walk(node, &start, parent_cx, &mut out);
                }
            }
            Ok(())
        })?;
        Ok(out.into_vec())
    }
}

impl<O, N> fmt::Debug for NodeProperty<O, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeProperty").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{Context, NodeScope, PathError, Schema};

    #[derive(Debug)]
    struct Part {
        label: String,
        subparts: Vec<Part>,
    }

    fn part(label: &str, subparts: Vec<Part>) -> Part {
        Part {
            label: String::from(label),
            subparts,
        }
    }

    /// R with children [A, B]; B with child [C].
    fn assembly() -> (crate::NodeProperty<Part, Part>, Part) {
        let mut schema = Schema::new();
        let root = schema.root::<Part>("assembly");
        let node = schema.nodes(
            &root,
            "part",
            |p: &Part| &p.subparts,
            |p: &mut Part| &mut p.subparts,
        );

        let tree = part(
            "R",
            vec![part("A", vec![]), part("B", vec![part("C", vec![])])],
        );
        (node, tree)
    }

    #[test]
    fn empty_route_is_the_root() {
        let (node, tree) = assembly();
        let got = node.get(&tree, &Context::default()).unwrap().unwrap();
        assert_eq!(got.label, "R");

        let explicit = Context::of(node.route([]));
        let got = node.get(&tree, &explicit).unwrap().unwrap();
        assert_eq!(got.label, "R");
    }

    #[test]
    fn routes_descend_hop_by_hop() {
        let (node, tree) = assembly();
        let cx = Context::of(node.route([1, 0]));
        let got = node.get(&tree, &cx).unwrap().unwrap();
        assert_eq!(got.label, "C");
    }

    #[test]
    fn hops_past_the_leaf_count_are_out_of_bounds() {
        let (node, tree) = assembly();
        for indices in [vec![2], vec![0, 0], vec![1, 0, 0]] {
            let cx = Context::of(node.route(indices));
            let err = node.get(&tree, &cx).unwrap_err();
            assert!(matches!(err, PathError::OutOfBounds { .. }));
        }
    }

    #[test]
    fn contextualize_walks_the_whole_tree_preorder() {
        let (node, tree) = assembly();
        assert_eq!(node.occurrences(&tree).unwrap(), 4);

        let labels: Vec<String> = node
            .iterate(&tree)
            .unwrap()
            .into_iter()
            .map(|n| n.label.clone())
            .collect();
        assert_eq!(labels, ["R", "A", "B", "C"]);
    }

    #[test]
    fn scoped_enumeration() {
        let (node, tree) = assembly();
        let at_b = Context::of(node.route([1]));

        let only = node.contextualize_scope(&tree, &at_b, NodeScope::Node).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(node.get(&tree, &only[0]).unwrap().unwrap().label, "B");

        let kids = node
            .contextualize_scope(&tree, &at_b, NodeScope::Children)
            .unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(node.get(&tree, &kids[0]).unwrap().unwrap().label, "C");

        let subtree = node
            .contextualize_scope(&tree, &Context::default(), NodeScope::Subtree)
            .unwrap();
        assert_eq!(subtree.len(), 4);
    }

    #[test]
    fn set_replaces_and_clear_detaches_subtrees() {
        let (node, mut tree) = assembly();

        node.set(&mut tree, part("B2", vec![]), &Context::of(node.route([1])))
            .unwrap();
        assert_eq!(tree.subparts[1].label, "B2");
        assert!(tree.subparts[1].subparts.is_empty());

        node.clear(&mut tree, &Context::of(node.route([0]))).unwrap();
        assert_eq!(tree.subparts.len(), 1);
        assert_eq!(tree.subparts[0].label, "B2");

        let err = node.clear(&mut tree, &Context::default()).unwrap_err();
        assert!(matches!(err, PathError::Readonly { .. }));
    }

    #[test]
    fn insert_appends_children_and_extract_returns_subtrees() {
        let (node, mut tree) = assembly();

        node.insert(&mut tree, part("D", vec![]), &Context::of(node.route([1])))
            .unwrap();
        assert_eq!(tree.subparts[1].subparts.len(), 2);

        let b = node
            .extract(&mut tree, &Context::of(node.route([1])))
            .unwrap();
        assert_eq!(b.label, "B");
        assert_eq!(b.subparts.len(), 2);
        assert_eq!(node.occurrences(&tree).unwrap(), 2);

        let err = node.extract(&mut tree, &Context::default()).unwrap_err();
        assert!(matches!(err, PathError::Readonly { .. }));
    }

    #[test]
    fn pinned_routes_narrow_enumeration() {
        let (node, tree) = assembly();
        let live = node
            .contextualize_with(&tree, &Context::of(node.route([1, 0])), false)
            .unwrap();
        assert_eq!(live.len(), 1);

        let dead = node
            .contextualize_with(&tree, &Context::of(node.route([5])), false)
            .unwrap();
        assert!(dead.is_empty());
    }
}
