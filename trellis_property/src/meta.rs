// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata.
//!
//! This module provides [`PropertyMeta`], the type-erased description every
//! property carries: identity, name, parent link, writability, and the kind
//! of reference the property needs in a context.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use trellis_context::{PropertyId, ReferenceKind};

/// Returns `true` if `name` is a valid property identifier.
///
/// Identifiers match `[a-zA-Z0-9_-]+`; composite path names join
/// identifiers with `.`.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// The type-erased description of one property.
///
/// Every [`Property`](crate::Property) carries one of these behind an
/// [`Arc`]. It is what survives type erasure: composition and hierarchy
/// walks deal in `Arc<PropertyMeta>` because the intermediate value types
/// of a composed path cannot be named from outside.
///
/// The parent link points at the property this one was registered under;
/// parents never reference their children, so the chain is acyclic and can
/// be held strongly.
pub struct PropertyMeta {
    id: PropertyId,
    name: String,
    parent: Option<Arc<PropertyMeta>>,
    writable: bool,
    reference: Option<ReferenceKind>,
    /// Set for composed properties: the two operands of `append`.
    operands: Option<(Arc<PropertyMeta>, Arc<PropertyMeta>)>,
}

impl PropertyMeta {
    pub(crate) fn new(
        name: &str,
        parent: Option<Arc<Self>>,
        writable: bool,
        reference: Option<ReferenceKind>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: PropertyId::fresh(),
            name: name.to_string(),
            parent,
            writable,
            reference,
            operands: None,
        })
    }

    pub(crate) fn composed(parent_op: Arc<Self>, child_op: Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            id: PropertyId::fresh(),
            name: child_op.name.clone(),
            writable: child_op.writable,
            reference: None,
            parent: Some(parent_op.clone()),
            operands: Some((parent_op, child_op)),
        })
    }

    /// Returns the identity of this property.
    #[must_use]
    #[inline]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Returns the short local identifier of this property.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property this one was registered under, if any.
    #[must_use]
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns `true` if a mutation strategy was supplied at construction.
    #[must_use]
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Returns the kind of reference this property needs in a context, or
    /// `None` for single-valued properties.
    #[must_use]
    #[inline]
    pub fn requires(&self) -> Option<ReferenceKind> {
        self.reference
    }

    /// Returns the dotted path of this property from its root.
    #[must_use]
    pub fn path(&self) -> String {
        match (&self.operands, &self.parent) {
            (Some((parent_op, child_op)), _) => {
                let mut path = parent_op.path();
                path.push('.');
                path.push_str(&child_op.path());
                path
            }
            (None, Some(parent)) => {
                let mut path = parent.path();
                path.push('.');
                path.push_str(&self.name);
                path
            }
            (None, None) => self.name.clone(),
        }
    }

    /// Returns all properties from the tree root through this one.
    ///
    /// For a composed property this is the union of both operands'
    /// hierarchies (the composite itself appears only when it is
    /// addressable in its own right). The result is what determines which
    /// references a context must supply to resolve this property.
    #[must_use]
    pub fn hierarchy(self: &Arc<Self>) -> Vec<Arc<Self>> {
        let mut chain = Vec::new();
        self.collect(&mut chain);
        chain
    }

    fn collect(self: &Arc<Self>, chain: &mut Vec<Arc<Self>>) {
        if let Some((parent_op, child_op)) = &self.operands {
            parent_op.collect(chain);
            child_op.collect(chain);
            if self.reference.is_some() {
                Self::push_unique(chain, self);
            }
        } else {
            if let Some(parent) = &self.parent {
                parent.collect(chain);
            }
            Self::push_unique(chain, self);
        }
    }

    fn push_unique(chain: &mut Vec<Arc<Self>>, meta: &Arc<Self>) {
        if !chain.iter().any(|m| m.id == meta.id) {
            chain.push(meta.clone());
        }
    }
}

impl fmt::Debug for PropertyMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMeta")
            .field("id", &self.id)
            .field("path", &self.path())
            .field("writable", &self.writable)
            .field("requires", &self.reference)
            .finish()
    }
}

impl fmt::Display for PropertyMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_validation() {
        assert!(is_valid_identifier("order"));
        assert!(is_valid_identifier("line_item-2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("a.b"));
        assert!(!is_valid_identifier("white space"));
    }

    #[test]
    fn path_joins_with_dots() {
        let root = PropertyMeta::new("order", None, false, None);
        let lines = PropertyMeta::new("lines", Some(root.clone()), true, None);
        let line = PropertyMeta::new(
            "line",
            Some(lines.clone()),
            true,
            Some(ReferenceKind::Index),
        );

        assert_eq!(root.path(), "order");
        assert_eq!(lines.path(), "order.lines");
        assert_eq!(line.path(), "order.lines.line");
    }

    #[test]
    fn hierarchy_includes_self_and_ancestors() {
        let root = PropertyMeta::new("order", None, false, None);
        let lines = PropertyMeta::new("lines", Some(root.clone()), true, None);
        let line = PropertyMeta::new(
            "line",
            Some(lines.clone()),
            true,
            Some(ReferenceKind::Index),
        );

        let chain = line.hierarchy();
        let ids: Vec<_> = chain.iter().map(|m| m.id()).collect();
        assert_eq!(ids, [root.id(), lines.id(), line.id()]);
    }

    #[test]
    fn composed_hierarchy_is_union_of_operands() {
        let left_root = PropertyMeta::new("order", None, false, None);
        let left = PropertyMeta::new("customer", Some(left_root.clone()), false, None);
        let right_root = PropertyMeta::new("customer", None, false, None);
        let right = PropertyMeta::new("name", Some(right_root.clone()), true, None);

        let composed = PropertyMeta::composed(left.clone(), right.clone());
        let ids: Vec<_> = composed.hierarchy().iter().map(|m| m.id()).collect();
        // Not addressable itself, so only the operands' chains appear.
        assert_eq!(
            ids,
            [left_root.id(), left.id(), right_root.id(), right.id()]
        );
        assert_eq!(composed.path(), "order.customer.customer.name");
        assert_eq!(composed.parent().map(|m| m.id()), Some(left.id()));
    }

    #[test]
    fn composed_inherits_writability_from_child() {
        let left = PropertyMeta::new("a", None, false, None);
        let right = PropertyMeta::new("b", None, true, None);
        assert!(PropertyMeta::composed(left.clone(), right).is_writable());

        let readonly = PropertyMeta::new("c", None, false, None);
        assert!(!PropertyMeta::composed(left, readonly).is_writable());
    }
}
