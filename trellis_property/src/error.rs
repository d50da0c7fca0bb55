// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The failure vocabulary of path resolution.

use alloc::string::String;
use core::fmt;

use trellis_context::ReferenceKind;

use crate::meta::PropertyMeta;

/// An error raised while resolving a property path.
///
/// Every variant carries the dotted path of the property at which
/// resolution failed. Errors are raised synchronously and never retried or
/// swallowed by the engine; the caller decides whether a failure is a
/// legitimate business outcome (and catches it) or a bug (and lets it
/// propagate). [`Property::exists`](crate::Property::exists) and
/// [`Property::is_null`](crate::Property::is_null) are the sanctioned way
/// to probe a path without triggering [`PathError::Interrupted`] or
/// [`PathError::OutOfBounds`].
#[derive(Clone, PartialEq, Eq)]
pub enum PathError {
    /// An ancestor value required to continue resolution was absent, and
    /// the operation did not opt into null tolerance.
    Interrupted {
        /// Path of the property whose value was absent.
        at: String,
    },
    /// A property along the chain needs a reference, but the context did
    /// not supply one of the right kind.
    Unreferenced {
        /// Path of the property missing its reference.
        at: String,
        /// The kind of reference that was needed.
        kind: ReferenceKind,
    },
    /// A supplied reference does not match the live container: an index
    /// out of range, an absent map key, a value that is not a set member,
    /// or a route hop past the leaf count.
    OutOfBounds {
        /// Path of the property whose reference missed.
        at: String,
    },
    /// A mutation was attempted on a property constructed without a
    /// mutation strategy.
    Readonly {
        /// Path of the read-only property.
        at: String,
    },
    /// A drop-by-value mutation named a value that is not present in the
    /// target collection, or a predecessor/successor scan never met the
    /// requested element.
    UnknownElement {
        /// Path of the property that was scanned.
        at: String,
    },
}

impl PathError {
    pub(crate) fn interrupted(meta: &PropertyMeta) -> Self {
        Self::Interrupted { at: meta.path() }
    }

    pub(crate) fn unreferenced(meta: &PropertyMeta, kind: ReferenceKind) -> Self {
        Self::Unreferenced {
            at: meta.path(),
            kind,
        }
    }

    pub(crate) fn out_of_bounds(meta: &PropertyMeta) -> Self {
        Self::OutOfBounds { at: meta.path() }
    }

    pub(crate) fn readonly(meta: &PropertyMeta) -> Self {
        Self::Readonly { at: meta.path() }
    }

    pub(crate) fn unknown_element(meta: &PropertyMeta) -> Self {
        Self::UnknownElement { at: meta.path() }
    }

    /// Returns the dotted path of the property at which resolution failed.
    #[must_use]
    pub fn at(&self) -> &str {
        match self {
            Self::Interrupted { at }
            | Self::Unreferenced { at, .. }
            | Self::OutOfBounds { at }
            | Self::Readonly { at }
            | Self::UnknownElement { at } => at,
        }
    }
}

impl fmt::Debug for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted { at } => write!(f, "Interrupted {{ at: {at:?} }}"),
            Self::Unreferenced { at, kind } => {
                write!(f, "Unreferenced {{ at: {at:?}, kind: {kind:?} }}")
            }
            Self::OutOfBounds { at } => write!(f, "OutOfBounds {{ at: {at:?} }}"),
            Self::Readonly { at } => write!(f, "Readonly {{ at: {at:?} }}"),
            Self::UnknownElement { at } => write!(f, "UnknownElement {{ at: {at:?} }}"),
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted { at } => {
                write!(f, "path interrupted at '{at}': an ancestor value is absent")
            }
            Self::Unreferenced { at, kind } => {
                write!(f, "no {kind} reference supplied for '{at}'")
            }
            Self::OutOfBounds { at } => {
                write!(f, "reference for '{at}' does not match the live container")
            }
            Self::Readonly { at } => write!(f, "property '{at}' is read-only"),
            Self::UnknownElement { at } => {
                write!(f, "value not present in the collection at '{at}'")
            }
        }
    }
}

impl core::error::Error for PathError {}
