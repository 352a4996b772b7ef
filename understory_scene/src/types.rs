// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: element identifiers, flags, and layout policies.

use kurbo::{Size, Vec2};

/// Identifier for an element in the scene.
///
/// A small, copyable handle that stays stable across updates but becomes invalid when the
/// underlying slot is reused. It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On removal, the slot is freed; any existing `ElementId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ElementId`.
///
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check whether an `ElementId` still refers
/// to a live element. Host queries on stale ids answer as if the element were detached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-element flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// The node is an element (text nodes are not).
        const ELEMENT = 0b0000_0001;
        /// The element and its subtree take no space and have an empty bounding box.
        const HIDDEN = 0b0000_0010;
        /// Native drag, selection and touch interactions are enabled.
        const NATIVE_DRAG = 0b0000_0100;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::ELEMENT | Self::NATIVE_DRAG
    }
}

/// How an element places its children.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Layout {
    /// Each child sits at its own offset from the element's origin.
    #[default]
    Free,
    /// Children are packed one after another along an axis.
    Stack {
        /// Pack top to bottom (`true`) or left to right.
        vertical: bool,
        /// Space between consecutive children.
        gap: f64,
    },
    /// Children flow left to right and wrap onto new rows at the element's width.
    Inline {
        /// Space between children, both within a row and between rows.
        gap: f64,
    },
}

impl Layout {
    /// A top to bottom stack.
    pub const fn stack_vertical(gap: f64) -> Self {
        Self::Stack {
            vertical: true,
            gap,
        }
    }

    /// A left to right stack.
    pub const fn stack_horizontal(gap: f64) -> Self {
        Self::Stack {
            vertical: false,
            gap,
        }
    }

    /// A wrapping row flow.
    pub const fn inline(gap: f64) -> Self {
        Self::Inline { gap }
    }
}

/// Style of a new element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Layout of the element's children.
    pub layout: Layout,
    /// Fixed size; `None` sizes the element to fit its children.
    pub size: Option<Size>,
    /// Offset from the parent's origin when the parent uses [`Layout::Free`].
    pub offset: Vec2,
}

