// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host interface: geometry, visual-tree mutation, helper templates and global listeners.
//!
//! ## Overview
//!
//! The engine never owns elements. Everything it knows about them comes from a [`Host`], and every
//! visual side effect (inserting a placeholder, translating an element, hiding the original while
//! a preview follows the pointer) goes back through it. This keeps the decision logic in
//! [`geometry`](crate::geometry) and [`sortable`](crate::sortable) testable without a rendering
//! surface.
//!
//! Rectangles are in client space: the host's page coordinates minus its scroll offset.

use core::fmt::Debug;
use core::time::Duration;

use kurbo::{Rect, Size, Vec2};

bitflags::bitflags! {
    /// Document-level listeners installed by the [`PointerBroker`](crate::broker::PointerBroker).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GlobalListeners: u8 {
        /// Pointer (mouse or touch) move samples.
        const POINTER_MOVE = 0b0000_0001;
        /// Pointer (mouse or touch) release.
        const POINTER_UP   = 0b0000_0010;
        /// Text selection start; its default is prevented while dragging.
        const SELECT_START = 0b0000_0100;
        /// Wheel scrolling; its default is prevented during mouse drags.
        const WHEEL        = 0b0000_1000;
        /// Touch move guard; prevents native scrolling while a touch drag is active.
        const TOUCH_MOVE   = 0b0001_0000;
    }
}

impl GlobalListeners {
    /// Listeners tied to an active drag (everything but the touch-move guard).
    pub const DRAG: Self = Self::POINTER_MOVE
        .union(Self::POINTER_UP)
        .union(Self::SELECT_START)
        .union(Self::WHEEL);
}

/// Kind of input driving a drag.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputKind {
    /// Mouse (or pen reported as mouse).
    Mouse,
    /// Touch.
    Touch,
}

/// Opaque reference to a preview or placeholder template the host knows how to render.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct HelperTemplate(pub u64);

/// Collaborator interface between the engine and the element tree it manipulates.
pub trait Host {
    /// Element handle.
    type Element: Copy + Eq + Debug;

    /// Returns true if `node` is an element (as opposed to text or another non-element node).
    fn is_element(&self, node: Self::Element) -> bool;

    /// Current client-space bounding box of `element`, including applied translations.
    ///
    /// Hidden or detached elements report a degenerate rectangle.
    fn bounding_rect(&self, element: Self::Element) -> Rect;

    /// Current scroll offset of the viewport.
    fn scroll_offset(&self) -> Vec2;

    /// Duration of the transform transition on `element`, zero if it has none.
    fn transition_duration(&self, _element: Self::Element) -> Duration {
        Duration::ZERO
    }

    /// Parent of `element`, if attached.
    fn parent(&self, element: Self::Element) -> Option<Self::Element>;

    /// Next sibling of `element`, if any.
    fn next_sibling(&self, element: Self::Element) -> Option<Self::Element>;

    /// Returns true if `element` matches the style selector.
    fn matches_selector(&self, element: Self::Element, selector: &str) -> bool;

    /// Returns true if `container` lays its children out inline or floated (wrapping rows)
    /// rather than as a block stack.
    fn is_inline_flow(&self, _container: Self::Element) -> bool {
        false
    }

    /// Insert `node` into `parent` before `reference`, or at the end when `reference` is `None`.
    ///
    /// A node that is already attached somewhere is moved.
    fn insert_before(
        &mut self,
        parent: Self::Element,
        node: Self::Element,
        reference: Option<Self::Element>,
    );

    /// Attach `node` to the fixed-position overlay layer (the document body for a browser).
    ///
    /// Overlay elements are positioned only by their translation.
    fn append_to_overlay(&mut self, node: Self::Element);

    /// Detach `node` from its parent, keeping it alive.
    fn detach(&mut self, node: Self::Element);

    /// Detach and release a node created by [`Host::clone_node`] or [`Host::render_template`].
    fn destroy(&mut self, node: Self::Element) {
        self.detach(node);
    }

    /// Deep-clone `node` into a new, detached element (without its identifier attribute).
    fn clone_node(&mut self, node: Self::Element) -> Self::Element;

    /// Current 2D translation applied to `element`.
    fn translation(&self, element: Self::Element) -> Vec2;

    /// Apply a 2D translation to `element`.
    fn set_translation(&mut self, element: Self::Element, translation: Vec2);

    /// Hide or show `element` (hidden elements take no space).
    fn set_hidden(&mut self, element: Self::Element, hidden: bool);

    /// Force the size of `element`.
    fn set_size(&mut self, element: Self::Element, size: Size);

    /// Add or remove a class on `element`.
    fn set_class(&mut self, element: Self::Element, class: &str, enabled: bool);

    /// Enable or disable the platform's native drag and selection behavior on `element`.
    fn set_native_drag_interactions(&mut self, _element: Self::Element, _enabled: bool) {}

    /// Render a helper template into a new, detached element.
    ///
    /// Returning `None` makes the engine fall back to a clone of the dragged element.
    fn render_template(&mut self, _template: HelperTemplate) -> Option<Self::Element> {
        None
    }

    /// Install document-level listeners.
    fn listen(&mut self, listeners: GlobalListeners, input: InputKind);

    /// Remove document-level listeners.
    fn unlisten(&mut self, listeners: GlobalListeners);
}

/// Returns true if `node` is `ancestor` or one of its descendants.
pub fn contains<H: Host + ?Sized>(host: &H, ancestor: H::Element, node: H::Element) -> bool {
    let mut cur = Some(node);
    while let Some(el) = cur {
        if el == ancestor {
            return true;
        }
        cur = host.parent(el);
    }
    false
}

/// Nearest strict ancestor of `element` matching `selector`.
pub fn closest_ancestor<H: Host + ?Sized>(
    host: &H,
    element: H::Element,
    selector: &str,
) -> Option<H::Element> {
    let mut cur = host.parent(element);
    while let Some(el) = cur {
        if host.matches_selector(el, selector) {
            return Some(el);
        }
        cur = host.parent(el);
    }
    None
}
