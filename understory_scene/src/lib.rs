// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a small retained element tree for driving Understory DnD.
//!
//! The scene plays the part of a document: elements with tags, classes and `id` attributes,
//! a document root and an overlay layer, and just enough layout to make sorting observable.
//!
//! - [`Layout::Free`] places children at their own offsets.
//! - [`Layout::Stack`] packs children along an axis with a gap.
//! - [`Layout::Inline`] flows children in rows that wrap at the element's width.
//!
//! Hidden elements take no space. Translations move an element and its subtree without
//! affecting siblings, like CSS transforms.
//!
//! [`Scene`] implements [`understory_dnd::host::Host`], so it can be handed directly to
//! [`understory_dnd::DragDrop`]. Selectors support tags, `.class`, `#id`, `*`, compounds such as
//! `li.card` and comma-separated lists.
//!
//! ## Not a layout engine
//!
//! There is no measurement of content, no padding and no alignment. Sizes are given explicitly
//! or derived from children; the goal is deterministic geometry for tests and demos.
//!
//! ## Example
//!
//! ```
//! use understory_scene::{Layout, Scene};
//! use understory_dnd::host::Host;
//! use kurbo::{Rect, Size};
//!
//! let mut scene = Scene::new(Size::new(400.0, 300.0));
//! let list = scene.insert_element(None, "ul", Layout::stack_vertical(4.0));
//! let a = scene.insert_sized(Some(list), "li", Size::new(100.0, 20.0));
//! let b = scene.insert_sized(Some(list), "li", Size::new(100.0, 20.0));
//!
//! assert_eq!(scene.bounding_rect(b), Rect::new(0.0, 24.0, 100.0, 44.0));
//!
//! // Moving `b` in front of `a` re-flows the list.
//! scene.insert_before(list, b, Some(a));
//! assert_eq!(scene.bounding_rect(a), Rect::new(0.0, 24.0, 100.0, 44.0));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod scene;
mod types;

pub use scene::Scene;
pub use types::{ElementFlags, ElementId, Layout, Style};
