// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd --heading-base-level=0

//! Understory DnD: a pointer-driven drag, drop and sort engine.
//!
//! Understory DnD turns raw pointer input (mouse and touch) into drag gestures over an element
//! tree owned by someone else.
//!
//! - Drag sessions follow the pointer once it travels a start threshold, optionally locked to an
//!   axis and clamped to a boundary, and either move the element itself or a floating preview.
//! - Drop zones hit-test the dragged element with a tolerance mode and claim drops, with greedy
//!   zones shadowing the zones they are nested in.
//! - Sortable containers reorder their members live while one is dragged and transfer members
//!   to connected containers.
//!
//! ## The host
//!
//! The engine never owns elements. Everything it needs from the tree (geometry, structure,
//! mutation and global listener installation) goes through the [`Host`](host::Host) trait, with
//! elements as small copyable handles. The `understory_scene` crate provides an in-memory host
//! with a simple flow layout.
//!
//! ## Pointer broker
//!
//! A single [`PointerBroker`](broker::PointerBroker) owns the global listeners: it installs the
//! touch-move listener while any draggable exists and the move/up listeners only while some
//! session is armed or dragging. Zones and containers learn about sessions through the broker's
//! started and stopped notices and then subscribe to the session channels they care about.
//!
//! ## Events
//!
//! Every input call on [`DragDrop`] returns the [`Event`](event::Event)s it produced, in order.
//! A drag reports `BeforeStarted`, `Started`, `Moved`..., `Released`, optional `Dropped`, and
//! exactly one `Ended`. Sortable drags finish with a
//! [`DropEvent`](event::DropEvent) describing where the item came from and where it landed.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_dnd::DragDrop;
//! use understory_dnd::config::{DragConfig, DropZoneConfig, SortConfig};
//! use understory_dnd::event::{Event, SortEvent};
//! use understory_dnd::input::PointerEvent;
//! use understory_dnd::zone::Accept;
//! use understory_scene::{Layout, Scene};
//! use kurbo::{Point, Size};
//! use core::time::Duration;
//!
//! let mut scene = Scene::new(Size::new(800.0, 600.0));
//! let list = scene.insert_element(None, "ul", Layout::stack_vertical(0.0));
//! let rows: Vec<_> = (0..3)
//!     .map(|_| scene.insert_sized(Some(list), "li", Size::new(200.0, 40.0)))
//!     .collect();
//!
//! let mut dnd = DragDrop::new();
//! let container = dnd.attach_sortable(&scene, list, SortConfig::default()).unwrap();
//! let items = rows
//!     .iter()
//!     .map(|row| dnd.attach_drag(&mut scene, *row, DragConfig::default()).unwrap())
//!     .collect::<Vec<_>>();
//! dnd.set_items(container, items.clone()).unwrap();
//!
//! // Drag the first row below the last one.
//! let t = Duration::ZERO;
//! dnd.pointer_down(&mut scene, &PointerEvent::mouse(Point::new(10.0, 20.0), Some(rows[0]), t));
//! for y in [40.0, 70.0, 110.0] {
//!     dnd.pointer_move(&mut scene, &PointerEvent::mouse(Point::new(10.0, y), None, t));
//! }
//! let events = dnd.pointer_up(&mut scene, &PointerEvent::mouse(Point::new(10.0, 110.0), None, t));
//!
//! let dropped = events.iter().find_map(|e| match e {
//!     Event::Sort(SortEvent::Dropped(drop)) => Some(*drop),
//!     _ => None,
//! });
//! assert_eq!(dropped.map(|d| (d.previous_index, d.current_index)), Some((0, 2)));
//! assert_eq!(dnd.container(container).unwrap().items(), &[items[1], items[2], items[0]]);
//! ```

pub mod broker;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod host;
pub mod input;
pub mod session;
pub mod sortable;
pub mod zone;

mod slots;

#[cfg(test)]
mod test_host;

pub use engine::DragDrop;
pub use error::{Error, Result};
pub use slots::{ContainerId, SessionId, ZoneId};
