// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications emitted by sessions, drop zones and sortable containers.
//!
//! Every [`DragDrop`](crate::engine::DragDrop) input call returns the [`Event`]s it produced in
//! emission order. Within a single drag, session events follow
//! `BeforeStarted`, `Started`, `Moved`*, `Released`, `Ended`, with `Ended` emitted exactly once.

use kurbo::Point;

use crate::geometry::DirectionDelta;
use crate::input::PointerEvent;
use crate::slots::{ContainerId, SessionId, ZoneId};

/// Session-level notifications.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent<E> {
    /// A pointer-down reached the session (emitted before any filtering).
    BeforeStarted,
    /// The pointer crossed the drag start threshold.
    Started {
        /// Client-space pickup point.
        pointer: Point,
    },
    /// The pointer moved while dragging; only emitted when someone observes moves.
    Moved {
        /// Constrained client-space pointer position.
        pointer: Point,
        /// The raw host sample.
        event: PointerEvent<E>,
        /// Direction of travel.
        delta: DirectionDelta,
    },
    /// The pointer was released after a drag started.
    Released,
    /// The drag is over and the element is back in the tree.
    Ended,
    /// The dragged item entered a sortable container other than the one holding it.
    Entered {
        /// The container entered.
        container: ContainerId,
    },
    /// The dragged item left a sortable container.
    Exited {
        /// The container left.
        container: ContainerId,
    },
    /// A drop zone claimed the drop.
    Dropped {
        /// The claiming zone.
        zone: ZoneId,
    },
}

/// Drop zone notifications.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ZoneEvent {
    /// The zone accepted a starting session and now tracks it.
    Activated {
        /// Zone.
        zone: ZoneId,
        /// Tracked session.
        session: SessionId,
    },
    /// The zone stopped tracking the session.
    Deactivated {
        /// Zone.
        zone: ZoneId,
        /// Session that was tracked.
        session: SessionId,
    },
    /// The dragged element is now over the zone.
    Entered {
        /// Zone.
        zone: ZoneId,
        /// Tracked session.
        session: SessionId,
    },
    /// The dragged element left the zone.
    Exited {
        /// Zone.
        zone: ZoneId,
        /// Tracked session.
        session: SessionId,
    },
    /// The zone claimed the drop.
    Dropped {
        /// Zone.
        zone: ZoneId,
        /// Dropped session.
        session: SessionId,
    },
    /// The tracked drag ended.
    Ended {
        /// Zone.
        zone: ZoneId,
        /// Session whose drag ended.
        session: SessionId,
    },
}

/// Final report of a sortable drag.
///
/// This is what applications apply to their own collections, typically with
/// [`move_item_in_array`](crate::geometry::move_item_in_array) when `container ==
/// previous_container` and [`transfer_array_item`](crate::geometry::transfer_array_item)
/// otherwise.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DropEvent {
    /// The dragged item.
    pub item: SessionId,
    /// Container the item was dropped into.
    pub container: ContainerId,
    /// Index of the item in `container`.
    pub current_index: usize,
    /// Container the item was picked up from.
    pub previous_container: ContainerId,
    /// Index the item had in `previous_container`.
    pub previous_index: usize,
    /// Whether the pointer was over `container` on release.
    pub is_pointer_over_container: bool,
}

/// Sortable container notifications.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SortEvent {
    /// An item entered the container from a connected one.
    Entered {
        /// Container entered.
        container: ContainerId,
        /// The dragged item.
        item: SessionId,
        /// Index the placeholder was inserted at.
        index: usize,
    },
    /// An item left the container for a connected one.
    Exited {
        /// Container left.
        container: ContainerId,
        /// The dragged item.
        item: SessionId,
    },
    /// The placeholder moved within the container.
    Sorted {
        /// Container sorting.
        container: ContainerId,
        /// The dragged item.
        item: SessionId,
        /// Index before the move.
        previous_index: usize,
        /// Index after the move.
        current_index: usize,
    },
    /// The drag ended.
    Dropped(DropEvent),
}

/// Any notification, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<E> {
    /// From a drag session.
    Session {
        /// Emitting session.
        session: SessionId,
        /// What happened.
        event: SessionEvent<E>,
    },
    /// From a drop zone.
    Zone(ZoneEvent),
    /// From a sortable container.
    Sort(SortEvent),
}

impl<E> Event<E> {
    /// The session event, if this is one emitted by `session`.
    pub fn session_event(&self, session: SessionId) -> Option<&SessionEvent<E>> {
        match self {
            Self::Session { session: s, event } if *s == session => Some(event),
            _ => None,
        }
    }
}
