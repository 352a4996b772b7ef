// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported when attaching or configuring behavior.
//!
//! Only attachment-time calls are fallible. Nothing in the per-sample path returns an error:
//! degenerate geometry degrades to "no intersection" and every started drag reaches `Ended`.

use crate::slots::{ContainerId, SessionId, ZoneId};

/// Result alias for fallible engine calls.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors returned by [`DragDrop`](crate::engine::DragDrop) attachment and configuration calls.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Drag or drop behavior was attached to a node that is not an element.
    #[error("cannot attach {behavior} to a node that is not an element")]
    NotAnElement {
        /// The behavior that was being attached.
        behavior: &'static str,
    },
    /// The session handle is stale or was never issued.
    #[error("unknown drag session {0:?}")]
    UnknownSession(SessionId),
    /// The zone handle is stale or was never issued.
    #[error("unknown drop zone {0:?}")]
    UnknownZone(ZoneId),
    /// The container handle is stale or was never issued.
    #[error("unknown sortable container {0:?}")]
    UnknownContainer(ContainerId),
    /// The session is already an item of another sortable container.
    #[error("drag session {session:?} already belongs to container {owner:?}")]
    AlreadyOwned {
        /// The session being added.
        session: SessionId,
        /// The container currently owning it.
        owner: ContainerId,
    },
    /// Items cannot change while one of them is being dragged.
    #[error("container {0:?} is in the middle of a drag")]
    DragInProgress(ContainerId),
}
