// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration for drag sessions, drop zones and sortable containers.
//!
//! All configuration is plain data with a [`Default`] so call sites can use struct update syntax:
//!
//! ```
//! use understory_dnd::config::{Axis, DragConfig, RevertPolicy};
//!
//! let config = DragConfig {
//!     lock_axis: Some(Axis::X),
//!     revert: RevertPolicy::OnInvalidDrop,
//!     ..Default::default()
//! };
//! assert_eq!(config.drag_start_threshold, 5.0);
//! ```
//!
//! With the `serde` feature enabled every type here is `Serialize`/`Deserialize`.

/// Scope shared by draggables and drop zones that did not set one.
pub const DEFAULT_SCOPE: &str = "default";

/// An axis of the page.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// When a standalone draggable jumps back to where it was picked up.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevertPolicy {
    /// Stay where released.
    #[default]
    Never,
    /// Always return.
    Always,
    /// Return unless some drop zone accepted the drop.
    OnInvalidDrop,
    /// Return only if some drop zone accepted the drop.
    OnValidDrop,
}

impl RevertPolicy {
    /// Whether to revert, given whether any drop zone accepted the drop this cycle.
    pub const fn should_revert(self, accepted: bool) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::OnInvalidDrop => !accepted,
            Self::OnValidDrop => accepted,
        }
    }
}

/// Geometric rule used to decide whether a dragged element is over a drop zone.
///
/// See [`tolerance_hit`](crate::geometry::tolerance_hit).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tolerance {
    /// The dragged box lies entirely inside the zone.
    Fit,
    /// The dragged box overlaps the zone by at least half on both axes.
    #[default]
    Intersect,
    /// The pointer lies inside the zone.
    Pointer,
    /// The dragged box overlaps the zone by any amount.
    Touch,
}

/// Main axis along which a sortable container lays out its items.
///
/// Containers whose host reports an inline (wrapping) flow ignore this and compare items within
/// a row horizontally and across rows vertically.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortAxis {
    /// Items stacked top to bottom.
    #[default]
    Vertical,
    /// Items laid out left to right.
    Horizontal,
}

/// Per-session drag configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DragConfig {
    /// Manhattan distance in pixels the pointer must travel before a drag starts.
    pub drag_start_threshold: f64,
    /// Distance in pixels the pointer must travel before the direction delta flips.
    pub direction_change_threshold: f64,
    /// Restrict movement to one axis.
    pub lock_axis: Option<Axis>,
    /// Revert policy for standalone draggables.
    pub revert: RevertPolicy,
    /// Scope tag; drop zones only consider sessions in the same scope.
    pub scope: String,
    /// Selector of an ancestor to drag instead of the attached element.
    ///
    /// If no ancestor matches, the attached element itself is dragged.
    pub root_selector: Option<String>,
    /// Selector of an ancestor whose box the dragged element must stay within.
    ///
    /// If no ancestor matches, movement is unconstrained.
    pub boundary_selector: Option<String>,
    /// Start disabled.
    pub disabled: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_start_threshold: 5.0,
            direction_change_threshold: 5.0,
            lock_axis: None,
            revert: RevertPolicy::Never,
            scope: String::from(DEFAULT_SCOPE),
            root_selector: None,
            boundary_selector: None,
            disabled: false,
        }
    }
}

/// Drop zone configuration (the plain-data part; acceptance lives on the zone).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DropZoneConfig {
    /// Hit-test rule.
    pub tolerance: Tolerance,
    /// Claim drops ahead of enclosing zones.
    pub greedy: bool,
    /// Scope tag; must equal the dragged session's scope.
    pub scope: String,
    /// Ignore every drag.
    pub disabled: bool,
}

impl Default for DropZoneConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::Intersect,
            greedy: false,
            scope: String::from(DEFAULT_SCOPE),
            disabled: false,
        }
    }
}

/// Sortable container configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SortConfig {
    /// Main layout axis.
    pub axis: SortAxis,
    /// Neither sort nor receive items.
    pub disabled: bool,
}
