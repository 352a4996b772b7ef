// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stateless geometry helpers: containment, tolerance tests, distances,
//! direction tracking and order-preserving array relocation.
//!
//! ## Degenerate rectangles
//!
//! A rectangle with zero (or non-finite) width or height describes an element that is hidden or
//! detached. Every containment and overlap test in this module treats such a rectangle as
//! "no intersection" instead of failing, so a vanishing element degrades a hit test rather than
//! aborting a drag.

use kurbo::{Point, Rect, Size, Vec2};

use crate::config::Tolerance;

/// Returns true if `rect` has no usable area.
#[inline]
pub fn is_degenerate(rect: Rect) -> bool {
    // Written as a negation so NaN extents count as degenerate.
    !(rect.width() > 0.0 && rect.height() > 0.0)
}

/// Returns true if `pt` lies inside `rect` (edges inclusive).
///
/// Always false for a degenerate `rect`.
pub fn point_in_rect(rect: Rect, pt: Point) -> bool {
    !is_degenerate(rect) && pt.x >= rect.x0 && pt.x <= rect.x1 && pt.y >= rect.y0 && pt.y <= rect.y1
}

/// Returns true if `inner` lies entirely within `outer` (edges inclusive).
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    !is_degenerate(outer)
        && !is_degenerate(inner)
        && inner.x0 >= outer.x0
        && inner.x1 <= outer.x1
        && inner.y0 >= outer.y0
        && inner.y1 <= outer.y1
}

/// Returns true if the two rectangles overlap or share an edge.
pub fn touches(a: Rect, b: Rect) -> bool {
    !is_degenerate(a)
        && !is_degenerate(b)
        && a.x0 <= b.x1
        && a.x1 >= b.x0
        && a.y0 <= b.y1
        && a.y1 >= b.y0
}

/// Returns true if `dragged` overlaps `zone` by at least half of its own extent on both axes.
///
/// This is the same as the center of `dragged` lying inside `zone`.
pub fn intersects_half(zone: Rect, dragged: Rect) -> bool {
    !is_degenerate(dragged) && point_in_rect(zone, dragged.center())
}

/// Decide whether a dragged element is over a zone for the given [`Tolerance`].
///
/// `pointer` is only consulted for [`Tolerance::Pointer`]; the other modes compare the dragged
/// element's bounding box against the zone's.
pub fn tolerance_hit(tolerance: Tolerance, zone: Rect, dragged: Rect, pointer: Point) -> bool {
    match tolerance {
        Tolerance::Pointer => point_in_rect(zone, pointer),
        Tolerance::Fit => contains_rect(zone, dragged),
        Tolerance::Intersect => intersects_half(zone, dragged),
        Tolerance::Touch => touches(zone, dragged),
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Distance between the top-left corners of two rectangles.
#[inline]
pub fn origin_distance(a: Rect, b: Rect) -> f64 {
    a.origin().distance(b.origin())
}

/// Manhattan distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Clamp `value` into `[min, max]`. When `max < min`, `min` wins.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(value))
}

/// Clamp a pointer so that a box of `size`, grabbed at `pickup` (offset inside the box), stays
/// inside `boundary`.
pub fn clamp_to_boundary(pointer: Point, pickup: Vec2, size: Size, boundary: Rect) -> Point {
    let min_x = boundary.x0 + pickup.x;
    let max_x = boundary.x1 - (size.width - pickup.x);
    let min_y = boundary.y0 + pickup.y;
    let max_y = boundary.y1 - (size.height - pickup.y);
    Point::new(
        clamp(pointer.x, min_x, max_x),
        clamp(pointer.y, min_y, max_y),
    )
}

/// Move the element at `from` to `to`, shifting everything in between by one slot.
///
/// Indices are clamped to the slice. The relative order of all other elements is preserved, and
/// `from == to` is a no-op.
pub fn move_item_in_array<T>(array: &mut [T], from: usize, to: usize) {
    let Some(last) = array.len().checked_sub(1) else {
        return;
    };
    let from = from.min(last);
    let to = to.min(last);
    if from < to {
        array[from..=to].rotate_left(1);
    } else if to < from {
        array[to..=from].rotate_right(1);
    }
}

/// Remove the element at `from` in `source` and insert it at `to` in `target`.
///
/// `from` is clamped to the source, `to` to the target's length (appending is allowed).
/// Does nothing when `source` is empty.
pub fn transfer_array_item<T>(source: &mut Vec<T>, target: &mut Vec<T>, from: usize, to: usize) {
    let Some(last) = source.len().checked_sub(1) else {
        return;
    };
    let item = source.remove(from.min(last));
    let to = to.min(target.len());
    target.insert(to, item);
}

/// Copy the element at `from` in `source` into `target` at `to`, leaving `source` intact.
pub fn copy_array_item<T: Clone>(source: &[T], target: &mut Vec<T>, from: usize, to: usize) {
    let Some(last) = source.len().checked_sub(1) else {
        return;
    };
    let to = to.min(target.len());
    target.insert(to, source[from.min(last)].clone());
}

/// Sign of the most recent movement along one axis.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Sign {
    /// Moving toward smaller coordinates.
    Negative,
    /// No movement recorded yet.
    #[default]
    Zero,
    /// Moving toward larger coordinates.
    Positive,
}

impl Sign {
    /// The sign as `-1`, `0` or `1`.
    pub const fn value(self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Zero => 0,
            Self::Positive => 1,
        }
    }
}

/// Most recent horizontal and vertical movement direction of the pointer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DirectionDelta {
    /// Horizontal direction.
    pub x: Sign,
    /// Vertical direction.
    pub y: Sign,
}

/// Tracks [`DirectionDelta`] with hysteresis.
///
/// The direction on an axis only changes after the pointer has travelled more than `threshold`
/// since the last change on that axis, so per-pixel jitter does not flip it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionTracker {
    delta: DirectionDelta,
    anchor: Point,
    threshold: f64,
}

impl DirectionTracker {
    /// Start tracking from `origin`.
    pub fn new(origin: Point, threshold: f64) -> Self {
        Self {
            delta: DirectionDelta::default(),
            anchor: origin,
            threshold,
        }
    }

    /// Current direction.
    pub fn delta(&self) -> DirectionDelta {
        self.delta
    }

    /// Feed a new pointer position and return the (possibly unchanged) direction.
    pub fn update(&mut self, pt: Point) -> DirectionDelta {
        if (pt.x - self.anchor.x).abs() > self.threshold {
            self.delta.x = if pt.x > self.anchor.x {
                Sign::Positive
            } else {
                Sign::Negative
            };
            self.anchor.x = pt.x;
        }
        if (pt.y - self.anchor.y).abs() > self.threshold {
            self.delta.y = if pt.y > self.anchor.y {
                Sign::Positive
            } else {
                Sign::Negative
            };
            self.anchor.y = pt.y;
        }
        self.delta
    }
}
