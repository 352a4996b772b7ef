// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sortable containers: live reordering of drag sessions by pointer position.
//!
//! ## Algorithm
//!
//! At drag start the container snapshots the rectangle of each member into [`CachedItem`]s,
//! ordered top to bottom then left to right. Each pointer sample then:
//!
//! 1. finds the cached item under the pointer ([`find_sort_target`]), ignoring items the pointer
//!    is not moving toward and the swap it just made;
//! 2. decides by which half of that item the pointer is in whether the dragged item goes before
//!    or after it;
//! 3. moves the placeholder in the tree and [`relocate`]s the cache entry, shifting the cached
//!    rectangles of everything in between instead of re-querying the host.
//!
//! The cache order is the visual order, which is the item order reported on drop.

use kurbo::{Point, Rect, Vec2};

use crate::config::{SortAxis, SortConfig};
use crate::event::SortEvent;
use crate::geometry::{DirectionDelta, Sign, move_item_in_array, point_in_rect};
use crate::host::Host;
use crate::slots::{ContainerId, SessionId};

/// How a container lays out its items, as far as sorting is concerned.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Flow {
    /// Block stack, top to bottom.
    Vertical,
    /// Single row, left to right.
    Horizontal,
    /// Inline or floated items wrapping into rows.
    Inline,
}

impl From<SortAxis> for Flow {
    fn from(axis: SortAxis) -> Self {
        match axis {
            SortAxis::Vertical => Self::Vertical,
            SortAxis::Horizontal => Self::Horizontal,
        }
    }
}

/// Snapshot of a member's geometry during a drag.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CachedItem<E> {
    /// The member session.
    pub item: SessionId,
    /// Element occupying the member's slot (the placeholder for the dragged item).
    pub element: E,
    /// Client rectangle, kept current as items are relocated.
    pub rect: Rect,
    /// Total shift applied to `rect` since the snapshot.
    pub offset: Vec2,
}

fn same_row(a: Rect, b: Rect) -> bool {
    a.y0 < b.y1 && b.y0 < a.y1
}

/// Find the item the dragged one should move to.
///
/// Returns the target index and the direction of travel that led there. Only the item under
/// `pointer` is considered, and only when:
///
/// - the pointer moves toward it (items after the dragged one need a non-negative step,
///   items before it a non-positive one);
/// - it is not the swap just made in the same direction;
/// - the pointer is in its trailing half (items after) or leading half (items before).
pub fn find_sort_target<E>(
    positions: &[CachedItem<E>],
    dragged: usize,
    pointer: Point,
    delta: DirectionDelta,
    flow: Flow,
    previous_swap: Option<(SessionId, Sign)>,
) -> Option<(usize, Sign)> {
    let dragged_rect = positions.get(dragged)?.rect;
    let (index, target) = positions
        .iter()
        .enumerate()
        .find(|(i, p)| *i != dragged && point_in_rect(p.rect, pointer))?;
    let after = index > dragged;
    let horizontal = match flow {
        Flow::Vertical => false,
        Flow::Horizontal => true,
        Flow::Inline => same_row(target.rect, dragged_rect),
    };
    let step = if horizontal { delta.x } else { delta.y };
    let toward = if after {
        step != Sign::Negative
    } else {
        step != Sign::Positive
    };
    if !toward || previous_swap == Some((target.item, step)) {
        return None;
    }
    let center = target.rect.center();
    let past_middle = if horizontal {
        pointer.x > center.x
    } else {
        pointer.y > center.y
    };
    (after == past_middle).then_some((index, step))
}

/// Move the cached item at `from` to `to`, shifting the rectangles of the items in between so
/// they mirror the new layout.
///
/// Stacked flows re-pack the affected range from its start, keeping the gaps between slots.
/// Inline flows hand each item the origin of the slot it lands in.
pub fn relocate<E>(positions: &mut [CachedItem<E>], from: usize, to: usize, flow: Flow) {
    if from == to || from >= positions.len() || to >= positions.len() {
        return;
    }
    let (lo, hi) = (from.min(to), from.max(to));
    match flow {
        Flow::Vertical | Flow::Horizontal => {
            let vertical = flow == Flow::Vertical;
            let start = |r: Rect| if vertical { r.y0 } else { r.x0 };
            let end = |r: Rect| if vertical { r.y1 } else { r.x1 };
            let gaps: Vec<f64> = (lo..hi)
                .map(|k| start(positions[k + 1].rect) - end(positions[k].rect))
                .collect();
            let mut cursor = start(positions[lo].rect);
            move_item_in_array(positions, from, to);
            for (n, p) in positions[lo..=hi].iter_mut().enumerate() {
                let shift = cursor - start(p.rect);
                let v = if vertical {
                    Vec2::new(0.0, shift)
                } else {
                    Vec2::new(shift, 0.0)
                };
                p.rect = p.rect + v;
                p.offset += v;
                cursor = end(p.rect) + gaps.get(n).copied().unwrap_or(0.0);
            }
        }
        Flow::Inline => {
            let origins: Vec<Point> = positions[lo..=hi].iter().map(|p| p.rect.origin()).collect();
            move_item_in_array(positions, from, to);
            for (p, origin) in positions[lo..=hi].iter_mut().zip(origins) {
                let v = origin - p.rect.origin();
                p.rect = p.rect + v;
                p.offset += v;
            }
        }
    }
}

/// Index at which an item entering from another container lands: next to the cached item
/// nearest to `pointer`, on the side of its center the pointer is on.
pub fn enter_index<E>(positions: &[CachedItem<E>], pointer: Point, flow: Flow) -> usize {
    let nearest = positions.iter().enumerate().min_by(|(_, a), (_, b)| {
        a.rect
            .center()
            .distance(pointer)
            .total_cmp(&b.rect.center().distance(pointer))
    });
    let Some((index, item)) = nearest else {
        return 0;
    };
    let center = item.rect.center();
    let after = match flow {
        Flow::Vertical => pointer.y > center.y,
        Flow::Horizontal | Flow::Inline => pointer.x > center.x,
    };
    if after { index + 1 } else { index }
}

#[derive(Copy, Clone, Debug)]
struct ActiveSort {
    session: SessionId,
    previous_swap: Option<(SessionId, Sign)>,
}

/// An ordered collection of drag sessions.
#[derive(Debug)]
pub struct SortableContainer<E> {
    id: ContainerId,
    element: E,
    config: SortConfig,
    items: Vec<SessionId>,
    connected: Vec<ContainerId>,
    positions: Vec<CachedItem<E>>,
    active: Option<ActiveSort>,
}

impl<E: Copy + Eq + core::fmt::Debug> SortableContainer<E> {
    pub(crate) fn new(id: ContainerId, element: E, config: SortConfig) -> Self {
        Self {
            id,
            element,
            config,
            items: Vec::new(),
            connected: Vec::new(),
            positions: Vec::new(),
            active: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Element the container is attached to.
    pub fn element(&self) -> E {
        self.element
    }

    /// Configuration.
    pub fn config(&self) -> SortConfig {
        self.config
    }

    /// Members in visual order.
    pub fn items(&self) -> &[SessionId] {
        &self.items
    }

    /// Index of `item` among the members.
    pub fn index_of(&self, item: SessionId) -> Option<usize> {
        self.items.iter().position(|i| *i == item)
    }

    /// Containers this one can hand items to.
    pub fn connected(&self) -> &[ContainerId] {
        &self.connected
    }

    /// Cached positions of the current drag (empty between drags).
    pub fn positions(&self) -> &[CachedItem<E>] {
        &self.positions
    }

    /// Session whose drag the container takes part in.
    pub fn sorting(&self) -> Option<SessionId> {
        self.active.map(|a| a.session)
    }

    /// Returns true if the container neither sorts nor receives items.
    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Enable or disable the container. Takes effect from the next drag.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    /// Change the main axis.
    pub fn set_axis(&mut self, axis: SortAxis) {
        self.config.axis = axis;
    }

    /// Flow used for sorting, asking the host about inline layout.
    pub fn flow<H: Host<Element = E> + ?Sized>(&self, host: &H) -> Flow {
        if host.is_inline_flow(self.element) {
            Flow::Inline
        } else {
            self.config.axis.into()
        }
    }

    pub(crate) fn set_items(&mut self, items: Vec<SessionId>) {
        self.items = items;
    }

    pub(crate) fn remove_item(&mut self, item: SessionId) {
        self.items.retain(|i| *i != item);
        self.positions.retain(|p| p.item != item);
    }

    pub(crate) fn connect(&mut self, other: ContainerId) {
        if other != self.id && !self.connected.contains(&other) {
            self.connected.push(other);
        }
    }

    pub(crate) fn disconnect(&mut self, other: ContainerId) {
        self.connected.retain(|c| *c != other);
    }

    /// Take part in the drag of `session`, snapshotting `members` (item and slot element).
    pub(crate) fn begin<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        session: SessionId,
        members: impl IntoIterator<Item = (SessionId, E)>,
    ) {
        self.active = Some(ActiveSort {
            session,
            previous_swap: None,
        });
        self.positions = members
            .into_iter()
            .map(|(item, element)| CachedItem {
                item,
                element,
                rect: Rect::ZERO,
                offset: Vec2::ZERO,
            })
            .collect();
        self.refresh(host);
    }

    /// Re-query every cached rectangle after the tree changed.
    pub(crate) fn refresh<H: Host<Element = E> + ?Sized>(&mut self, host: &H) {
        for p in &mut self.positions {
            p.rect = host.bounding_rect(p.element);
            p.offset = Vec2::ZERO;
        }
        self.positions.sort_by(|a, b| {
            a.rect
                .y0
                .total_cmp(&b.rect.y0)
                .then(a.rect.x0.total_cmp(&b.rect.x0))
        });
    }

    pub(crate) fn position_of(&self, item: SessionId) -> Option<usize> {
        self.positions.iter().position(|p| p.item == item)
    }

    pub(crate) fn take_position(&mut self, item: SessionId) -> Option<CachedItem<E>> {
        let index = self.position_of(item)?;
        Some(self.positions.remove(index))
    }

    pub(crate) fn insert_position(&mut self, index: usize, entry: CachedItem<E>) {
        let index = index.min(self.positions.len());
        self.positions.insert(index, entry);
        if let Some(active) = &mut self.active {
            active.previous_swap = None;
        }
    }

    /// Make the member list match the cached (visual) order.
    pub(crate) fn commit_order(&mut self) {
        self.items = self.positions.iter().map(|p| p.item).collect();
    }

    /// Leave the drag, dropping the cache.
    pub(crate) fn finish(&mut self) {
        self.active = None;
        self.positions.clear();
    }

    /// Reorder for a pointer sample of the dragged `session`.
    pub(crate) fn sort<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        session: SessionId,
        pointer: Point,
        delta: DirectionDelta,
    ) -> Option<SortEvent> {
        let from = self.position_of(session)?;
        let flow = self.flow(host);
        let previous_swap = self.active.and_then(|a| a.previous_swap);
        let (to, step) =
            find_sort_target(&self.positions, from, pointer, delta, flow, previous_swap)?;

        let placeholder = self.positions[from].element;
        let target = self.positions[to].element;
        let parent = host.parent(target).unwrap_or(self.element);
        let reference = if to > from {
            host.next_sibling(target)
        } else {
            Some(target)
        };
        host.insert_before(parent, placeholder, reference);

        let swapped = self.positions[to].item;
        relocate(&mut self.positions, from, to, flow);
        if let Some(active) = &mut self.active {
            active.previous_swap = Some((swapped, step));
        }
        tracing::trace!(container = ?self.id, ?session, from, to, ?pointer, "sorted");
        Some(SortEvent::Sorted {
            container: self.id,
            item: session,
            previous_index: from,
            current_index: to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SlotKey;

    fn sid(i: u32) -> SessionId {
        SessionId::from_parts(i, 1)
    }

    fn column(n: u32, height: f64, gap: f64) -> Vec<CachedItem<u32>> {
        (0..n)
            .map(|i| {
                let y = f64::from(i) * (height + gap);
                CachedItem {
                    item: sid(i),
                    element: i,
                    rect: Rect::new(0.0, y, 100.0, y + height),
                    offset: Vec2::ZERO,
                }
            })
            .collect()
    }

    fn down() -> DirectionDelta {
        DirectionDelta {
            x: Sign::Zero,
            y: Sign::Positive,
        }
    }

    #[test]
    fn trailing_half_of_a_later_item_is_a_target() {
        let p = column(8, 40.0, 0.0);
        // I5 spans y 200..240.
        let hit = find_sort_target(&p, 2, Point::new(50.0, 225.0), down(), Flow::Vertical, None);
        assert_eq!(hit, Some((5, Sign::Positive)));
        // Leading half: not yet.
        let miss = find_sort_target(&p, 2, Point::new(50.0, 210.0), down(), Flow::Vertical, None);
        assert_eq!(miss, None);
    }

    #[test]
    fn direction_filter_and_previous_swap() {
        let p = column(4, 40.0, 0.0);
        let up = DirectionDelta {
            x: Sign::Zero,
            y: Sign::Negative,
        };
        // Moving up over a later item does nothing.
        assert_eq!(
            find_sort_target(&p, 0, Point::new(50.0, 70.0), up, Flow::Vertical, None),
            None
        );
        // Moving up into the leading half of an earlier item.
        assert_eq!(
            find_sort_target(&p, 3, Point::new(50.0, 50.0), up, Flow::Vertical, None),
            Some((1, Sign::Negative))
        );
        assert_eq!(
            find_sort_target(
                &p,
                3,
                Point::new(50.0, 50.0),
                up,
                Flow::Vertical,
                Some((sid(1), Sign::Negative))
            ),
            None
        );
    }

    #[test]
    fn relocate_repacks_stack_with_gaps() {
        let mut p = column(4, 40.0, 10.0);
        relocate(&mut p, 0, 2, Flow::Vertical);
        let order: Vec<u32> = p.iter().map(|c| c.element).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
        let tops: Vec<f64> = p.iter().map(|c| c.rect.y0).collect();
        assert_eq!(tops, vec![0.0, 50.0, 100.0, 150.0]);
        assert_eq!(p[2].offset, Vec2::new(0.0, 100.0));
        assert_eq!(p[0].offset, Vec2::new(0.0, -50.0));
    }

    #[test]
    fn relocate_uneven_heights() {
        let mut p = column(3, 40.0, 0.0);
        p[0].rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        p[1].rect = Rect::new(0.0, 20.0, 100.0, 60.0);
        p[2].rect = Rect::new(0.0, 60.0, 100.0, 100.0);
        relocate(&mut p, 0, 1, Flow::Vertical);
        assert_eq!(p[0].rect, Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(p[1].rect, Rect::new(0.0, 40.0, 100.0, 60.0));
        assert_eq!(p[2].rect, Rect::new(0.0, 60.0, 100.0, 100.0));
    }

    #[test]
    fn relocate_inline_swaps_slot_origins() {
        let mut p: Vec<CachedItem<u32>> = (0..3)
            .map(|i| {
                let x = f64::from(i) * 50.0;
                CachedItem {
                    item: sid(i),
                    element: i,
                    rect: Rect::new(x, 0.0, x + 50.0, 50.0),
                    offset: Vec2::ZERO,
                }
            })
            .collect();
        relocate(&mut p, 2, 0, Flow::Inline);
        assert_eq!(p[0].element, 2);
        assert_eq!(p[0].rect.origin(), Point::ZERO);
        assert_eq!(p[2].rect.origin(), Point::new(100.0, 0.0));
    }

    #[test]
    fn inline_flow_compares_within_row_horizontally() {
        let mut p = column(1, 50.0, 0.0);
        p[0].rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        p.push(CachedItem {
            item: sid(1),
            element: 1,
            rect: Rect::new(50.0, 0.0, 100.0, 50.0),
            offset: Vec2::ZERO,
        });
        let right = DirectionDelta {
            x: Sign::Positive,
            y: Sign::Zero,
        };
        assert_eq!(
            find_sort_target(&p, 0, Point::new(80.0, 10.0), right, Flow::Inline, None),
            Some((1, Sign::Positive))
        );
        assert_eq!(
            find_sort_target(&p, 0, Point::new(60.0, 10.0), right, Flow::Inline, None),
            None
        );
    }

    #[test]
    fn entering_picks_the_side_of_the_nearest_item() {
        let p = column(3, 40.0, 0.0);
        assert_eq!(enter_index(&p, Point::new(50.0, 45.0), Flow::Vertical), 1);
        assert_eq!(enter_index(&p, Point::new(50.0, 70.0), Flow::Vertical), 2);
        assert_eq!(enter_index(&p, Point::new(50.0, 500.0), Flow::Vertical), 3);
        let empty: Vec<CachedItem<u32>> = Vec::new();
        assert_eq!(enter_index(&empty, Point::ZERO, Flow::Vertical), 0);
    }
}
