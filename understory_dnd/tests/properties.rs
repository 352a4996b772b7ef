// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the drag start threshold and cached-position relocation.

use core::time::Duration;

use kurbo::{Point, Rect, Size, Vec2};
use proptest::prelude::*;
use understory_dnd::config::DragConfig;
use understory_dnd::event::{Event, SessionEvent};
use understory_dnd::input::PointerEvent;
use understory_dnd::sortable::{CachedItem, Flow, relocate};
use understory_dnd::{DragDrop, SessionId};
use understory_scene::{ElementId, Layout, Scene};

/// A column of items with integer heights and gaps, plus the ids to label them.
fn column(heights: &[u32], gap: u32) -> Vec<CachedItem<ElementId>> {
    let mut scene = Scene::new(Size::new(1000.0, 1000.0));
    let mut dnd = DragDrop::new();
    let list = scene.insert_element(None, "ul", Layout::stack_vertical(f64::from(gap)));
    let mut y = 0.0;
    heights
        .iter()
        .map(|h| {
            let h = f64::from(*h);
            let element = scene.insert_sized(Some(list), "li", Size::new(100.0, h));
            let item: SessionId = dnd
                .attach_drag(&mut scene, element, DragConfig::default())
                .unwrap();
            let rect = Rect::new(0.0, y, 100.0, y + h);
            y += h + f64::from(gap);
            CachedItem {
                item,
                element,
                rect,
                offset: Vec2::ZERO,
            }
        })
        .collect()
}

fn order(positions: &[CachedItem<ElementId>]) -> Vec<SessionId> {
    positions.iter().map(|p| p.item).collect()
}

fn arb_column() -> impl Strategy<Value = (Vec<u32>, u32, usize, usize)> {
    (proptest::collection::vec(1_u32..=80, 2..=10), 0_u32..=12).prop_flat_map(|(heights, gap)| {
        let n = heights.len();
        (Just(heights), Just(gap), 0..n, 0..n)
    })
}

proptest! {
    #[test]
    fn drag_starts_exactly_at_threshold(dx in -12_i32..=12, dy in -12_i32..=12) {
        let mut scene = Scene::new(Size::new(800.0, 600.0));
        let mut dnd = DragDrop::new();
        let card = scene.insert_sized(None, "div", Size::new(50.0, 50.0));
        let id = dnd.attach_drag(&mut scene, card, DragConfig::default()).unwrap();
        let t = Duration::ZERO;
        dnd.pointer_down(&mut scene, &PointerEvent::mouse(Point::new(20.0, 20.0), Some(card), t));
        let to = Point::new(20.0 + f64::from(dx), 20.0 + f64::from(dy));
        let events = dnd.pointer_move(&mut scene, &PointerEvent::mouse(to, None, t));

        let expected = dx.abs() + dy.abs() >= 5;
        prop_assert_eq!(dnd.is_dragging(id), expected);
        let started = events
            .iter()
            .any(|e| matches!(e, Event::Session { event: SessionEvent::Started { .. }, .. }));
        prop_assert_eq!(started, expected);
    }

    #[test]
    fn relocation_preserves_packing((heights, gap, from, to) in arb_column()) {
        let mut positions = column(&heights, gap);
        let span = (positions[0].rect.y0, positions[positions.len() - 1].rect.y1);
        let before = order(&positions);
        relocate(&mut positions, from, to, Flow::Vertical);

        // Order changes like a single array move.
        let mut expected = before.clone();
        let moved = expected.remove(from);
        expected.insert(to, moved);
        prop_assert_eq!(order(&positions), expected);

        // Slots stay packed with the original gaps and the column keeps its extent.
        prop_assert_eq!(positions[0].rect.y0, span.0);
        prop_assert_eq!(positions[positions.len() - 1].rect.y1, span.1);
        for pair in positions.windows(2) {
            prop_assert_eq!(pair[1].rect.y0 - pair[0].rect.y1, f64::from(gap));
        }
    }

    #[test]
    fn relocation_round_trips((heights, gap, from, to) in arb_column()) {
        let original = column(&heights, gap);
        let mut positions = original.clone();
        relocate(&mut positions, from, to, Flow::Vertical);
        relocate(&mut positions, to, from, Flow::Vertical);
        prop_assert_eq!(order(&positions), order(&original));
        for (a, b) in positions.iter().zip(&original) {
            prop_assert_eq!(a.rect, b.rect);
            prop_assert_eq!(a.offset, Vec2::ZERO);
        }
    }

    #[test]
    fn relocation_in_place_is_a_no_op((heights, gap, from, _to) in arb_column()) {
        let original = column(&heights, gap);
        let mut positions = original.clone();
        relocate(&mut positions, from, from, Flow::Vertical);
        prop_assert_eq!(order(&positions), order(&original));
        for (a, b) in positions.iter().zip(&original) {
            prop_assert_eq!(a.rect, b.rect);
        }
    }
}
