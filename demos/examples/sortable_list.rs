// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reorder a vertical list by dragging one row over the others.
//!
//! The application keeps its own model and mirrors the single `Dropped` notification with
//! `move_item_in_array`.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example sortable_list`
//! - `RUST_LOG=understory_dnd=trace cargo run -p understory_dnd_demos --example sortable_list`

use core::time::Duration;

use kurbo::{Point, Size};
use understory_dnd::DragDrop;
use understory_dnd::config::{DragConfig, SortConfig};
use understory_dnd::event::{Event, SortEvent};
use understory_dnd::geometry::move_item_in_array;
use understory_dnd::input::PointerEvent;
use understory_scene::{Layout, Scene};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut model: Vec<String> = (0..8).map(|i| format!("task {i}")).collect();

    let mut scene = Scene::new(Size::new(400.0, 600.0));
    let list = scene.insert_element(None, "ul", Layout::stack_vertical(0.0));
    let mut dnd = DragDrop::new();
    let container = dnd
        .attach_sortable(&scene, list, SortConfig::default())
        .unwrap();
    let items = model
        .iter()
        .map(|_| {
            let row = scene.insert_sized(Some(list), "li", Size::new(300.0, 40.0));
            dnd.attach_drag(&mut scene, row, DragConfig::default()).unwrap()
        })
        .collect();
    dnd.set_items(container, items).unwrap();

    // Pick up the third row and pull it down past three neighbors.
    let mut t = Duration::ZERO;
    let mut sample = |y: f64| {
        t += Duration::from_millis(16);
        let pt = Point::new(20.0, y);
        PointerEvent::mouse(pt, scene.hit_test(pt), t)
    };
    let path: Vec<_> = [90.0, 100.0, 130.0, 150.0, 170.0, 190.0, 230.0]
        .into_iter()
        .map(&mut sample)
        .collect();

    let mut events = dnd.pointer_down(&mut scene, &path[0]);
    for ev in &path[1..] {
        events.extend(dnd.pointer_move(&mut scene, ev));
    }
    events.extend(dnd.pointer_up(&mut scene, &path[path.len() - 1]));

    println!("== Events ==");
    for event in &events {
        println!("  {event:?}");
    }

    for event in &events {
        if let Event::Sort(SortEvent::Dropped(drop)) = event {
            move_item_in_array(&mut model, drop.previous_index, drop.current_index);
        }
    }
    println!("== Model ==\n  {model:?}");
    assert_eq!(model[5], "task 2");
}
