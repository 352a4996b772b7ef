// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Move a card between two connected lists, kanban style.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example connected_lists`

use core::time::Duration;

use kurbo::{Point, Size, Vec2};
use understory_dnd::config::{DragConfig, SortConfig};
use understory_dnd::event::{Event, SortEvent};
use understory_dnd::geometry::{move_item_in_array, transfer_array_item};
use understory_dnd::input::PointerEvent;
use understory_dnd::{ContainerId, DragDrop};
use understory_scene::{ElementId, Layout, Scene, Style};

struct Column {
    id: ContainerId,
    cards: Vec<ElementId>,
    titles: Vec<&'static str>,
}

fn column(
    scene: &mut Scene,
    dnd: &mut DragDrop<ElementId>,
    offset: Vec2,
    titles: Vec<&'static str>,
) -> Column {
    let element = scene.insert(
        None,
        "ul",
        Style {
            layout: Layout::stack_vertical(8.0),
            offset,
            ..Style::default()
        },
    );
    let cards: Vec<_> = titles
        .iter()
        .map(|_| scene.insert_sized(Some(element), "li", Size::new(200.0, 40.0)))
        .collect();
    let id = dnd
        .attach_sortable(scene, element, SortConfig::default())
        .unwrap();
    let items = cards
        .iter()
        .map(|card| dnd.attach_drag(scene, *card, DragConfig::default()).unwrap())
        .collect();
    dnd.set_items(id, items).unwrap();
    Column { id, cards, titles }
}

fn main() {
    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let mut dnd = DragDrop::new();
    let mut todo = column(
        &mut scene,
        &mut dnd,
        Vec2::ZERO,
        vec!["write", "review", "ship"],
    );
    let mut done = column(&mut scene, &mut dnd, Vec2::new(300.0, 0.0), vec!["plan"]);
    dnd.connect(todo.id, done.id).unwrap();
    dnd.connect(done.id, todo.id).unwrap();

    // "review" sits at y 48..88. Carry it over to the right column, below "plan" (y 0..40).
    let review = todo.cards[1];
    let at = |x: f64, y: f64| PointerEvent::mouse(Point::new(x, y), None, Duration::ZERO);
    let down = PointerEvent::mouse(Point::new(20.0, 60.0), Some(review), Duration::ZERO);
    let mut events = dnd.pointer_down(&mut scene, &down);
    events.extend(dnd.pointer_move(&mut scene, &at(20.0, 70.0)));
    events.extend(dnd.pointer_move(&mut scene, &at(350.0, 30.0)));
    events.extend(dnd.pointer_up(&mut scene, &at(350.0, 30.0)));

    for event in &events {
        match event {
            Event::Sort(SortEvent::Exited { container, .. }) => {
                println!("left   {container:?}");
            }
            Event::Sort(SortEvent::Entered { container, index, .. }) => {
                println!("joined {container:?} at {index}");
            }
            Event::Sort(SortEvent::Dropped(drop)) => {
                println!(
                    "dropped into {:?} at {} (from {:?} at {})",
                    drop.container, drop.current_index, drop.previous_container, drop.previous_index
                );
                if drop.container == drop.previous_container {
                    let titles = if drop.container == todo.id {
                        &mut todo.titles
                    } else {
                        &mut done.titles
                    };
                    move_item_in_array(titles, drop.previous_index, drop.current_index);
                } else if drop.container == done.id {
                    transfer_array_item(
                        &mut todo.titles,
                        &mut done.titles,
                        drop.previous_index,
                        drop.current_index,
                    );
                } else {
                    transfer_array_item(
                        &mut done.titles,
                        &mut todo.titles,
                        drop.previous_index,
                        drop.current_index,
                    );
                }
            }
            _ => {}
        }
    }

    println!("todo: {:?}", todo.titles);
    println!("done: {:?}", done.titles);
    assert_eq!(todo.titles, ["write", "ship"]);
    assert_eq!(done.titles, ["plan", "review"]);
    assert_eq!(dnd.container(done.id).unwrap().items().len(), 2);
}
