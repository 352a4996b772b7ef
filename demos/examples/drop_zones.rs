// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop a card on a zone, then miss and watch it revert.
//!
//! The card only reverts when no zone takes it (`RevertPolicy::OnInvalidDrop`). The bin
//! accepts elements matching `.card` and hit-tests with the pointer position.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example drop_zones`
//! - `RUST_LOG=understory_dnd=debug cargo run -p understory_dnd_demos --example drop_zones`

use core::time::Duration;

use kurbo::{Point, Rect, Size, Vec2};
use understory_dnd::DragDrop;
use understory_dnd::config::{DragConfig, DropZoneConfig, RevertPolicy, Tolerance};
use understory_dnd::event::Event;
use understory_dnd::host::Host;
use understory_dnd::input::PointerEvent;
use understory_dnd::zone::Accept;
use understory_scene::{ElementId, Scene};

fn throw(
    scene: &mut Scene,
    dnd: &mut DragDrop<ElementId>,
    card: ElementId,
    from: Point,
    to: Point,
) -> Vec<Event<ElementId>> {
    let down = PointerEvent::mouse(from, Some(card), Duration::ZERO);
    let mut events = dnd.pointer_down(scene, &down);
    let moved = PointerEvent::mouse(to, None, Duration::from_millis(16));
    events.extend(dnd.pointer_move(scene, &moved));
    events.extend(dnd.pointer_up(scene, &moved));
    events
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let mut dnd = DragDrop::new();

    let card = scene.insert_at(None, "div", Rect::new(400.0, 0.0, 450.0, 50.0));
    scene.add_class(card, "card");
    let session = dnd
        .attach_drag(
            &mut scene,
            card,
            DragConfig {
                revert: RevertPolicy::OnInvalidDrop,
                ..Default::default()
            },
        )
        .unwrap();

    let bin = scene.insert_at(None, "aside", Rect::new(0.0, 0.0, 200.0, 200.0));
    let bin_zone = dnd
        .attach_drop_zone(
            &scene,
            bin,
            DropZoneConfig {
                tolerance: Tolerance::Pointer,
                ..Default::default()
            },
            Accept::from(".card"),
        )
        .unwrap();

    println!("== Miss ==");
    let pickup = Point::new(410.0, 10.0);
    let events = throw(&mut scene, &mut dnd, card, pickup, Point::new(600.0, 400.0));
    for event in &events {
        println!("  {event:?}");
    }
    assert_eq!(scene.translation(card), Vec2::ZERO);

    println!("== Hit ==");
    let events = throw(&mut scene, &mut dnd, card, pickup, Point::new(100.0, 100.0));
    for event in &events {
        println!("  {event:?}");
    }
    assert_eq!(dnd.session(session).unwrap().accepted_zones(), &[bin_zone]);
    println!("card now at {:?}", scene.bounding_rect(card));
    assert_eq!(scene.translation(card), Vec2::new(-310.0, 90.0));
}
